//! Channel memory records: 64 bytes each, 1024 slots.
//!
//! Byte layout (all other bytes stay `0xFF`):
//!
//! ```text
//!  0..4   rx frequency, u32 LE, 10 Hz units
//!  4..8   tx frequency
//!  8..10  rx sub-audio          10..12  tx sub-audio
//!  12     power                 13      bandwidth
//!  14     1 = analog FM         15      digital tier (0 = I, 1 = II)
//!  16     color code            17      time slot
//!  18..20 tx contact slot, u16 LE, 1-based, 0xFFFF = none
//!  20..22 rx group slot
//!  22     encryption key slot, 1-based, 0xFF = none
//!  24     learn-FHSS flag       25      scan-add flag
//!  28..31 FHSS code, reversed nibble pairs; 31 = 0x00 valid / 0xFF unused
//!  32..44 name, GB2312
//! ```
//!
//! A record is empty when its first four bytes are all `0xFF` or all
//! `0x00`.

use crate::doc_enum;
use crate::fields::{
    at, decode_gb2312, encode_gb2312, read_freq, read_u16_le, write_freq, write_u16_le,
};
use crate::subaudio::SubAudio;

pub const RECORD_LEN: usize = 64;

pub const NAME_OFFSET: usize = 32;
pub const NAME_LEN: usize = 12;

doc_enum! {
    pub enum ChannelKind {
        Analog = 0 => "Analog",
        DmrTier1 = 1 => "DmrTier1",
        DmrTier2 = 2 => "DmrTier2",
    }
}

doc_enum! {
    pub enum Power {
        High = 1 => "High",
        Low = 0 => "Low",
    }
}

doc_enum! {
    pub enum Bandwidth {
        Narrow = 0 => "Narrow",
        Wide = 1 => "Wide",
    }
}

doc_enum! {
    pub enum TimeSlot {
        Slot1 = 0 => "Slot1",
        Slot2 = 1 => "Slot2",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub rx_freq: u32,
    pub tx_freq: u32,
    pub rx_sub_audio: SubAudio,
    pub tx_sub_audio: SubAudio,
    pub power: Power,
    pub bandwidth: Bandwidth,
    pub kind: ChannelKind,
    pub color_code: u8,
    pub time_slot: TimeSlot,
    /// 1-based contact slot used when transmitting.
    pub tx_contact: Option<u16>,
    /// 1-based rx group list slot.
    pub rx_group: Option<u16>,
    /// 1-based encryption key slot.
    pub encryption_key: Option<u8>,
    pub learn_fhss: bool,
    pub scan_add: bool,
    /// Six hex digits, present only on FHSS channels.
    pub fhss: Option<String>,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            name: String::new(),
            rx_freq: 0,
            tx_freq: 0,
            rx_sub_audio: SubAudio::Off,
            tx_sub_audio: SubAudio::Off,
            power: Power::default(),
            bandwidth: Bandwidth::default(),
            kind: ChannelKind::default(),
            color_code: 0,
            time_slot: TimeSlot::default(),
            tx_contact: None,
            rx_group: None,
            encryption_key: None,
            learn_fhss: false,
            scan_add: false,
            fhss: None,
        }
    }
}

pub(crate) fn decode_kind(b14: u8, b15: u8) -> ChannelKind {
    match b14 & 0x0F {
        1 => ChannelKind::Analog,
        0 => {
            if b15 & 0x0F == 1 {
                ChannelKind::DmrTier2
            } else {
                ChannelKind::DmrTier1
            }
        }
        _ => ChannelKind::Analog,
    }
}

pub(crate) fn encode_kind(kind: ChannelKind) -> (u8, u8) {
    match kind {
        ChannelKind::Analog => (1, 0),
        ChannelKind::DmrTier1 => (0, 0),
        ChannelKind::DmrTier2 => (0, 1),
    }
}

fn read_slot(buf: &[u8], off: usize) -> Option<u16> {
    match read_u16_le(buf, off) {
        0 | 0xFFFF => None,
        n => Some(n),
    }
}

fn write_slot(buf: &mut [u8], off: usize, slot: Option<u16>) {
    write_u16_le(buf, off, slot.unwrap_or(0xFFFF));
}

fn decode_fhss(buf: &[u8]) -> Option<String> {
    if at(buf, 31) != 0x00 {
        return None;
    }
    // byte28 = (d4<<4)|d5, byte29 = (d2<<4)|d3, byte30 = (d0<<4)|d1
    let pairs = [at(buf, 30), at(buf, 29), at(buf, 28)];
    let mut code = String::with_capacity(6);
    for b in pairs {
        code.push(char::from_digit((b >> 4) as u32, 16).unwrap_or('0').to_ascii_uppercase());
        code.push(char::from_digit((b & 0x0F) as u32, 16).unwrap_or('0').to_ascii_uppercase());
    }
    Some(code)
}

fn encode_fhss(code: &str, buf: &mut [u8]) {
    let mut d = [0u8; 6];
    for (i, c) in code.chars().take(6).enumerate() {
        d[i] = c.to_digit(16).unwrap_or(0) as u8;
    }
    buf[28] = (d[4] << 4) | d[5];
    buf[29] = (d[2] << 4) | d[3];
    buf[30] = (d[0] << 4) | d[1];
    buf[31] = 0x00;
}

pub fn decode(buf: &[u8]) -> Option<Channel> {
    let head = [at(buf, 0), at(buf, 1), at(buf, 2), at(buf, 3)];
    if head.iter().all(|&b| b == 0xFF) || head.iter().all(|&b| b == 0x00) {
        return None;
    }
    Some(Channel {
        name: decode_gb2312(buf.get(NAME_OFFSET..NAME_OFFSET + NAME_LEN).unwrap_or(&[])),
        rx_freq: read_freq(buf, 0),
        tx_freq: read_freq(buf, 4),
        rx_sub_audio: SubAudio::decode(at(buf, 8), at(buf, 9)),
        tx_sub_audio: SubAudio::decode(at(buf, 10), at(buf, 11)),
        power: Power::from_raw(at(buf, 12) & 0x0F).unwrap_or_default(),
        bandwidth: Bandwidth::from_raw(at(buf, 13) & 0x0F).unwrap_or_default(),
        kind: decode_kind(at(buf, 14), at(buf, 15)),
        color_code: at(buf, 16) & 0x0F,
        time_slot: TimeSlot::from_raw(at(buf, 17) & 0x0F).unwrap_or_default(),
        tx_contact: read_slot(buf, 18),
        rx_group: read_slot(buf, 20),
        encryption_key: match at(buf, 22) {
            0xFF | 0x00 => None,
            b => Some(b & 0x0F),
        },
        learn_fhss: at(buf, 24) & 0x0F == 1,
        scan_add: at(buf, 25) & 0x0F == 1,
        fhss: decode_fhss(buf),
    })
}

pub fn encode(ch: &Channel, out: &mut [u8]) {
    out.fill(0xFF);
    write_freq(out, 0, ch.rx_freq);
    write_freq(out, 4, ch.tx_freq);
    out[8..10].copy_from_slice(&ch.rx_sub_audio.encode());
    out[10..12].copy_from_slice(&ch.tx_sub_audio.encode());
    out[12] = ch.power.raw();
    out[13] = ch.bandwidth.raw();
    let (b14, b15) = encode_kind(ch.kind);
    out[14] = b14;
    out[15] = b15;
    out[16] = ch.color_code & 0x0F;
    out[17] = ch.time_slot.raw();
    write_slot(out, 18, ch.tx_contact);
    write_slot(out, 20, ch.rx_group);
    out[22] = ch.encryption_key.map_or(0xFF, |k| k & 0x0F);
    out[24] = ch.learn_fhss as u8;
    out[25] = ch.scan_add as u8;
    if let Some(code) = &ch.fhss {
        encode_fhss(code, out);
    }
    encode_gb2312(&ch.name, &mut out[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);
}
