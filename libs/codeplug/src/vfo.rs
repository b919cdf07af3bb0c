//! VFO banks A and B: one 128-byte block of two channel-shaped records.
//!
//! The layout matches a channel record except that byte 24 carries the
//! tuning step instead of the learn-FHSS flag, and the scan-add byte and
//! FHSS region are unowned. Erased frequency fields substitute the
//! per-bank defaults so a factory-fresh radio still shows something
//! tunable.

use crate::channel::{
    decode_kind, encode_kind, Bandwidth, ChannelKind, Power, TimeSlot, NAME_LEN, NAME_OFFSET,
};
use crate::doc_enum;
use crate::fields::{at, decode_gb2312, encode_gb2312, read_freq, read_u16_le, write_freq, write_u16_le};
use crate::subaudio::SubAudio;

pub const BANK_LEN: usize = 64;

/// 136.125 MHz in 10 Hz units.
pub const BANK_A_DEFAULT_FREQ: u32 = 13_612_500;
/// 400.125 MHz in 10 Hz units.
pub const BANK_B_DEFAULT_FREQ: u32 = 40_012_500;

doc_enum! {
    pub enum VfoStep {
        Khz2_5 = 0 => "2.5kHz",
        Khz5 = 1 => "5kHz",
        Khz6_25 = 2 => "6.25kHz",
        Khz10 = 3 => "10kHz",
        Khz12_5 = 4 => "12.5kHz",
        Khz20 = 5 => "20kHz",
        Khz25 = 6 => "25kHz",
        Khz50 = 7 => "50kHz",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VfoBank {
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
    pub tx_contact: Option<u16>,
    pub rx_group: Option<u16>,
    pub encryption_key: Option<u8>,
    pub step: VfoStep,
}

impl VfoBank {
    fn blank(default_freq: u32) -> Self {
        Self {
            name: String::new(),
            rx_freq: default_freq,
            tx_freq: default_freq,
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
            step: VfoStep::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VfoBanks {
    pub a: VfoBank,
    pub b: VfoBank,
}

impl Default for VfoBanks {
    fn default() -> Self {
        Self {
            a: VfoBank::blank(BANK_A_DEFAULT_FREQ),
            b: VfoBank::blank(BANK_B_DEFAULT_FREQ),
        }
    }
}

fn substitute(units: u32, default_freq: u32) -> u32 {
    if units == 0 || units == 0xFFFF_FFFF {
        default_freq
    } else {
        units
    }
}

fn decode_bank(buf: &[u8], default_freq: u32) -> VfoBank {
    VfoBank {
        name: decode_gb2312(buf.get(NAME_OFFSET..NAME_OFFSET + NAME_LEN).unwrap_or(&[])),
        rx_freq: substitute(read_freq(buf, 0), default_freq),
        tx_freq: substitute(read_freq(buf, 4), default_freq),
        rx_sub_audio: SubAudio::decode(at(buf, 8), at(buf, 9)),
        tx_sub_audio: SubAudio::decode(at(buf, 10), at(buf, 11)),
        power: Power::from_raw(at(buf, 12) & 0x0F).unwrap_or_default(),
        bandwidth: Bandwidth::from_raw(at(buf, 13) & 0x0F).unwrap_or_default(),
        kind: decode_kind(at(buf, 14), at(buf, 15)),
        color_code: at(buf, 16) & 0x0F,
        time_slot: TimeSlot::from_raw(at(buf, 17) & 0x0F).unwrap_or_default(),
        tx_contact: match read_u16_le(buf, 18) {
            0 | 0xFFFF => None,
            n => Some(n),
        },
        rx_group: match read_u16_le(buf, 20) {
            0 | 0xFFFF => None,
            n => Some(n),
        },
        encryption_key: match at(buf, 22) {
            0xFF | 0x00 => None,
            b => Some(b & 0x0F),
        },
        step: VfoStep::from_raw(at(buf, 24) & 0x0F).unwrap_or_default(),
    }
}

fn encode_bank(bank: &VfoBank, out: &mut [u8]) {
    out.fill(0xFF);
    write_freq(out, 0, bank.rx_freq);
    write_freq(out, 4, bank.tx_freq);
    out[8..10].copy_from_slice(&bank.rx_sub_audio.encode());
    out[10..12].copy_from_slice(&bank.tx_sub_audio.encode());
    out[12] = bank.power.raw();
    out[13] = bank.bandwidth.raw();
    let (b14, b15) = encode_kind(bank.kind);
    out[14] = b14;
    out[15] = b15;
    out[16] = bank.color_code & 0x0F;
    out[17] = bank.time_slot.raw();
    write_u16_le(out, 18, bank.tx_contact.unwrap_or(0xFFFF));
    write_u16_le(out, 20, bank.rx_group.unwrap_or(0xFFFF));
    out[22] = bank.encryption_key.map_or(0xFF, |k| k & 0x0F);
    out[24] = bank.step.raw();
    encode_gb2312(&bank.name, &mut out[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);
}

pub fn decode_banks(buf: &[u8]) -> VfoBanks {
    let (a, b) = if buf.len() >= 2 * BANK_LEN {
        (&buf[..BANK_LEN], &buf[BANK_LEN..2 * BANK_LEN])
    } else {
        (&[][..], &[][..])
    };
    VfoBanks {
        a: decode_bank(a, BANK_A_DEFAULT_FREQ),
        b: decode_bank(b, BANK_B_DEFAULT_FREQ),
    }
}

pub fn encode_banks(banks: &VfoBanks) -> Vec<u8> {
    let mut out = vec![0xFF; 2 * BANK_LEN];
    encode_bank(&banks.a, &mut out[..BANK_LEN]);
    let (_, rest) = out.split_at_mut(BANK_LEN);
    encode_bank(&banks.b, rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erased_block_substitutes_default_frequencies() {
        let banks = decode_banks(&[0xFF; 128]);
        assert_eq!(banks.a.rx_freq, 13_612_500);
        assert_eq!(banks.a.tx_freq, 13_612_500);
        assert_eq!(banks.b.rx_freq, 40_012_500);
        assert_eq!(banks.b.tx_freq, 40_012_500);
    }

    #[test]
    fn zero_frequencies_substitute_too() {
        let mut buf = vec![0xFF; 128];
        buf[0..4].fill(0x00);
        buf[64..68].fill(0x00);
        let banks = decode_banks(&buf);
        assert_eq!(banks.a.rx_freq, BANK_A_DEFAULT_FREQ);
        assert_eq!(banks.b.rx_freq, BANK_B_DEFAULT_FREQ);
    }

    #[test]
    fn step_lives_at_the_learn_fhss_position() {
        let mut banks = VfoBanks::default();
        banks.a.step = VfoStep::Khz25;
        let buf = encode_banks(&banks);
        assert_eq!(buf[24], 6);
        let back = decode_banks(&buf);
        assert_eq!(back.a.step, VfoStep::Khz25);
    }

    #[test]
    fn banks_roundtrip() {
        let mut banks = VfoBanks::default();
        banks.a.rx_freq = 14_550_000;
        banks.a.tx_freq = 14_610_000;
        banks.a.rx_sub_audio = SubAudio::Ctcss(1000);
        banks.a.kind = ChannelKind::Analog;
        banks.b.kind = ChannelKind::DmrTier2;
        banks.b.color_code = 5;
        banks.b.step = VfoStep::Khz12_5;
        let back = decode_banks(&encode_banks(&banks));
        assert_eq!(back, banks);
    }

    #[test]
    fn scan_add_and_fhss_region_stay_erased() {
        let buf = encode_banks(&VfoBanks::default());
        assert_eq!(buf[25], 0xFF);
        assert_eq!(&buf[28..32], &[0xFF; 4]);
        assert_eq!(buf[64 + 25], 0xFF);
    }
}
