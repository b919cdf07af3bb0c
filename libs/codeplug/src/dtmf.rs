//! DTMF block: 272 bytes.
//!
//! ```text
//!  0..6     current ID, one digit per byte, 0xFF terminated
//!  8        PTT ID mode        9  digit duration index
//!  10       digit interval index
//!  16..136  15 code groups, 8 bytes each, up to 6 digits, 0xFF fill
//! ```
//!
//! Digits index the alphabet `0123456789ABCD*#`. Everything else stays
//! `0xFF`.

use crate::doc_enum;
use crate::fields::{at, decode_digits, encode_digits, DTMF_ALPHABET};
use crate::DTMF_LEN;

pub const MAX_CODE_GROUPS: usize = 15;
pub const MAX_ID_DIGITS: usize = 5;
pub const MAX_GROUP_DIGITS: usize = 6;

const ID_OFFSET: usize = 0;
const ID_LEN: usize = 6;
const PTT_ID_OFFSET: usize = 8;
const DURATION_OFFSET: usize = 9;
const INTERVAL_OFFSET: usize = 10;
const GROUPS_OFFSET: usize = 16;
const GROUP_SLOT_LEN: usize = 8;

doc_enum! {
    pub enum PttId {
        Off = 0 => "Off",
        Bot = 1 => "Bot",
        Eot = 2 => "Eot",
        Both = 3 => "Both",
    }
}

doc_enum! {
    pub enum DtmfTiming {
        Ms100 = 1 => "100ms",
        Ms50 = 0 => "50ms",
        Ms150 = 2 => "150ms",
        Ms200 = 3 => "200ms",
        Ms250 = 4 => "250ms",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dtmf {
    pub current_id: String,
    pub ptt_id: PttId,
    pub duration: DtmfTiming,
    pub interval: DtmfTiming,
    pub code_groups: Vec<Option<String>>,
}

impl Default for Dtmf {
    fn default() -> Self {
        Self {
            current_id: String::new(),
            ptt_id: PttId::default(),
            duration: DtmfTiming::default(),
            interval: DtmfTiming::default(),
            code_groups: vec![None; MAX_CODE_GROUPS],
        }
    }
}

pub fn decode(buf: &[u8]) -> Dtmf {
    let mut code_groups = Vec::with_capacity(MAX_CODE_GROUPS);
    for i in 0..MAX_CODE_GROUPS {
        let off = GROUPS_OFFSET + i * GROUP_SLOT_LEN;
        let digits = decode_digits(buf.get(off..off + GROUP_SLOT_LEN).unwrap_or(&[]), DTMF_ALPHABET);
        code_groups.push(if digits.is_empty() { None } else { Some(digits) });
    }
    Dtmf {
        current_id: decode_digits(buf.get(ID_OFFSET..ID_OFFSET + ID_LEN).unwrap_or(&[]), DTMF_ALPHABET),
        ptt_id: PttId::from_raw(at(buf, PTT_ID_OFFSET) & 0x0F).unwrap_or_default(),
        duration: DtmfTiming::from_raw(at(buf, DURATION_OFFSET) & 0x0F).unwrap_or_default(),
        interval: DtmfTiming::from_raw(at(buf, INTERVAL_OFFSET) & 0x0F).unwrap_or_default(),
        code_groups,
    }
}

pub fn encode(dtmf: &Dtmf) -> Vec<u8> {
    let mut out = vec![0xFF; DTMF_LEN];
    encode_digits(&dtmf.current_id, DTMF_ALPHABET, &mut out[ID_OFFSET..ID_OFFSET + ID_LEN]);
    out[PTT_ID_OFFSET] = dtmf.ptt_id.raw();
    out[DURATION_OFFSET] = dtmf.duration.raw();
    out[INTERVAL_OFFSET] = dtmf.interval.raw();
    for (i, group) in dtmf.code_groups.iter().enumerate().take(MAX_CODE_GROUPS) {
        if let Some(digits) = group {
            let off = GROUPS_OFFSET + i * GROUP_SLOT_LEN;
            encode_digits(digits, DTMF_ALPHABET, &mut out[off..off + GROUP_SLOT_LEN]);
        }
    }
    out
}
