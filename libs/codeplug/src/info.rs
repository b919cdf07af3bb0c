//! Basic info block: 64 bytes. Model name (GB2312) at offset 8, model ID
//! at offset 20 as eight ASCII digits left-padded with `'0'`. Written to
//! the radio only when the caller explicitly opts in.

use crate::fields::{at, decode_gb2312, encode_gb2312};
use crate::INFO_LEN;

pub const NAME_OFFSET: usize = 8;
pub const NAME_LEN: usize = 12;
pub const ID_OFFSET: usize = 20;
pub const ID_DIGITS: usize = 8;

pub const MAX_MODEL_ID: u32 = 99_999_999;

#[derive(Debug, Clone, PartialEq)]
pub struct RadioInfo {
    pub model_name: String,
    pub model_id: u32,
}

impl Default for RadioInfo {
    fn default() -> Self {
        Self {
            model_name: "RT-5D".into(),
            model_id: 0,
        }
    }
}

pub fn decode(buf: &[u8]) -> RadioInfo {
    let mut model_id = 0u32;
    for i in 0..ID_DIGITS {
        let b = at(buf, ID_OFFSET + i);
        if b.is_ascii_digit() {
            model_id = model_id * 10 + (b - b'0') as u32;
        }
    }
    RadioInfo {
        model_name: decode_gb2312(buf.get(NAME_OFFSET..NAME_OFFSET + NAME_LEN).unwrap_or(&[])),
        model_id,
    }
}

pub fn encode(info: &RadioInfo) -> Vec<u8> {
    let mut out = vec![0xFF; INFO_LEN];
    encode_gb2312(&info.model_name, &mut out[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);
    let digits = format!("{:08}", info.model_id.min(MAX_MODEL_ID));
    out[ID_OFFSET..ID_OFFSET + ID_DIGITS].copy_from_slice(digits.as_bytes());
    out
}
