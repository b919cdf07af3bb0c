//! Encryption key slots: 33 bytes each, 8 slots, one 264-byte block.
//!
//! Byte 0 low nibble selects the algorithm; bytes 1.. carry the hex key
//! packed two digits per byte, high nibble first, for exactly the
//! algorithm's digit budget (10 / 32 / 64). Bytes past the budget stay
//! `0xFF`. A slot is empty when bytes 0 and 1 are both `0xFF`.

use crate::doc_enum;
use crate::fields::at;
use crate::{KEYS_LEN, MAX_KEYS};

pub const RECORD_LEN: usize = 33;

doc_enum! {
    pub enum KeyAlgorithm {
        Arc4 = 0 => "Arc4",
        Aes128 = 1 => "Aes128",
        Aes256 = 2 => "Aes256",
    }
}

impl KeyAlgorithm {
    /// Required key length in hex digits.
    pub fn digits(self) -> usize {
        match self {
            KeyAlgorithm::Arc4 => 10,
            KeyAlgorithm::Aes128 => 32,
            KeyAlgorithm::Aes256 => 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncryptionKey {
    pub algorithm: KeyAlgorithm,
    /// Uppercase hex, exactly `algorithm.digits()` long.
    pub key: String,
}

pub fn decode(buf: &[u8]) -> Option<EncryptionKey> {
    if at(buf, 0) == 0xFF && at(buf, 1) == 0xFF {
        return None;
    }
    let algorithm = KeyAlgorithm::from_raw(at(buf, 0) & 0x0F).unwrap_or_default();
    let mut key = String::with_capacity(algorithm.digits());
    for i in 0..algorithm.digits() {
        let b = at(buf, 1 + i / 2);
        let nibble = if i % 2 == 0 { b >> 4 } else { b & 0x0F };
        key.push(
            char::from_digit(nibble as u32, 16)
                .unwrap_or('0')
                .to_ascii_uppercase(),
        );
    }
    Some(EncryptionKey { algorithm, key })
}

pub fn encode(key: &EncryptionKey, out: &mut [u8]) {
    out.fill(0xFF);
    out[0] = key.algorithm.raw();
    let digits = key.algorithm.digits();
    let mut nibbles = vec![0u8; digits];
    for (i, c) in key.key.chars().take(digits).enumerate() {
        nibbles[i] = c.to_digit(16).unwrap_or(0) as u8;
    }
    for (i, pair) in nibbles.chunks(2).enumerate() {
        out[1 + i] = (pair[0] << 4) | pair.get(1).copied().unwrap_or(0);
    }
}

/// Split the 264-byte block into 8 slots.
pub fn decode_block(buf: &[u8]) -> Vec<Option<EncryptionKey>> {
    (0..MAX_KEYS)
        .map(|i| {
            let off = i * RECORD_LEN;
            decode(buf.get(off..off + RECORD_LEN).unwrap_or(&[]))
        })
        .collect()
}

pub fn encode_block(slots: &[Option<EncryptionKey>]) -> Vec<u8> {
    let mut out = vec![0xFF; KEYS_LEN];
    for (i, slot) in slots.iter().enumerate().take(MAX_KEYS) {
        if let Some(key) = slot {
            encode(key, &mut out[i * RECORD_LEN..(i + 1) * RECORD_LEN]);
        }
    }
    out
}
