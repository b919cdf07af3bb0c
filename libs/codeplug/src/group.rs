//! Rx group lists: 128 bytes each, 32 slots.
//!
//! Bytes 0..96 hold up to 32 member IDs as big-endian triples. The member
//! list ends at the first all-zero triple; the encoder always writes that
//! terminator when fewer than 32 members are present, because `FF FF FF`
//! is a valid ID (16,777,215) and the `0xFF` fill must never read as one.
//! Bytes 96..108 are the GB2312 name; byte 96 at `0xFF` marks the slot
//! empty.

use crate::fields::{at, decode_gb2312, encode_gb2312, read_u24_be, write_u24_be};

pub const RECORD_LEN: usize = 128;
pub const MAX_MEMBERS: usize = 32;

pub const NAME_OFFSET: usize = 96;
pub const NAME_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct RxGroup {
    pub name: String,
    pub members: Vec<u32>,
}

pub fn decode(buf: &[u8]) -> Option<RxGroup> {
    if at(buf, NAME_OFFSET) == 0xFF {
        return None;
    }
    let mut members = Vec::new();
    for i in 0..MAX_MEMBERS {
        let id = read_u24_be(buf, i * 3);
        if id == 0 {
            break;
        }
        members.push(id);
    }
    Some(RxGroup {
        name: decode_gb2312(buf.get(NAME_OFFSET..NAME_OFFSET + NAME_LEN).unwrap_or(&[])),
        members,
    })
}

pub fn encode(group: &RxGroup, out: &mut [u8]) {
    out.fill(0xFF);
    let members = &group.members[..group.members.len().min(MAX_MEMBERS)];
    for (i, &id) in members.iter().enumerate() {
        write_u24_be(out, i * 3, id);
    }
    if members.len() < MAX_MEMBERS {
        write_u24_be(out, members.len() * 3, 0);
    }
    encode_gb2312(&group.name, &mut out[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);
}
