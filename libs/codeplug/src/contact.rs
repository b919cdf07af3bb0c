//! Address book records: 16 bytes each, 4000 slots.
//!
//! Byte 0 low nibble is the call type, byte 1 is `0x00` on valid records,
//! bytes 2..5 carry the 24-bit DMR ID big-endian and bytes 5..15 the
//! GB2312 name. A record is empty when byte 0, 1 or 5 reads `0xFF`.

use crate::doc_enum;
use crate::fields::{at, decode_gb2312, encode_gb2312, read_u24_be, write_u24_be};

pub const RECORD_LEN: usize = 16;

pub const NAME_OFFSET: usize = 5;
pub const NAME_LEN: usize = 10;

/// Largest 24-bit DMR ID.
pub const MAX_CALL_ID: u32 = 0xFF_FFFF;

doc_enum! {
    pub enum CallType {
        Group = 0 => "Group",
        Private = 1 => "Private",
        AllCall = 2 => "AllCall",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub call_type: CallType,
    pub id: u32,
    pub name: String,
}

pub fn decode(buf: &[u8]) -> Option<Contact> {
    if at(buf, 0) == 0xFF || at(buf, 1) == 0xFF || at(buf, 5) == 0xFF {
        return None;
    }
    Some(Contact {
        call_type: CallType::from_raw(at(buf, 0) & 0x0F).unwrap_or_default(),
        id: read_u24_be(buf, 2),
        name: decode_gb2312(buf.get(NAME_OFFSET..NAME_OFFSET + NAME_LEN).unwrap_or(&[])),
    })
}

pub fn encode(contact: &Contact, out: &mut [u8]) {
    out.fill(0xFF);
    out[0] = contact.call_type.raw();
    out[1] = 0x00;
    write_u24_be(out, 2, contact.id);
    encode_gb2312(&contact.name, &mut out[NAME_OFFSET..NAME_OFFSET + NAME_LEN]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erased_record_is_empty() {
        assert!(decode(&[0xFF; RECORD_LEN]).is_none());
    }

    #[test]
    fn each_sentinel_byte_marks_empty() {
        let contact = Contact {
            call_type: CallType::Private,
            id: 1234,
            name: "Op".into(),
        };
        let mut buf = [0u8; RECORD_LEN];
        for sentinel in [0usize, 1, 5] {
            encode(&contact, &mut buf);
            buf[sentinel] = 0xFF;
            assert!(decode(&buf).is_none(), "byte {sentinel} should mark empty");
        }
    }

    #[test]
    fn contact_roundtrip() {
        let contact = Contact {
            call_type: CallType::Group,
            id: 91,
            name: "Worldwide".into(),
        };
        let mut buf = [0u8; RECORD_LEN];
        encode(&contact, &mut buf);
        assert_eq!(buf[1], 0x00);
        assert_eq!(&buf[2..5], &[0x00, 0x00, 0x5B]);
        assert_eq!(decode(&buf).unwrap(), contact);
    }

    #[test]
    fn max_id_roundtrips() {
        let contact = Contact {
            call_type: CallType::AllCall,
            id: MAX_CALL_ID,
            name: "All".into(),
        };
        let mut buf = [0u8; RECORD_LEN];
        encode(&contact, &mut buf);
        assert_eq!(decode(&buf).unwrap().id, 16_777_215);
    }

    #[test]
    fn trailing_byte_stays_erased() {
        let contact = Contact {
            call_type: CallType::Group,
            id: 1,
            name: "0123456789".into(),
        };
        let mut buf = [0u8; RECORD_LEN];
        encode(&contact, &mut buf);
        assert_eq!(buf[15], 0xFF);
        assert_eq!(decode(&buf).unwrap().name, "0123456789");
    }
}
