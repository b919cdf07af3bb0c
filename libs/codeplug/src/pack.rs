//! Fan-out and fan-in between flat slot arrays and the fixed-size
//! transport packets the session moves.
//!
//! Slot `k` lives in packet `k / per_packet` at byte offset
//! `(k % per_packet) * record_len`. Packets are pre-filled with `0xFF`
//! before any record is written, so empty slots stay erased.

pub fn pack<T>(
    slots: &[Option<T>],
    packets: usize,
    per_packet: usize,
    record_len: usize,
    mut encode: impl FnMut(&T, &mut [u8]),
) -> Vec<Vec<u8>> {
    let mut out = vec![vec![0xFF; per_packet * record_len]; packets];
    for (k, slot) in slots.iter().enumerate().take(packets * per_packet) {
        if let Some(record) = slot {
            let packet = k / per_packet;
            let off = (k % per_packet) * record_len;
            encode(record, &mut out[packet][off..off + record_len]);
        }
    }
    out
}

pub fn unpack<T>(
    packets: &[Vec<u8>],
    per_packet: usize,
    record_len: usize,
    mut decode: impl FnMut(&[u8]) -> Option<T>,
) -> Vec<Option<T>> {
    let mut slots = Vec::with_capacity(packets.len() * per_packet);
    for packet in packets {
        for r in 0..per_packet {
            let off = r * record_len;
            slots.push(decode(packet.get(off..off + record_len).unwrap_or(&[])));
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{self, Channel};
    use crate::contact::{self, CallType, Contact};
    use crate::{
        CHANNELS_PER_PACKET, CHANNEL_PACKETS, CHANNEL_PACKET_LEN, CONTACTS_PER_PACKET,
        CONTACT_PACKETS, CONTACT_PACKET_LEN, MAX_CHANNELS, MAX_CONTACTS,
    };

    #[test]
    fn empty_channel_array_packs_to_erased_packets() {
        let slots: Vec<Option<Channel>> = vec![None; MAX_CHANNELS];
        let packets = pack(
            &slots,
            CHANNEL_PACKETS,
            CHANNELS_PER_PACKET,
            channel::RECORD_LEN,
            channel::encode,
        );
        assert_eq!(packets.len(), 64);
        for packet in &packets {
            assert_eq!(packet.len(), CHANNEL_PACKET_LEN);
            assert!(packet.iter().all(|&b| b == 0xFF));
        }
        let back = unpack(
            &packets,
            CHANNELS_PER_PACKET,
            channel::RECORD_LEN,
            channel::decode,
        );
        assert_eq!(back.len(), MAX_CHANNELS);
        assert!(back.iter().all(|slot| slot.is_none()));
    }

    #[test]
    fn channel_slot_17_lands_in_packet_1_offset_64() {
        let mut slots: Vec<Option<Channel>> = vec![None; MAX_CHANNELS];
        slots[17] = Some(Channel {
            rx_freq: 14_550_000,
            tx_freq: 14_550_000,
            ..Channel::default()
        });
        let packets = pack(
            &slots,
            CHANNEL_PACKETS,
            CHANNELS_PER_PACKET,
            channel::RECORD_LEN,
            channel::encode,
        );
        // 17 / 16 = packet 1, (17 % 16) * 64 = byte 64.
        assert_eq!(&packets[1][64..68], &14_550_000u32.to_le_bytes());
        assert!(packets[1][..64].iter().all(|&b| b == 0xFF));
        let back = unpack(
            &packets,
            CHANNELS_PER_PACKET,
            channel::RECORD_LEN,
            channel::decode,
        );
        assert!(back[17].is_some());
        assert_eq!(back.iter().filter(|s| s.is_some()).count(), 1);
    }

    #[test]
    fn contact_fanout_dimensions() {
        let mut slots: Vec<Option<Contact>> = vec![None; MAX_CONTACTS];
        slots[3999] = Some(Contact {
            call_type: CallType::Private,
            id: 7,
            name: "Last".into(),
        });
        let packets = pack(
            &slots,
            CONTACT_PACKETS,
            CONTACTS_PER_PACKET,
            contact::RECORD_LEN,
            contact::encode,
        );
        assert_eq!(packets.len(), 80);
        assert!(packets.iter().all(|p| p.len() == CONTACT_PACKET_LEN));
        // 3999 / 50 = packet 79, (3999 % 50) * 16 = 784.
        assert_eq!(packets[79][784], CallType::Private.raw());
        let back = unpack(
            &packets,
            CONTACTS_PER_PACKET,
            contact::RECORD_LEN,
            contact::decode,
        );
        assert!(back[3999].is_some());
    }

    #[test]
    fn slots_past_capacity_are_dropped() {
        let slots: Vec<Option<u8>> = vec![Some(1); 5];
        let packets = pack(&slots, 2, 2, 1, |v, out| out[0] = *v);
        assert_eq!(packets, vec![vec![1, 1], vec![1, 1]]);
    }
}
