//! Built-in self tests: the protocol and codec vectors that must hold on
//! any machine, runnable in the field without a radio attached.

use rt5d_codeplug::{channel, fields, group, pack, subaudio::SubAudio, vfo};
use rt5d_protocol as proto;

type Check = fn() -> Result<(), String>;

pub fn run() -> bool {
    let checks: &[(&str, Check)] = &[
        ("crc-16 check vector", check_crc),
        ("handshake frame", check_handshake_frame),
        ("password frame", check_password_frame),
        ("channel write frame", check_channel_write_frame),
        ("ctcss 88.5", check_ctcss),
        ("dcs d023i", check_dcs),
        ("frequency 145.5 MHz", check_frequency),
        ("vfo default substitution", check_vfo_defaults),
        ("rx group terminator", check_group_terminator),
        ("empty channel packets", check_empty_packets),
    ];
    let mut ok = true;
    for (name, check) in checks {
        match check() {
            Ok(()) => println!("ok   {name}"),
            Err(e) => {
                ok = false;
                println!("FAIL {name}: {e}");
            }
        }
    }
    ok
}

fn expect(cond: bool, msg: &str) -> Result<(), String> {
    if cond {
        Ok(())
    } else {
        Err(msg.to_string())
    }
}

fn check_crc() -> Result<(), String> {
    expect(proto::crc16(b"123456789") == 0x31C3, "crc16(\"123456789\") != 0x31C3")
}

fn check_handshake_frame() -> Result<(), String> {
    let frame = proto::encode_frame(proto::CMD_HANDSHAKE, 0, b"PROGRAMJC8810DU");
    expect(frame.len() == 23, "length != 23")?;
    expect(frame[..6] == [0xA5, 0x02, 0x00, 0x00, 0x00, 0x0F], "bad header")?;
    expect(frame[6] == 0x50 && frame[20] == 0x55, "bad payload bytes")
}

fn check_password_frame() -> Result<(), String> {
    let frame = proto::encode_frame(proto::CMD_PASSWORD, 0, &[0xFF; 6]);
    expect(frame.len() == 14, "length != 14")?;
    expect(frame[1] == 0x05 && frame[5] == 0x06 && frame[6] == 0xFF, "bad bytes")
}

fn check_channel_write_frame() -> Result<(), String> {
    let frame = proto::encode_frame(proto::CMD_WRITE_CHANNELS, 0, &[0u8; 1024]);
    expect(frame.len() == 1032, "length != 1032")?;
    expect(frame[4..6] == [0x04, 0x00], "bad length field")
}

fn check_ctcss() -> Result<(), String> {
    expect(SubAudio::Ctcss(885).encode() == [0x75, 0x03], "encode mismatch")?;
    expect(
        SubAudio::decode(0x75, 0x03) == SubAudio::Ctcss(885),
        "decode mismatch",
    )
}

fn check_dcs() -> Result<(), String> {
    let d023i = SubAudio::parse("D023I").ok_or("D023I did not parse")?;
    expect(d023i.encode() == [0x6A, 0x00], "encode mismatch")?;
    expect(SubAudio::decode(0x6A, 0x00).to_string() == "D023I", "decode mismatch")
}

fn check_frequency() -> Result<(), String> {
    let units = fields::parse_mhz("145.5").ok_or("145.5 did not parse")?;
    expect(units == 14_550_000, "wrong unit count")?;
    let mut buf = [0u8; 4];
    fields::write_freq(&mut buf, 0, units);
    expect(buf == [0xF0, 0x03, 0xDE, 0x00], "wrong wire bytes")?;
    expect(fields::format_mhz(units) == "145.500000", "wrong rendering")
}

fn check_vfo_defaults() -> Result<(), String> {
    let banks = vfo::decode_banks(&[0xFF; 128]);
    expect(banks.a.rx_freq == 13_612_500, "bank A default wrong")?;
    expect(banks.b.rx_freq == 40_012_500, "bank B default wrong")
}

fn check_group_terminator() -> Result<(), String> {
    let mut buf = [0u8; group::RECORD_LEN];
    group::encode(
        &group::RxGroup {
            name: "T".into(),
            members: vec![1, 2, 3],
        },
        &mut buf,
    );
    expect(buf[9..12] == [0, 0, 0], "terminator missing")?;
    let decoded = group::decode(&buf).ok_or("group did not decode")?;
    expect(decoded.members == vec![1, 2, 3], "members mismatch")
}

fn check_empty_packets() -> Result<(), String> {
    let slots: Vec<Option<channel::Channel>> = vec![None; 1024];
    let packets = pack::pack(&slots, 64, 16, channel::RECORD_LEN, channel::encode);
    expect(packets.len() == 64, "wrong packet count")?;
    expect(
        packets.iter().all(|p| p.len() == 1024 && p.iter().all(|&b| b == 0xFF)),
        "packets not erased",
    )?;
    let back = pack::unpack(&packets, 16, channel::RECORD_LEN, channel::decode);
    expect(back.iter().all(|s| s.is_none()), "unpack not empty")
}

#[cfg(test)]
mod tests {
    #[test]
    fn all_self_tests_pass() {
        assert!(super::run());
    }
}
