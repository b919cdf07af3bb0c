//! The twelve-step programming session.
//!
//! The radio's own state machine requires exactly this progression:
//! handshake, password, version, then the seven codeplug blocks, basic
//! info, and the end marker. Reordering is not an option; any transport
//! or protocol failure aborts the whole session and the caller starts
//! over from step one.
//!
//! Retry policy lives here: each request gets a 1000 ms response window,
//! NAK frames are dropped on the floor within that window, and an expired
//! window flushes the input and retransmits, three retries at most. A CRC
//! mismatch is not retried; it means the wire itself is bad.

use std::time::{Duration, Instant};

use rt5d_codeplug::{
    SessionPayloads, CHANNEL_PACKETS, CHANNEL_PACKET_LEN, CONTACT_PACKETS, CONTACT_PACKET_LEN,
    DTMF_LEN, GROUP_PACKETS, GROUP_PACKET_LEN, INFO_LEN, KEYS_LEN, SETTINGS_LEN, VERSION_LEN,
    VFO_LEN,
};
use rt5d_protocol::{
    self as proto, Deframer, Frame, FrameError, CMD_END_SESSION, CMD_HANDSHAKE, CMD_NAK,
    CMD_PASSWORD, CMD_READ_CHANNELS, CMD_READ_CONTACTS, CMD_READ_DTMF, CMD_READ_GROUPS,
    CMD_READ_INFO, CMD_READ_KEYS, CMD_READ_SETTINGS, CMD_READ_VFO, CMD_VERSION,
    CMD_WRITE_CHANNELS, CMD_WRITE_CONTACTS, CMD_WRITE_DTMF, CMD_WRITE_GROUPS, CMD_WRITE_INFO,
    CMD_WRITE_KEYS, CMD_WRITE_SETTINGS, CMD_WRITE_VFO,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::transport::{CancelToken, TransportError, Wire};

/// Fixed greeting the factory tool sends in step 1.
pub const HANDSHAKE_MAGIC: &[u8] = b"PROGRAMJC8810DU";

/// Step 2 always carries the blank password.
pub const BLANK_PASSWORD: [u8; 6] = [0xFF; 6];

const RESPONSE_WINDOW: Duration = Duration::from_millis(1000);
const MAX_ATTEMPTS: u32 = 4;

/// How long the radio takes to reboot after a write session closes.
const RESTART_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("no response to command {cmd:#04x} after {attempts} attempts")]
    RetryExhausted { cmd: u8, attempts: u32 },
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("{step}: expected a {expected}-byte payload, the radio sent {actual}")]
    WrongPayloadSize {
        step: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("response command {actual:#04x} does not match request {expected:#04x}")]
    CommandMismatch { expected: u8, actual: u8 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

pub type ProgressFn<'a> = Box<dyn FnMut(&'static str, usize, usize) + 'a>;

pub struct Session<'a, W: Wire> {
    wire: &'a mut W,
    cancel: CancelToken,
    progress: Option<ProgressFn<'a>>,
    restart_delay: Duration,
}

impl<'a, W: Wire> Session<'a, W> {
    pub fn new(wire: &'a mut W, cancel: CancelToken) -> Self {
        Self {
            wire,
            cancel,
            progress: None,
            restart_delay: RESTART_DELAY,
        }
    }

    pub fn with_progress(mut self, progress: ProgressFn<'a>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    /// Steps 1–12 with read opcodes.
    pub fn read_codeplug(&mut self) -> Result<SessionPayloads, SessionError> {
        let mut payloads = SessionPayloads::filled();
        payloads.version = self.begin()?;
        payloads.dtmf = self.read_single("dtmf", CMD_READ_DTMF, DTMF_LEN)?;
        payloads.keys = self.read_single("encryption keys", CMD_READ_KEYS, KEYS_LEN)?;
        payloads.contacts =
            self.read_packets("contacts", CMD_READ_CONTACTS, CONTACT_PACKETS, CONTACT_PACKET_LEN)?;
        payloads.groups =
            self.read_packets("rx groups", CMD_READ_GROUPS, GROUP_PACKETS, GROUP_PACKET_LEN)?;
        payloads.channels =
            self.read_packets("channels", CMD_READ_CHANNELS, CHANNEL_PACKETS, CHANNEL_PACKET_LEN)?;
        payloads.vfo = self.read_single("vfo", CMD_READ_VFO, VFO_LEN)?;
        payloads.settings = self.read_single("settings", CMD_READ_SETTINGS, SETTINGS_LEN)?;
        payloads.info = self.read_single("basic info", CMD_READ_INFO, INFO_LEN)?;
        self.end()?;
        Ok(payloads)
    }

    /// Steps 1–3 and 12 only; returns the version block.
    pub fn read_version(&mut self) -> Result<Vec<u8>, SessionError> {
        let version = self.begin()?;
        self.end()?;
        Ok(version)
    }

    /// Steps 1–3, the write sequence, step 12, the restart wait, then a
    /// full verify read. Success means the verify read completed cleanly.
    pub fn write_codeplug(
        &mut self,
        payloads: &SessionPayloads,
        write_basic_info: bool,
    ) -> Result<(), SessionError> {
        self.begin()?;
        self.write_single("dtmf", CMD_WRITE_DTMF, &payloads.dtmf)?;
        self.write_single("encryption keys", CMD_WRITE_KEYS, &payloads.keys)?;
        self.write_packets("contacts", CMD_WRITE_CONTACTS, &payloads.contacts)?;
        self.write_packets("rx groups", CMD_WRITE_GROUPS, &payloads.groups)?;
        self.write_packets("channels", CMD_WRITE_CHANNELS, &payloads.channels)?;
        self.write_single("vfo", CMD_WRITE_VFO, &payloads.vfo)?;
        self.write_single("settings", CMD_WRITE_SETTINGS, &payloads.settings)?;
        if write_basic_info {
            self.write_single("basic info", CMD_WRITE_INFO, &payloads.info)?;
        }
        self.end()?;

        info!("waiting for the radio to restart");
        self.cancel.sleep(self.restart_delay)?;

        info!("verifying with a full read");
        self.read_codeplug()?;
        Ok(())
    }

    fn begin(&mut self) -> Result<Vec<u8>, SessionError> {
        debug!("handshake");
        self.send_receive(CMD_HANDSHAKE, 0, HANDSHAKE_MAGIC)?;
        debug!("password");
        self.send_receive(CMD_PASSWORD, 0, &BLANK_PASSWORD)?;
        debug!("version");
        let version = self.send_receive(CMD_VERSION, 0, &[])?;
        if version.payload.len() != VERSION_LEN {
            return Err(ProtocolError::WrongPayloadSize {
                step: "version",
                expected: VERSION_LEN,
                actual: version.payload.len(),
            }
            .into());
        }
        Ok(version.payload)
    }

    fn end(&mut self) -> Result<(), SessionError> {
        debug!("end session");
        self.send_receive(CMD_END_SESSION, 0, &[0x00, 0x00])?;
        Ok(())
    }

    fn read_single(
        &mut self,
        step: &'static str,
        cmd: u8,
        len: usize,
    ) -> Result<Vec<u8>, SessionError> {
        Ok(self.read_packets(step, cmd, 1, len)?.remove(0))
    }

    fn read_packets(
        &mut self,
        step: &'static str,
        cmd: u8,
        packets: usize,
        len: usize,
    ) -> Result<Vec<Vec<u8>>, SessionError> {
        info!("reading {step} ({packets} packet(s))");
        self.report(step, 0, packets);
        let mut out = Vec::with_capacity(packets);
        for seq in 0..packets {
            let frame = self.send_receive(cmd, seq as u16, &[])?;
            if frame.payload.len() != len {
                return Err(ProtocolError::WrongPayloadSize {
                    step,
                    expected: len,
                    actual: frame.payload.len(),
                }
                .into());
            }
            out.push(frame.payload);
            self.report(step, seq + 1, packets);
        }
        Ok(out)
    }

    fn write_single(
        &mut self,
        step: &'static str,
        cmd: u8,
        payload: &[u8],
    ) -> Result<(), SessionError> {
        info!("writing {step}");
        self.report(step, 0, 1);
        self.send_receive(cmd, 0, payload)?;
        self.report(step, 1, 1);
        Ok(())
    }

    fn write_packets(
        &mut self,
        step: &'static str,
        cmd: u8,
        packets: &[Vec<u8>],
    ) -> Result<(), SessionError> {
        info!("writing {step} ({} packet(s))", packets.len());
        self.report(step, 0, packets.len());
        for (seq, payload) in packets.iter().enumerate() {
            self.send_receive(cmd, seq as u16, payload)?;
            self.report(step, seq + 1, packets.len());
        }
        Ok(())
    }

    fn send_receive(&mut self, cmd: u8, seq: u16, payload: &[u8]) -> Result<Frame, SessionError> {
        let frame = proto::encode_frame(cmd, seq, payload);
        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                debug!("cmd {cmd:#04x} seq {seq}: retransmit (attempt {attempt})");
                self.wire.discard_input()?;
            }
            self.wire.write(&frame)?;
            if let Some(response) = self.receive_response(cmd)? {
                return Ok(response);
            }
        }
        Err(ProtocolError::RetryExhausted {
            cmd,
            attempts: MAX_ATTEMPTS,
        }
        .into())
    }

    /// Wait out one response window. `Ok(None)` means the window expired
    /// and the caller should retransmit.
    fn receive_response(&mut self, cmd: u8) -> Result<Option<Frame>, SessionError> {
        let mut deframer = Deframer::new();
        let deadline = Instant::now() + RESPONSE_WINDOW;
        let mut buf = [0u8; 256];
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let n = match self.wire.read(&mut buf, deadline - now) {
                Ok(n) => n,
                Err(TransportError::Timeout) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            for &byte in &buf[..n] {
                match deframer.push(byte) {
                    Ok(None) => {}
                    Ok(Some(frame)) if frame.cmd == CMD_NAK => {
                        // Not success, not failure; stay in the window.
                        debug!("cmd {cmd:#04x}: NAK dropped");
                    }
                    Ok(Some(frame)) => {
                        if frame.cmd != cmd {
                            return Err(ProtocolError::CommandMismatch {
                                expected: cmd,
                                actual: frame.cmd,
                            }
                            .into());
                        }
                        return Ok(Some(frame));
                    }
                    Err(e) => return Err(ProtocolError::from(e).into()),
                }
            }
        }
    }

    fn report(&mut self, phase: &'static str, done: usize, total: usize) {
        if let Some(progress) = &mut self.progress {
            progress(phase, done, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted radio: answers each written frame through a closure, so
    /// tests control timing, NAKs and corruption byte by byte.
    struct MockWire {
        rx: VecDeque<u8>,
        sent: Vec<(u8, u16, usize)>,
        respond: Box<dyn FnMut(u8, u16, &[u8]) -> Vec<Vec<u8>>>,
    }

    impl MockWire {
        fn new(respond: impl FnMut(u8, u16, &[u8]) -> Vec<Vec<u8>> + 'static) -> Self {
            Self {
                rx: VecDeque::new(),
                sent: Vec::new(),
                respond: Box::new(respond),
            }
        }

        fn radio() -> Self {
            Self::new(|cmd, seq, _payload| vec![happy_response(cmd, seq)])
        }
    }

    /// A well-behaved radio's response to one request.
    fn happy_response(cmd: u8, seq: u16) -> Vec<u8> {
        let payload_len = match cmd {
            CMD_VERSION => VERSION_LEN,
            CMD_READ_DTMF => DTMF_LEN,
            CMD_READ_KEYS => KEYS_LEN,
            CMD_READ_CONTACTS => CONTACT_PACKET_LEN,
            CMD_READ_GROUPS => GROUP_PACKET_LEN,
            CMD_READ_CHANNELS => CHANNEL_PACKET_LEN,
            CMD_READ_VFO => VFO_LEN,
            CMD_READ_SETTINGS => SETTINGS_LEN,
            CMD_READ_INFO => INFO_LEN,
            _ => 0,
        };
        proto::encode_frame(cmd, seq, &vec![0xFF; payload_len])
    }

    impl Wire for MockWire {
        fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            let cmd = bytes[1];
            let seq = u16::from_be_bytes([bytes[2], bytes[3]]);
            let len = u16::from_be_bytes([bytes[4], bytes[5]]) as usize;
            self.sent.push((cmd, seq, len));
            for chunk in (self.respond)(cmd, seq, &bytes[6..6 + len]) {
                self.rx.extend(chunk);
            }
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8], _window: Duration) -> Result<usize, TransportError> {
            let mut n = 0;
            while n < buf.len() {
                match self.rx.pop_front() {
                    Some(b) => {
                        buf[n] = b;
                        n += 1;
                    }
                    None => break,
                }
            }
            if n == 0 {
                Err(TransportError::Timeout)
            } else {
                Ok(n)
            }
        }

        fn discard_input(&mut self) -> Result<(), TransportError> {
            self.rx.clear();
            Ok(())
        }
    }

    fn token() -> CancelToken {
        CancelToken::with_deadline(Duration::from_secs(60))
    }

    #[test]
    fn read_session_walks_the_steps_in_order() {
        let mut wire = MockWire::radio();
        let payloads = Session::new(&mut wire, token()).read_codeplug().unwrap();

        assert_eq!(payloads.dtmf.len(), DTMF_LEN);
        assert_eq!(payloads.contacts.len(), CONTACT_PACKETS);
        assert_eq!(payloads.version.len(), VERSION_LEN);

        let mut expected: Vec<(u8, u16)> = vec![
            (CMD_HANDSHAKE, 0),
            (CMD_PASSWORD, 0),
            (CMD_VERSION, 0),
            (CMD_READ_DTMF, 0),
            (CMD_READ_KEYS, 0),
        ];
        expected.extend((0..80u16).map(|s| (CMD_READ_CONTACTS, s)));
        expected.extend((0..4u16).map(|s| (CMD_READ_GROUPS, s)));
        expected.extend((0..64u16).map(|s| (CMD_READ_CHANNELS, s)));
        expected.extend([
            (CMD_READ_VFO, 0),
            (CMD_READ_SETTINGS, 0),
            (CMD_READ_INFO, 0),
            (CMD_END_SESSION, 0),
        ]);
        let sent: Vec<(u8, u16)> = wire.sent.iter().map(|&(c, s, _)| (c, s)).collect();
        assert_eq!(sent, expected);

        // Handshake and password carry their fixed payloads.
        assert_eq!(wire.sent[0].2, HANDSHAKE_MAGIC.len());
        assert_eq!(wire.sent[1].2, BLANK_PASSWORD.len());
    }

    #[test]
    fn write_session_writes_blocks_then_verifies() {
        let mut wire = MockWire::radio();
        let payloads = SessionPayloads::filled();
        Session::new(&mut wire, token())
            .with_restart_delay(Duration::ZERO)
            .write_codeplug(&payloads, false)
            .unwrap();

        let cmds: Vec<u8> = wire.sent.iter().map(|&(c, _, _)| c).collect();
        // Write phase: begin, 7 blocks with write opcodes, end.
        let write_phase: Vec<u8> = vec![CMD_HANDSHAKE, CMD_PASSWORD, CMD_VERSION]
            .into_iter()
            .chain([CMD_WRITE_DTMF, CMD_WRITE_KEYS])
            .chain(std::iter::repeat(CMD_WRITE_CONTACTS).take(80))
            .chain(std::iter::repeat(CMD_WRITE_GROUPS).take(4))
            .chain(std::iter::repeat(CMD_WRITE_CHANNELS).take(64))
            .chain([CMD_WRITE_VFO, CMD_WRITE_SETTINGS, CMD_END_SESSION])
            .collect();
        assert_eq!(&cmds[..write_phase.len()], &write_phase[..]);
        // No basic info write without the explicit opt-in.
        assert!(!cmds.contains(&CMD_WRITE_INFO));
        // Then the verify read runs the read opcodes.
        assert!(cmds[write_phase.len()..].contains(&CMD_READ_CHANNELS));
        assert_eq!(*cmds.last().unwrap(), CMD_END_SESSION);

        // Channel write packets carry 1024 bytes each.
        let channel_writes: Vec<usize> = wire
            .sent
            .iter()
            .filter(|&&(c, _, _)| c == CMD_WRITE_CHANNELS)
            .map(|&(_, _, len)| len)
            .collect();
        assert_eq!(channel_writes, vec![CHANNEL_PACKET_LEN; 64]);
    }

    #[test]
    fn basic_info_write_is_opt_in() {
        let mut wire = MockWire::radio();
        let payloads = SessionPayloads::filled();
        Session::new(&mut wire, token())
            .with_restart_delay(Duration::ZERO)
            .write_codeplug(&payloads, true)
            .unwrap();
        assert!(wire.sent.iter().any(|&(c, _, _)| c == CMD_WRITE_INFO));
    }

    #[test]
    fn timeout_triggers_retransmit() {
        let mut first = true;
        let mut wire = MockWire::new(move |cmd, seq, _| {
            if cmd == CMD_HANDSHAKE && std::mem::take(&mut first) {
                vec![] // ignore the first handshake
            } else {
                vec![happy_response(cmd, seq)]
            }
        });
        Session::new(&mut wire, token()).read_version().unwrap();
        let handshakes = wire
            .sent
            .iter()
            .filter(|&&(c, _, _)| c == CMD_HANDSHAKE)
            .count();
        assert_eq!(handshakes, 2);
    }

    #[test]
    fn nak_is_dropped_within_the_window() {
        let mut wire = MockWire::new(|cmd, seq, _| {
            vec![
                proto::encode_frame(CMD_NAK, 0, &[]),
                happy_response(cmd, seq),
            ]
        });
        Session::new(&mut wire, token()).read_version().unwrap();
        // One write per request; the NAK consumed no attempt.
        assert_eq!(wire.sent.len(), 4);
    }

    #[test]
    fn retry_exhaustion_after_four_attempts() {
        let mut wire = MockWire::new(|_, _, _| vec![]);
        let err = Session::new(&mut wire, token()).read_version().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Protocol(ProtocolError::RetryExhausted { cmd: CMD_HANDSHAKE, attempts: 4 })
        ));
        assert_eq!(wire.sent.len(), 4);
    }

    #[test]
    fn crc_mismatch_aborts_without_retry() {
        let mut wire = MockWire::new(|cmd, seq, _| {
            let mut frame = happy_response(cmd, seq);
            let len = frame.len();
            frame[len - 1] ^= 0xFF;
            vec![frame]
        });
        let err = Session::new(&mut wire, token()).read_version().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Protocol(ProtocolError::Frame(FrameError::CrcMismatch { .. }))
        ));
        assert_eq!(wire.sent.len(), 1);
    }

    #[test]
    fn wrong_payload_size_is_rejected() {
        let mut wire = MockWire::new(|cmd, seq, _| {
            if cmd == CMD_VERSION {
                vec![proto::encode_frame(cmd, seq, &[0xFF; 64])]
            } else {
                vec![happy_response(cmd, seq)]
            }
        });
        let err = Session::new(&mut wire, token()).read_version().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Protocol(ProtocolError::WrongPayloadSize { step: "version", expected: 128, actual: 64 })
        ));
    }

    #[test]
    fn cancelled_session_aborts() {
        let mut wire = MockWire::radio();
        let cancel = token();
        cancel.cancel();
        // The mock wire itself never checks the token; the restart wait does.
        let err = Session::new(&mut wire, cancel)
            .with_restart_delay(Duration::from_secs(1))
            .write_codeplug(&SessionPayloads::filled(), false)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Transport(TransportError::Cancelled)
        ));
    }

    #[test]
    fn progress_reports_phase_and_packet_counts() {
        let mut wire = MockWire::radio();
        let mut seen: Vec<(&'static str, usize, usize)> = Vec::new();
        {
            let mut session = Session::new(&mut wire, token())
                .with_progress(Box::new(|phase, done, total| seen.push((phase, done, total))));
            session.read_codeplug().unwrap();
        }
        assert!(seen.contains(&("contacts", 0, 80)));
        assert!(seen.contains(&("contacts", 80, 80)));
        assert!(seen.contains(&("channels", 64, 64)));
    }
}
