//! Serial byte transport.
//!
//! Opens the programming cable at 115200 8N1 with DTR and RTS asserted
//! (the cable draws power and its enable signal from those lines), then
//! waits for the switching circuitry to settle before the first byte.
//!
//! The native `serialport` timeout is kept short so every blocking read
//! returns quickly enough to interleave cancellation checks; the
//! transport-level inactivity window is what callers observe as
//! [`TransportError::Timeout`].

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serialport::ClearBuffer;
use thiserror::Error;
use tracing::{debug, trace};

pub const BAUD_RATE: u32 = 115_200;

/// Inactivity window for exact reads.
pub const READ_WINDOW: Duration = Duration::from_secs(2);

/// Native serial timeout; the granularity of cancellation checks.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Settle time for the cable's power switching after DTR/RTS assert.
const SETTLE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("timed out waiting for the radio")]
    Timeout,
    #[error("serial port closed (zero-byte read)")]
    Closed,
    #[error("operation cancelled")]
    Cancelled,
    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),
    #[error("serial I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One cancellation signal for the whole session: an explicit flag plus an
/// absolute deadline, checked at every suspension point.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Instant,
}

impl CancelToken {
    pub fn with_deadline(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now() + timeout,
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || Instant::now() >= self.deadline
    }

    pub fn check(&self) -> Result<(), TransportError> {
        if self.is_cancelled() {
            Err(TransportError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep in small slices so cancellation stays responsive.
    pub fn sleep(&self, total: Duration) -> Result<(), TransportError> {
        let end = Instant::now() + total;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= end {
                return Ok(());
            }
            std::thread::sleep((end - now).min(Duration::from_millis(100)));
        }
    }
}

/// What the session driver needs from a byte transport. A trait so tests
/// can script a fake radio.
pub trait Wire {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Read at least one byte into `buf`, waiting up to `window`.
    fn read(&mut self, buf: &mut [u8], window: Duration) -> Result<usize, TransportError>;

    /// Drop whatever sits in the OS receive buffer. Called before a
    /// retransmit so a stale half-frame cannot shadow the fresh response.
    fn discard_input(&mut self) -> Result<(), TransportError>;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let mut filled = 0;
        while filled < buf.len() {
            filled += self.read(&mut buf[filled..], READ_WINDOW)?;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
    cancel: CancelToken,
}

impl SerialTransport {
    pub fn open(path: &str, cancel: CancelToken) -> Result<Self, TransportError> {
        debug!("opening {path} at {BAUD_RATE} 8N1");
        let mut port = serialport::new(path, BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(POLL_INTERVAL)
            .open()?;
        port.write_data_terminal_ready(true)?;
        port.write_request_to_send(true)?;
        cancel.sleep(SETTLE_DELAY)?;
        Ok(Self { port, cancel })
    }
}

impl Wire for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.cancel.check()?;
        trace!("tx {} bytes: {:02X?}", bytes.len(), bytes);
        self.port.write_all(bytes).map_err(map_io)?;
        self.port.flush().map_err(map_io)?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], window: Duration) -> Result<usize, TransportError> {
        let start = Instant::now();
        loop {
            self.cancel.check()?;
            match self.port.read(buf) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => {
                    trace!("rx {} bytes: {:02X?}", n, &buf[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    if start.elapsed() >= window {
                        return Err(TransportError::Timeout);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
    }

    fn discard_input(&mut self) -> Result<(), TransportError> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

fn map_io(e: io::Error) -> TransportError {
    if e.kind() == io::ErrorKind::TimedOut {
        TransportError::Timeout
    } else {
        TransportError::Io(e)
    }
}
