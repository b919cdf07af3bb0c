mod ports;
mod selftest;
mod session;
mod transport;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rt5d_codeplug::{Codeplug, ConfigDocument};
use tracing::{debug, info};
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

use session::{ProgressFn, ProtocolError, Session, SessionError};
use transport::{CancelToken, SerialTransport, TransportError};

/// Whole-session deadline; the cancellation signal threaded through every
/// read, write and sleep.
const SESSION_DEADLINE: Duration = Duration::from_secs(120);

/// Codeplug programmer for the RT-5D / JJCC-888DMR handheld.
#[derive(Parser, Debug)]
#[command(name = "rt5d", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
    /// Wire-level logging (frames, retries, NAKs).
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run built-in self tests; exit 0 iff all pass.
    Test,
    /// List serial port names, sorted.
    Ports,
    /// Open a session, print the radio's version block, close.
    Info { port: String },
    /// Read the full codeplug into a JSON document.
    Read {
        port: String,
        #[arg(default_value = "rt5d_config.json")]
        outfile: PathBuf,
    },
    /// Write a JSON document to the radio, then verify with a full re-read.
    Write {
        port: String,
        infile: PathBuf,
        /// Also overwrite the basic info block (model name and ID).
        #[arg(long)]
        basic_info: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    match run(cli.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code(&err)
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "rt5d=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap();
    let format = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::NONE);
    tracing_subscriber::registry().with(filter).with(format).init();
}

/// Usage and generic failures exit 1, protocol failures 2, transport
/// failures 3.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(session) = cause.downcast_ref::<SessionError>() {
            return match session {
                SessionError::Transport(_) => ExitCode::from(3),
                SessionError::Protocol(_) => ExitCode::from(2),
            };
        }
        if cause.downcast_ref::<TransportError>().is_some() {
            return ExitCode::from(3);
        }
        if cause.downcast_ref::<ProtocolError>().is_some() {
            return ExitCode::from(2);
        }
    }
    ExitCode::from(1)
}

fn run(cmd: Cmd) -> Result<()> {
    match cmd {
        Cmd::Test => {
            if selftest::run() {
                Ok(())
            } else {
                anyhow::bail!("self tests failed");
            }
        }
        Cmd::Ports => {
            for port in ports::list_ports() {
                println!("{port}");
            }
            Ok(())
        }
        Cmd::Info { port } => info_cmd(&port),
        Cmd::Read { port, outfile } => read_cmd(&port, &outfile),
        Cmd::Write {
            port,
            infile,
            basic_info,
        } => write_cmd(&port, &infile, basic_info),
    }
}

fn open_transport(port: &str) -> Result<(SerialTransport, CancelToken)> {
    let cancel = CancelToken::with_deadline(SESSION_DEADLINE);
    let transport = SerialTransport::open(port, cancel.clone())
        .with_context(|| format!("opening {port}"))?;
    Ok((transport, cancel))
}

fn progress_logger<'a>() -> ProgressFn<'a> {
    Box::new(|phase, done, total| {
        if done > 0 {
            debug!("{phase}: packet {done}/{total}");
        }
    })
}

fn info_cmd(port: &str) -> Result<()> {
    let (mut transport, cancel) = open_transport(port)?;
    let version = Session::new(&mut transport, cancel).read_version()?;

    let printable: String = version
        .iter()
        .take_while(|&&b| b != 0x00 && b != 0xFF)
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect();
    println!("version: {printable}");
    for (i, chunk) in version.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
        println!("{:04X}  {}", i * 16, hex.join(" "));
    }
    Ok(())
}

fn read_cmd(port: &str, outfile: &PathBuf) -> Result<()> {
    let (mut transport, cancel) = open_transport(port)?;
    let payloads = Session::new(&mut transport, cancel)
        .with_progress(progress_logger())
        .read_codeplug()?;

    let document = ConfigDocument::from_codeplug(&Codeplug::from_payloads(&payloads));
    let mut json = serde_json::to_string_pretty(&document)?;
    json.push('\n');
    std::fs::write(outfile, json).with_context(|| format!("writing {}", outfile.display()))?;
    info!("codeplug saved to {}", outfile.display());
    Ok(())
}

fn write_cmd(port: &str, infile: &PathBuf, basic_info: bool) -> Result<()> {
    let text = std::fs::read_to_string(infile)
        .with_context(|| format!("reading {}", infile.display()))?;
    let document: ConfigDocument =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", infile.display()))?;
    let payloads = document.to_codeplug()?.to_payloads();

    let (mut transport, cancel) = open_transport(port)?;
    Session::new(&mut transport, cancel)
        .with_progress(progress_logger())
        .write_codeplug(&payloads, basic_info)?;
    info!("write verified");
    Ok(())
}
