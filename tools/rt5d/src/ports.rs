//! Serial port discovery. No attached device is not an error; the list is
//! simply empty.

/// Device name prefixes that USB-serial programming cables show up under
/// on UNIX-like hosts.
#[cfg(unix)]
const PREFIXES: &[&str] = &["ttyUSB", "ttyACM", "ttyS", "ttyAMA", "tty.usb", "cu.usb"];

#[cfg(unix)]
fn is_candidate(name: &str) -> bool {
    PREFIXES.iter().any(|p| name.starts_with(p))
}

#[cfg(unix)]
pub fn list_ports() -> Vec<String> {
    let mut out = Vec::new();
    if let Ok(entries) = std::fs::read_dir("/dev") {
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_candidate(&name) {
                out.push(format!("/dev/{name}"));
            }
        }
    }
    out.sort();
    out
}

#[cfg(windows)]
pub fn list_ports() -> Vec<String> {
    let mut out: Vec<String> = serialport::available_ports()
        .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
        .unwrap_or_default();
    out.sort();
    out
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn usb_serial_names_are_candidates() {
        for name in ["ttyUSB0", "ttyACM3", "ttyS0", "ttyAMA1", "tty.usbserial-14", "cu.usbmodem9"] {
            assert!(is_candidate(name), "{name} should match");
        }
    }

    #[test]
    fn unrelated_device_names_are_not() {
        for name in ["tty0", "null", "random", "sda1", "pts"] {
            assert!(!is_candidate(name), "{name} should not match");
        }
    }
}
