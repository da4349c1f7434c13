//! Byte sinks the LCD bridge can be reached through.
//!
//! Transports are write-only: the bridge never answers.

mod file;
mod hid;
mod serial;

pub use file::FileTransport;
pub use hid::HidTransport;
pub use serial::{settle_delay_for_baud, SerialTransport, DEFAULT_BAUD_RATE};

use crate::lcd::protocol::REPORT_ID;
use crate::{Error, Result};
use std::str::FromStr;
use std::time::Duration;

/// Time the bridge needs to reinitialise the controller after a reset.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Write-only link to the bridge.
pub trait Transport {
    /// Writes the bytes of one frame.
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Returns how long to wait after a reset before the next frame.
    fn settle_delay(&self) -> Duration {
        DEFAULT_SETTLE_DELAY
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        (**self).write_frame(frame)
    }

    fn settle_delay(&self) -> Duration {
        (**self).settle_delay()
    }
}

/// Transport kinds selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// USB HID through hidapi.
    #[default]
    Hid,
    /// RS-232 through a serial port.
    Serial,
    /// Any writable file or device node.
    File,
}

impl FromStr for TransportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hid" => Ok(TransportKind::Hid),
            "serial" => Ok(TransportKind::Serial),
            "file" => Ok(TransportKind::File),
            _ => Err(Error::InvalidTransport(s.to_string())),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Hid => write!(f, "hid"),
            TransportKind::Serial => write!(f, "serial"),
            TransportKind::File => write!(f, "file"),
        }
    }
}

/// Prefixes a frame with the HID report number.
pub fn hid_report(frame: &[u8]) -> Vec<u8> {
    let mut report = Vec::with_capacity(frame.len() + 1);
    report.push(REPORT_ID);
    report.extend_from_slice(frame);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hid_report_prefix() {
        assert_eq!(hid_report(&[0x05]), vec![0x00, 0x05]);
        assert_eq!(hid_report(&[0x03, 0x40, 0x01]), vec![0x00, 0x03, 0x40, 0x01]);
        assert_eq!(hid_report(b"Hi"), vec![0x00, b'H', b'i']);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("HID".parse::<TransportKind>().unwrap(), TransportKind::Hid);
        assert_eq!("serial".parse::<TransportKind>().unwrap(), TransportKind::Serial);
        assert_eq!("file".parse::<TransportKind>().unwrap(), TransportKind::File);
        assert!(matches!(
            "usb".parse::<TransportKind>(),
            Err(Error::InvalidTransport(_))
        ));
    }
}
