//! RS-232 transport.

use super::{Transport, DEFAULT_SETTLE_DELAY};
use crate::{Error, Result};
use std::io::Write;
use std::time::Duration;
use tokio_serial::{DataBits, Parity, SerialPort, StopBits};
use tracing::info;

/// Baud rate of the USB-serial variant of the bridge.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Highest baud rate that still needs the long reset delay.
const SLOW_LINK_BAUD: u32 = 9600;

/// Settle delay after reset on slow links.
const SLOW_LINK_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Returns the post-reset delay for a link running at `baud`.
pub fn settle_delay_for_baud(baud: u32) -> Duration {
    if baud <= SLOW_LINK_BAUD {
        SLOW_LINK_SETTLE_DELAY
    } else {
        DEFAULT_SETTLE_DELAY
    }
}

/// Bridge reached through a serial port, 8N1.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    baud: u32,
}

impl SerialTransport {
    /// Opens the serial port at the given baud rate.
    pub fn open(path: &str, baud: u32) -> Result<Self> {
        let port = tokio_serial::new(path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .open()
            .map_err(|e| {
                // Check if the error is due to device not existing
                if let tokio_serial::ErrorKind::Io(kind) = &e.kind {
                    if *kind == std::io::ErrorKind::NotFound
                        || *kind == std::io::ErrorKind::PermissionDenied
                    {
                        if !std::path::Path::new(path).exists() {
                            return Error::TransportNotFound(path.to_string());
                        }
                    }
                }
                Error::Serial(e)
            })?;

        info!("Serial port {} opened at {} baud", path, baud);
        Ok(Self { port, baud })
    }

    /// Returns the baud rate.
    pub fn baud(&self) -> u32 {
        self.baud
    }
}

impl Transport for SerialTransport {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()?;
        Ok(())
    }

    fn settle_delay(&self) -> Duration {
        settle_delay_for_baud(self.baud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_delay_for_baud() {
        assert_eq!(settle_delay_for_baud(9600), Duration::from_secs(2));
        assert_eq!(settle_delay_for_baud(4800), Duration::from_secs(2));
        assert_eq!(settle_delay_for_baud(115_200), Duration::from_millis(500));
        assert_eq!(settle_delay_for_baud(19_200), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_port_is_a_transport_error() {
        let err = SerialTransport::open("/dev/does-not-exist-mg24065", 9600)
            .err()
            .unwrap();
        assert!(err.is_transport());
    }
}
