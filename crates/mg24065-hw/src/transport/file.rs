//! Raw file transport.
//!
//! Writes frames straight to a path: a `/dev/hidrawN` node, a tty, or a
//! capture file. `-` writes to stdout.

use super::{hid_report, Transport};
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::io::Write;
use tracing::info;

/// Bridge reached through a plain writable file.
pub struct FileTransport {
    writer: Box<dyn Write + Send>,
    report_prefix: bool,
}

impl FileTransport {
    /// Opens `path` for writing, or stdout for `-`.
    ///
    /// With `report_prefix` each frame is preceded by the HID report number,
    /// as a hidraw node expects.
    pub fn open(path: &str, report_prefix: bool) -> Result<Self> {
        let writer: Box<dyn Write + Send> = if path == "-" {
            Box::new(std::io::stdout())
        } else {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::TransportNotFound(path.to_string())
                    } else {
                        Error::Io(e)
                    }
                })?;
            Box::new(file)
        };

        info!("Writing frames to {} (report prefix: {})", path, report_prefix);
        Ok(Self::from_writer(writer, report_prefix))
    }

    /// Wraps an existing writer.
    pub fn from_writer(writer: Box<dyn Write + Send>, report_prefix: bool) -> Self {
        Self {
            writer,
            report_prefix,
        }
    }
}

impl Transport for FileTransport {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        if self.report_prefix {
            self.writer.write_all(&hid_report(frame))?;
        } else {
            self.writer.write_all(frame)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mg24065-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_writes_frames_back_to_back() {
        let path = capture_path("plain");
        let path_str = path.to_str().unwrap();
        {
            let mut transport = FileTransport::open(path_str, false).unwrap();
            transport.write_frame(&[0x05]).unwrap();
            transport.write_frame(&[0x07, 0x0f]).unwrap();
        }
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x05, 0x07, 0x0f]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_report_prefix_per_frame() {
        let path = capture_path("prefixed");
        let path_str = path.to_str().unwrap();
        {
            let mut transport = FileTransport::open(path_str, true).unwrap();
            transport.write_frame(&[0x05]).unwrap();
            transport.write_frame(&[0x06, 0x01]).unwrap();
        }
        assert_eq!(
            std::fs::read(&path).unwrap(),
            vec![0x00, 0x05, 0x00, 0x06, 0x01]
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let result = FileTransport::open("/nonexistent-mg24065/capture.bin", false);
        assert!(matches!(result, Err(Error::TransportNotFound(_))));
    }
}
