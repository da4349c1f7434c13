//! USB HID transport.

use super::{hid_report, Transport};
use crate::{Error, Result};
use hidapi::{HidApi, HidDevice};
use std::ffi::CString;
use tracing::{debug, info};

/// Bridge reached as a USB HID device.
///
/// Every frame goes out as one output report with report number 0.
pub struct HidTransport {
    device: HidDevice,
}

impl HidTransport {
    /// Opens the first HID device matching VID:PID.
    pub fn open(vid: u16, pid: u16) -> Result<Self> {
        let api = HidApi::new()?;

        let devices: Vec<_> = api
            .device_list()
            .filter(|d| d.vendor_id() == vid && d.product_id() == pid)
            .collect();

        for dev in &devices {
            debug!(
                "Found HID device: path={:?}, interface={}",
                dev.path(),
                dev.interface_number()
            );
        }

        let not_found = || Error::TransportNotFound(format!("{:04X}:{:04X}", vid, pid));
        let device_info = devices.first().ok_or_else(not_found)?;
        let device = device_info.open_device(&api).map_err(|e| {
            debug!("Failed to open device: {}", e);
            not_found()
        })?;

        info!(
            "HID device opened (VID:{:04X} PID:{:04X}, interface={})",
            vid,
            pid,
            device_info.interface_number()
        );
        Ok(Self { device })
    }

    /// Opens a HID device by path, e.g. `/dev/hidraw3`.
    pub fn open_path(path: &str) -> Result<Self> {
        let api = HidApi::new()?;
        let c_path = CString::new(path).map_err(|_| Error::TransportNotFound(path.to_string()))?;

        let device = api.open_path(&c_path).map_err(|e| {
            debug!("Failed to open {}: {}", path, e);
            Error::TransportNotFound(path.to_string())
        })?;

        info!("HID device opened at path: {}", path);
        Ok(Self { device })
    }
}

impl Transport for HidTransport {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.device.write(&hid_report(frame))?;
        Ok(())
    }
}
