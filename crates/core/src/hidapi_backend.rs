//! Portable backend built on hidapi.
//!
//! hidapi strips the report ID from input reports and expects it as the first
//! byte of output reports. The transport re-inserts a zero report ID on read
//! so the codec always sees the full 9-byte layout.

use crate::error::{hid_os_code, Error, Result, TransportOp};
use crate::report::{Report, REPORT_LEN};
use crate::transport::{DeviceIds, DeviceNode, HidBackend, HidTransport};
use std::ffi::CString;
use tracing::{debug, trace};

/// Enumerates and opens devices through one hidapi context.
pub struct HidApiBackend {
    api: hidapi::HidApi,
}

impl HidApiBackend {
    /// Initialise hidapi. Failure here is an enumeration setup failure.
    pub fn new() -> Result<Self> {
        let api = hidapi::HidApi::new().map_err(|e| Error::EnumerationSetup {
            code: hid_os_code(&e),
            message: e.to_string(),
        })?;
        Ok(Self { api })
    }
}

impl HidBackend for HidApiBackend {
    fn enumerate(&mut self) -> Result<Vec<DeviceNode>> {
        self.api
            .refresh_devices()
            .map_err(|e| Error::EnumerationSetup {
                code: hid_os_code(&e),
                message: e.to_string(),
            })?;

        let nodes: Vec<DeviceNode> = self
            .api
            .device_list()
            .map(|info| DeviceNode {
                path: info.path().to_string_lossy().into_owned(),
                ids: Some(DeviceIds::new(info.vendor_id(), info.product_id())),
            })
            .collect();

        debug!(count = nodes.len(), "hidapi enumeration complete");
        Ok(nodes)
    }

    fn open(&self, path: &str) -> Result<Box<dyn HidTransport>> {
        let c_path = CString::new(path).map_err(|e| Error::TransportOpen {
            path: path.to_string(),
            code: None,
            message: e.to_string(),
        })?;
        let device = self
            .api
            .open_path(&c_path)
            .map_err(|e| Error::TransportOpen {
                path: path.to_string(),
                code: hid_os_code(&e),
                message: e.to_string(),
            })?;
        device
            .set_blocking_mode(true)
            .map_err(|e| Error::TransportOpen {
                path: path.to_string(),
                code: hid_os_code(&e),
                message: e.to_string(),
            })?;

        Ok(Box::new(HidApiDevice {
            device,
            path: path.to_string(),
        }))
    }
}

/// One device opened through hidapi.
pub struct HidApiDevice {
    device: hidapi::HidDevice,
    path: String,
}

impl HidTransport for HidApiDevice {
    fn read_report(&mut self, report: &mut Report) -> Result<()> {
        report.fill(0);
        let n = self
            .device
            .read(&mut report[1..])
            .map_err(|e| Error::hid(TransportOp::Read, &e))?;
        frame_input(report, n, &self.path)?;
        if n < REPORT_LEN - 1 {
            trace!(len = n, path = %self.path, "short input report");
        }
        Ok(())
    }

    fn write_report(&mut self, report: &Report) -> Result<()> {
        let sent = self
            .device
            .write(report)
            .map_err(|e| Error::hid(TransportOp::Write, &e))?;
        if sent < REPORT_LEN {
            return Err(Error::TransportIo {
                op: TransportOp::Write,
                code: None,
                message: format!("sent {sent} of {REPORT_LEN} bytes"),
            });
        }
        Ok(())
    }

    fn device_ids(&self) -> Result<DeviceIds> {
        let info = self
            .device
            .get_device_info()
            .map_err(|e| Error::hid(TransportOp::QueryIds, &e))?;
        Ok(DeviceIds::new(info.vendor_id(), info.product_id()))
    }

    fn product_name(&self) -> Result<String> {
        let name_err = |code, message| Error::NameQuery {
            path: self.path.clone(),
            code,
            message,
        };
        match self.device.get_product_string() {
            Ok(Some(name)) => Ok(name),
            Ok(None) => Err(name_err(None, "device has no product string".into())),
            Err(e) => Err(name_err(hid_os_code(&e), e.to_string())),
        }
    }
}

/// Restore the 9-byte input layout after hidapi read `n` payload bytes into
/// `report[1..]`: byte 0 becomes report ID 0, and an empty read is an error.
fn frame_input(report: &mut Report, n: usize, path: &str) -> Result<()> {
    report[0] = 0;
    if n == 0 {
        return Err(Error::TransportIo {
            op: TransportOp::Read,
            code: None,
            message: format!("empty report from {path}"),
        });
    }
    Ok(())
}
