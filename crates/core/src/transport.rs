//! HID transport abstraction for hub communication.
//!
//! Two traits make up the platform capability: [`HidBackend`] lists and opens
//! device nodes, [`HidTransport`] is one open node. Real backends and the test
//! mocks share the same interface.

use crate::error::Result;
use crate::report::Report;

/// USB vendor/product identifier pair reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIds {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIds {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl std::fmt::Display for DeviceIds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "VID=0x{:04X} PID=0x{:04X}",
            self.vendor_id, self.product_id
        )
    }
}

/// One entry of a backend enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceNode {
    /// Identifier passed back to [`HidBackend::open`].
    pub path: String,
    /// Ids advertised by the enumeration itself, when the platform has them
    /// without opening the device.
    pub ids: Option<DeviceIds>,
}

/// An open HID device node.
///
/// Dropping the value closes the underlying OS handle.
pub trait HidTransport: Send {
    /// Blocking read of exactly one report.
    fn read_report(&mut self, report: &mut Report) -> Result<()>;

    /// Blocking write of exactly one report.
    fn write_report(&mut self, report: &Report) -> Result<()>;

    /// Vendor/product ids reported by the open handle.
    fn device_ids(&self) -> Result<DeviceIds>;

    /// Human-readable product string.
    fn product_name(&self) -> Result<String>;
}

/// Platform device listing and open.
pub trait HidBackend {
    /// List HID device nodes visible to the OS, in OS order.
    ///
    /// Fails only when the enumeration mechanism itself cannot be set up.
    fn enumerate(&mut self) -> Result<Vec<DeviceNode>>;

    /// Open one node for bidirectional access.
    fn open(&self, path: &str) -> Result<Box<dyn HidTransport>>;
}
