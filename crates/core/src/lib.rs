//! wedo-core: LEGO WeDo hub discovery, HID report codec, and port access.
//!
//! This crate provides the cross-platform core logic for communicating with
//! WeDo USB hubs: each hub exposes two ports whose attached device type and
//! value can be read, and whose output byte can be written.

pub mod device;
pub mod discovery;
pub mod error;
pub mod hidapi_backend;
#[cfg(target_os = "linux")]
pub mod hiddev;
pub mod hub;
pub mod report;
pub mod transport;

pub use device::{DeviceType, Port, Slot};
pub use discovery::{find_hubs, find_hubs_with, open_hub};
pub use error::{Error, Result};
pub use hub::{Hub, HubInfo, PortInfo};

/// LEGO USB Vendor ID.
pub const VENDOR_ID: u16 = 0x0694;

/// WeDo hub USB Product ID.
pub const PRODUCT_ID: u16 = 0x0003;

/// Backend used by [`find_hubs`], selected at build time.
#[cfg(all(target_os = "linux", feature = "hiddev"))]
pub type DefaultBackend = hiddev::HiddevBackend;

/// Backend used by [`find_hubs`], selected at build time.
#[cfg(not(all(target_os = "linux", feature = "hiddev")))]
pub type DefaultBackend = hidapi_backend::HidApiBackend;
