//! Linux backend scanning `/dev/usb` for hiddev nodes.
//!
//! Ids and names come from the hiddev ioctls (linux/hiddev.h):
//!   HIDIOCGDEVINFO = _IOR('H', 0x03, struct hiddev_devinfo)
//!   HIDIOCGNAME(len) = _IOC(_IOC_READ, 'H', 0x06, len)

use crate::error::{Error, Result, TransportOp};
use crate::report::Report;
use crate::transport::{DeviceIds, DeviceNode, HidBackend, HidTransport};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::path::PathBuf;
use tracing::{debug, trace};

/// Default directory holding hiddev nodes.
pub const DEFAULT_DIR: &str = "/dev/usb";
/// Default node name prefix.
pub const DEFAULT_PREFIX: &str = "hid";

const NAME_LEN: usize = 256;

/// `struct hiddev_devinfo`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
#[allow(dead_code)]
struct HiddevDevinfo {
    bustype: u32,
    busnum: u32,
    devnum: u32,
    ifnum: u32,
    vendor: i16,
    product: i16,
    version: i16,
    num_applications: u32,
}

nix::ioctl_read!(hidiocgdevinfo, b'H', 0x03, HiddevDevinfo);
nix::ioctl_read_buf!(hidiocgname, b'H', 0x06, u8);

/// Directory-scan backend.
#[derive(Debug, Clone)]
pub struct HiddevBackend {
    dir: PathBuf,
    prefix: String,
}

impl HiddevBackend {
    /// Scan [`DEFAULT_DIR`] for [`DEFAULT_PREFIX`] nodes.
    pub fn new() -> Result<Self> {
        Ok(Self::with_dir(DEFAULT_DIR, DEFAULT_PREFIX))
    }

    /// Scan another directory, e.g. a udev-managed symlink farm.
    pub fn with_dir(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }
}

impl HidBackend for HiddevBackend {
    fn enumerate(&mut self) -> Result<Vec<DeviceNode>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::EnumerationSetup {
            code: e.raw_os_error(),
            message: format!("failed to open directory {}: {e}", self.dir.display()),
        })?;

        let mut nodes = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(&self.prefix) {
                continue;
            }
            nodes.push(DeviceNode {
                path: entry.path().to_string_lossy().into_owned(),
                ids: None,
            });
        }

        debug!(
            dir = %self.dir.display(),
            count = nodes.len(),
            "hiddev scan complete"
        );
        Ok(nodes)
    }

    fn open(&self, path: &str) -> Result<Box<dyn HidTransport>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| Error::TransportOpen {
                path: path.to_string(),
                code: e.raw_os_error(),
                message: e.to_string(),
            })?;
        Ok(Box::new(HiddevDevice {
            file,
            path: path.to_string(),
        }))
    }
}

/// One open hiddev node.
pub struct HiddevDevice {
    file: File,
    path: String,
}

impl HidTransport for HiddevDevice {
    fn read_report(&mut self, report: &mut Report) -> Result<()> {
        report.fill(0);
        let n = self
            .file
            .read(report)
            .map_err(|e| Error::io(TransportOp::Read, &e))?;
        if n < report.len() {
            trace!(len = n, path = %self.path, "short input report");
        }
        Ok(())
    }

    fn write_report(&mut self, report: &Report) -> Result<()> {
        self.file
            .write_all(report)
            .map_err(|e| Error::io(TransportOp::Write, &e))
    }

    fn device_ids(&self) -> Result<DeviceIds> {
        let mut info = HiddevDevinfo::default();
        // SAFETY: the fd is owned by `self.file` and `info` matches the
        // kernel's struct hiddev_devinfo layout.
        unsafe { hidiocgdevinfo(self.file.as_raw_fd(), &mut info) }.map_err(|errno| {
            Error::TransportIo {
                op: TransportOp::QueryIds,
                code: Some(errno as i32),
                message: format!("failed to get device info for {}: {errno}", self.path),
            }
        })?;
        Ok(DeviceIds::new(info.vendor as u16, info.product as u16))
    }

    fn product_name(&self) -> Result<String> {
        let mut buf = [0u8; NAME_LEN];
        // SAFETY: the kernel writes at most `NAME_LEN - 1` bytes, leaving a
        // trailing NUL.
        unsafe { hidiocgname(self.file.as_raw_fd(), &mut buf[..NAME_LEN - 1]) }.map_err(
            |errno| Error::NameQuery {
                path: self.path.clone(),
                code: Some(errno as i32),
                message: errno.to_string(),
            },
        )?;
        Ok(nul_terminated(&buf))
    }
}

fn nul_terminated(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
