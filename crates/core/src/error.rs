//! Error types for wedo-core.

use thiserror::Error;

/// Transport operation that failed on an already-open handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOp {
    Read,
    Write,
    QueryIds,
}

impl std::fmt::Display for TransportOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Read => "read report",
            Self::Write => "write report",
            Self::QueryIds => "query vendor/product id",
        };
        f.write_str(s)
    }
}

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Device node could not be opened (permission, busy, nonexistent).
    #[error("failed to open {path}: {message}")]
    TransportOpen {
        path: String,
        code: Option<i32>,
        message: String,
    },

    /// Read, write or id query on an open handle failed.
    #[error("failed to {op}: {message}")]
    TransportIo {
        op: TransportOp,
        code: Option<i32>,
        message: String,
    },

    /// The OS enumeration mechanism could not be initialised.
    #[error("HID enumeration setup failed: {message}")]
    EnumerationSetup { code: Option<i32>, message: String },

    /// Product name could not be read after a vendor/product match.
    #[error("failed to get device name for {path}: {message}")]
    NameQuery {
        path: String,
        code: Option<i32>,
        message: String,
    },

    /// Device opened directly does not carry the WeDo vendor/product pair.
    #[error("not a WeDo hub: {path} (VID=0x{vendor_id:04X}, PID=0x{product_id:04X})")]
    NotAHub {
        path: String,
        vendor_id: u16,
        product_id: u16,
    },
}

impl Error {
    /// OS error code carried by the error, when the platform reported one.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Self::TransportOpen { code, .. }
            | Self::TransportIo { code, .. }
            | Self::EnumerationSetup { code, .. }
            | Self::NameQuery { code, .. } => *code,
            Self::NotAHub { .. } => None,
        }
    }

    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    pub(crate) fn io(op: TransportOp, err: &std::io::Error) -> Self {
        Self::TransportIo {
            op,
            code: err.raw_os_error(),
            message: err.to_string(),
        }
    }

    pub(crate) fn hid(op: TransportOp, err: &hidapi::HidError) -> Self {
        Self::TransportIo {
            op,
            code: hid_os_code(err),
            message: err.to_string(),
        }
    }
}

/// Extract the OS error code from a hidapi error, if it wraps one.
pub(crate) fn hid_os_code(err: &hidapi::HidError) -> Option<i32> {
    match err {
        hidapi::HidError::IoError { error } => error.raw_os_error(),
        _ => None,
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_io_message_names_operation() {
        let err = Error::TransportIo {
            op: TransportOp::Write,
            code: Some(5),
            message: "Input/output error".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write report: Input/output error"
        );
        assert_eq!(err.os_code(), Some(5));
    }

    #[test]
    fn io_error_keeps_os_code() {
        let io = std::io::Error::from_raw_os_error(13);
        let err = Error::io(TransportOp::Read, &io);
        assert_eq!(err.os_code(), Some(13));
        assert!(matches!(
            err,
            Error::TransportIo {
                op: TransportOp::Read,
                ..
            }
        ));
    }

    #[test]
    fn not_a_hub_formats_ids() {
        let err = Error::NotAHub {
            path: "/dev/usb/hiddev0".into(),
            vendor_id: 0x046D,
            product_id: 0xC08B,
        };
        assert_eq!(
            err.to_string(),
            "not a WeDo hub: /dev/usb/hiddev0 (VID=0x046D, PID=0xC08B)"
        );
        assert_eq!(err.os_code(), None);
    }
}
