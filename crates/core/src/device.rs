//! Port model: slots, device type classification, and port handles.

use crate::error::Result;
use crate::report::ReportCodec;
use std::cell::RefCell;

/// Number of ports on a WeDo hub.
pub const PORT_COUNT: usize = 2;

/// One of the two physical sockets on a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum Slot {
    A = 0,
    B = 1,
}

impl Slot {
    /// Both slots in report order.
    pub const ALL: [Slot; PORT_COUNT] = [Slot::A, Slot::B];

    /// Slot for a raw index, `None` for anything but 0 or 1.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::A),
            1 => Some(Self::B),
            _ => None,
        }
    }

    /// Parse a slot from a CLI-friendly string: "a", "b", "0" or "1".
    pub fn from_name(name: &str) -> Option<Self> {
        if let Ok(index) = name.parse::<u8>() {
            return Self::from_index(index);
        }
        match name.to_lowercase().as_str() {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            _ => None,
        }
    }

    /// Zero-based slot index.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// Raw type byte the hub reports for an empty port.
pub const RAW_TYPE_EMPTY: u8 = 231;

/// Peripheral currently plugged into a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DeviceType {
    None,
    Motor,
    ServoMotor,
    Light,
    DistanceSensor,
    TiltSensor,
}

impl DeviceType {
    /// All device types.
    pub const ALL: &'static [DeviceType] = &[
        DeviceType::None,
        DeviceType::Motor,
        DeviceType::ServoMotor,
        DeviceType::Light,
        DeviceType::DistanceSensor,
        DeviceType::TiltSensor,
    ];

    /// Classify a raw type byte. Unknown bytes map to `None`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0..=3 | 239..=241 => Self::Motor,
            38 | 39 => Self::TiltSensor,
            102 | 103 => Self::ServoMotor,
            177..=180 => Self::DistanceSensor,
            202..=205 => Self::Light,
            RAW_TYPE_EMPTY => Self::None,
            _ => Self::None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Motor => "Motor",
            Self::ServoMotor => "Servo Motor",
            Self::Light => "Light",
            Self::DistanceSensor => "Distance Sensor",
            Self::TiltSensor => "Tilt Sensor",
        }
    }

    /// Whether the device consumes output bytes.
    ///
    /// Informational only: writes to sensor ports are not rejected.
    pub fn is_output(&self) -> bool {
        matches!(self, Self::Motor | Self::ServoMotor | Self::Light)
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Handle to one port of a hub.
///
/// Borrows the hub's codec, so a port can be copied freely but never outlives
/// its hub. Every call performs one synchronous transport read or write.
#[derive(Clone, Copy)]
pub struct Port<'h> {
    slot: Slot,
    codec: &'h RefCell<ReportCodec>,
}

impl<'h> Port<'h> {
    pub(crate) fn new(slot: Slot, codec: &'h RefCell<ReportCodec>) -> Self {
        Self { slot, codec }
    }

    /// Slot this port was constructed for.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Read the unclassified device type byte.
    pub fn read_raw_type(&self) -> Result<u8> {
        self.codec.borrow_mut().read_type(self.slot)
    }

    /// Read and classify the attached device type.
    pub fn read_type(&self) -> Result<DeviceType> {
        self.read_raw_type().map(DeviceType::from_raw)
    }

    /// Read the raw value byte. Interpretation depends on the device type.
    pub fn read_value(&self) -> Result<u8> {
        self.codec.borrow_mut().read_value(self.slot)
    }

    /// Write an output byte to this port.
    pub fn write_value(&self, value: u8) -> Result<()> {
        self.codec.borrow_mut().write_value(self.slot, value)
    }
}

impl std::fmt::Debug for Port<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port").field("slot", &self.slot).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    fn expected(raw: u8) -> DeviceType {
        match raw {
            0 | 1 | 2 | 3 | 239 | 240 | 241 => DeviceType::Motor,
            38 | 39 => DeviceType::TiltSensor,
            102 | 103 => DeviceType::ServoMotor,
            177 | 178 | 179 | 180 => DeviceType::DistanceSensor,
            202 | 203 | 204 | 205 => DeviceType::Light,
            _ => DeviceType::None,
        }
    }

    #[test]
    fn classification_covers_every_byte() {
        for raw in 0..=u8::MAX {
            assert_eq!(DeviceType::from_raw(raw), expected(raw), "raw byte {raw}");
        }
    }

    #[test]
    fn classification_known_bytes() {
        assert_eq!(DeviceType::from_raw(103), DeviceType::ServoMotor);
        assert_eq!(DeviceType::from_raw(204), DeviceType::Light);
        assert_eq!(DeviceType::from_raw(RAW_TYPE_EMPTY), DeviceType::None);
        assert_eq!(DeviceType::from_raw(1), DeviceType::Motor);
        assert_eq!(DeviceType::from_raw(99), DeviceType::None);
    }

    #[test]
    fn slot_from_index() {
        assert_eq!(Slot::from_index(0), Some(Slot::A));
        assert_eq!(Slot::from_index(1), Some(Slot::B));
        assert_eq!(Slot::from_index(2), None);
    }

    #[test]
    fn slot_from_name_accepts_variants() {
        assert_eq!(Slot::from_name("a"), Some(Slot::A));
        assert_eq!(Slot::from_name("B"), Some(Slot::B));
        assert_eq!(Slot::from_name("0"), Some(Slot::A));
        assert_eq!(Slot::from_name("1"), Some(Slot::B));
        assert_eq!(Slot::from_name("2"), None);
        assert_eq!(Slot::from_name("c"), None);
        assert_eq!(Slot::from_name(""), None);
    }

    #[test]
    fn device_type_labels_non_empty() {
        for ty in DeviceType::ALL {
            assert!(!ty.label().is_empty());
        }
    }

    #[test]
    fn only_actuators_are_outputs() {
        assert!(DeviceType::Motor.is_output());
        assert!(DeviceType::ServoMotor.is_output());
        assert!(DeviceType::Light.is_output());
        assert!(!DeviceType::TiltSensor.is_output());
        assert!(!DeviceType::DistanceSensor.is_output());
        assert!(!DeviceType::None.is_output());
    }

    #[test]
    fn port_reads_live_type() {
        let mock = MockTransport::hub();
        let codec = RefCell::new(ReportCodec::new(Box::new(mock.clone())));
        let port = Port::new(Slot::B, &codec);

        mock.queue_read([0, 0, 0, 0, 0, 0, 177, 0, 0]);
        mock.queue_read([0, 0, 0, 0, 0, 0, RAW_TYPE_EMPTY, 0, 0]);

        assert_eq!(port.read_type().unwrap(), DeviceType::DistanceSensor);
        assert_eq!(port.read_type().unwrap(), DeviceType::None);
    }

    #[test]
    fn port_slot_is_stable_across_io() {
        let mock = MockTransport::hub();
        let codec = RefCell::new(ReportCodec::new(Box::new(mock.clone())));
        let port = Port::new(Slot::A, &codec);

        for v in 0..10 {
            mock.queue_read([0, 0, 0, v, 0, 0, 0, 0, 0]);
            assert_eq!(port.read_value().unwrap(), v);
            port.write_value(v).unwrap();
            assert_eq!(port.slot(), Slot::A);
        }
    }

    #[test]
    fn sensor_port_accepts_writes() {
        let mock = MockTransport::hub();
        let codec = RefCell::new(ReportCodec::new(Box::new(mock.clone())));
        let port = Port::new(Slot::A, &codec);

        port.write_value(255).unwrap();
        assert_eq!(mock.writes()[0][2], 255);
    }
}
