//! A connected WeDo hub and its two ports.

use crate::device::{DeviceType, Port, Slot, PORT_COUNT};
use crate::error::Result;
use crate::report::ReportCodec;
use crate::transport::HidTransport;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// One WeDo hub.
///
/// Owns the transport through its codec; dropping the hub closes the device.
/// Ports share the codec, so the hub is `Send` but not `Sync`.
pub struct Hub {
    name: String,
    path: String,
    codec: RefCell<ReportCodec>,
}

impl Hub {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        transport: Box<dyn HidTransport>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            codec: RefCell::new(ReportCodec::new(transport)),
        }
    }

    /// Product string reported by the device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transport path the hub was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Both ports, slot A first.
    pub fn ports(&self) -> [Port<'_>; PORT_COUNT] {
        Slot::ALL.map(|slot| self.port(slot))
    }

    /// Port for one slot.
    pub fn port(&self, slot: Slot) -> Port<'_> {
        Port::new(slot, &self.codec)
    }

    /// Snapshot of the hub and the devices currently attached.
    ///
    /// Reads one report per port.
    pub fn info(&self) -> Result<HubInfo> {
        let mut ports = Vec::with_capacity(PORT_COUNT);
        for port in self.ports() {
            let raw_type = port.read_raw_type()?;
            ports.push(PortInfo {
                slot: port.slot(),
                device_type: DeviceType::from_raw(raw_type),
                raw_type,
            });
        }
        Ok(HubInfo {
            name: self.name.clone(),
            path: self.path.clone(),
            ports,
        })
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Serializable description of a hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubInfo {
    pub name: String,
    pub path: String,
    pub ports: Vec<PortInfo>,
}

/// Serializable description of one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub slot: Slot,
    pub device_type: DeviceType,
    pub raw_type: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    fn hub() -> (Hub, MockTransport) {
        let mock = MockTransport::hub();
        let hub = Hub::new("LEGO USB Hub V1.00", "/dev/usb/hiddev0", Box::new(mock.clone()));
        (hub, mock)
    }

    #[test]
    fn exposes_two_ports_in_slot_order() {
        let (hub, _mock) = hub();
        let ports = hub.ports();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].slot(), Slot::A);
        assert_eq!(ports[1].slot(), Slot::B);
    }

    #[test]
    fn accessors_return_construction_values() {
        let (hub, _mock) = hub();
        assert_eq!(hub.name(), "LEGO USB Hub V1.00");
        assert_eq!(hub.path(), "/dev/usb/hiddev0");
    }

    #[test]
    fn ports_share_one_write_buffer() {
        let (hub, mock) = hub();
        let [a, b] = hub.ports();
        a.write_value(0x40).unwrap();
        b.write_value(0x80).unwrap();
        a.write_value(0x00).unwrap();

        let writes = mock.writes();
        assert_eq!(writes[1][2..4], [0x40, 0x80]);
        assert_eq!(writes[2][2..4], [0x00, 0x80]);
    }

    #[test]
    fn info_reports_attached_devices() {
        let (hub, mock) = hub();
        let report = [0, 0, 0, 0, 39, 0, 231, 0, 0];
        mock.queue_read(report);
        mock.queue_read(report);

        let info = hub.info().unwrap();
        assert_eq!(info.ports.len(), 2);
        assert_eq!(info.ports[0].device_type, DeviceType::TiltSensor);
        assert_eq!(info.ports[0].raw_type, 39);
        assert_eq!(info.ports[1].device_type, DeviceType::None);

        let json = serde_json::to_string(&info).expect("serialize hub info");
        let back: HubInfo = serde_json::from_str(&json).expect("deserialize hub info");
        assert_eq!(back, info);
    }

    #[test]
    fn dropping_hub_closes_transport_once() {
        let (hub, mock) = hub();
        assert_eq!(mock.drop_count(), 0);
        drop(hub);
        assert_eq!(mock.drop_count(), 1);
    }
}
