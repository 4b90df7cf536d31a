//! WeDo hub HID report encoding and decoding.
//!
//! The hub exchanges fixed 9-byte reports. Byte 0 is the report ID slot and
//! is not interpreted here.
//!
//! Input report, per slot `s`:
//!   - offset `3 + 2s`: value byte (sensor reading / position)
//!   - offset `4 + 2s`: device type byte
//!
//! Output report:
//!   - offset 1: command byte, always [`OUTPUT_COMMAND`]
//!   - offset `2 + s`: output byte for slot `s`

use crate::device::Slot;
use crate::error::Result;
use crate::transport::HidTransport;
use tracing::trace;

/// Report length including the report ID byte.
pub const REPORT_LEN: usize = 9;

/// One raw report.
pub type Report = [u8; REPORT_LEN];

/// Command byte sent at [`COMMAND_OFFSET`] with every output report.
pub const OUTPUT_COMMAND: u8 = 64;

/// Offset of the command byte in an output report.
pub const COMMAND_OFFSET: usize = 1;

/// Offset of a slot's value byte in an input report.
pub const fn value_offset(slot: Slot) -> usize {
    3 + slot.index() * 2
}

/// Offset of a slot's device type byte in an input report.
pub const fn type_offset(slot: Slot) -> usize {
    4 + slot.index() * 2
}

/// Offset of a slot's output byte in an output report.
pub const fn output_offset(slot: Slot) -> usize {
    2 + slot.index()
}

/// Translates between hub reports and per-slot fields.
///
/// Owns the transport for its whole lifetime. The read buffer is overwritten
/// on every read. The write buffer is never cleared: writing one slot resends
/// whatever was last written to the other.
pub struct ReportCodec {
    transport: Box<dyn HidTransport>,
    read_buf: Report,
    write_buf: Report,
}

impl ReportCodec {
    pub fn new(transport: Box<dyn HidTransport>) -> Self {
        Self {
            transport,
            read_buf: [0; REPORT_LEN],
            write_buf: [0; REPORT_LEN],
        }
    }

    fn read(&mut self) -> Result<&Report> {
        self.transport.read_report(&mut self.read_buf)?;
        trace!(report_hex = format_args!("{:02X?}", self.read_buf), "WeDo RX");
        Ok(&self.read_buf)
    }

    /// Read one report and return the raw device type byte of `slot`.
    pub fn read_type(&mut self, slot: Slot) -> Result<u8> {
        Ok(self.read()?[type_offset(slot)])
    }

    /// Read one report and return the raw value byte of `slot`.
    pub fn read_value(&mut self, slot: Slot) -> Result<u8> {
        Ok(self.read()?[value_offset(slot)])
    }

    /// Set the output byte of `slot` and send the whole output report.
    pub fn write_value(&mut self, slot: Slot, value: u8) -> Result<()> {
        self.write_buf[COMMAND_OFFSET] = OUTPUT_COMMAND;
        self.write_buf[output_offset(slot)] = value;
        trace!(
            slot = %slot,
            report_hex = format_args!("{:02X?}", self.write_buf),
            "WeDo TX"
        );
        self.transport.write_report(&self.write_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, TransportOp};
    use crate::transport::mock::MockTransport;

    fn codec() -> (ReportCodec, MockTransport) {
        let mock = MockTransport::hub();
        (ReportCodec::new(Box::new(mock.clone())), mock)
    }

    #[test]
    fn offsets_match_wire_layout() {
        assert_eq!(value_offset(Slot::A), 3);
        assert_eq!(type_offset(Slot::A), 4);
        assert_eq!(value_offset(Slot::B), 5);
        assert_eq!(type_offset(Slot::B), 6);
        assert_eq!(output_offset(Slot::A), 2);
        assert_eq!(output_offset(Slot::B), 3);
    }

    #[test]
    fn decodes_both_slots_from_input_report() {
        let (mut codec, mock) = codec();
        let report = [0xEE, 0xEE, 0xEE, 0x11, 0x26, 0x22, 0xB1, 0xEE, 0xEE];
        for _ in 0..4 {
            mock.queue_read(report);
        }

        assert_eq!(codec.read_value(Slot::A).unwrap(), 0x11);
        assert_eq!(codec.read_type(Slot::A).unwrap(), 0x26);
        assert_eq!(codec.read_value(Slot::B).unwrap(), 0x22);
        assert_eq!(codec.read_type(Slot::B).unwrap(), 0xB1);
    }

    #[test]
    fn every_read_hits_the_transport() {
        let (mut codec, mock) = codec();
        mock.queue_read([0, 0, 0, 10, 0, 0, 0, 0, 0]);
        mock.queue_read([0, 0, 0, 20, 0, 0, 0, 0, 0]);

        assert_eq!(codec.read_value(Slot::A).unwrap(), 10);
        assert_eq!(codec.read_value(Slot::A).unwrap(), 20);
        // Queue drained: a third read must fail rather than reuse the buffer.
        assert!(codec.read_value(Slot::A).is_err());
    }

    #[test]
    fn write_sets_command_byte_and_slot_byte() {
        let (mut codec, mock) = codec();
        codec.write_value(Slot::B, 0x7F).unwrap();

        let writes = mock.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0], [0, 64, 0, 0x7F, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn sibling_slot_byte_is_resent() {
        let (mut codec, mock) = codec();
        codec.write_value(Slot::A, 100).unwrap();
        codec.write_value(Slot::B, 200).unwrap();

        let writes = mock.writes();
        assert_eq!(writes[0][COMMAND_OFFSET], 64);
        assert_eq!(writes[0][2], 100);
        assert_eq!(writes[0][3], 0);
        assert_eq!(writes[1][COMMAND_OFFSET], 64);
        assert_eq!(writes[1][2], 100);
        assert_eq!(writes[1][3], 200);
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let (mut codec, mock) = codec();
        mock.fail_io();

        let err = codec.write_value(Slot::A, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::TransportIo {
                op: TransportOp::Write,
                code: Some(5),
                ..
            }
        ));
        assert!(codec.read_type(Slot::A).is_err());
        assert!(mock.writes().is_empty());
    }
}
