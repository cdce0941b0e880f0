//! Framed binary report protocol.
//!
//! A host issues `0xBE 0xEF <id> <len> <payload>` requests over a serial
//! link; [`ReportEngine`] parses them byte-at-a-time as they arrive, looks
//! the report ID up in a [`ReportTable`], and writes back
//! `<retcode> <out_len> <out>`. The engine owns only framing and dispatch —
//! everything it needs from sensors, calibration, or board I/O comes through
//! the [`Device`] trait a caller implements and supplies.

pub mod device;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod frame;
pub mod io;
pub mod reports;

pub use device::{ButtonSwitchState, Device, LsmConfigRequest, PacketFlags, SensorErrorCounts, WirePacket};
pub use dispatch::{EngineStats, ReportHandlerFn, ReportTable};
pub use engine::ReportEngine;
pub use error::{ComError, ReportError};
pub use frame::{report_id, stream_id, RetCode, MAGIC0, MAGIC1, READ_BUF_SIZE, RPT_TIMEOUT_MS};
pub use io::{DroppedBytes, LoopbackSerialIo, SerialIo};

/// Register every standard report handler (0x10-0x11, 0x20-0x24, 0x30-0x34)
/// into a fresh table for the given `Device` implementation.
pub fn standard_report_table<D: Device>() -> ReportTable<D> {
    let mut table = ReportTable::new();
    table
        .register(frame::report_id::GET_TIMEOUT_COUNT, reports::get_timeout_count)
        .register(frame::report_id::GET_INVALID_CHARS_COUNT, reports::get_invalid_chars_count)
        .register(frame::report_id::LSM_CHANGE_CONFIG, reports::lsm_change_config)
        .register(frame::report_id::LSM_GET_TEMP, reports::lsm_get_temp)
        .register(frame::report_id::LSM_GET_ACCEL, reports::lsm_get_accel)
        .register(frame::report_id::LSM_GET_MAG, reports::lsm_get_mag)
        .register(frame::report_id::LSM_GET_ERRORS, reports::lsm_get_errors)
        .register(frame::report_id::PENSEL_GET_VERSION, reports::pensel_get_version)
        .register(frame::report_id::PENSEL_GET_TIMESTAMP, reports::pensel_get_timestamp)
        .register(frame::report_id::PENSEL_GET_COMS_ERRORS, reports::pensel_get_coms_errors)
        .register(frame::report_id::PENSEL_GET_BUTTON_SWITCH, reports::pensel_get_button_switch)
        .register(frame::report_id::PENSEL_GET_CRITICAL_ERRORS, reports::pensel_get_critical_errors);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ButtonSwitchState as BSS, LsmConfigRequest, PacketFlags, SensorErrorCounts, WirePacket};

    #[derive(Debug, Clone, Copy, Default)]
    struct FakeAccel {
        x: i16,
        y: i16,
        z: i16,
    }

    impl WirePacket for FakeAccel {
        const WIRE_LEN: usize = 6;
        fn write_into(&self, out: &mut [u8]) {
            out[0..2].copy_from_slice(&self.x.to_le_bytes());
            out[2..4].copy_from_slice(&self.y.to_le_bytes());
            out[4..6].copy_from_slice(&self.z.to_le_bytes());
        }
    }

    #[derive(Debug, Default)]
    struct FakeDevice {
        now_ms: u32,
        pending_accel: Option<FakeAccel>,
        critical_errors: u8,
    }

    impl Device for FakeDevice {
        type Accel = FakeAccel;
        type Mag = FakeAccel;

        fn now_ms(&self) -> u32 {
            self.now_ms
        }
        fn version(&self) -> (u8, u8) {
            (1, 2)
        }
        fn dropped_packets(&self) -> u8 {
            0
        }
        fn button_switch_state(&self) -> BSS {
            BSS { switch: 1, main_button: 0, aux_button: 1 }
        }
        fn critical_errors(&self) -> u8 {
            self.critical_errors
        }
        fn lsm_change_config(&mut self, _cfg: LsmConfigRequest) -> Result<(), ReportError> {
            Ok(())
        }
        fn lsm_get_temp(&self) -> Result<i16, ReportError> {
            Ok(21)
        }
        fn accel_packet(&mut self, _flags: PacketFlags) -> Result<Option<FakeAccel>, ReportError> {
            Ok(self.pending_accel.take())
        }
        fn mag_packet(&mut self, _flags: PacketFlags) -> Result<Option<FakeAccel>, ReportError> {
            Ok(None)
        }
        fn sensor_error_counts(&self) -> SensorErrorCounts {
            SensorErrorCounts::default()
        }
    }

    fn request(id: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![MAGIC0, MAGIC1, id, payload.len() as u8];
        bytes.extend_from_slice(payload);
        bytes
    }

    fn pump_until_response(
        engine: &mut ReportEngine,
        io: &mut LoopbackSerialIo,
        table: &ReportTable<FakeDevice>,
        device: &mut FakeDevice,
    ) {
        for _ in 0..16 {
            engine.pump(io, device.now_ms, table, device).unwrap();
            if io.written().len() >= 2 {
                return;
            }
        }
        panic!("engine did not produce a response within the step budget");
    }

    #[test]
    fn version_report_round_trips() {
        let table = standard_report_table::<FakeDevice>();
        let mut engine = ReportEngine::new();
        let mut io = LoopbackSerialIo::new();
        let mut device = FakeDevice::default();

        io.feed(&request(report_id::PENSEL_GET_VERSION, &[]));
        pump_until_response(&mut engine, &mut io, &table, &mut device);

        assert_eq!(io.written(), &[RetCode::Ok.as_u8(), 2, 1, 2]);
    }

    #[test]
    fn unknown_report_returns_noreport() {
        let table = standard_report_table::<FakeDevice>();
        let mut engine = ReportEngine::new();
        let mut io = LoopbackSerialIo::new();
        let mut device = FakeDevice::default();

        io.feed(&request(0xFF, &[]));
        pump_until_response(&mut engine, &mut io, &table, &mut device);

        assert_eq!(io.written(), &[RetCode::NoReport.as_u8(), 0]);
    }

    #[test]
    fn garbage_before_magic_counts_as_invalid_chars() {
        let table = standard_report_table::<FakeDevice>();
        let mut engine = ReportEngine::new();
        let mut io = LoopbackSerialIo::new();
        let mut device = FakeDevice::default();

        io.feed(&[0x00, 0x01]);
        io.feed(&request(report_id::PENSEL_GET_VERSION, &[]));
        pump_until_response(&mut engine, &mut io, &table, &mut device);

        assert_eq!(engine.invalid_chars(), 2);
    }

    #[test]
    fn stalled_transaction_times_out_and_resets() {
        let table = standard_report_table::<FakeDevice>();
        let mut engine = ReportEngine::new();
        let mut io = LoopbackSerialIo::new();
        let mut device = FakeDevice::default();

        io.feed(&[MAGIC0]);
        engine.pump(&mut io, 0, &table, &mut device).unwrap();
        // No further bytes arrive; advance time past RPT_TIMEOUT_MS while in
        // ReadMagic1, which does perform a timeout check every pump.
        engine.pump(&mut io, RPT_TIMEOUT_MS + 1, &table, &mut device).unwrap();

        assert_eq!(engine.timeouts(), 1);

        io.feed(&request(report_id::PENSEL_GET_VERSION, &[]));
        pump_until_response(&mut engine, &mut io, &table, &mut device);
        assert_eq!(io.written(), &[RetCode::Ok.as_u8(), 2, 1, 2]);
    }

    #[test]
    fn button_switch_report_reads_back_device_state() {
        let table = standard_report_table::<FakeDevice>();
        let mut engine = ReportEngine::new();
        let mut io = LoopbackSerialIo::new();
        let mut device = FakeDevice::default();

        io.feed(&request(report_id::PENSEL_GET_BUTTON_SWITCH, &[]));
        pump_until_response(&mut engine, &mut io, &table, &mut device);

        assert_eq!(io.written(), &[RetCode::Ok.as_u8(), 3, 1, 0, 1]);
    }

    #[test]
    fn critical_errors_report_is_exposed() {
        let table = standard_report_table::<FakeDevice>();
        let mut engine = ReportEngine::new();
        let mut io = LoopbackSerialIo::new();
        let mut device = FakeDevice { critical_errors: 3, ..Default::default() };

        io.feed(&request(report_id::PENSEL_GET_CRITICAL_ERRORS, &[]));
        pump_until_response(&mut engine, &mut io, &table, &mut device);

        assert_eq!(io.written(), &[RetCode::Ok.as_u8(), 1, 3]);
    }

    #[test]
    fn accel_report_returns_empty_response_when_no_sample_available() {
        let table = standard_report_table::<FakeDevice>();
        let mut engine = ReportEngine::new();
        let mut io = LoopbackSerialIo::new();
        let mut device = FakeDevice::default();

        io.feed(&request(report_id::LSM_GET_ACCEL, &[0b00]));
        pump_until_response(&mut engine, &mut io, &table, &mut device);

        assert_eq!(io.written(), &[RetCode::Ok.as_u8(), 0]);
    }

    #[test]
    fn accel_report_with_bad_payload_length_is_invalid_args() {
        let table = standard_report_table::<FakeDevice>();
        let mut engine = ReportEngine::new();
        let mut io = LoopbackSerialIo::new();
        let mut device = FakeDevice::default();

        io.feed(&request(report_id::LSM_GET_ACCEL, &[0, 0]));
        pump_until_response(&mut engine, &mut io, &table, &mut device);

        assert_eq!(io.written(), &[RetCode::InvalidArgs.as_u8(), 0]);
    }
}
