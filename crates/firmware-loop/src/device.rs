//! Concrete [`report_protocol::Device`] wiring the sensor source and
//! on-board button/switch state into the report engine.

use report_protocol::{
    ButtonSwitchState, Device, LsmConfigRequest, PacketFlags, ReportError, SensorErrorCounts,
};
use sensor_source::{AccelPacket, MagPacket, ReadMode, SensorSource};

use crate::toggles::CriticalErrors;

pub const FIRMWARE_VERSION: (u8, u8) = (0, 1);

/// Reads the device's physical button/switch state. Implemented by the
/// board-support layer; kept separate from [`Device`] so tests can supply a
/// fixed state without faking the rest of the device.
pub trait ButtonSwitch {
    fn state(&self) -> ButtonSwitchState;
}

/// A `ButtonSwitch` that always reports the same fixed state — used in
/// tests and by any build with no physical buttons attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedButtonSwitch(pub ButtonSwitchState);

impl ButtonSwitch for FixedButtonSwitch {
    fn state(&self) -> ButtonSwitchState {
        self.0
    }
}

/// Assembles a [`SensorSource`] and a [`ButtonSwitch`] into the
/// `report_protocol::Device` the engine dispatches against.
pub struct PenselDevice<S: SensorSource, B: ButtonSwitch> {
    pub sensor: S,
    pub buttons: B,
    now_ms: u32,
    dropped_packets: u8,
    pub critical_errors: CriticalErrors,
}

impl<S: SensorSource, B: ButtonSwitch> PenselDevice<S, B> {
    pub fn new(sensor: S, buttons: B) -> Self {
        PenselDevice { sensor, buttons, now_ms: 0, dropped_packets: 0, critical_errors: CriticalErrors::default() }
    }

    pub fn set_now_ms(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
    }

    /// Mirror a transport's cumulative dropped-byte count, so
    /// `pensel_get_coms_errors` reflects drops the transport itself
    /// observed (e.g. a full stdio/UART receive buffer) rather than only
    /// ones this crate noticed directly.
    pub fn sync_dropped_packets(&mut self, count: u8) {
        self.dropped_packets = self.dropped_packets.max(count);
    }
}

impl<S: SensorSource, B: ButtonSwitch> Device for PenselDevice<S, B> {
    type Accel = AccelPacket;
    type Mag = MagPacket;

    fn now_ms(&self) -> u32 {
        self.now_ms
    }

    fn version(&self) -> (u8, u8) {
        FIRMWARE_VERSION
    }

    fn dropped_packets(&self) -> u8 {
        self.dropped_packets
    }

    fn button_switch_state(&self) -> ButtonSwitchState {
        self.buttons.state()
    }

    fn critical_errors(&self) -> u8 {
        self.critical_errors.as_u8()
    }

    fn lsm_change_config(&mut self, cfg: LsmConfigRequest) -> Result<(), ReportError> {
        self.sensor.reconfigure(cfg)
    }

    fn lsm_get_temp(&self) -> Result<i16, ReportError> {
        Ok(self.sensor.temperature())
    }

    fn accel_packet(&mut self, flags: PacketFlags) -> Result<Option<AccelPacket>, ReportError> {
        if flags.block {
            while !self.sensor.accel_data_available() {}
        }
        if self.sensor.accel_data_available() {
            Ok(Some(self.sensor.accel_get_packet(ReadMode::from_flags(flags))))
        } else {
            Ok(None)
        }
    }

    fn mag_packet(&mut self, flags: PacketFlags) -> Result<Option<MagPacket>, ReportError> {
        if flags.block {
            while !self.sensor.mag_data_available() {}
        }
        if self.sensor.mag_data_available() {
            Ok(Some(self.sensor.mag_get_packet(ReadMode::from_flags(flags))))
        } else {
            Ok(None)
        }
    }

    fn sensor_error_counts(&self) -> SensorErrorCounts {
        SensorErrorCounts {
            accel_packet_overwrites: self.sensor.accel_packet_overwrite_count(),
            mag_packet_overwrites: self.sensor.mag_packet_overwrite_count(),
            accel_hw_overwrites: self.sensor.accel_hw_overwrite_count(),
            mag_hw_overwrites: self.sensor.mag_hw_overwrite_count(),
        }
    }
}
