//! Collaborator contract the report engine dispatches against.
//!
//! The engine owns wire framing and dispatch only; it never owns the LSM303
//! sensor, calibration store, or button/switch hardware. A concrete `Device`
//! is assembled by the firmware loop and threaded through
//! [`crate::dispatch::ReportTable::dispatch`].

use crate::error::ReportError;

/// Flags packed into the single input byte of the `lsm_get_accel`/
/// `lsm_get_mag` reports.
///
/// `block` is tested against the literal value `0b10`, not bit-tested like
/// `peek` is — this mirrors the original firmware's `in_p[0] == 0b10` check
/// exactly. A byte of `0b11` therefore sets `peek` but leaves `block` false,
/// which looks inconsistent but is the behavior callers have always gotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketFlags {
    pub peek: bool,
    pub block: bool,
}

impl PacketFlags {
    pub fn parse(byte: u8) -> PacketFlags {
        PacketFlags {
            peek: byte & 0b01 != 0,
            block: byte == 0b10,
        }
    }
}

/// Requested LSM303 configuration, unpacked from the `lsm_change_config`
/// payload (4 raw bytes: accel ODR, accel sensitivity, mag ODR, mag
/// sensitivity, in that order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsmConfigRequest {
    pub accel_odr: u8,
    pub accel_sensitivity: u8,
    pub mag_odr: u8,
    pub mag_sensitivity: u8,
}

impl LsmConfigRequest {
    pub const WIRE_LEN: usize = 4;

    pub fn parse(bytes: &[u8]) -> Result<LsmConfigRequest, ReportError> {
        if bytes.len() != Self::WIRE_LEN {
            return Err(ReportError::InvalidArgs(crate::frame::report_id::LSM_CHANGE_CONFIG));
        }
        Ok(LsmConfigRequest {
            accel_odr: bytes[0],
            accel_sensitivity: bytes[1],
            mag_odr: bytes[2],
            mag_sensitivity: bytes[3],
        })
    }
}

/// Momentary state of the device's physical button and switch, as sampled by
/// `pensel_get_button_switch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonSwitchState {
    pub switch: u8,
    pub main_button: u8,
    pub aux_button: u8,
}

/// Overwrite counters surfaced by `lsm_get_errors` — packet-level overwrites
/// happen in the ring buffer sitting between ISR and foreground loop,
/// hardware-level overwrites happen inside the LSM303's own FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorErrorCounts {
    pub accel_packet_overwrites: u32,
    pub mag_packet_overwrites: u32,
    pub accel_hw_overwrites: u32,
    pub mag_hw_overwrites: u32,
}

/// A wire-encodable accelerometer or magnetometer sample packet. Implemented
/// by `sensor-source`'s `AccelPacket`/`MagPacket`; kept generic here so this
/// crate doesn't depend on sensor-source's internal sample representation,
/// only on the ability to serialize one onto the wire.
pub trait WirePacket {
    /// Encoded length in bytes, as written into the response's `out_len`.
    const WIRE_LEN: usize;
    fn write_into(&self, out: &mut [u8]);
}

/// Everything the report engine needs from the rest of the firmware to
/// answer a request. One firmware-loop type implements this once, wiring
/// together its sensor source, calibration store, and board I/O.
pub trait Device {
    type Accel: WirePacket;
    type Mag: WirePacket;

    fn now_ms(&self) -> u32;
    fn version(&self) -> (u8, u8);
    fn dropped_packets(&self) -> u8;
    fn button_switch_state(&self) -> ButtonSwitchState;
    fn critical_errors(&self) -> u8;

    fn lsm_change_config(&mut self, cfg: LsmConfigRequest) -> Result<(), ReportError>;
    fn lsm_get_temp(&self) -> Result<i16, ReportError>;

    /// `None` means no sample is available (and the caller didn't block).
    fn accel_packet(&mut self, flags: PacketFlags) -> Result<Option<Self::Accel>, ReportError>;
    fn mag_packet(&mut self, flags: PacketFlags) -> Result<Option<Self::Mag>, ReportError>;

    fn sensor_error_counts(&self) -> SensorErrorCounts;
}
