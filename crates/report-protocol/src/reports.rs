//! Standard report handlers, grounded one-to-one in the original firmware's
//! `reports.c`. Each is generic over `Device` and registered into a
//! [`crate::dispatch::ReportTable`] by monomorphizing against a concrete
//! device type (see `firmware-loop`).

use crate::device::{Device, LsmConfigRequest, PacketFlags, WirePacket};
use crate::dispatch::EngineStats;
use crate::error::ReportError;
use crate::frame::{report_id, READ_BUF_SIZE};

/// Report 0x10: the number of times the parser has timed out waiting for the
/// next byte of a request. The counter itself saturates at `u16::MAX` but is
/// widened to a `u32` on the wire, matching the original report's output
/// width.
pub fn get_timeout_count<D: Device>(
    stats: &EngineStats,
    _device: &mut D,
    _payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    out[..4].copy_from_slice(&(stats.timeouts as u32).to_le_bytes());
    Ok(4)
}

/// Report 0x11: the number of bytes received outside any recognized frame
/// (garbage before a valid `0xBE 0xEF` magic), widened to `u32` on the wire.
pub fn get_invalid_chars_count<D: Device>(
    stats: &EngineStats,
    _device: &mut D,
    _payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    out[..4].copy_from_slice(&(stats.invalid_chars as u32).to_le_bytes());
    Ok(4)
}

/// Report 0x20: reconfigure the LSM303's output data rate and sensitivity
/// for both sub-sensors. Payload is 4 raw bytes: accel ODR, accel
/// sensitivity, mag ODR, mag sensitivity.
pub fn lsm_change_config<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    payload: &[u8],
    _out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    let cfg = LsmConfigRequest::parse(payload)?;
    device.lsm_change_config(cfg)?;
    Ok(0)
}

/// Report 0x21: current LSM303 die temperature, as a little-endian `i16`.
pub fn lsm_get_temp<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    _payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    let temp = device.lsm_get_temp()?;
    out[..2].copy_from_slice(&temp.to_le_bytes());
    Ok(2)
}

/// Report 0x22: fetch (or peek) the oldest queued accelerometer packet.
/// Payload is a single flags byte; see [`PacketFlags`]. Returns a zero-length
/// response if no sample is available and the caller didn't request
/// blocking.
pub fn lsm_get_accel<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    if payload.len() != 1 {
        return Err(ReportError::InvalidArgs(report_id::LSM_GET_ACCEL));
    }
    let flags = PacketFlags::parse(payload[0]);
    match device.accel_packet(flags)? {
        Some(pkt) => {
            pkt.write_into(&mut out[..D::Accel::WIRE_LEN]);
            Ok(D::Accel::WIRE_LEN)
        }
        None => Ok(0),
    }
}

/// Report 0x23: fetch (or peek) the oldest queued magnetometer packet.
/// Mirror of [`lsm_get_accel`] for the magnetometer channel.
pub fn lsm_get_mag<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    if payload.len() != 1 {
        return Err(ReportError::InvalidArgs(report_id::LSM_GET_MAG));
    }
    let flags = PacketFlags::parse(payload[0]);
    match device.mag_packet(flags)? {
        Some(pkt) => {
            pkt.write_into(&mut out[..D::Mag::WIRE_LEN]);
            Ok(D::Mag::WIRE_LEN)
        }
        None => Ok(0),
    }
}

/// Report 0x24: four little-endian `u32` overwrite counters, in order
/// accel-packet, mag-packet, accel-hardware, mag-hardware.
pub fn lsm_get_errors<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    _payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    let counts = device.sensor_error_counts();
    out[0..4].copy_from_slice(&counts.accel_packet_overwrites.to_le_bytes());
    out[4..8].copy_from_slice(&counts.mag_packet_overwrites.to_le_bytes());
    out[8..12].copy_from_slice(&counts.accel_hw_overwrites.to_le_bytes());
    out[12..16].copy_from_slice(&counts.mag_hw_overwrites.to_le_bytes());
    Ok(16)
}

/// Report 0x30: firmware major/minor version, one byte each.
pub fn pensel_get_version<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    _payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    let (major, minor) = device.version();
    out[0] = major;
    out[1] = minor;
    Ok(2)
}

/// Report 0x31: current system tick count in milliseconds, little-endian `u32`.
pub fn pensel_get_timestamp<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    _payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    out[..4].copy_from_slice(&device.now_ms().to_le_bytes());
    Ok(4)
}

/// Report 0x32: number of UART bytes dropped due to a full receive buffer.
pub fn pensel_get_coms_errors<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    _payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    out[0] = device.dropped_packets();
    Ok(1)
}

/// Report 0x33: switch state, main button state, aux button state — one byte
/// each.
pub fn pensel_get_button_switch<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    _payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    let state = device.button_switch_state();
    out[0] = state.switch;
    out[1] = state.main_button;
    out[2] = state.aux_button;
    Ok(3)
}

/// Report 0x34 [SUPPLEMENT]: count of critical errors latched since boot
/// (`gCriticalErrors` in the original firmware). The distilled spec dropped
/// this report entirely even though the original exposes it; kept here
/// because nothing else in the wire protocol surfaces that counter.
pub fn pensel_get_critical_errors<D: Device>(
    _stats: &EngineStats,
    device: &mut D,
    _payload: &[u8],
    out: &mut [u8; READ_BUF_SIZE],
) -> Result<usize, ReportError> {
    out[0] = device.critical_errors();
    Ok(1)
}
