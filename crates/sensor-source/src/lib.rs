//! LSM303DLHC-shaped accel/mag sample packets and the queue-backed source
//! that serves them to the report protocol and the firmware loop.
//!
//! The real driver's ISR pushes one packet per sample onto a
//! [`ring_buffer::Queue`]; the foreground loop drains it through
//! [`SensorSource::accel_get_packet`]/[`SensorSource::mag_get_packet`]. A
//! second, separate overwrite counter tracks drops inside the sensor's own
//! hardware FIFO, upstream of the queue — the two counters answer different
//! questions (`lsm_get_errors` reports both, see `report-protocol`).

mod mock;
mod packet;
mod queue_source;

pub use mock::MockSensorSource;
pub use packet::{AccelPacket, MagPacket};
pub use queue_source::QueueSensorSource;

/// Whether a packet read should leave the source's queue untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Consume,
    Peek,
}

impl ReadMode {
    pub fn from_flags(flags: report_protocol::PacketFlags) -> ReadMode {
        if flags.peek {
            ReadMode::Peek
        } else {
            ReadMode::Consume
        }
    }
}

/// A source of accelerometer and magnetometer packets, backing the
/// `lsm_get_accel`/`lsm_get_mag`/`lsm_get_errors` reports.
///
/// Callers must check `*_data_available` before calling the matching
/// `*_get_packet` — like the driver it's modeled on, reading an empty queue
/// is a caller bug, not a recoverable error.
pub trait SensorSource {
    fn accel_data_available(&self) -> bool;
    fn mag_data_available(&self) -> bool;

    fn accel_get_packet(&mut self, mode: ReadMode) -> AccelPacket;
    fn mag_get_packet(&mut self, mode: ReadMode) -> MagPacket;

    fn accel_packet_overwrite_count(&self) -> u32;
    fn mag_packet_overwrite_count(&self) -> u32;
    fn accel_hw_overwrite_count(&self) -> u32;
    fn mag_hw_overwrite_count(&self) -> u32;

    /// Current die temperature reading, backing `lsm_get_temp`.
    fn temperature(&self) -> i16;

    /// Reconfigure output data rate and sensitivity for both sub-sensors,
    /// backing `lsm_change_config`. Errors from here are forwarded to the
    /// caller verbatim.
    fn reconfigure(&mut self, cfg: report_protocol::LsmConfigRequest) -> Result<(), report_protocol::ReportError>;

    /// Drain the sensor's own hardware FIFO into the packet queue, bumping
    /// the hardware overwrite counter on overflow. A no-op for sources
    /// (like [`MockSensorSource`]) with no separate hardware FIFO to poll.
    fn service(&mut self) {}
}
