//! Real (queue-backed) [`SensorSource`].
//!
//! Mirrors how the firmware wires the LSM303 driver to `reports.c`: an ISR
//! (here, [`QueueSensorSource::push_accel_sample`]/`push_mag_sample`) drops
//! samples onto a lock-free queue as they arrive from the sensor; the
//! foreground loop drains them via [`SensorSource::accel_get_packet`]. A
//! hardware FIFO sits upstream of that queue and has its own, independent
//! overwrite counter (the sensor can drop a sample before the ISR ever sees
//! it) — [`QueueSensorSource::record_accel_hw_overwrite`] models that path.

use std::sync::atomic::{AtomicU32, Ordering};

use ring_buffer::{PopMode, Queue};

use crate::packet::{AccelPacket, MagPacket};
use crate::{ReadMode, SensorSource};

/// Number of packets the backing queues hold before the oldest is
/// overwritten. Matches the firmware's default FIFO depth.
pub const DEFAULT_QUEUE_DEPTH: usize = 32;

pub struct QueueSensorSource {
    accel_queue: Queue<AccelPacket>,
    mag_queue: Queue<MagPacket>,
    accel_hw_overwrites: AtomicU32,
    mag_hw_overwrites: AtomicU32,
    temperature: i16,
}

impl QueueSensorSource {
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_QUEUE_DEPTH)
    }

    pub fn with_depth(depth: usize) -> Self {
        QueueSensorSource {
            accel_queue: Queue::new(depth),
            mag_queue: Queue::new(depth),
            accel_hw_overwrites: AtomicU32::new(0),
            mag_hw_overwrites: AtomicU32::new(0),
            temperature: 20,
        }
    }

    /// Set the die temperature the next `lsm_get_temp` report should read
    /// back. Called by whatever samples the real sensor's temperature
    /// register.
    pub fn set_temperature(&mut self, temperature: i16) {
        self.temperature = temperature;
    }

    /// Called from the accelerometer's data-ready ISR.
    pub fn push_accel_sample(&self, packet: AccelPacket) {
        self.accel_queue.push(&[packet]);
    }

    /// Called from the magnetometer's data-ready ISR.
    pub fn push_mag_sample(&self, packet: MagPacket) {
        self.mag_queue.push(&[packet]);
    }

    /// Called when the sensor's own hardware FIFO overflows before the ISR
    /// drains it — a drop the queue-level overwrite counter never sees.
    pub fn record_accel_hw_overwrite(&self) {
        self.accel_hw_overwrites.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mag_hw_overwrite(&self) {
        self.mag_hw_overwrites.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for QueueSensorSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for QueueSensorSource {
    fn accel_data_available(&self) -> bool {
        self.accel_queue.available() > 0
    }

    fn mag_data_available(&self) -> bool {
        self.mag_queue.available() > 0
    }

    fn accel_get_packet(&mut self, mode: ReadMode) -> AccelPacket {
        let mut out = [AccelPacket::default(); 1];
        let pop_mode = match mode {
            ReadMode::Consume => PopMode::Consume,
            ReadMode::Peek => PopMode::Peek,
        };
        self.accel_queue.pop(&mut out, pop_mode);
        out[0]
    }

    fn mag_get_packet(&mut self, mode: ReadMode) -> MagPacket {
        let mut out = [MagPacket::default(); 1];
        let pop_mode = match mode {
            ReadMode::Consume => PopMode::Consume,
            ReadMode::Peek => PopMode::Peek,
        };
        self.mag_queue.pop(&mut out, pop_mode);
        out[0]
    }

    fn accel_packet_overwrite_count(&self) -> u32 {
        (self.accel_queue.overwrite_count() / AccelPacket::WIRE_LEN as u64) as u32
    }

    fn mag_packet_overwrite_count(&self) -> u32 {
        (self.mag_queue.overwrite_count() / MagPacket::WIRE_LEN as u64) as u32
    }

    fn accel_hw_overwrite_count(&self) -> u32 {
        self.accel_hw_overwrites.load(Ordering::Relaxed)
    }

    fn mag_hw_overwrite_count(&self) -> u32 {
        self.mag_hw_overwrites.load(Ordering::Relaxed)
    }

    fn temperature(&self) -> i16 {
        self.temperature
    }

    fn reconfigure(
        &mut self,
        _cfg: report_protocol::LsmConfigRequest,
    ) -> Result<(), report_protocol::ReportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushed_samples_are_available_and_consumed_in_order() {
        let mut src = QueueSensorSource::with_depth(4);
        assert!(!src.accel_data_available());

        src.push_accel_sample(AccelPacket { x: 1, frame_index: 0, ..Default::default() });
        src.push_accel_sample(AccelPacket { x: 2, frame_index: 1, ..Default::default() });
        assert!(src.accel_data_available());

        let first = src.accel_get_packet(ReadMode::Consume);
        assert_eq!(first.x, 1);
        let second = src.accel_get_packet(ReadMode::Consume);
        assert_eq!(second.x, 2);
        assert!(!src.accel_data_available());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut src = QueueSensorSource::with_depth(4);
        src.push_mag_sample(MagPacket { x: 7, ..Default::default() });

        let peeked = src.mag_get_packet(ReadMode::Peek);
        assert_eq!(peeked.x, 7);
        assert!(src.mag_data_available());

        let consumed = src.mag_get_packet(ReadMode::Consume);
        assert_eq!(consumed.x, 7);
        assert!(!src.mag_data_available());
    }

    #[test]
    fn overflow_increments_packet_overwrite_count_by_records_not_bytes() {
        let mut src = QueueSensorSource::with_depth(2);
        for i in 0..5u32 {
            src.push_accel_sample(AccelPacket { frame_index: i, ..Default::default() });
        }
        // 2-record queue, 5 pushed -> 3 overwritten.
        assert_eq!(src.accel_packet_overwrite_count(), 3);
        assert_eq!(src.accel_hw_overwrite_count(), 0);

        src.record_accel_hw_overwrite();
        assert_eq!(src.accel_hw_overwrite_count(), 1);
    }
}
