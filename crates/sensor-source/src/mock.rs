//! Deterministic [`SensorSource`] used by host-side tests and by
//! `pensel-firmware` when built without real sensor hardware attached.
//!
//! Samples are generated by hashing a frame counter to get reproducible,
//! pseudo-random-looking values without pulling in a real RNG crate for a
//! test double.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::packet::{AccelPacket, MagPacket};
use crate::{ReadMode, SensorSource};

pub struct MockSensorSource {
    odr: u8,
    accel_frame: u32,
    mag_frame: u32,
    accel_overwrites: u32,
    mag_overwrites: u32,
}

impl MockSensorSource {
    pub fn new(odr: u8) -> Self {
        MockSensorSource { odr, accel_frame: 0, mag_frame: 0, accel_overwrites: 0, mag_overwrites: 0 }
    }

    fn hash_axis(seed: u32, axis: u8) -> i16 {
        let mut hasher = DefaultHasher::new();
        seed.hash(&mut hasher);
        axis.hash(&mut hasher);
        let h = hasher.finish();
        (h % 4096) as i16 - 2048
    }
}

impl Default for MockSensorSource {
    fn default() -> Self {
        Self::new(5)
    }
}

impl SensorSource for MockSensorSource {
    fn accel_data_available(&self) -> bool {
        true
    }

    fn mag_data_available(&self) -> bool {
        true
    }

    fn accel_get_packet(&mut self, mode: ReadMode) -> AccelPacket {
        let pkt = AccelPacket {
            x: Self::hash_axis(self.accel_frame, 0),
            y: Self::hash_axis(self.accel_frame, 1),
            z: Self::hash_axis(self.accel_frame, 2),
            frame_index: self.accel_frame,
            odr: self.odr,
        };
        if mode == ReadMode::Consume {
            self.accel_frame = self.accel_frame.wrapping_add(1);
        }
        pkt
    }

    fn mag_get_packet(&mut self, mode: ReadMode) -> MagPacket {
        let pkt = MagPacket {
            x: Self::hash_axis(self.mag_frame, 10),
            y: Self::hash_axis(self.mag_frame, 11),
            z: Self::hash_axis(self.mag_frame, 12),
            frame_index: self.mag_frame,
            odr: self.odr,
        };
        if mode == ReadMode::Consume {
            self.mag_frame = self.mag_frame.wrapping_add(1);
        }
        pkt
    }

    fn accel_packet_overwrite_count(&self) -> u32 {
        self.accel_overwrites
    }

    fn mag_packet_overwrite_count(&self) -> u32 {
        self.mag_overwrites
    }

    fn accel_hw_overwrite_count(&self) -> u32 {
        0
    }

    fn mag_hw_overwrite_count(&self) -> u32 {
        0
    }

    fn temperature(&self) -> i16 {
        20 + Self::hash_axis(self.accel_frame, 99) % 5
    }

    fn reconfigure(
        &mut self,
        cfg: report_protocol::LsmConfigRequest,
    ) -> Result<(), report_protocol::ReportError> {
        self.odr = cfg.accel_odr;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consuming_reads_advance_frame_index_deterministically() {
        let mut src = MockSensorSource::new(5);
        let a = src.accel_get_packet(ReadMode::Consume);
        let b = src.accel_get_packet(ReadMode::Consume);
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
        assert_ne!(a.x, b.x);
    }

    #[test]
    fn peeking_does_not_advance_frame_index() {
        let mut src = MockSensorSource::new(5);
        let a = src.accel_get_packet(ReadMode::Peek);
        let b = src.accel_get_packet(ReadMode::Peek);
        assert_eq!(a, b);
    }
}
