//! Wire-format sample packets.
//!
//! 11 bytes each: three signed 16-bit axis readings, a 32-bit frame index
//! (the sample count since boot, used by consumers to detect dropped
//! frames), and the output data rate the sample was captured at.

use report_protocol::WirePacket;

macro_rules! sample_packet {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name {
            pub x: i16,
            pub y: i16,
            pub z: i16,
            pub frame_index: u32,
            pub odr: u8,
        }

        impl $name {
            pub const WIRE_LEN: usize = 11;
        }

        impl WirePacket for $name {
            const WIRE_LEN: usize = $name::WIRE_LEN;

            fn write_into(&self, out: &mut [u8]) {
                out[0..2].copy_from_slice(&self.x.to_le_bytes());
                out[2..4].copy_from_slice(&self.y.to_le_bytes());
                out[4..6].copy_from_slice(&self.z.to_le_bytes());
                out[6..10].copy_from_slice(&self.frame_index.to_le_bytes());
                out[10] = self.odr;
            }
        }
    };
}

sample_packet!(AccelPacket, "One accelerometer sample.");
sample_packet!(MagPacket, "One magnetometer sample.");
