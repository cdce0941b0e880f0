//! Tick service and main dispatch loop tying the report protocol, sensor
//! source, and orientation filter bank together into one firmware loop.

pub mod device;
pub mod dispatch_loop;
pub mod tick;
pub mod toggles;

pub use device::{ButtonSwitch, FixedButtonSwitch, PenselDevice, FIRMWARE_VERSION};
pub use dispatch_loop::DispatchLoop;
pub use tick::TickService;
pub use toggles::{CriticalErrors, StreamingToggles};

#[cfg(test)]
mod tests {
    use super::*;
    use report_protocol::{frame::report_id, LoopbackSerialIo, RetCode, MAGIC0, MAGIC1};
    use sensor_source::{AccelPacket, MockSensorSource};

    fn request(id: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![MAGIC0, MAGIC1, id, payload.len() as u8];
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn version_report_flows_through_the_full_loop() {
        let device = PenselDevice::new(MockSensorSource::default(), FixedButtonSwitch::default());
        let mut loop_ = DispatchLoop::new(device);
        let mut io = LoopbackSerialIo::new();

        io.feed(&request(report_id::PENSEL_GET_VERSION, &[]));
        for t in 0..8 {
            loop_.step(&mut io, t, || {}).unwrap();
        }

        assert_eq!(io.written()[..2], [RetCode::Ok.as_u8(), 2]);
    }

    #[test]
    fn raw_accel_stream_emits_when_toggled_on() {
        let device = PenselDevice::new(MockSensorSource::default(), FixedButtonSwitch::default());
        let mut loop_ = DispatchLoop::new(device);
        loop_.toggles.raw_accel = true;
        let mut io = LoopbackSerialIo::new();

        loop_.step(&mut io, 0, || {}).unwrap();

        assert_eq!(io.written()[0], report_protocol::frame::stream_id::RACCEL);
        assert_eq!(io.written()[1], AccelPacket::WIRE_LEN as u8);
    }

    #[test]
    fn no_stream_emitted_when_toggles_are_off() {
        let device = PenselDevice::new(MockSensorSource::default(), FixedButtonSwitch::default());
        let mut loop_ = DispatchLoop::new(device);
        let mut io = LoopbackSerialIo::new();

        loop_.step(&mut io, 0, || {}).unwrap();

        assert!(io.written().is_empty());
    }
}
