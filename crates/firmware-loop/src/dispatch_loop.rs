//! Main dispatch loop: report engine pump, sensor drain, filtering, and
//! conditional stream report emission. Ported from `pensel_v1.c`'s
//! `while (true)` body.

use orientation_filter::{CartesianVector, FilterBank};
use report_protocol::{frame::stream_id, DroppedBytes, ReportEngine, ReportError, ReportTable, SerialIo};
use sensor_source::{AccelPacket, MagPacket, ReadMode, SensorSource};

use crate::device::{ButtonSwitch, PenselDevice};
use crate::toggles::StreamingToggles;

/// Number of loop iterations between cosmetic workload-indicator LED
/// toggles, matching the original's `subcount == 100000` comparison.
const WORKLOAD_LED_PERIOD: u32 = 100_000;

/// Owns the report engine, device, filter bank, and stream toggles, and
/// drives one iteration of the main loop per [`DispatchLoop::step`] call.
pub struct DispatchLoop<S: SensorSource, B: ButtonSwitch> {
    engine: ReportEngine,
    table: ReportTable<PenselDevice<S, B>>,
    device: PenselDevice<S, B>,
    filters: FilterBank,
    pub toggles: StreamingToggles,
    workload_count: u32,
}

impl<S: SensorSource, B: ButtonSwitch> DispatchLoop<S, B> {
    pub fn new(device: PenselDevice<S, B>) -> Self {
        DispatchLoop {
            engine: ReportEngine::new(),
            table: report_protocol::standard_report_table(),
            device,
            filters: FilterBank::new(),
            toggles: StreamingToggles::default(),
            workload_count: 0,
        }
    }

    pub fn device(&self) -> &PenselDevice<S, B> {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut PenselDevice<S, B> {
        &mut self.device
    }

    pub fn filters(&self) -> &FilterBank {
        &self.filters
    }

    /// Run one pass of the main loop body: pump the report engine one byte,
    /// service the sensor source, and drain at most one accel and one mag
    /// packet, emitting stream reports as configured.
    ///
    /// `workload_led_toggle` is called every [`WORKLOAD_LED_PERIOD`]
    /// iterations, a cosmetic "loop is alive" indicator distinct from the
    /// tick service's 1-second heartbeat.
    pub fn step<IO: SerialIo + DroppedBytes>(
        &mut self,
        io: &mut IO,
        now_ms: u32,
        mut workload_led_toggle: impl FnMut(),
    ) -> Result<(), ReportError> {
        self.device.set_now_ms(now_ms);
        self.engine.pump(io, now_ms, &self.table, &mut self.device)?;
        self.device.sync_dropped_packets(io.dropped_packets());

        self.device.sensor.service();

        if self.workload_count >= WORKLOAD_LED_PERIOD {
            self.workload_count = 0;
            tracing::trace!("workload indicator toggled");
            workload_led_toggle();
        } else {
            self.workload_count += 1;
        }

        if self.device.sensor.mag_data_available() {
            let raw = self.device.sensor.mag_get_packet(ReadMode::Consume);
            if self.toggles.raw_mag {
                emit_stream_packet(io, stream_id::RMAG, &raw);
            }

            let filtered_vector = self.filters.ingest_mag_vector(raw);
            if self.toggles.filtered_mag {
                let filtered = filtered_packet_mag(raw, filtered_vector);
                emit_stream_packet(io, stream_id::FMAG, &filtered);
            }
        }

        if self.device.sensor.accel_data_available() {
            let raw = self.device.sensor.accel_get_packet(ReadMode::Consume);
            if self.toggles.raw_accel {
                emit_stream_packet(io, stream_id::RACCEL, &raw);
            }

            let filtered_vector = self.filters.ingest_accel_vector(raw);
            if self.toggles.filtered_accel {
                let filtered = filtered_packet(raw, filtered_vector);
                emit_stream_packet(io, stream_id::FACCEL, &filtered);
            }
        }

        Ok(())
    }
}

trait IntoVector {
    fn into_vector(self) -> CartesianVector;
}

impl IntoVector for AccelPacket {
    fn into_vector(self) -> CartesianVector {
        CartesianVector::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl IntoVector for MagPacket {
    fn into_vector(self) -> CartesianVector {
        CartesianVector::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

trait FilterBankExt {
    fn ingest_accel_vector(&mut self, packet: AccelPacket) -> CartesianVector;
    fn ingest_mag_vector(&mut self, packet: MagPacket) -> CartesianVector;
}

impl FilterBankExt for FilterBank {
    fn ingest_accel_vector(&mut self, packet: AccelPacket) -> CartesianVector {
        self.ingest_accel(packet.into_vector());
        self.gravity()
    }

    fn ingest_mag_vector(&mut self, packet: MagPacket) -> CartesianVector {
        self.ingest_mag(packet.into_vector());
        self.north()
    }
}

fn filtered_packet(raw: AccelPacket, vector: CartesianVector) -> AccelPacket {
    let (x, y, z) = vector.to_i16_frame();
    AccelPacket { x, y, z, frame_index: raw.frame_index, odr: raw.odr }
}

fn filtered_packet_mag(raw: MagPacket, vector: CartesianVector) -> MagPacket {
    let (x, y, z) = vector.to_i16_frame();
    MagPacket { x, y, z, frame_index: raw.frame_index, odr: raw.odr }
}

/// Emits a stream report. Bytes the transport can't accept are dropped and
/// counted by `io`, not propagated — a stale stream sample is never worth
/// stalling the dispatch loop over.
fn emit_stream_packet<IO: SerialIo, P: report_protocol::WirePacket>(io: &mut IO, id: u8, packet: &P) {
    let mut buf = [0u8; 32];
    packet.write_into(&mut buf[..P::WIRE_LEN]);
    io.put_byte(id);
    io.put_byte(P::WIRE_LEN as u8);
    for &b in &buf[..P::WIRE_LEN] {
        io.put_byte(b);
    }
}
