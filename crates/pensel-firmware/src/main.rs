//! `pensel-firmware` — host build of the Pensel engine.
//!
//! Ported from `pensel_v1.c`'s `main()`: bring up calibration and the
//! sensor source, then spin the dispatch loop forever, advancing the tick
//! service once per iteration the way the target's 1ms hardware timer would
//! in firmware.

mod config;
mod fatal;
mod logging;
mod serial;

use calibration::{CalibrationStore, InMemoryCalibrationStore};
use firmware_loop::{DispatchLoop, FixedButtonSwitch, PenselDevice, TickService};
use sensor_source::MockSensorSource;
use tracing::{info, warn};

use crate::config::FirmwareConfig;
use crate::fatal::FatalError;
use crate::serial::StdioSerial;

fn main() {
    let cfg = FirmwareConfig::load().unwrap_or_else(|err| {
        // Config loading happens before logging is up; print and fall back
        // to defaults rather than dying over a malformed TOML file.
        eprintln!("pensel-firmware: config load failed ({err}), using defaults");
        FirmwareConfig::default()
    });

    logging::init(cfg.verbose_logging);
    info!(version = ?firmware_loop::FIRMWARE_VERSION, "pensel-firmware starting");

    // Mirrors the original's check_retval_fatal() around LSM303DLHC_init():
    // a sensor that can't be brought up at a valid ODR is a bring-up failure,
    // not something to limp forward from.
    if cfg.sensor_odr == 0 {
        fatal::halt(FatalError { file: file!(), line: line!(), code: -1 }, || {});
    }

    let mut calibration = InMemoryCalibrationStore::new();
    let _ = calibration.load_from_flash();
    if calibration.check_validity().is_err() {
        warn!("no valid calibration in flash, loaded defaults");
        calibration.load_defaults();
    }

    let sensor = MockSensorSource::new(cfg.sensor_odr);
    let device = PenselDevice::new(sensor, FixedButtonSwitch::default());
    let mut dispatch = DispatchLoop::new(device);
    dispatch.toggles.raw_accel = cfg.streams.raw_accel;
    dispatch.toggles.filtered_accel = cfg.streams.filtered_accel;
    dispatch.toggles.raw_mag = cfg.streams.raw_mag;
    dispatch.toggles.filtered_mag = cfg.streams.filtered_mag;

    let mut io = StdioSerial::new();
    let mut tick = TickService::new();
    let watchdog_enabled = cfg.watchdog_enabled;

    info!("entering main loop");
    loop {
        let now_ms = tick.now_ms();
        if let Err(err) = dispatch.step(&mut io, now_ms, || {}) {
            warn!(%err, "report handler returned an error, continuing");
        }

        tick.on_tick(
            watchdog_enabled,
            |_now| {},
            || {},
            || info!("heartbeat"),
        );

        std::thread::sleep(std::time::Duration::from_millis(1));
    }
}
