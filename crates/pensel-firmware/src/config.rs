//! Boot-time configuration.
//!
//! The original firmware's equivalent is a handful of `#define`s in
//! `pensel_v1.c` (watchdog enable, sensor ODR) that only change between
//! hardware revisions and therefore required a reflash to edit. On the host
//! build those knobs become a TOML file plus `PENSEL_`-prefixed environment
//! overrides, loaded once at startup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamDefaults {
    pub raw_accel: bool,
    pub filtered_accel: bool,
    pub raw_mag: bool,
    pub filtered_mag: bool,
}

impl Default for StreamDefaults {
    fn default() -> Self {
        StreamDefaults { raw_accel: false, filtered_accel: false, raw_mag: false, filtered_mag: false }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FirmwareConfig {
    /// Output data rate reported alongside sensor packets, matching the
    /// original's `LSM303DLHC_init` ODR argument. Zero is a bring-up failure.
    pub sensor_odr: u8,
    /// Whether the tick service pets a watchdog. Disabled by default on the
    /// host build, where there is no watchdog to pet.
    pub watchdog_enabled: bool,
    pub streams: StreamDefaults,
    pub verbose_logging: bool,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        FirmwareConfig {
            sensor_odr: 5,
            watchdog_enabled: false,
            streams: StreamDefaults::default(),
            verbose_logging: false,
        }
    }
}

impl FirmwareConfig {
    /// Load from `pensel.toml` in the working directory if present, then
    /// apply any `PENSEL_*` environment overrides, falling back to defaults
    /// for anything neither source sets.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("pensel").required(false))
            .add_source(Environment::with_prefix("PENSEL").separator("_"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_every_stream_disabled() {
        let cfg = FirmwareConfig::default();
        assert!(!cfg.streams.raw_accel);
        assert!(!cfg.streams.filtered_accel);
        assert!(!cfg.streams.raw_mag);
        assert!(!cfg.streams.filtered_mag);
        assert!(!cfg.watchdog_enabled);
        assert_eq!(cfg.sensor_odr, 5);
    }
}
