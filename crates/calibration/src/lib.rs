//! Calibration blob persistence.
//!
//! The protocol core never interprets calibration data — only `load_from_flash`,
//! `check_validity`, and `load_defaults` are load-bearing outside this crate.
//! The blob's actual field layout (sensor offsets, scale factors) is this
//! crate's business alone.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Opaque calibration data. `valid` mirrors the on-flash validity marker: a
/// blob that fails its checksum or was never written loads with `valid =
/// false` rather than failing outright, so callers can fall back to
/// [`CalibrationStore::load_defaults`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBlob {
    pub accel_offset: [f32; 3],
    pub accel_scale: [f32; 3],
    pub mag_offset: [f32; 3],
    pub mag_scale: [f32; 3],
}

impl Default for CalibrationBlob {
    fn default() -> Self {
        CalibrationBlob {
            accel_offset: [0.0; 3],
            accel_scale: [1.0; 3],
            mag_offset: [0.0; 3],
            mag_scale: [1.0; 3],
        }
    }
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration blob failed validity check: {0}")]
    Invalid(String),
    #[error("failed to decode calibration blob: {0}")]
    Decode(#[from] postcard::Error),
}

/// Load/validate/defaults contract the firmware loop relies on.
pub trait CalibrationStore {
    fn load_from_flash(&mut self) -> Result<(), CalibrationError>;
    fn check_validity(&self) -> Result<(), CalibrationError>;
    fn load_defaults(&mut self);
    fn blob(&self) -> CalibrationBlob;
}

/// In-memory reference implementation: starts with defaults, "flash" is
/// just a byte vector passed in at construction. On-target code swaps this
/// for a real flash-backed store without the firmware loop knowing the
/// difference.
pub struct InMemoryCalibrationStore {
    blob: CalibrationBlob,
    valid: bool,
    raw_flash_image: Option<Vec<u8>>,
}

impl InMemoryCalibrationStore {
    pub fn new() -> Self {
        info!("initializing in-memory calibration store with defaults");
        InMemoryCalibrationStore { blob: CalibrationBlob::default(), valid: false, raw_flash_image: None }
    }

    /// Seed the store with a serialized blob, as if it had just been read
    /// off flash. Used by tests and by firmware start-up before the first
    /// `load_from_flash` call.
    pub fn with_flash_image(image: Vec<u8>) -> Self {
        let mut store = Self::new();
        store.raw_flash_image = Some(image);
        store
    }
}

impl Default for InMemoryCalibrationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationStore for InMemoryCalibrationStore {
    fn load_from_flash(&mut self) -> Result<(), CalibrationError> {
        match self.raw_flash_image.take() {
            Some(bytes) => {
                let blob: CalibrationBlob = postcard::from_bytes(&bytes)?;
                self.blob = blob;
                self.valid = true;
                Ok(())
            }
            None => {
                warn!("no calibration flash image present, falling back to defaults");
                self.load_defaults();
                Err(CalibrationError::Invalid("no flash image written".into()))
            }
        }
    }

    fn check_validity(&self) -> Result<(), CalibrationError> {
        if self.valid {
            Ok(())
        } else {
            Err(CalibrationError::Invalid("calibration blob not loaded".into()))
        }
    }

    fn load_defaults(&mut self) {
        self.blob = CalibrationBlob::default();
        self.valid = false;
    }

    fn blob(&self) -> CalibrationBlob {
        self.blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_is_invalid_until_loaded() {
        let store = InMemoryCalibrationStore::new();
        assert!(store.check_validity().is_err());
        assert_eq!(store.blob(), CalibrationBlob::default());
    }

    #[test]
    fn loading_with_no_flash_image_falls_back_to_defaults() {
        let mut store = InMemoryCalibrationStore::new();
        assert!(store.load_from_flash().is_err());
        assert!(store.check_validity().is_err());
        assert_eq!(store.blob(), CalibrationBlob::default());
    }

    #[test]
    fn loading_a_valid_image_round_trips_the_blob() {
        let blob = CalibrationBlob {
            accel_offset: [1.0, 2.0, 3.0],
            accel_scale: [1.1, 1.2, 1.3],
            mag_offset: [0.1, 0.2, 0.3],
            mag_scale: [0.9, 0.95, 1.0],
        };
        let bytes = postcard::to_allocvec(&blob).unwrap();
        let mut store = InMemoryCalibrationStore::with_flash_image(bytes);

        store.load_from_flash().unwrap();
        assert!(store.check_validity().is_ok());
        assert_eq!(store.blob(), blob);
    }
}
