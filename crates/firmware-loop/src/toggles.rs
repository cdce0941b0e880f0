//! Stream-enable toggles and the critical-error latch.
//!
//! Mirrors the original firmware's four `gEnable*Stream` globals and its
//! `critical_errors_t gCriticalErrors` — both single-threaded main-loop
//! state, no synchronization needed beyond what `&mut` already gives us.

/// Which of the four stream reports are currently enabled. All start
/// disabled, matching the firmware's boot-time defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamingToggles {
    pub raw_accel: bool,
    pub filtered_accel: bool,
    pub raw_mag: bool,
    pub filtered_mag: bool,
}

/// Latched critical errors, surfaced by the `pensel_get_critical_errors`
/// report and cleared at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CriticalErrors {
    /// Set when the device woke from an unexpected watchdog reset.
    pub watchdog_reset: bool,
}

impl CriticalErrors {
    pub fn clear(&mut self) {
        *self = CriticalErrors::default();
    }

    pub fn as_u8(self) -> u8 {
        self.watchdog_reset as u8
    }
}
