//! Fatal-halt loop for unrecoverable bring-up failures.
//!
//! Ported from `pensel_v1.c`'s `fatal_error_handler`: a debug build keeps
//! reporting where it died and pets the watchdog so the board stays up long
//! enough to be noticed on a debug probe; a release build just stops feeding
//! the watchdog and lets the hardware reset itself.

use std::time::Duration;

/// Where and why bring-up failed. `code` mirrors the original's `int8_t
/// err_code` — the retcode of whichever init step failed.
#[derive(Debug, Clone, Copy)]
pub struct FatalError {
    pub file: &'static str,
    pub line: u32,
    pub code: i8,
}

/// Enter the fatal-halt loop. Never returns.
///
/// `watchdog_kick` is called periodically in debug builds only, matching the
/// original's `#if defined(DEBUG) && defined(WATCHDOG_ENABLE)` guard; a
/// release build intentionally starves the watchdog.
pub fn halt(err: FatalError, mut watchdog_kick: impl FnMut()) -> ! {
    if cfg!(debug_assertions) {
        loop {
            tracing::error!(file = err.file, line = err.line, code = err.code, "fatal error, halting");
            for _ in 0..25 {
                std::thread::sleep(Duration::from_millis(100));
                watchdog_kick();
            }
        }
    } else {
        loop {
            std::thread::sleep(Duration::from_secs(3600));
        }
    }
}
