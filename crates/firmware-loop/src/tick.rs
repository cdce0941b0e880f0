//! Millisecond tick service.
//!
//! Ported from `HAL_IncTick`: a 1 ms hardware timer calls
//! [`TickService::on_tick`] once per millisecond. It increments the
//! monotonic counter the report engine uses for timeouts and
//! `pensel_get_timestamp`, then on the appropriate sub-intervals calls back
//! into periodic debounce handling, a watchdog kick, and a heartbeat toggle.

use std::sync::atomic::{AtomicU32, Ordering};

const DEBOUNCE_PERIOD_MS: u8 = 10;
const WATCHDOG_KICK_OFFSET_MS: u8 = 5;
const HEARTBEAT_PERIOD_MS: u16 = 1000;

/// Millisecond counter plus the sub-counters needed to dispatch periodic
/// work at coarser intervals than 1 ms.
pub struct TickService {
    ms: AtomicU32,
    debounce_sub_count: u8,
    heartbeat_sub_count: u16,
}

impl TickService {
    pub fn new() -> Self {
        TickService { ms: AtomicU32::new(0), debounce_sub_count: 0, heartbeat_sub_count: 0 }
    }

    /// Current tick count, in milliseconds. Wraps silently after ~49 days
    /// of uptime; nothing in this crate attempts to detect or compensate
    /// for that wrap.
    pub fn now_ms(&self) -> u32 {
        self.ms.load(Ordering::Acquire)
    }

    /// Advance the clock by one millisecond and run whichever periodic
    /// callbacks are due this tick.
    pub fn on_tick(
        &mut self,
        watchdog_enabled: bool,
        mut periodic_handler: impl FnMut(u32),
        mut watchdog_kick: impl FnMut(),
        mut heartbeat_toggle: impl FnMut(),
    ) {
        let now = self.ms.fetch_add(1, Ordering::Release).wrapping_add(1);

        if self.debounce_sub_count >= DEBOUNCE_PERIOD_MS - 1 {
            self.debounce_sub_count = 0;
            periodic_handler(now);
        } else {
            self.debounce_sub_count += 1;
        }

        if watchdog_enabled && self.debounce_sub_count == WATCHDOG_KICK_OFFSET_MS {
            watchdog_kick();
        }

        if self.heartbeat_sub_count >= HEARTBEAT_PERIOD_MS - 1 {
            self.heartbeat_sub_count = 0;
            heartbeat_toggle();
        } else {
            self.heartbeat_sub_count += 1;
        }
    }
}

impl Default for TickService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_ms_advances_once_per_tick() {
        let mut tick = TickService::new();
        for _ in 0..5 {
            tick.on_tick(false, |_| {}, || {}, || {});
        }
        assert_eq!(tick.now_ms(), 5);
    }

    #[test]
    fn periodic_handler_fires_every_ten_ticks() {
        let mut tick = TickService::new();
        let mut fires = 0u32;
        for _ in 0..30 {
            tick.on_tick(false, |_| fires += 1, || {}, || {});
        }
        assert_eq!(fires, 3);
    }

    #[test]
    fn heartbeat_fires_once_per_thousand_ticks() {
        let mut tick = TickService::new();
        let mut toggles = 0u32;
        for _ in 0..2500 {
            tick.on_tick(false, |_| {}, || {}, || toggles += 1);
        }
        assert_eq!(toggles, 2);
    }

    #[test]
    fn watchdog_kicks_only_when_enabled() {
        let mut tick = TickService::new();
        let mut kicks = 0u32;
        for _ in 0..100 {
            tick.on_tick(true, |_| {}, || kicks += 1, || {});
        }
        assert_eq!(kicks, 10);
    }
}
