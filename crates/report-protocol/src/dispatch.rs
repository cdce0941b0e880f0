//! Sparse report dispatch table.
//!
//! The original firmware indexes a 256-entry array of function pointers by
//! report ID directly; spec calls that out as an implementation convenience
//! of the specific target, not a contract to replicate. A `HashMap` keyed by
//! ID gives the same "unknown ID -> NoReport" behavior without paying for
//! 256 slots, almost all of which point at the same "unsupported" stub.

use std::collections::HashMap;

use crate::device::Device;
use crate::error::ReportError;
use crate::frame::READ_BUF_SIZE;

/// Engine-internal counters a handful of reports (`get_timeout_count`,
/// `get_invalid_chars_count`) need to read without the `Device` trait having
/// to know anything about the engine that's calling it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStats {
    pub timeouts: u16,
    pub invalid_chars: u16,
}

/// A report handler: given the current engine stats, the device, and the
/// request payload, write a response into `out` and return the number of
/// bytes written.
///
/// Function pointers (not `Box<dyn Fn>`) mirror the original's literal
/// function-pointer table while staying zero-cost — each registered handler
/// is monomorphized for the concrete `Device` impl it's registered against.
pub type ReportHandlerFn<D> =
    fn(&EngineStats, &mut D, &[u8], &mut [u8; READ_BUF_SIZE]) -> Result<usize, ReportError>;

/// Sparse report ID -> handler map.
pub struct ReportTable<D: Device> {
    handlers: HashMap<u8, ReportHandlerFn<D>>,
}

impl<D: Device> ReportTable<D> {
    pub fn new() -> Self {
        ReportTable { handlers: HashMap::new() }
    }

    /// Register `f` to answer report `id`. Returns `self` so registrations
    /// can be chained.
    pub fn register(&mut self, id: u8, f: ReportHandlerFn<D>) -> &mut Self {
        self.handlers.insert(id, f);
        self
    }

    pub fn dispatch(
        &self,
        id: u8,
        stats: &EngineStats,
        device: &mut D,
        payload: &[u8],
        out: &mut [u8; READ_BUF_SIZE],
    ) -> Result<usize, ReportError> {
        match self.handlers.get(&id) {
            Some(handler) => handler(stats, device, payload, out),
            None => Err(ReportError::NoReport(id)),
        }
    }
}

impl<D: Device> Default for ReportTable<D> {
    fn default() -> Self {
        Self::new()
    }
}
