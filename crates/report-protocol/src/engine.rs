//! Request parser / dispatcher state machine.
//!
//! Ported state-for-state from the original firmware's `rpt_run()`: one call
//! to [`ReportEngine::pump`] attempts exactly one non-blocking byte read and
//! advances at most one state transition, so it can be driven once per
//! foreground-loop iteration without blocking on I/O.

use crate::device::Device;
use crate::dispatch::{EngineStats, ReportTable};
use crate::error::ReportError;
use crate::frame::{RetCode, MAGIC0, MAGIC1, READ_BUF_SIZE, RPT_TIMEOUT_MS};
use crate::io::SerialIo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ReadMagic0,
    ReadMagic1,
    ReadId,
    ReadLen,
    ReadPayload,
    Execute,
}

/// Drives the wire protocol's receive/dispatch/respond cycle. Holds no
/// reference to the transport or device it's pumped against — both are
/// passed in on each call, so the engine itself is `Send` and trivially
/// testable against a [`crate::io::LoopbackSerialIo`].
pub struct ReportEngine {
    phase: Phase,
    start_time_ms: u32,
    invalid_chars: u16,
    timeouts: u16,
    read_buf: [u8; READ_BUF_SIZE],
    rpt_id: u8,
    in_len: u8,
    payload_index: usize,
}

impl ReportEngine {
    pub fn new() -> Self {
        ReportEngine {
            phase: Phase::ReadMagic0,
            start_time_ms: 0,
            invalid_chars: 0,
            timeouts: 0,
            read_buf: [0u8; READ_BUF_SIZE],
            rpt_id: 0,
            in_len: 0,
            payload_index: 0,
        }
    }

    pub fn invalid_chars(&self) -> u16 {
        self.invalid_chars
    }

    pub fn timeouts(&self) -> u16 {
        self.timeouts
    }

    fn stats(&self) -> EngineStats {
        EngineStats { timeouts: self.timeouts, invalid_chars: self.invalid_chars }
    }

    /// `now_ms.wrapping_sub(start_time_ms)` tolerates the millisecond tick
    /// counter wrapping around mid-transaction; the original firmware
    /// compares `HAL_GetTick() > start_time + RPT_TIMEOUT` directly and
    /// never wraps across a 32-bit wraparound in practice (it would take
    /// ~49 days of uptime), but there's no reason to carry that landmine.
    fn timed_out(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.start_time_ms) > RPT_TIMEOUT_MS
    }

    fn check_timeout(&mut self, now_ms: u32) {
        if self.timed_out(now_ms) {
            self.timeouts = self.timeouts.saturating_add(1);
            tracing::warn!(total = self.timeouts, "report transaction timed out, resetting parser");
            self.phase = Phase::ReadMagic0;
        }
    }

    /// Attempt one non-blocking read-and-advance cycle. Should be called
    /// once per foreground-loop tick.
    pub fn pump<IO: SerialIo, D: Device>(
        &mut self,
        io: &mut IO,
        now_ms: u32,
        table: &ReportTable<D>,
        device: &mut D,
    ) -> Result<(), ReportError> {
        match self.phase {
            Phase::ReadMagic0 => {
                if let Some(b) = io.get_byte()? {
                    if b == MAGIC0 {
                        self.start_time_ms = now_ms;
                        self.phase = Phase::ReadMagic1;
                    } else {
                        self.invalid_chars = self.invalid_chars.saturating_add(1);
                    }
                }
            }
            Phase::ReadMagic1 => {
                if let Some(b) = io.get_byte()? {
                    if b == MAGIC1 {
                        self.phase = Phase::ReadId;
                    } else {
                        self.invalid_chars = self.invalid_chars.saturating_add(1);
                    }
                }
                self.check_timeout(now_ms);
            }
            Phase::ReadId => {
                if let Some(b) = io.get_byte()? {
                    self.rpt_id = b;
                    self.phase = Phase::ReadLen;
                }
                self.check_timeout(now_ms);
            }
            Phase::ReadLen => {
                if let Some(b) = io.get_byte()? {
                    self.in_len = b;
                    self.payload_index = 0;
                    self.phase =
                        if self.in_len != 0 { Phase::ReadPayload } else { Phase::Execute };
                }
                self.check_timeout(now_ms);
            }
            Phase::ReadPayload => {
                if let Some(b) = io.get_byte()? {
                    self.read_buf[self.payload_index] = b;
                    self.payload_index += 1;
                    if self.payload_index == self.in_len as usize {
                        self.phase = Phase::Execute;
                        self.payload_index = 0;
                        // Matches the original: a completed payload skips
                        // this cycle's timeout check and moves straight on.
                        return Ok(());
                    }
                }
                self.check_timeout(now_ms);
            }
            Phase::Execute => {
                // Unconditional: a dropped response byte must not leave the
                // parser stuck waiting for a transaction that already ran.
                self.execute_and_respond(io, table, device);
                self.phase = Phase::ReadMagic0;
            }
        }
        Ok(())
    }

    /// Dispatches the buffered request and writes its response. Response
    /// bytes that the transport can't accept are dropped and counted by
    /// `io`, never propagated — the caller already ran the handler and
    /// committed to a reply; losing a byte on the way out doesn't undo that.
    fn execute_and_respond<IO: SerialIo, D: Device>(
        &mut self,
        io: &mut IO,
        table: &ReportTable<D>,
        device: &mut D,
    ) {
        let stats = self.stats();
        let payload = &self.read_buf[..self.in_len as usize];
        let mut out = [0u8; READ_BUF_SIZE];

        match table.dispatch(self.rpt_id, &stats, device, payload, &mut out) {
            Ok(out_len) => {
                io.put_byte(RetCode::Ok.as_u8());
                io.put_byte(out_len as u8);
                for &b in &out[..out_len] {
                    io.put_byte(b);
                }
            }
            Err(err) => {
                tracing::debug!(report_id = self.rpt_id, %err, "report handler returned an error");
                io.put_byte(err.retcode().as_u8());
                io.put_byte(0);
            }
        }
    }
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}
