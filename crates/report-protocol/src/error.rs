//! Report protocol error taxonomy

use thiserror::Error;

use crate::frame::RetCode;

/// Errors a report handler or the engine itself can raise. Each variant maps
/// to a wire [`RetCode`] via [`ReportError::retcode`] — the engine never
/// propagates these beyond the response frame it emits.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Peripheral busy / in transit.
    #[error("peripheral busy")]
    Busy,

    /// Argument or buffer length violation.
    #[error("payload length {actual} invalid for report (expected {expected})")]
    Len { expected: u8, actual: u8 },

    /// Output would exceed the 255-byte response payload limit.
    #[error("output length {0} exceeds max response payload")]
    MaxLen(usize),

    /// Transport-level failure (get_byte failed; put_byte never fails, it
    /// drops and counts instead).
    #[error("transport error: {0}")]
    Com(String),

    /// Malformed report payload.
    #[error("invalid arguments for report 0x{0:02X}")]
    InvalidArgs(u8),

    /// Unknown report ID.
    #[error("no such report: 0x{0:02X}")]
    NoReport(u8),

    /// Default/unexpected failure.
    #[error("unexpected failure: {0}")]
    Gen(String),
}

impl ReportError {
    /// Map this error to the wire retcode byte emitted in the response frame.
    pub fn retcode(&self) -> RetCode {
        match self {
            ReportError::Busy => RetCode::Busy,
            ReportError::Len { .. } => RetCode::Len,
            ReportError::MaxLen(_) => RetCode::MaxLen,
            ReportError::Com(_) => RetCode::Com,
            ReportError::InvalidArgs(_) => RetCode::InvalidArgs,
            ReportError::NoReport(_) => RetCode::NoReport,
            ReportError::Gen(_) => RetCode::Gen,
        }
    }
}

/// Transport-level failure from the [`crate::io::SerialIo`] contract.
#[derive(Debug, Error)]
#[error("serial transport error: {0}")]
pub struct ComError(pub String);

impl From<ComError> for ReportError {
    fn from(err: ComError) -> Self {
        ReportError::Com(err.0)
    }
}
