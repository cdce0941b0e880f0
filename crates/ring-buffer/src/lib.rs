//! Byte-granularity SPSC ring buffer
//!
//! Carries fixed-size records (sensor packets, in the firmware's case) from
//! a producer role to a consumer role with well-defined overwrite semantics.
//! Head/tail indices advance one byte at a time even though callers push and
//! pop whole records, so overwrite accounting stays byte-granular regardless
//! of record size (see [`Queue::overwrite_count`]).

mod queue;

pub use queue::{CapacityError, PopMode, Queue};
