//! Byte-oriented transport contract the report engine pumps bytes through.

use std::collections::VecDeque;

use crate::error::ComError;

/// A single full-duplex byte channel. Implemented by the real UART driver on
/// target and by [`LoopbackSerialIo`] in tests.
pub trait SerialIo {
    /// Write one byte, blocking the caller's notion of "now" not at all —
    /// implementations that can't accept a byte immediately must buffer or
    /// drop it and count the drop (see [`DroppedBytes`]) rather than fail;
    /// a response byte lost on the way out is never the caller's problem.
    fn put_byte(&mut self, byte: u8);

    /// Non-blocking read: `Ok(None)` means no byte is currently available.
    fn get_byte(&mut self) -> Result<Option<u8>, ComError>;
}

/// Exposes a transport's dropped-byte counter, read by the
/// `pensel_get_coms_errors` report.
pub trait DroppedBytes {
    fn dropped_packets(&self) -> u8;
}

/// In-memory loopback transport used by engine tests: bytes written with
/// [`LoopbackSerialIo::feed`] become readable via `get_byte`, and bytes the
/// engine writes with `put_byte` accumulate in [`LoopbackSerialIo::written`].
#[derive(Debug, Default)]
pub struct LoopbackSerialIo {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    dropped: u8,
}

impl LoopbackSerialIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for subsequent `get_byte` calls to return, as if received
    /// from the host.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// Bytes the engine has written via `put_byte`, in order.
    pub fn written(&self) -> &[u8] {
        &self.outbound
    }

    pub fn clear_written(&mut self) {
        self.outbound.clear();
    }
}

impl SerialIo for LoopbackSerialIo {
    fn put_byte(&mut self, byte: u8) {
        self.outbound.push(byte);
    }

    fn get_byte(&mut self) -> Result<Option<u8>, ComError> {
        Ok(self.inbound.pop_front())
    }
}

impl DroppedBytes for LoopbackSerialIo {
    fn dropped_packets(&self) -> u8 {
        self.dropped
    }
}
