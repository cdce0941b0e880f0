//! Host stand-in for the 250kbaud UART the real report protocol rides on.
//!
//! There is no UART driver in this workspace (`[AMBIENT]`/Non-goals exclude
//! hardware drivers) — on the host, the wire-format bytes travel over stdin
//! and stdout instead, read by a background thread so `get_byte` stays
//! non-blocking the way the real engine expects.

use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use report_protocol::{ComError, DroppedBytes, SerialIo};

pub struct StdioSerial {
    inbound: Receiver<u8>,
    dropped: u8,
}

impl StdioSerial {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut stdin = std::io::stdin();
            let mut byte = [0u8; 1];
            while stdin.read_exact(&mut byte).is_ok() {
                if tx.send(byte[0]).is_err() {
                    break;
                }
            }
        });
        StdioSerial { inbound: rx, dropped: 0 }
    }
}

impl SerialIo for StdioSerial {
    fn put_byte(&mut self, byte: u8) {
        let mut stdout = std::io::stdout();
        let wrote = stdout.write_all(&[byte]).and_then(|_| stdout.flush());
        if wrote.is_err() {
            self.dropped = self.dropped.saturating_add(1);
        }
    }

    fn get_byte(&mut self) -> Result<Option<u8>, ComError> {
        match self.inbound.try_recv() {
            Ok(byte) => Ok(Some(byte)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.dropped = self.dropped.saturating_add(1);
                Err(ComError("stdin reader thread disconnected".into()))
            }
        }
    }
}

impl DroppedBytes for StdioSerial {
    fn dropped_packets(&self) -> u8 {
        self.dropped
    }
}
