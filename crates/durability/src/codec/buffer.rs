//! Output buffer shared by the encoders.

use std::io::{self, Write};

/// Capacity kept across frames. A larger frame's allocation is released
/// after it is written.
const RETAINED_CAPACITY: usize = 64 * 1024;

/// Accumulates one frame and writes it to the bound stream on flush.
///
/// The allocation survives [`rebind`](Self::rebind), so an encoder reused
/// across segments keeps its buffer.
pub(crate) struct FrameBuffer {
    buf: Vec<u8>,
    sink: Box<dyn Write + Send>,
}

impl FrameBuffer {
    pub(crate) fn new() -> Self {
        FrameBuffer {
            buf: Vec::new(),
            sink: Box::new(io::sink()),
        }
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Write the pending frame and flush the stream.
    ///
    /// The pending bytes are dropped whether or not the write succeeds, so a
    /// failed frame is never replayed in front of the next one.
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        let result = self
            .sink
            .write_all(&self.buf)
            .and_then(|_| self.sink.flush());
        self.buf.clear();
        if self.buf.capacity() > RETAINED_CAPACITY {
            self.buf.shrink_to(RETAINED_CAPACITY);
        }
        result
    }

    pub(crate) fn rebind(&mut self, sink: Box<dyn Write + Send>) {
        self.buf.clear();
        self.sink = sink;
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.buf.len()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}
