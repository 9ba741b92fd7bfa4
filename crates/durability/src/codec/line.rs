//! Delimiter-framed codec.
//!
//! Each record is the raw payload followed by a single `\n`. There is no
//! header, so payloads must not contain the delimiter.

use super::buffer::FrameBuffer;
use super::traits::{CodecError, Decoder, Encoder};
use seglog_core::LINE_DELIMITER;
use std::io::{self, BufRead, BufReader, Read, Write};

/// Codec identifier for line framing.
pub const LINE_CODEC_ID: &str = "line";

/// Encoder for newline-terminated records.
pub struct LineEncoder {
    out: FrameBuffer,
}

impl LineEncoder {
    /// Create an encoder bound to a discarding stream.
    pub fn new() -> Self {
        LineEncoder {
            out: FrameBuffer::new(),
        }
    }
}

impl Default for LineEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for LineEncoder {
    fn write_header(&mut self, _payload: &[u8]) -> Result<usize, CodecError> {
        Ok(0)
    }

    fn write_body(&mut self, payload: &[u8]) -> Result<usize, CodecError> {
        if let Some(position) = payload.iter().position(|&b| b == LINE_DELIMITER) {
            return Err(CodecError::DelimiterInPayload { position });
        }

        self.out.extend(payload);
        self.out.push(LINE_DELIMITER);
        self.out.flush()?;
        Ok(payload.len() + 1)
    }

    fn reset(&mut self, sink: Box<dyn Write + Send>) {
        self.out.rebind(sink);
    }

    fn codec_id(&self) -> &'static str {
        LINE_CODEC_ID
    }
}

/// Decoder for newline-terminated records.
pub struct LineDecoder {
    reader: BufReader<Box<dyn Read + Send>>,
}

impl LineDecoder {
    /// Create a decoder bound to an empty stream.
    pub fn new() -> Self {
        LineDecoder {
            reader: BufReader::new(Box::new(io::empty())),
        }
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineDecoder {
    fn read_header(&mut self) -> Result<usize, CodecError> {
        // No header bytes; only detect a clean end of stream.
        if self.reader.fill_buf()?.is_empty() {
            return Err(CodecError::EndOfStream);
        }
        Ok(0)
    }

    fn read_body(&mut self) -> Result<(usize, Vec<u8>), CodecError> {
        let mut data = Vec::new();
        let read = self.reader.read_until(LINE_DELIMITER, &mut data)?;

        if data.last() != Some(&LINE_DELIMITER) {
            return Err(CodecError::Unterminated { read });
        }
        data.pop();
        Ok((read, data))
    }

    fn reset(&mut self, source: Box<dyn Read + Send>) {
        let buffered = self.reader.buffer().len();
        self.reader.consume(buffered);
        *self.reader.get_mut() = source;
    }

    fn codec_id(&self) -> &'static str {
        LINE_CODEC_ID
    }
}
