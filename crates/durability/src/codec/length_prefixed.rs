//! Length-prefixed codec.
//!
//! # Frame Layout
//!
//! ```text
//! ┌──────────────────────┬───────────────────────┐
//! │ Length (4 bytes, BE) │ Payload (Length bytes)│
//! └──────────────────────┴───────────────────────┘
//! ```
//!
//! Payloads are arbitrary bytes, including empty payloads and payloads that
//! contain `\n`.

use super::buffer::FrameBuffer;
use super::traits::{CodecError, Decoder, Encoder};
use seglog_core::{FRAME_HEADER_LEN, MAX_LENGTH_PREFIXED_PAYLOAD};
use std::io::{self, BufRead, BufReader, ErrorKind, Read, Write};

/// Codec identifier for length-prefixed framing.
pub const LENGTH_PREFIXED_CODEC_ID: &str = "length-prefixed";

/// Initial body allocation cap; larger bodies grow as bytes arrive.
const BODY_PREALLOC_LIMIT: usize = 64 * 1024;

/// Encoder for length-prefixed frames.
pub struct LengthPrefixedEncoder {
    out: FrameBuffer,
}

impl LengthPrefixedEncoder {
    /// Create an encoder bound to a discarding stream.
    pub fn new() -> Self {
        LengthPrefixedEncoder {
            out: FrameBuffer::new(),
        }
    }
}

impl Default for LengthPrefixedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for LengthPrefixedEncoder {
    fn write_header(&mut self, payload: &[u8]) -> Result<usize, CodecError> {
        if payload.len() as u64 > MAX_LENGTH_PREFIXED_PAYLOAD {
            return Err(CodecError::PayloadTooLarge { len: payload.len() });
        }
        self.out.extend(&(payload.len() as u32).to_be_bytes());
        Ok(FRAME_HEADER_LEN)
    }

    fn write_body(&mut self, payload: &[u8]) -> Result<usize, CodecError> {
        self.out.extend(payload);
        self.out.flush()?;
        Ok(payload.len())
    }

    fn reset(&mut self, sink: Box<dyn Write + Send>) {
        self.out.rebind(sink);
    }

    fn codec_id(&self) -> &'static str {
        LENGTH_PREFIXED_CODEC_ID
    }
}

/// Decoder for length-prefixed frames.
pub struct LengthPrefixedDecoder {
    reader: BufReader<Box<dyn Read + Send>>,
    /// Body length announced by the last header
    body_len: u32,
    max_frame_len: Option<u32>,
}

impl LengthPrefixedDecoder {
    /// Create a decoder bound to an empty stream.
    pub fn new() -> Self {
        LengthPrefixedDecoder {
            reader: BufReader::new(Box::new(io::empty())),
            body_len: 0,
            max_frame_len: None,
        }
    }

    /// Reject headers announcing more than `max` body bytes.
    pub fn with_max_frame_len(mut self, max: u32) -> Self {
        self.max_frame_len = Some(max);
        self
    }

    /// Read up to `buf.len()` bytes, stopping early only at end of stream.
    fn read_full(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut read = 0;
        while read < buf.len() {
            match self.reader.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(read)
    }
}

impl Default for LengthPrefixedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LengthPrefixedDecoder {
    fn read_header(&mut self) -> Result<usize, CodecError> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        let read = self.read_full(&mut header)?;

        if read == 0 {
            return Err(CodecError::EndOfStream);
        }
        if read < FRAME_HEADER_LEN {
            return Err(CodecError::TruncatedHeader {
                read,
                expected: FRAME_HEADER_LEN,
            });
        }

        let len = u32::from_be_bytes(header);
        if let Some(max) = self.max_frame_len {
            if len > max {
                return Err(CodecError::FrameTooLarge {
                    len: len as u64,
                    max: max as u64,
                });
            }
        }

        self.body_len = len;
        Ok(FRAME_HEADER_LEN)
    }

    fn read_body(&mut self) -> Result<(usize, Vec<u8>), CodecError> {
        let expected = self.body_len as usize;
        let mut data = Vec::with_capacity(expected.min(BODY_PREALLOC_LIMIT));
        (&mut self.reader)
            .take(expected as u64)
            .read_to_end(&mut data)?;

        if data.len() < expected {
            return Err(CodecError::TruncatedBody {
                read: data.len(),
                expected,
            });
        }
        Ok((expected, data))
    }

    fn reset(&mut self, source: Box<dyn Read + Send>) {
        let buffered = self.reader.buffer().len();
        self.reader.consume(buffered);
        *self.reader.get_mut() = source;
        self.body_len = 0;
    }

    fn codec_id(&self) -> &'static str {
        LENGTH_PREFIXED_CODEC_ID
    }
}
