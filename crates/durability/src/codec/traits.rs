//! Frame codec trait definitions.

use std::io::{self, Read, Write};

/// Frame encoder trait.
///
/// Writing a record is split into a header step and a body step so that
/// length-prefixed framing can carry binary payloads (embedded newlines,
/// empty payloads) while line framing stays header-free.
///
/// # Stream Binding
///
/// An encoder is bound to one output stream at a time. [`reset`](Self::reset)
/// drops any buffered bytes and rebinds it; the writer does this on every
/// segment rotation instead of allocating a new encoder.
pub trait Encoder: Send {
    /// Write the frame header for `payload`.
    ///
    /// Returns the number of header bytes produced (0 for line framing).
    fn write_header(&mut self, payload: &[u8]) -> Result<usize, CodecError>;

    /// Write `payload` and any terminator, then flush to the bound stream.
    ///
    /// The flush is a buffer flush, not an fsync.
    fn write_body(&mut self, payload: &[u8]) -> Result<usize, CodecError>;

    /// Discard buffered bytes and bind to a new output stream.
    fn reset(&mut self, sink: Box<dyn Write + Send>);

    /// Unique codec identifier.
    fn codec_id(&self) -> &'static str;
}

/// Frame decoder trait.
///
/// The mirror image of [`Encoder`]: `read_header` then `read_body` yields
/// one payload together with the number of bytes it occupied on disk.
pub trait Decoder: Send {
    /// Read the next frame header.
    ///
    /// Returns [`CodecError::EndOfStream`] when the stream is exhausted at a
    /// frame boundary. A stream that ends inside a header is a
    /// [`CodecError::TruncatedHeader`].
    fn read_header(&mut self) -> Result<usize, CodecError>;

    /// Read the frame body announced by the last header.
    ///
    /// Returns `(bytes consumed, payload)`.
    fn read_body(&mut self) -> Result<(usize, Vec<u8>), CodecError>;

    /// Discard buffered bytes and bind to a new input stream.
    fn reset(&mut self, source: Box<dyn Read + Send>);

    /// Unique codec identifier.
    fn codec_id(&self) -> &'static str;
}

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Stream exhausted exactly at a frame boundary.
    ///
    /// This is the normal way a segment ends and is not a failure.
    #[error("End of stream")]
    EndOfStream,

    /// Stream ended part-way through a frame header.
    #[error("Truncated frame header: read {read} of {expected} bytes")]
    TruncatedHeader {
        /// Header bytes actually read
        read: usize,
        /// Header width
        expected: usize,
    },

    /// Stream ended before the announced body length was read.
    #[error("Truncated frame body: read {read} of {expected} bytes")]
    TruncatedBody {
        /// Body bytes actually read
        read: usize,
        /// Length announced by the header
        expected: usize,
    },

    /// Stream ended before the record delimiter.
    #[error("Unterminated record: {read} bytes without a delimiter")]
    Unterminated {
        /// Bytes read before end of stream
        read: usize,
    },

    /// Header announces a frame larger than the decoder accepts.
    #[error("Frame length {len} exceeds limit {max}")]
    FrameTooLarge {
        /// Announced length
        len: u64,
        /// Configured limit
        max: u64,
    },

    /// Line-framed payload contains the delimiter byte.
    #[error("Payload contains the record delimiter at byte {position}")]
    DelimiterInPayload {
        /// Index of the first delimiter byte
        position: usize,
    },

    /// Payload too long for a length-prefixed header.
    #[error("Payload of {len} bytes cannot be length-prefixed")]
    PayloadTooLarge {
        /// Payload length
        len: usize,
    },

    /// Unknown codec identifier.
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),

    /// Underlying stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// True for a clean end of stream.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, CodecError::EndOfStream)
    }

    /// True for damaged or incomplete frames.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            CodecError::TruncatedHeader { .. }
                | CodecError::TruncatedBody { .. }
                | CodecError::Unterminated { .. }
                | CodecError::FrameTooLarge { .. }
        )
    }
}
