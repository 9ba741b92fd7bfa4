//! Format constants and size limits
//!
//! These values are part of the on-disk format. Changing the frame header
//! width or the delimiter makes existing segments unreadable.

/// Width of the length-prefixed frame header in bytes.
pub const FRAME_HEADER_LEN: usize = 4;

/// Terminator byte for delimiter-framed records.
pub const LINE_DELIMITER: u8 = b'\n';

/// Largest payload a length-prefixed frame can describe.
pub const MAX_LENGTH_PREFIXED_PAYLOAD: u64 = u32::MAX as u64;

/// Default size threshold for size-based rotation (128MB).
pub const DEFAULT_MAX_SEGMENT_SIZE: u64 = 128 * 1024 * 1024;

/// Default segment file extension.
pub const DEFAULT_SEGMENT_EXTENSION: &str = ".log";

/// Extension appended to a reader's name to form its checkpoint file.
pub const CHECKPOINT_EXTENSION: &str = ".checkpoint";
