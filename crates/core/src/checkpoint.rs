//! Reader checkpoint value and its text format
//!
//! A checkpoint marks the position a reader has fully delivered:
//! every frame before `offset` in `segment`, and every segment whose name
//! sorts before `segment`.
//!
//! # On-disk format
//!
//! ```text
//! <segment-filename>\n
//! <decimal-offset>\n
//! ```
//!
//! An empty file is the zero checkpoint (no segment, offset 0).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Persisted resume position of a reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checkpoint {
    segment: String,
    offset: u64,
}

impl Checkpoint {
    /// Create a checkpoint at `offset` within `segment`.
    pub fn new(segment: impl Into<String>, offset: u64) -> Self {
        Checkpoint {
            segment: segment.into(),
            offset,
        }
    }

    /// Segment file name (empty before the first record is delivered).
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Byte offset within [`segment`](Self::segment).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// True for the zero checkpoint a fresh reader starts from.
    pub fn is_empty(&self) -> bool {
        self.segment.is_empty() && self.offset == 0
    }

    /// Move to the start of another segment.
    pub fn enter_segment(&mut self, segment: impl Into<String>) {
        self.segment = segment.into();
        self.offset = 0;
    }

    /// Advance past a delivered frame of `len` bytes.
    pub fn advance(&mut self, len: u64) {
        self.offset += len;
    }

    /// Render the two-line text form.
    pub fn to_text(&self) -> String {
        format!("{}\n{}\n", self.segment, self.offset)
    }

    /// Parse the two-line text form.
    ///
    /// Both lines must be newline-terminated. Anything after the second line
    /// is ignored.
    pub fn parse(text: &str) -> Result<Self, CheckpointFormatError> {
        if text.is_empty() {
            return Ok(Checkpoint::default());
        }

        let (segment, rest) = text
            .split_once('\n')
            .ok_or(CheckpointFormatError::MissingSegmentLine)?;
        let (offset, _) = rest
            .split_once('\n')
            .ok_or(CheckpointFormatError::MissingOffsetLine)?;

        let offset = offset
            .parse::<u64>()
            .map_err(|_| CheckpointFormatError::InvalidOffset {
                value: offset.to_string(),
            })?;

        Ok(Checkpoint::new(segment, offset))
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.segment, self.offset)
    }
}

/// Malformed checkpoint contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointFormatError {
    /// The segment line has no terminating newline
    #[error("checkpoint segment line is not newline-terminated")]
    MissingSegmentLine,

    /// The offset line is absent or unterminated
    #[error("checkpoint offset line is missing or not newline-terminated")]
    MissingOffsetLine,

    /// The offset line is not a decimal integer
    #[error("checkpoint offset is not a decimal integer: {value:?}")]
    InvalidOffset {
        /// The offending line
        value: String,
    },
}
