//! Core types for seglog
//!
//! This crate defines the foundational types shared by the writer and reader:
//! - Checkpoint: persisted (segment, offset) resume marker and its text format
//! - RotationPolicy: size, day or hour segment rotation
//! - Error: unified error taxonomy
//! - Limits: on-disk format constants

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
pub mod error;
pub mod limits;
pub mod rotation;

pub use checkpoint::{Checkpoint, CheckpointFormatError};
pub use error::{Error, Result};
pub use limits::{
    CHECKPOINT_EXTENSION, DEFAULT_MAX_SEGMENT_SIZE, DEFAULT_SEGMENT_EXTENSION, FRAME_HEADER_LEN,
    LINE_DELIMITER, MAX_LENGTH_PREFIXED_PAYLOAD,
};
pub use rotation::RotationPolicy;
