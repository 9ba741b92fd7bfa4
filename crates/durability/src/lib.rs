//! Durability layer for seglog
//!
//! This crate handles everything that touches disk:
//!
//! - Codecs: line and length-prefixed record framing behind `Encoder`/`Decoder`
//! - Segment writer: rotation by size, day or hour; manual, always or
//!   periodic fsync
//! - Checkpoint store: in-place or atomic-rename persistence of the reader
//!   position
//! - Segment reader: ordered, resumable, cancellable replay
//! - Configuration: `seglog.toml`
//! - Testing utilities: manual clock and corruption helpers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint; // Reader checkpoint file
pub mod clock; // Time source for rotation
pub mod codec; // Record framing
pub mod config; // seglog.toml
pub mod segment; // Writer, reader, naming
pub mod testing; // Test clock and corruption helpers

// === Re-exports ===
pub use checkpoint::{checkpoint_path, CheckpointError, CheckpointStore, PersistMode};
pub use clock::{Clock, SystemClock};
pub use codec::{
    get_decoder, get_encoder, CodecError, CodecKind, Decoder, Encoder, LengthPrefixedDecoder,
    LengthPrefixedEncoder, LineDecoder, LineEncoder,
};
pub use config::{CheckpointSettings, ConfigError, StoreConfig, CONFIG_FILE_NAME};
pub use segment::{
    HandlerError, ReaderCloser, ReaderConfig, ReaderError, SegmentNamer, SegmentPattern,
    SegmentReader, SegmentWriter, SyncMode, SyncThread, WriterConfig, WriterCounters, WriterError,
};
