//! seglog - append-only segment log with checkpointed readers
//!
//! Producers append framed records to rotating segment files; consumers replay
//! them in write order and resume after restarts from a persisted checkpoint.
//!
//! # Quick Start
//!
//! ```ignore
//! use seglog::{ReaderConfig, SegmentReader, SegmentWriter, WriterConfig};
//!
//! let config = WriterConfig::new().with_prefix("app_");
//! let writer = SegmentWriter::open("/var/lib/app/log", config.clone())?;
//! writer.write(b"first record")?;
//! writer.sync()?;
//!
//! let mut reader = SegmentReader::open("/var/lib/app/log", ReaderConfig::for_writer(&config))?;
//! reader.handle(|record, checkpoint| {
//!     println!("{checkpoint}: {}", String::from_utf8_lossy(record));
//!     Ok(())
//! })?;
//! ```
//!
//! # Architecture
//!
//! - `seglog-core`: checkpoint value and text format, rotation policy, errors
//! - `seglog-durability`: codecs, writer, reader, checkpoint store, config

pub use seglog_core::{Checkpoint, CheckpointFormatError, Error, Result, RotationPolicy};
pub use seglog_durability::*;
