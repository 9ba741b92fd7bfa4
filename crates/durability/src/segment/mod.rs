//! Segmented record log
//!
//! A store is a directory of append-only segment files named
//! `<prefix><suffix><extension>`. One [`SegmentWriter`] appends framed records
//! and rotates by size or calendar bucket; any number of [`SegmentReader`]s,
//! each with its own checkpoint file, consume the segments in name order.

pub mod config;
mod mode;
mod naming;
mod reader;
mod sync;
mod writer;

pub use config::{ReaderConfig, WriterConfig, DEFAULT_CHECKPOINT_NAME, DEFAULT_PREFIX};
pub use mode::SyncMode;
pub use naming::{SegmentNamer, SegmentPattern};
pub use reader::{HandlerError, ReaderCloser, ReaderError, SegmentReader};
pub use sync::{SyncThread, SYNC_THREAD_NAME};
pub use writer::{SegmentWriter, WriterCounters, WriterError};
