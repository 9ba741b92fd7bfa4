//! Checkpointed segment reader.
//!
//! `handle` walks the segments of a directory in name order starting at the
//! persisted checkpoint, hands each record to a handler, and persists the new
//! position after every record. A restarted reader resumes at the first record
//! that was not yet persisted, so each record is delivered at least once and,
//! absent handler failures, exactly once.

use super::config::ReaderConfig;
use super::naming::SegmentPattern;
use crate::checkpoint::{CheckpointError, CheckpointStore};
use crate::codec::{CodecError, Decoder};
use crate::config::ConfigError;
use parking_lot::RwLock;
use seglog_core::Checkpoint;
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Error a record handler may return to abort `handle`.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Segment reader errors.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O failure
    #[error("{op} {}: {source}", .path.display())]
    Io {
        /// Operation that failed
        op: &'static str,
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A frame could not be decoded
    #[error("Failed to decode frame at {segment}@{offset}: {source}")]
    Decode {
        /// Segment being read
        segment: String,
        /// Offset of the frame start
        offset: u64,
        /// Decoder failure
        #[source]
        source: CodecError,
    },

    /// Checkpoint load or persist failed
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// The handler rejected a record; it was not checkpointed
    #[error("Handler failed at {segment}@{offset}: {source}")]
    Handler {
        /// Segment of the rejected record
        segment: String,
        /// Offset of the rejected record
        offset: u64,
        /// Handler error
        #[source]
        source: HandlerError,
    },

    /// Rejected configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `handle` stopped because the reader was closed
    #[error("Reader closed")]
    Closed,
}

impl ReaderError {
    fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        ReaderError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this is the stopped-on-request sentinel.
    pub fn is_closed(&self) -> bool {
        matches!(self, ReaderError::Closed)
    }
}

impl From<ReaderError> for seglog_core::Error {
    fn from(e: ReaderError) -> Self {
        match e {
            ReaderError::Io { op, path, source } => seglog_core::Error::Io { op, path, source },
            ReaderError::Decode {
                segment,
                source: CodecError::Io(source),
                ..
            } => seglog_core::Error::Io {
                op: "read segment",
                path: PathBuf::from(segment),
                source,
            },
            e @ ReaderError::Decode { .. } => seglog_core::Error::Framing(e.to_string()),
            ReaderError::Checkpoint(e) => e.into(),
            e @ ReaderError::Handler { .. } => seglog_core::Error::Handler(e.to_string()),
            ReaderError::Config(e) => e.into(),
            ReaderError::Closed => seglog_core::Error::Closed,
        }
    }
}

/// Cancels a reader from another thread.
///
/// Cloneable; every clone flips the same flag.
#[derive(Debug, Clone)]
pub struct ReaderCloser {
    closed: Arc<RwLock<bool>>,
}

impl ReaderCloser {
    /// Ask the reader to stop. Takes effect before the next file or record.
    pub fn close(&self) {
        *self.closed.write() = true;
    }

    /// Whether close was requested.
    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }
}

/// Reads segments in order, persisting a checkpoint after every record.
pub struct SegmentReader {
    dir: PathBuf,
    config: ReaderConfig,
    pattern: SegmentPattern,
    decoder: Box<dyn Decoder>,
    store: CheckpointStore,
    checkpoint: Checkpoint,
    closed: Arc<RwLock<bool>>,
}

impl SegmentReader {
    /// Open a reader on `dir`, loading (or creating) its checkpoint.
    pub fn open(dir: impl AsRef<Path>, config: ReaderConfig) -> Result<Self, ReaderError> {
        let decoder = config.decoder();
        Self::open_with_decoder(dir, config, decoder)
    }

    /// Open a reader with an explicit decoder.
    ///
    /// A malformed checkpoint file is an error here, not a silent restart
    /// from the beginning.
    pub fn open_with_decoder(
        dir: impl AsRef<Path>,
        config: ReaderConfig,
        decoder: Box<dyn Decoder>,
    ) -> Result<Self, ReaderError> {
        config.validate()?;
        let dir = dir.as_ref().to_path_buf();
        let (store, checkpoint) =
            CheckpointStore::load_with_mode(&dir, &config.checkpoint_name, config.persist)?;

        tracing::info!(
            dir = %dir.display(),
            checkpoint = %checkpoint,
            codec = decoder.codec_id(),
            "Segment reader opened"
        );

        Ok(SegmentReader {
            pattern: config.pattern(),
            dir,
            config,
            decoder,
            store,
            checkpoint,
            closed: Arc::new(RwLock::new(false)),
        })
    }

    /// Deliver every record after the checkpoint to `handler`.
    ///
    /// Records are delivered in segment-name order, then file order. The
    /// handler sees the checkpoint of the record's own start; the position
    /// after the record is persisted only once the handler returns `Ok`.
    ///
    /// Returns `Err(ReaderError::Closed)` when stopped by `close`. Any other
    /// error aborts immediately and takes precedence over a pending close.
    /// May be called again after it returns.
    pub fn handle<F>(&mut self, mut handler: F) -> Result<(), ReaderError>
    where
        F: FnMut(&[u8], &Checkpoint) -> Result<(), HandlerError>,
    {
        let result = self.run(&mut handler);

        self.decoder.reset(Box::new(io::empty()));
        self.store.release();

        result?;
        if self.is_closed() {
            tracing::info!(checkpoint = %self.checkpoint, "Segment reader stopped on close");
            return Err(ReaderError::Closed);
        }
        tracing::info!(checkpoint = %self.checkpoint, "Segment reader caught up");
        Ok(())
    }

    fn run<F>(&mut self, handler: &mut F) -> Result<(), ReaderError>
    where
        F: FnMut(&[u8], &Checkpoint) -> Result<(), HandlerError>,
    {
        let segments = self.segments()?;
        tracing::debug!(count = segments.len(), from = %self.checkpoint, "Reading segments");

        for name in segments {
            if self.is_closed() {
                break;
            }

            if self.checkpoint.segment() != name {
                // Persist (name, 0) before any record so a stale offset never
                // outlives the segment it belongs to
                self.checkpoint.enter_segment(&name);
                self.store.persist(&self.checkpoint)?;
                tracing::debug!(segment = %name, "Entered segment");
            }

            self.read_segment(&name, handler)?;
        }
        Ok(())
    }

    fn read_segment<F>(&mut self, name: &str, handler: &mut F) -> Result<(), ReaderError>
    where
        F: FnMut(&[u8], &Checkpoint) -> Result<(), HandlerError>,
    {
        let path = self.dir.join(name);
        let mut file = File::open(&path).map_err(|e| ReaderError::io("open segment", &path, e))?;

        let offset = self.checkpoint.offset();
        if offset > 0 {
            let len = file
                .metadata()
                .map_err(|e| ReaderError::io("stat segment", &path, e))?
                .len();
            if offset > len {
                tracing::warn!(
                    segment = %name,
                    offset,
                    len,
                    "Checkpoint offset is past the end of the segment"
                );
            }
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| ReaderError::io("seek segment", &path, e))?;
        }
        self.decoder.reset(Box::new(file));

        while !self.is_closed() {
            let frame_offset = self.checkpoint.offset();
            let decode_err = |source: CodecError| {
                if source.is_framing() {
                    tracing::warn!(
                        segment = %name,
                        offset = frame_offset,
                        error = %source,
                        "Damaged frame, stopping at last checkpoint"
                    );
                }
                ReaderError::Decode {
                    segment: name.to_string(),
                    offset: frame_offset,
                    source,
                }
            };

            let header = match self.decoder.read_header() {
                Ok(n) => n,
                Err(CodecError::EndOfStream) => break,
                Err(source) => return Err(decode_err(source)),
            };
            let (body, payload) = self.decoder.read_body().map_err(decode_err)?;

            handler(&payload, &self.checkpoint).map_err(|source| ReaderError::Handler {
                segment: name.to_string(),
                offset: frame_offset,
                source,
            })?;

            self.checkpoint.advance((header + body) as u64);
            self.store.persist(&self.checkpoint)?;
        }
        Ok(())
    }

    /// Request cancellation. Callable repeatedly.
    pub fn close(&self) {
        *self.closed.write() = true;
    }

    /// Handle for cancelling this reader from another thread.
    pub fn closer(&self) -> ReaderCloser {
        ReaderCloser {
            closed: Arc::clone(&self.closed),
        }
    }

    /// Whether close was requested.
    pub fn is_closed(&self) -> bool {
        *self.closed.read()
    }

    /// In-memory checkpoint.
    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    /// Segments a `handle` call would visit, oldest first.
    pub fn segments(&self) -> Result<Vec<String>, ReaderError> {
        let mut segments = self
            .pattern
            .list(&self.dir)
            .map_err(|e| ReaderError::io("list segments", &self.dir, e))?;
        let from = self.checkpoint.segment();
        segments.retain(|name| name.as_str() >= from);
        Ok(segments)
    }

    /// Segment directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl std::fmt::Debug for SegmentReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentReader")
            .field("dir", &self.dir)
            .field("checkpoint", &self.checkpoint)
            .field("closed", &self.is_closed())
            .finish()
    }
}
