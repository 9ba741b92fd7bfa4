//! Segment writer with rotation and sync mode support.
//!
//! The writer appends framed records to the active segment of a directory and
//! rolls over to a new segment when the rotation policy says so. All state sits
//! behind one mutex, so concurrent writers are serialized and `sync` contends
//! for the same lock.

use super::config::WriterConfig;
use super::naming::SegmentNamer;
use crate::clock::{Clock, SystemClock};
use crate::codec::{CodecError, Encoder};
use crate::config::ConfigError;
use parking_lot::Mutex;
use seglog_core::RotationPolicy;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cumulative writer counters.
///
/// Accumulated over the lifetime of the writer and never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterCounters {
    /// Successful `write` calls
    pub appends: u64,
    /// Segments opened
    pub rotations: u64,
    /// fsync calls issued against a segment
    pub sync_calls: u64,
    /// Frame bytes written, headers included
    pub bytes_written: u64,
}

/// Segment writer errors.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
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

    /// Encoding a record failed
    #[error("Failed to write record to segment {segment}: {source}")]
    Codec {
        /// Active segment name
        segment: String,
        /// Encoder failure
        #[source]
        source: CodecError,
    },

    /// Rejected configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WriterError {
    fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        WriterError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<WriterError> for seglog_core::Error {
    fn from(e: WriterError) -> Self {
        match e {
            WriterError::Io { op, path, source } => seglog_core::Error::Io { op, path, source },
            WriterError::Codec {
                segment,
                source: CodecError::Io(source),
            } => seglog_core::Error::Io {
                op: "write segment",
                path: PathBuf::from(segment),
                source,
            },
            WriterError::Codec { source, .. } => seglog_core::Error::Framing(source.to_string()),
            WriterError::Config(e) => e.into(),
        }
    }
}

struct ActiveSegment {
    /// Handle used for fsync; the encoder writes through a clone of it
    file: File,
    name: String,
    path: PathBuf,
}

struct WriterState {
    active: Option<ActiveSegment>,
    /// Bytes in the active segment
    position: u64,
    encoder: Box<dyn Encoder>,
    counters: WriterCounters,
}

/// Appends records to rotating segment files.
///
/// No file is opened until the first `write`. Reopening a directory appends
/// to the segment the policy names for "now" if it already exists, starting
/// from its current length.
///
/// # Rotation
///
/// - Size: a new segment starts once the active one has grown past
///   `max_bytes`. Names carry unix seconds, so rotation inside the same
///   second keeps appending to the active segment.
/// - Day/Hour: a new segment starts when the clock enters a new bucket.
///
/// The new file is opened before the old one is released, so a failed
/// rotation leaves the previous segment active.
pub struct SegmentWriter {
    dir: PathBuf,
    config: WriterConfig,
    namer: SegmentNamer,
    clock: Arc<dyn Clock>,
    state: Mutex<WriterState>,
}

impl SegmentWriter {
    /// Open a writer on `dir` with the encoder the config selects.
    ///
    /// Creates the directory if needed.
    pub fn open(dir: impl AsRef<Path>, config: WriterConfig) -> Result<Self, WriterError> {
        let encoder = config.codec.encoder();
        Self::open_with(dir, config, encoder, Arc::new(SystemClock))
    }

    /// Open a writer with an explicit encoder and clock.
    pub fn open_with(
        dir: impl AsRef<Path>,
        config: WriterConfig,
        encoder: Box<dyn Encoder>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WriterError> {
        config.validate()?;
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| WriterError::io("create segment dir", &dir, e))?;

        tracing::info!(
            dir = %dir.display(),
            prefix = %config.prefix,
            rotation = config.rotation.description(),
            codec = encoder.codec_id(),
            sync = config.sync.description(),
            "Segment writer opened"
        );

        Ok(SegmentWriter {
            namer: config.namer(),
            dir,
            config,
            clock,
            state: Mutex::new(WriterState {
                active: None,
                position: 0,
                encoder,
                counters: WriterCounters::default(),
            }),
        })
    }

    /// Append one record. Returns the frame bytes written.
    ///
    /// On failure the position is re-read from the file, so it stays equal
    /// to the bytes actually on disk.
    pub fn write(&self, payload: &[u8]) -> Result<usize, WriterError> {
        let mut state = self.state.lock();
        let WriterState {
            active,
            position,
            encoder,
            counters,
        } = &mut *state;
        let active = self.rotate_if_needed(active, position, encoder, counters)?;

        let written = encoder
            .write_header(payload)
            .and_then(|header| Ok(header + encoder.write_body(payload)?));

        let written = match written {
            Ok(n) => n,
            Err(source) => {
                match active.file.metadata() {
                    Ok(meta) => *position = meta.len(),
                    Err(e) => tracing::warn!(
                        segment = %active.name,
                        position = *position,
                        error = %e,
                        "Failed to resync position after write error"
                    ),
                }
                return Err(WriterError::Codec {
                    segment: active.name.clone(),
                    source,
                });
            }
        };

        *position += written as u64;
        counters.appends += 1;
        counters.bytes_written += written as u64;

        if self.config.sync.syncs_every_write() {
            active
                .file
                .sync_all()
                .map_err(|e| WriterError::io("sync segment", &active.path, e))?;
            counters.sync_calls += 1;
        }

        Ok(written)
    }

    /// Open the segment the policy names for "now" when rotation is due and
    /// return the segment the next frame goes to.
    ///
    /// A failed open leaves the previous segment active.
    fn rotate_if_needed<'a>(
        &self,
        active: &'a mut Option<ActiveSegment>,
        position: &mut u64,
        encoder: &mut Box<dyn Encoder>,
        counters: &mut WriterCounters,
    ) -> Result<&'a ActiveSegment, WriterError> {
        let now = self.clock.now();
        let name = self.namer.name_at(now);
        let due = match (active.as_ref(), self.namer.policy()) {
            (None, _) => true,
            (Some(_), RotationPolicy::Size { max_bytes }) => *position > max_bytes,
            (Some(current), _) => name != current.name,
        };

        let segment = match active.take() {
            Some(current) if !due => current,
            Some(current) if current.name == name => {
                tracing::debug!(
                    segment = %name,
                    position = *position,
                    "Rotation deferred, segment name unchanged"
                );
                current
            }
            previous => match self.open_segment(name) {
                Ok((segment, sink, opened_at)) => {
                    encoder.reset(Box::new(sink));
                    *position = opened_at;
                    counters.rotations += 1;
                    match previous {
                        Some(prev) => tracing::debug!(
                            from = %prev.name,
                            to = %segment.name,
                            position = opened_at,
                            "Rotated segment"
                        ),
                        None => tracing::info!(
                            segment = %segment.name,
                            position = opened_at,
                            "Opened segment"
                        ),
                    }
                    segment
                }
                Err(e) => {
                    *active = previous;
                    return Err(e);
                }
            },
        };

        Ok(active.insert(segment))
    }

    /// Open `name` for append. Returns the segment, a handle for the encoder
    /// and the current length.
    fn open_segment(&self, name: String) -> Result<(ActiveSegment, File, u64), WriterError> {
        let path = self.dir.join(&name);
        let file = open_append(&path).map_err(|e| WriterError::io("open segment", &path, e))?;
        let len = file
            .metadata()
            .map_err(|e| WriterError::io("stat segment", &path, e))?
            .len();
        let sink = file
            .try_clone()
            .map_err(|e| WriterError::io("clone segment handle", &path, e))?;
        Ok((ActiveSegment { file, name, path }, sink, len))
    }

    /// fsync the active segment. No-op when no segment is open.
    pub fn sync(&self) -> Result<(), WriterError> {
        let mut state = self.state.lock();
        if let Some(active) = &state.active {
            active
                .file
                .sync_all()
                .map_err(|e| WriterError::io("sync segment", &active.path, e))?;
            state.counters.sync_calls += 1;
        }
        Ok(())
    }

    /// Release the active segment.
    ///
    /// Closing with no segment open is a no-op. The writer stays usable: the
    /// next `write` opens the segment the policy names for "now".
    pub fn close(&self) {
        let mut state = self.state.lock();
        if let Some(active) = state.active.take() {
            state.encoder.reset(Box::new(io::sink()));
            state.position = 0;
            tracing::debug!(segment = %active.name, "Closed segment");
        }
    }

    /// Name of the active segment, if one is open.
    pub fn current_segment(&self) -> Option<String> {
        self.state.lock().active.as_ref().map(|a| a.name.clone())
    }

    /// Bytes in the active segment.
    pub fn position(&self) -> u64 {
        self.state.lock().position
    }

    /// Snapshot of the cumulative counters.
    pub fn counters(&self) -> WriterCounters {
        self.state.lock().counters
    }

    /// Segments of this writer's pattern in the directory, oldest first.
    pub fn list_segments(&self) -> Result<Vec<String>, WriterError> {
        self.namer
            .pattern()
            .list(&self.dir)
            .map_err(|e| WriterError::io("list segments", &self.dir, e))
    }

    /// Segment directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writer configuration.
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }
}

impl std::fmt::Debug for SegmentWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentWriter")
            .field("dir", &self.dir)
            .field("config", &self.config)
            .field("current_segment", &self.current_segment())
            .finish()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
