//! Checkpoint persistence for segment readers
//!
//! The checkpoint file `<dir>/<name>.checkpoint` holds the reader's resume
//! position in the two-line text form of [`Checkpoint`]. It is rewritten in
//! full after every delivered record.
//!
//! # Persist Modes
//!
//! - `InPlace`: truncate, seek to 0, write. One open handle, no fsync.
//! - `AtomicRename`: write `.<name>.checkpoint.tmp`, fsync, rename over the
//!   checkpoint, fsync the directory. A crash leaves either the old or the
//!   new contents, never a torn file.

use seglog_core::{Checkpoint, CheckpointFormatError, CHECKPOINT_EXTENSION};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// How the checkpoint file is rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistMode {
    /// Truncate and rewrite the open file (the default)
    #[default]
    InPlace,
    /// Write a temporary file and rename it into place
    AtomicRename,
}

/// Path of the checkpoint file for reader `name` in `dir`.
pub fn checkpoint_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}{}", name, CHECKPOINT_EXTENSION))
}

/// Checkpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// I/O failure
    #[error("{op} {}: {source}", .path.display())]
    Io {
        /// Operation that failed
        op: &'static str,
        /// Checkpoint file involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Persisted contents are malformed
    #[error("Malformed checkpoint {}: {source}", .path.display())]
    Format {
        /// Checkpoint file
        path: PathBuf,
        /// Parse failure
        #[source]
        source: CheckpointFormatError,
    },
}

impl CheckpointError {
    fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        CheckpointError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<CheckpointError> for seglog_core::Error {
    fn from(e: CheckpointError) -> Self {
        match e {
            CheckpointError::Io { op, path, source } => seglog_core::Error::Io { op, path, source },
            CheckpointError::Format { source, .. } => seglog_core::Error::CheckpointFormat(source),
        }
    }
}

/// Owns one reader's checkpoint file.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    mode: PersistMode,
    /// Held open between in-place rewrites
    file: Option<File>,
}

impl CheckpointStore {
    /// Load the checkpoint for reader `name`, creating an empty file if absent.
    pub fn load(dir: &Path, name: &str) -> Result<(Self, Checkpoint), CheckpointError> {
        Self::load_with_mode(dir, name, PersistMode::default())
    }

    /// Load with an explicit persist mode.
    ///
    /// A missing file yields the zero checkpoint. An existing file must parse;
    /// malformed contents are an error, never silently reset.
    pub fn load_with_mode(
        dir: &Path,
        name: &str,
        mode: PersistMode,
    ) -> Result<(Self, Checkpoint), CheckpointError> {
        let path = checkpoint_path(dir, name);

        let exists = match std::fs::metadata(&path) {
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(CheckpointError::io("stat checkpoint", &path, e)),
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| CheckpointError::io("open checkpoint", &path, e))?;

        let checkpoint = if exists {
            let mut text = String::new();
            file.read_to_string(&mut text)
                .map_err(|e| CheckpointError::io("read checkpoint", &path, e))?;
            Checkpoint::parse(&text).map_err(|source| CheckpointError::Format {
                path: path.clone(),
                source,
            })?
        } else {
            tracing::debug!(path = %path.display(), "Created empty checkpoint");
            Checkpoint::default()
        };

        let file = match mode {
            PersistMode::InPlace => Some(file),
            PersistMode::AtomicRename => None,
        };

        Ok((CheckpointStore { path, mode, file }, checkpoint))
    }

    /// Path of the checkpoint file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist mode in use.
    pub fn mode(&self) -> PersistMode {
        self.mode
    }

    /// Rewrite the checkpoint file with `checkpoint`.
    ///
    /// Full rewrite, safe to repeat with the same or newer values.
    pub fn persist(&mut self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let text = checkpoint.to_text();
        match self.mode {
            PersistMode::InPlace => self.persist_in_place(text.as_bytes()),
            PersistMode::AtomicRename => self.persist_atomic(text.as_bytes()),
        }
    }

    fn persist_in_place(&mut self, bytes: &[u8]) -> Result<(), CheckpointError> {
        let path = &self.path;
        let file = match self.file.take() {
            Some(file) => file,
            None => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(path)
                .map_err(|e| CheckpointError::io("open checkpoint", path, e))?,
        };
        let file = self.file.insert(file);

        file.set_len(0)
            .map_err(|e| CheckpointError::io("truncate checkpoint", path, e))?;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| CheckpointError::io("seek checkpoint", path, e))?;
        file.write_all(bytes)
            .map_err(|e| CheckpointError::io("write checkpoint", path, e))?;
        Ok(())
    }

    fn persist_atomic(&mut self, bytes: &[u8]) -> Result<(), CheckpointError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = dir.join(format!(".{}.tmp", file_name));

        // Step 1: write and fsync the temporary file
        let mut temp = File::create(&temp_path)
            .map_err(|e| CheckpointError::io("create checkpoint temp", &temp_path, e))?;
        temp.write_all(bytes)
            .map_err(|e| CheckpointError::io("write checkpoint temp", &temp_path, e))?;
        temp.sync_all()
            .map_err(|e| CheckpointError::io("sync checkpoint temp", &temp_path, e))?;
        drop(temp);

        // Step 2: atomic rename
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| CheckpointError::io("rename checkpoint", &self.path, e))?;

        // Step 3: fsync the parent directory
        File::open(dir)
            .and_then(|d| d.sync_all())
            .map_err(|e| CheckpointError::io("sync checkpoint dir", dir, e))?;
        Ok(())
    }

    /// Release the held file handle. A later persist reopens it.
    pub fn release(&mut self) {
        self.file = None;
    }

    /// Whether a file handle is currently held.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}
