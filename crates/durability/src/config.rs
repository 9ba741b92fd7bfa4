//! Store configuration via `seglog.toml`
//!
//! One file describes both sides of a store: how the writer names, frames and
//! syncs segments, and where the reader keeps its checkpoint. Missing fields
//! fall back to defaults, so an empty file is a valid configuration.

use crate::checkpoint::PersistMode;
use crate::codec::CodecKind;
use crate::segment::config::{DEFAULT_CHECKPOINT_NAME, DEFAULT_PREFIX};
use crate::segment::{ReaderConfig, SyncMode, WriterConfig};
use seglog_core::{RotationPolicy, DEFAULT_SEGMENT_EXTENSION};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Config file name placed in the store directory.
pub const CONFIG_FILE_NAME: &str = "seglog.toml";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Prefix contains a path separator or newline
    #[error("Invalid segment prefix {0:?}: must not contain a path separator or newline")]
    InvalidPrefix(String),

    /// Extension is empty, contains a path separator or newline, or ends in
    /// the checkpoint extension
    #[error("Invalid segment extension {0:?}: must be non-empty, contain no path separator or newline, and not end in .checkpoint")]
    InvalidExtension(String),

    /// Size rotation with a zero threshold
    #[error("Max segment size must be at least 1 byte")]
    ZeroSegmentSize,

    /// Periodic sync with a zero interval
    #[error("Periodic sync interval must be at least 1ms")]
    ZeroSyncInterval,

    /// Checkpoint name is empty or contains a path separator or newline
    #[error("Invalid checkpoint name {0:?}")]
    InvalidCheckpointName(String),

    /// Config file could not be read
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Config file could not be parsed
    #[error("Failed to parse config file '{}': {message}", .path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// Config file could not be written
    #[error("Failed to write config file '{}': {source}", .path.display())]
    Write {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// Checkpoint settings (`[checkpoint]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointSettings {
    /// Checkpoint file stem.
    #[serde(default = "default_checkpoint_name")]
    pub name: String,
    /// How the checkpoint is rewritten.
    #[serde(default)]
    pub persist: PersistMode,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        CheckpointSettings {
            name: default_checkpoint_name(),
            persist: PersistMode::default(),
        }
    }
}

/// Store configuration loaded from `seglog.toml`.
///
/// # Example
///
/// ```toml
/// prefix = "app_"
/// extension = ".log"
/// codec = "line"
///
/// [rotation]
/// policy = "size"
/// max_segment_size = 134217728
///
/// [sync]
/// mode = "periodic"
/// interval_ms = 1000
///
/// [checkpoint]
/// name = "app"
/// persist = "in-place"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Segment name prefix.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Segment file extension, including the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// `"line"` or `"length-prefixed"`.
    #[serde(default)]
    pub codec: CodecKind,
    /// Reject length-prefixed frames announcing more bytes than this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_frame_len: Option<u32>,
    /// Rotation policy.
    #[serde(default)]
    pub rotation: RotationPolicy,
    /// Sync mode.
    #[serde(default)]
    pub sync: SyncMode,
    /// Reader checkpoint settings.
    #[serde(default)]
    pub checkpoint: CheckpointSettings,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_extension() -> String {
    DEFAULT_SEGMENT_EXTENSION.to_string()
}

fn default_checkpoint_name() -> String {
    DEFAULT_CHECKPOINT_NAME.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            prefix: default_prefix(),
            extension: default_extension(),
            codec: CodecKind::default(),
            max_frame_len: None,
            rotation: RotationPolicy::default(),
            sync: SyncMode::default(),
            checkpoint: CheckpointSettings::default(),
        }
    }
}

impl StoreConfig {
    /// Writer half of this configuration.
    pub fn writer_config(&self) -> WriterConfig {
        WriterConfig {
            prefix: self.prefix.clone(),
            extension: self.extension.clone(),
            rotation: self.rotation,
            codec: self.codec,
            sync: self.sync,
        }
    }

    /// Reader half of this configuration.
    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            prefix: self.prefix.clone(),
            extension: self.extension.clone(),
            codec: self.codec,
            checkpoint_name: self.checkpoint.name.clone(),
            persist: self.checkpoint.persist,
            max_frame_len: self.max_frame_len,
        }
    }

    /// Validate both halves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.writer_config().validate()?;
        self.reader_config().validate()
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# seglog store configuration

# Segment files are named <prefix><suffix><extension>
prefix = "segment_"
extension = ".log"

# Record framing: "line" (newline-terminated) or "length-prefixed"
codec = "line"

# Rotation: "size" (unix-seconds suffix), "day" (YYYY-MM-DD) or "hour" (YYYY-MM-DD-HH)
[rotation]
policy = "size"
max_segment_size = 134217728

# Sync: "manual" (caller syncs), "always" (fsync every write) or "periodic"
[sync]
mode = "manual"
# interval_ms = 1000            # periodic only

# Reader checkpoint: "in-place" rewrite or "atomic-rename"
[checkpoint]
name = "reader"
persist = "in-place"
"#
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl From<ConfigError> for seglog_core::Error {
    fn from(e: ConfigError) -> Self {
        seglog_core::Error::Config(e.to_string())
    }
}
