//! Writer and reader configuration.
//!
//! Both follow the builder pattern and are checked with `validate()` when a
//! writer or reader is opened.

use super::mode::SyncMode;
use super::naming::{SegmentNamer, SegmentPattern};
use crate::checkpoint::PersistMode;
use crate::codec::{CodecKind, Decoder, LengthPrefixedDecoder};
use crate::config::ConfigError;
use seglog_core::{RotationPolicy, CHECKPOINT_EXTENSION, DEFAULT_SEGMENT_EXTENSION};

/// Default segment name prefix.
pub const DEFAULT_PREFIX: &str = "segment_";

/// Default reader checkpoint name.
pub const DEFAULT_CHECKPOINT_NAME: &str = "reader";

/// Segment writer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Segment name prefix (default: `segment_`).
    pub prefix: String,

    /// Segment file extension including the dot (default: `.log`).
    pub extension: String,

    /// When to start a new segment (default: size, 128MB).
    pub rotation: RotationPolicy,

    /// Record framing (default: line).
    pub codec: CodecKind,

    /// When to fsync (default: manual).
    pub sync: SyncMode,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_SEGMENT_EXTENSION.to_string(),
            rotation: RotationPolicy::default(),
            codec: CodecKind::default(),
            sync: SyncMode::default(),
        }
    }
}

impl WriterConfig {
    /// Create a writer configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the segment name prefix (builder pattern).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the segment file extension (builder pattern).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the rotation policy (builder pattern).
    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Use size rotation with the given threshold (builder pattern).
    pub fn with_max_segment_size(mut self, max_bytes: u64) -> Self {
        self.rotation = RotationPolicy::size(max_bytes);
        self
    }

    /// Set the record framing (builder pattern).
    pub fn with_codec(mut self, codec: CodecKind) -> Self {
        self.codec = codec;
        self
    }

    /// Set the sync mode (builder pattern).
    pub fn with_sync(mut self, sync: SyncMode) -> Self {
        self.sync = sync;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_prefix(&self.prefix)?;
        validate_extension(&self.extension)?;
        if self.rotation.max_bytes() == Some(0) {
            return Err(ConfigError::ZeroSegmentSize);
        }
        if let SyncMode::Periodic { interval_ms: 0 } = self.sync {
            return Err(ConfigError::ZeroSyncInterval);
        }
        Ok(())
    }

    /// Name generator for this configuration.
    pub fn namer(&self) -> SegmentNamer {
        SegmentNamer::new(
            SegmentPattern::new(&self.prefix, &self.extension),
            self.rotation,
        )
    }

    /// Create a configuration optimized for testing (small segments).
    pub fn for_testing() -> Self {
        WriterConfig {
            rotation: RotationPolicy::size(1024),
            ..Self::default()
        }
    }
}

/// Segment reader configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Segment name prefix; must match the writer's.
    pub prefix: String,

    /// Segment file extension; must match the writer's.
    pub extension: String,

    /// Record framing; must match the writer's.
    pub codec: CodecKind,

    /// Checkpoint file stem (default: `reader`).
    pub checkpoint_name: String,

    /// How the checkpoint is rewritten (default: in place).
    pub persist: PersistMode,

    /// Largest body a length-prefixed header may announce (default: unlimited).
    pub max_frame_len: Option<u32>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_SEGMENT_EXTENSION.to_string(),
            codec: CodecKind::default(),
            checkpoint_name: DEFAULT_CHECKPOINT_NAME.to_string(),
            persist: PersistMode::default(),
            max_frame_len: None,
        }
    }
}

impl ReaderConfig {
    /// Create a reader configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader configuration matching a writer's naming and framing.
    pub fn for_writer(writer: &WriterConfig) -> Self {
        ReaderConfig {
            prefix: writer.prefix.clone(),
            extension: writer.extension.clone(),
            codec: writer.codec,
            ..Self::default()
        }
    }

    /// Set the segment name prefix (builder pattern).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the segment file extension (builder pattern).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the record framing (builder pattern).
    pub fn with_codec(mut self, codec: CodecKind) -> Self {
        self.codec = codec;
        self
    }

    /// Set the checkpoint name (builder pattern).
    pub fn with_checkpoint_name(mut self, name: impl Into<String>) -> Self {
        self.checkpoint_name = name.into();
        self
    }

    /// Set the checkpoint persist mode (builder pattern).
    pub fn with_persist(mut self, persist: PersistMode) -> Self {
        self.persist = persist;
        self
    }

    /// Limit length-prefixed frame bodies (builder pattern).
    pub fn with_max_frame_len(mut self, max: u32) -> Self {
        self.max_frame_len = Some(max);
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_prefix(&self.prefix)?;
        validate_extension(&self.extension)?;
        if self.checkpoint_name.is_empty() || is_unsafe_name_part(&self.checkpoint_name) {
            return Err(ConfigError::InvalidCheckpointName(
                self.checkpoint_name.clone(),
            ));
        }
        Ok(())
    }

    /// Segment file pattern for this configuration.
    pub fn pattern(&self) -> SegmentPattern {
        SegmentPattern::new(&self.prefix, &self.extension)
    }

    /// Build the decoder this configuration describes.
    pub fn decoder(&self) -> Box<dyn Decoder> {
        match (self.codec, self.max_frame_len) {
            (CodecKind::LengthPrefixed, Some(max)) => {
                Box::new(LengthPrefixedDecoder::new().with_max_frame_len(max))
            }
            (codec, _) => codec.decoder(),
        }
    }
}

/// Path separators would leave the directory; a newline would break the
/// line-oriented checkpoint file that records segment names.
fn is_unsafe_name_part(s: &str) -> bool {
    s.contains(['/', '\\', '\n'])
}

fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    if is_unsafe_name_part(prefix) {
        return Err(ConfigError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

fn validate_extension(extension: &str) -> Result<(), ConfigError> {
    // Checkpoint files share the directory and are never listed as segments
    if extension.is_empty()
        || is_unsafe_name_part(extension)
        || extension.ends_with(CHECKPOINT_EXTENSION)
    {
        return Err(ConfigError::InvalidExtension(extension.to_string()));
    }
    Ok(())
}
