//! Segment file naming.
//!
//! Segments are named `<prefix><suffix><extension>`:
//!
//! | Policy | Suffix | Example (`app_`, `.log`) |
//! |--------|--------|--------------------------|
//! | Size | unix seconds | `app_1700000000.log` |
//! | Day | `YYYY-MM-DD` | `app_2024-03-09.log` |
//! | Hour | `YYYY-MM-DD-HH` | `app_2024-03-09-17.log` |
//!
//! Every suffix is fixed-width for the lifetime of a store, so lexicographic
//! order of names is creation order.

use chrono::{DateTime, Utc};
use seglog_core::{RotationPolicy, CHECKPOINT_EXTENSION};
use std::io;
use std::path::Path;

/// Matches the segment files belonging to one prefix/extension pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPattern {
    prefix: String,
    extension: String,
}

impl SegmentPattern {
    /// Create a pattern for `<prefix>*<extension>`.
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        SegmentPattern {
            prefix: prefix.into(),
            extension: extension.into(),
        }
    }

    /// Segment name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Segment file extension, including the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Check whether `name` is a segment of this pattern.
    ///
    /// The suffix between prefix and extension must be non-empty, and
    /// checkpoint files never match.
    pub fn matches(&self, name: &str) -> bool {
        name.len() > self.prefix.len() + self.extension.len()
            && name.starts_with(&self.prefix)
            && name.ends_with(&self.extension)
            && !name.ends_with(CHECKPOINT_EXTENSION)
    }

    /// List matching segment names in `dir`, sorted ascending.
    pub fn list(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut segments = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!(name = ?raw, "Skipping non UTF-8 directory entry");
                    continue;
                }
            };
            if self.matches(&name) {
                segments.push(name);
            }
        }

        segments.sort();
        Ok(segments)
    }
}

/// Computes segment names for a rotation policy.
#[derive(Debug, Clone)]
pub struct SegmentNamer {
    pattern: SegmentPattern,
    policy: RotationPolicy,
}

impl SegmentNamer {
    /// Create a namer.
    pub fn new(pattern: SegmentPattern, policy: RotationPolicy) -> Self {
        SegmentNamer { pattern, policy }
    }

    /// The pattern every generated name matches.
    pub fn pattern(&self) -> &SegmentPattern {
        &self.pattern
    }

    /// The rotation policy names are generated for.
    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Name of the segment that should be active at `now`.
    pub fn name_at(&self, now: DateTime<Utc>) -> String {
        let suffix = match self.policy {
            RotationPolicy::Size { .. } => now.timestamp().to_string(),
            RotationPolicy::Day => now.format("%Y-%m-%d").to_string(),
            RotationPolicy::Hour => now.format("%Y-%m-%d-%H").to_string(),
        };
        format!("{}{}{}", self.pattern.prefix, suffix, self.pattern.extension)
    }
}
