//! Segment rotation policy
//!
//! Decides when a writer abandons its active segment and starts a new one.

use crate::limits::DEFAULT_MAX_SEGMENT_SIZE;
use serde::{Deserialize, Serialize};

/// Rule deciding when the writer starts a new segment.
///
/// The policy is fixed when the writer is built and never changes.
///
/// | Policy | Rotates when | Segment suffix |
/// |--------|--------------|----------------|
/// | Size | position exceeds `max_bytes` | unix seconds |
/// | Day | the UTC date changes | `YYYY-MM-DD` |
/// | Hour | the UTC hour changes | `YYYY-MM-DD-HH` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Rotate once the active segment has grown past `max_bytes`.
    Size {
        /// Size threshold in bytes
        #[serde(default = "default_max_segment_size", rename = "max_segment_size")]
        max_bytes: u64,
    },

    /// One segment per calendar day.
    Day,

    /// One segment per calendar hour.
    Hour,
}

fn default_max_segment_size() -> u64 {
    DEFAULT_MAX_SEGMENT_SIZE
}

impl RotationPolicy {
    /// Size policy with the given threshold.
    pub fn size(max_bytes: u64) -> Self {
        RotationPolicy::Size { max_bytes }
    }

    /// True for the day and hour policies.
    pub fn is_calendar(&self) -> bool {
        matches!(self, RotationPolicy::Day | RotationPolicy::Hour)
    }

    /// Size threshold, if this is a size policy.
    pub fn max_bytes(&self) -> Option<u64> {
        match self {
            RotationPolicy::Size { max_bytes } => Some(*max_bytes),
            _ => None,
        }
    }

    /// Human-readable description of the policy
    pub fn description(&self) -> &'static str {
        match self {
            RotationPolicy::Size { .. } => "size (new segment past a byte threshold)",
            RotationPolicy::Day => "day (one segment per UTC day)",
            RotationPolicy::Hour => "hour (one segment per UTC hour)",
        }
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        RotationPolicy::Size {
            max_bytes: DEFAULT_MAX_SEGMENT_SIZE,
        }
    }
}
