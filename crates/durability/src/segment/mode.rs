//! Writer sync mode configuration
//!
//! Controls when segment data is fsynced (Manual, Always, Periodic).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sync mode for segment writes
///
/// A `write` always pushes the frame out of the encoder buffer into the
/// file. This mode only decides when the file is fsynced.
///
/// # Modes
///
/// | Mode | fsync | Data Loss Window |
/// |------|-------|-----------------|
/// | Manual | When the caller calls `sync()` | Everything since the last call |
/// | Always | After every write | Zero |
/// | Periodic | Background thread, every `interval_ms` | Up to one interval |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SyncMode {
    /// Caller decides (the default)
    #[default]
    Manual,

    /// fsync after every write (slow, maximum durability)
    Always,

    /// fsync from a background thread on a fixed interval
    Periodic {
        /// Time between fsyncs in milliseconds
        interval_ms: u64,
    },
}

impl SyncMode {
    /// Check if every write is followed by an fsync
    pub fn syncs_every_write(&self) -> bool {
        matches!(self, SyncMode::Always)
    }

    /// Background sync interval, for periodic mode
    pub fn interval(&self) -> Option<Duration> {
        match self {
            SyncMode::Periodic { interval_ms } => Some(Duration::from_millis(*interval_ms)),
            _ => None,
        }
    }

    /// Human-readable description of the mode
    pub fn description(&self) -> &'static str {
        match self {
            SyncMode::Manual => "Manual (caller invokes sync)",
            SyncMode::Always => "Always sync (safest, slowest)",
            SyncMode::Periodic { .. } => "Periodic (background sync thread)",
        }
    }

    /// Periodic mode with a one-second interval
    pub fn periodic_default() -> Self {
        SyncMode::Periodic { interval_ms: 1000 }
    }
}
