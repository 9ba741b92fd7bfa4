//! Testing utilities for segment stores
//!
//! - **ManualClock**: settable time source for driving rotation across
//!   second, hour and day boundaries without sleeping
//! - **Corruption helpers**: simulate torn trailing writes and stray bytes
//!
//! # Example
//!
//! ```ignore
//! use seglog_durability::testing::ManualClock;
//!
//! let clock = Arc::new(ManualClock::new(start));
//! let writer = SegmentWriter::open_with(dir, config, encoder, clock.clone())?;
//! clock.advance(chrono::Duration::hours(1));
//! ```

use crate::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(start),
        }
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Cut the last `bytes` bytes off a file, as a crash mid-write would.
///
/// Returns the new length.
pub fn truncate_tail(path: &Path, bytes: u64) -> io::Result<u64> {
    let file = OpenOptions::new().write(true).open(path)?;
    let len = file.metadata()?.len().saturating_sub(bytes);
    file.set_len(len)?;
    Ok(len)
}

/// Append raw bytes to a file, bypassing any framing.
pub fn append_raw(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(bytes)
}
