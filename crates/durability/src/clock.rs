//! Time source for segment naming.
//!
//! Rotation decisions read the current time through [`Clock`] so tests can
//! step across day and hour boundaries without sleeping.

use chrono::{DateTime, Utc};
use std::fmt;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
