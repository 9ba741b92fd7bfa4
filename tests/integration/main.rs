//! End-to-end integration tests
//!
//! Writer and reader together through the public `seglog` API.

#[path = "../common/mod.rs"]
mod common;

mod cancellation;
mod config_file;
mod crash_resume;
mod periodic_sync;
mod rotation;
