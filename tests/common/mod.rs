//! Shared test utilities for the integration suite.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use seglog::testing::ManualClock;
use seglog::{
    Checkpoint, ReaderConfig, ReaderError, SegmentReader, SegmentWriter, WriterConfig,
};
use std::path::Path;
use std::sync::{Arc, Once};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once; filter with `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Scratch store directory.
pub fn store_dir() -> TempDir {
    init_tracing();
    TempDir::new().unwrap()
}

/// Fixed start time for clock-driven tests.
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

/// Writer driven by a manual clock.
pub fn clocked_writer(dir: &Path, config: WriterConfig) -> (SegmentWriter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_time()));
    let encoder = config.codec.encoder();
    let writer = SegmentWriter::open_with(dir, config, encoder, clock.clone()).unwrap();
    (writer, clock)
}

/// Delivered records with the checkpoint each was handed.
pub fn drain(
    reader: &mut SegmentReader,
) -> (Vec<(Vec<u8>, Checkpoint)>, Result<(), ReaderError>) {
    let mut seen = Vec::new();
    let result = reader.handle(|data, cp| {
        seen.push((data.to_vec(), cp.clone()));
        Ok(())
    });
    (seen, result)
}

/// Read every pending record with a fresh reader for `config`.
pub fn read_pending(dir: &Path, config: &WriterConfig) -> Vec<Vec<u8>> {
    let mut reader = SegmentReader::open(dir, ReaderConfig::for_writer(config)).unwrap();
    let (seen, result) = drain(&mut reader);
    result.unwrap();
    seen.into_iter().map(|(data, _)| data).collect()
}
