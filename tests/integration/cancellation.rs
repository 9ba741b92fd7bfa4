//! Cross-thread cancellation of a running reader.

use crate::common::*;
use parking_lot::Mutex;
use seglog::{ReaderConfig, ReaderError, SegmentReader, SegmentWriter, WriterConfig};
use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

#[test]
fn close_during_handle_stops_after_current_record() {
    let dir = store_dir();
    let config = WriterConfig::new().with_prefix("c_");
    let writer = SegmentWriter::open(dir.path(), config.clone()).unwrap();
    for i in 0..100 {
        writer.write(format!("{}", i).as_bytes()).unwrap();
    }

    let mut reader = SegmentReader::open(dir.path(), ReaderConfig::for_writer(&config)).unwrap();
    let closer = reader.closer();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let (delivered_tx, delivered_rx) = mpsc::channel();
    let (closed_tx, closed_rx) = mpsc::channel::<()>();

    let thread_seen = Arc::clone(&seen);
    let handle = thread::spawn(move || {
        reader.handle(|data, _| {
            let mut seen = thread_seen.lock();
            seen.push(data.to_vec());
            if seen.len() == 1 {
                drop(seen);
                delivered_tx.send(()).unwrap();
                closed_rx.recv().unwrap();
            }
            Ok(())
        })
    });

    delivered_rx.recv().unwrap();
    closer.close();
    closed_tx.send(()).unwrap();

    let result = handle.join().unwrap();
    assert!(matches!(result, Err(ReaderError::Closed)));
    assert_eq!(seen.lock().len(), 1);

    // The record in flight at close time was checkpointed
    let rest = read_pending(dir.path(), &config);
    assert_eq!(rest.len(), 99);
    assert_eq!(rest[0], b"1");
}

#[test]
fn racing_close_never_duplicates_or_loses_records() {
    let dir = store_dir();
    let config = WriterConfig::new().with_prefix("r_").with_max_segment_size(256);
    let (writer, clock) = clocked_writer(dir.path(), config.clone());
    for i in 0..2_000 {
        writer.write(format!("rec-{:05}", i).as_bytes()).unwrap();
        if i % 20 == 0 {
            clock.advance(chrono::Duration::seconds(1));
        }
    }
    assert!(writer.list_segments().unwrap().len() > 1);

    let mut reader = SegmentReader::open(dir.path(), ReaderConfig::for_writer(&config)).unwrap();
    let closer = reader.closer();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let thread_seen = Arc::clone(&seen);
    let handle = thread::spawn(move || {
        reader.handle(|data, _| {
            thread_seen.lock().push(data.to_vec());
            Ok(())
        })
    });
    thread::yield_now();
    closer.close();

    match handle.join().unwrap() {
        Ok(()) | Err(ReaderError::Closed) => {}
        Err(e) => panic!("unexpected error: {}", e),
    }

    let mut all: Vec<Vec<u8>> = seen.lock().clone();
    all.extend(read_pending(dir.path(), &config));

    assert_eq!(all.len(), 2_000);
    let unique: HashSet<&Vec<u8>> = all.iter().collect();
    assert_eq!(unique.len(), 2_000);
    assert_eq!(all.first().unwrap(), b"rec-00000");
    assert_eq!(all.last().unwrap(), b"rec-01999");
}

#[test]
fn closed_error_maps_to_unified_error() {
    let dir = store_dir();
    let mut reader = SegmentReader::open(dir.path(), ReaderConfig::new()).unwrap();
    reader.close();

    let err: seglog::Error = reader.handle(|_, _| Ok(())).unwrap_err().into();
    assert!(err.is_closed());
}
