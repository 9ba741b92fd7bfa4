//! Background sync thread with concurrent producers.

use crate::common::*;
use seglog::{SegmentWriter, SyncMode, WriterConfig};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn periodic_sync_runs_alongside_writers() {
    let dir = store_dir();
    let config = WriterConfig::new()
        .with_prefix("p_")
        .with_sync(SyncMode::Periodic { interval_ms: 2 });
    let writer = Arc::new(SegmentWriter::open(dir.path(), config.clone()).unwrap());
    let mut sync = writer.start_sync_thread().unwrap().expect("periodic mode");

    let producers: Vec<_> = (0..4)
        .map(|t| {
            let writer = Arc::clone(&writer);
            thread::spawn(move || {
                for i in 0..250 {
                    writer.write(format!("{}:{}", t, i).as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while writer.counters().sync_calls == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(2));
    }

    let before_stop = writer.counters().sync_calls;
    sync.stop().unwrap();
    let counters = writer.counters();

    assert!(before_stop >= 1);
    assert!(counters.sync_calls > before_stop);
    assert_eq!(counters.appends, 1_000);

    let records = read_pending(dir.path(), &config);
    assert_eq!(records.len(), 1_000);
    for t in 0..4 {
        let mine: Vec<usize> = records
            .iter()
            .map(|r| String::from_utf8(r.clone()).unwrap())
            .filter_map(|r| {
                let (thread, seq) = r.split_once(':')?;
                (thread == t.to_string()).then(|| seq.parse().unwrap())
            })
            .collect();
        assert_eq!(mine, (0..250).collect::<Vec<_>>(), "producer {}", t);
    }
}

#[test]
fn dropping_sync_thread_syncs_once_more() {
    let dir = store_dir();
    let config = WriterConfig::new().with_sync(SyncMode::Periodic {
        interval_ms: 3_600_000,
    });
    let writer = Arc::new(SegmentWriter::open(dir.path(), config).unwrap());
    let sync = writer.start_sync_thread().unwrap();
    assert!(sync.is_some());

    writer.write(b"pending").unwrap();
    drop(sync);

    assert_eq!(writer.counters().sync_calls, 1);
}
