//! Rotation through the public API, checked by reading everything back.

use crate::common::*;
use chrono::Duration;
use seglog::{CodecKind, RotationPolicy, WriterConfig};

#[test]
fn size_rotation_round_trips_both_codecs() {
    for codec in [CodecKind::Line, CodecKind::LengthPrefixed] {
        let dir = store_dir();
        let config = WriterConfig::new()
            .with_prefix("s_")
            .with_codec(codec)
            .with_max_segment_size(100);
        let (writer, clock) = clocked_writer(dir.path(), config.clone());

        let records: Vec<Vec<u8>> = (0..50).map(|i| format!("record {:02}", i).into_bytes()).collect();
        for record in &records {
            writer.write(record).unwrap();
            clock.advance(Duration::seconds(1));
        }

        let segments = writer.list_segments().unwrap();
        assert!(segments.len() >= 2, "{}: {:?}", codec, segments);
        let mut sorted = segments.clone();
        sorted.sort();
        assert_eq!(segments, sorted);

        assert_eq!(read_pending(dir.path(), &config), records, "{}", codec);
    }
}

#[test]
fn calendar_rotation_groups_by_bucket() {
    let dir = store_dir();
    let config = WriterConfig::new()
        .with_prefix("d_")
        .with_rotation(RotationPolicy::Day);
    let (writer, clock) = clocked_writer(dir.path(), config.clone());

    // 2024-01-15 10:00 start
    writer.write(b"mon 10:00").unwrap();
    clock.advance(Duration::hours(13));
    writer.write(b"mon 23:00").unwrap();
    clock.advance(Duration::hours(1));
    writer.write(b"tue 00:00").unwrap();

    assert_eq!(
        writer.list_segments().unwrap(),
        vec!["d_2024-01-15.log", "d_2024-01-16.log"]
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("d_2024-01-15.log")).unwrap(),
        "mon 10:00\nmon 23:00\n"
    );
    assert_eq!(read_pending(dir.path(), &config).len(), 3);
}

#[test]
fn reader_follows_live_writer() {
    let dir = store_dir();
    let config = WriterConfig::new()
        .with_prefix("h_")
        .with_rotation(RotationPolicy::Hour);
    let (writer, clock) = clocked_writer(dir.path(), config.clone());

    let mut reader =
        seglog::SegmentReader::open(dir.path(), seglog::ReaderConfig::for_writer(&config)).unwrap();

    let mut expected = Vec::new();
    for hour in 0..5 {
        for n in 0..3 {
            let record = format!("h{}-{}", hour, n).into_bytes();
            writer.write(&record).unwrap();
            expected.push(record);
        }
        let (seen, result) = drain(&mut reader);
        result.unwrap();
        let got: Vec<Vec<u8>> = seen.into_iter().map(|(d, _)| d).collect();
        assert_eq!(got, expected);
        expected.clear();
        clock.advance(Duration::hours(1));
    }

    assert_eq!(writer.counters().rotations, 5);
}
