//! Simulated consumer crashes and torn producer writes.
//!
//! Consumers "crash" by failing the handler after a random number of records;
//! producers "crash" by leaving a partial frame at the tail of a segment.

use crate::common::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seglog::testing::{append_raw, truncate_tail};
use seglog::{
    CodecKind, ReaderConfig, ReaderError, SegmentReader, SegmentWriter, WriterConfig,
};

const SEED: u64 = 0x5E61_0600_0000_0042;

fn random_records(rng: &mut StdRng, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|_| {
            let len = rng.gen_range(0..200);
            (0..len).map(|_| rng.gen::<u8>()).collect()
        })
        .collect()
}

#[test]
fn repeated_consumer_crashes_deliver_each_record_once() {
    let dir = store_dir();
    let mut rng = StdRng::seed_from_u64(SEED);
    let config = WriterConfig::new()
        .with_prefix("bin_")
        .with_codec(CodecKind::LengthPrefixed)
        .with_max_segment_size(2048);
    let (writer, clock) = clocked_writer(dir.path(), config.clone());

    let records = random_records(&mut rng, 300);
    for record in &records {
        writer.write(record).unwrap();
        clock.advance(chrono::Duration::seconds(1));
    }
    assert!(writer.list_segments().unwrap().len() >= 2);

    let mut delivered = Vec::new();
    for _attempt in 0..1_000 {
        let crash_after = rng.gen_range(1..40);
        let mut reader =
            SegmentReader::open(dir.path(), ReaderConfig::for_writer(&config)).unwrap();

        let mut count = 0;
        let result = reader.handle(|data, _| {
            if count == crash_after {
                return Err("simulated crash".into());
            }
            count += 1;
            delivered.push(data.to_vec());
            Ok(())
        });

        match result {
            Ok(()) => break,
            Err(ReaderError::Handler { .. }) => continue,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(delivered, records);
}

#[test]
fn torn_tail_write_is_framing_error_then_resumes() {
    let dir = store_dir();
    let config = WriterConfig::new()
        .with_prefix("bin_")
        .with_codec(CodecKind::LengthPrefixed);
    let writer = SegmentWriter::open(dir.path(), config.clone()).unwrap();

    writer.write(b"alpha").unwrap();
    writer.write(b"beta").unwrap();
    writer.sync().unwrap();
    let segment = writer.current_segment().unwrap();
    let path = dir.path().join(&segment);

    // Producer died after the header and half the body
    truncate_tail(&path, 2).unwrap();

    let mut reader = SegmentReader::open(dir.path(), ReaderConfig::for_writer(&config)).unwrap();
    let (seen, result) = drain(&mut reader);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, b"alpha");

    let err: seglog::Error = result.unwrap_err().into();
    assert!(matches!(err, seglog::Error::Framing(_)), "{}", err);

    // Operator repairs the tail; the reader continues from the torn frame
    append_raw(&path, b"ta").unwrap();
    let (seen, result) = drain(&mut reader);
    result.unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, b"beta");
    assert_eq!(seen[0].1.segment(), segment);
    assert_eq!(seen[0].1.offset(), 9);
}

#[test]
fn line_records_with_delimiter_are_refused() {
    let dir = store_dir();
    let config = WriterConfig::new().with_prefix("txt_");
    let writer = SegmentWriter::open(dir.path(), config.clone()).unwrap();

    writer.write(b"good").unwrap();
    let err: seglog::Error = writer.write(b"two\nlines").unwrap_err().into();
    assert!(matches!(err, seglog::Error::Framing(_)));
    writer.write(b"still good").unwrap();

    assert_eq!(
        read_pending(dir.path(), &config),
        vec![b"good".to_vec(), b"still good".to_vec()]
    );
}
