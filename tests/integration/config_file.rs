//! Store configuration loaded from `seglog.toml`.

use crate::common::*;
use seglog::{
    CodecKind, ConfigError, PersistMode, ReaderError, RotationPolicy, SegmentReader,
    SegmentWriter, StoreConfig, SyncMode, CONFIG_FILE_NAME,
};

#[test]
fn default_file_drives_writer_and_reader() {
    let dir = store_dir();
    let path = dir.path().join(CONFIG_FILE_NAME);
    StoreConfig::write_default_if_missing(&path).unwrap();

    let config = StoreConfig::from_file(&path).unwrap();
    assert_eq!(config, StoreConfig::default());

    let writer = SegmentWriter::open(dir.path(), config.writer_config()).unwrap();
    writer.write(b"configured").unwrap();

    let mut reader = SegmentReader::open(dir.path(), config.reader_config()).unwrap();
    let (seen, result) = drain(&mut reader);
    result.unwrap();
    assert_eq!(seen[0].0, b"configured");

    // The config and checkpoint files are not segments
    assert_eq!(writer.list_segments().unwrap().len(), 1);
}

#[test]
fn custom_file_round_trip() {
    let dir = store_dir();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        r#"
prefix = "app_"
extension = ".data"
codec = "length-prefixed"
max_frame_len = 4096

[rotation]
policy = "day"

[sync]
mode = "always"

[checkpoint]
name = "shipper"
persist = "atomic-rename"
"#,
    )
    .unwrap();

    let config = StoreConfig::from_file(&path).unwrap();
    assert_eq!(config.codec, CodecKind::LengthPrefixed);
    assert_eq!(config.rotation, RotationPolicy::Day);
    assert_eq!(config.sync, SyncMode::Always);
    assert_eq!(config.checkpoint.persist, PersistMode::AtomicRename);

    let (writer, _clock) = clocked_writer(dir.path(), config.writer_config());
    writer.write(b"binary\n\0payload").unwrap();
    assert_eq!(writer.current_segment().unwrap(), "app_2024-01-15.data");
    assert_eq!(writer.counters().sync_calls, 1);

    let mut reader = SegmentReader::open(dir.path(), config.reader_config()).unwrap();
    let (seen, result) = drain(&mut reader);
    result.unwrap();
    assert_eq!(seen[0].0, b"binary\n\0payload");
    assert!(dir.path().join("shipper.checkpoint").exists());

    let rewritten = dir.path().join("copy.toml");
    config.write_to_file(&rewritten).unwrap();
    assert_eq!(StoreConfig::from_file(&rewritten).unwrap(), config);
}

#[test]
fn oversized_frame_limit_from_config() {
    let dir = store_dir();
    let config = StoreConfig {
        codec: CodecKind::LengthPrefixed,
        max_frame_len: Some(8),
        ..StoreConfig::default()
    };

    let writer = SegmentWriter::open(dir.path(), config.writer_config()).unwrap();
    writer.write(b"short").unwrap();
    writer.write(b"much too long").unwrap();

    let mut reader = SegmentReader::open(dir.path(), config.reader_config()).unwrap();
    let (seen, result) = drain(&mut reader);
    assert_eq!(seen.len(), 1);
    assert!(matches!(result, Err(ReaderError::Decode { offset: 9, .. })));
}

#[test]
fn invalid_file_is_reported() {
    let dir = store_dir();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[sync]\nmode = \"periodic\"\ninterval_ms = 0\n").unwrap();

    let err = StoreConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroSyncInterval));

    let unified: seglog::Error = err.into();
    assert!(matches!(unified, seglog::Error::Config(_)));
}
