//! Tests for loading patcher configuration

use chunk_core::{ChunkParserPatcher, Error, PatcherConfig, SubChunkQuery, UndoBehavior};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chunk.toml");
    fs::write(&path, "max_depth = 8\nundo = \"no-undo-point\"\n").unwrap();

    let config = PatcherConfig::load(&path).unwrap();
    assert_eq!(config.max_depth, 8);
    assert_eq!(config.undo, UndoBehavior::NoUndoPoint);
    assert!(config.verify_before_commit);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = PatcherConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(matches!(
        PatcherConfig::from_toml_str("max_depth = 0"),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        PatcherConfig::from_toml_str("max_dpeth = 3"),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        PatcherConfig::from_toml_str("undo = \"sometimes\""),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_config_roundtrips_through_toml() {
    let config = PatcherConfig {
        max_depth: 12,
        verify_before_commit: false,
        undo: UndoBehavior::NoUndoPoint,
    };
    let toml = config.to_toml_string().unwrap();
    assert_eq!(PatcherConfig::from_toml_str(&toml).unwrap(), config);
}

#[test]
fn test_max_depth_applies_to_sessions() {
    let raw = "<TRACK\n<ITEM\n<TAKE\n>\n>\n>\n";
    let config = PatcherConfig::from_toml_str("max_depth = 2").unwrap();
    let session = ChunkParserPatcher::from_text(raw).unwrap().with_config(config);
    let err = session
        .get_sub_chunk(&SubChunkQuery::new("ITEM"))
        .unwrap_err();
    assert!(err.is_malformed());

    let session = ChunkParserPatcher::from_text(raw).unwrap();
    assert!(session.get_sub_chunk(&SubChunkQuery::new("ITEM")).unwrap().is_some());
}
