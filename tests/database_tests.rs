//! Tests for Database
//!
//! These tests verify:
//! - Basic get/put/delete operations
//! - Typed values through custom codecs
//! - Absent keys read as None, never as an empty value
//! - Persistence across close/reopen
//! - Handle lifecycle (close, use after close, single handle per path)

use strandkv::codec::CodecError;
use strandkv::config::{BackendKind, Config, SyncStrategy};
use strandkv::{BatchOp, Database, Decode, Encode, Namespace, StrandError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup_temp_db() -> (TempDir, Database) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (temp_dir, db)
}

/// Text type whose codec is deliberately asymmetric
#[derive(Debug, PartialEq)]
struct TaggedText(String);

impl Encode for TaggedText {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        format!("{}-SERIALIZE", self.0).encode()
    }
}

impl Decode for TaggedText {
    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(TaggedText(String::decode(bytes)? + "-DESERIALIZE"))
    }
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("mydb");

    let db = Database::open(&data_dir).unwrap();

    assert!(data_dir.exists());
    assert!(db.namespace().is_root());
    db.close().unwrap();
}

#[test]
fn test_put_get_text() {
    let (_temp, db) = setup_temp_db();

    db.put("testText", "lolamkhaha").unwrap();
    db.put("testEmoji", "😂").unwrap();
    db.put("testTextEmoji", "emojitext 😂").unwrap();
    db.put("testMultipleEmoji", "😂😂😂").unwrap();

    assert_eq!(db.get::<String>("testText").unwrap().as_deref(), Some("lolamkhaha"));
    assert_eq!(db.get::<String>("testEmoji").unwrap().as_deref(), Some("😂"));
    assert_eq!(db.get::<String>("testTextEmoji").unwrap().as_deref(), Some("emojitext 😂"));
    assert_eq!(db.get::<String>("testMultipleEmoji").unwrap().as_deref(), Some("😂😂😂"));
}

#[test]
fn test_get_nonexistent_key() {
    let (_temp, db) = setup_temp_db();

    assert_eq!(db.get::<String>("nonexistent").unwrap(), None);
    assert!(!db.contains_key("nonexistent").unwrap());
}

#[test]
fn test_put_overwrite() {
    let (_temp, db) = setup_temp_db();

    db.put("key", "value1").unwrap();
    db.put("key", "value2").unwrap();

    assert_eq!(db.get::<String>("key").unwrap().as_deref(), Some("value2"));
}

#[test]
fn test_delete() {
    let (_temp, db) = setup_temp_db();

    db.put("testDeleteKey", "this is a simple value 😘").unwrap();
    db.delete("testDeleteKey").unwrap();

    assert_eq!(db.get::<String>("testDeleteKey").unwrap(), None);
}

#[test]
fn test_delete_nonexistent_key() {
    let (_temp, db) = setup_temp_db();

    // Should not error
    db.delete("nonexistent").unwrap();
    assert_eq!(db.get::<String>("nonexistent").unwrap(), None);
}

#[test]
fn test_deleted_key_differs_from_empty_value() {
    let (_temp, db) = setup_temp_db();

    db.put("empty", "").unwrap();
    db.put("gone", "value").unwrap();
    db.delete("gone").unwrap();

    assert_eq!(db.get::<String>("empty").unwrap(), Some(String::new()));
    assert!(db.contains_key("empty").unwrap());
    assert_eq!(db.get::<String>("gone").unwrap(), None);
    assert!(!db.contains_key("gone").unwrap());
}

fn setup_memory_db() -> Database {
    init_tracing();
    let config = Config::builder().backend(BackendKind::Memory).build();
    Database::open_with_config(config, Namespace::root()).unwrap()
}

/// Checks keys the engine cannot hold on a root-namespace database
fn assert_unstorable_keys_rejected(db: &Database) {
    let long_key = vec![b'k'; 70_000];

    assert!(matches!(db.put("", "v"), Err(StrandError::InvalidKey(_))));
    assert!(matches!(db.put(&long_key, "v"), Err(StrandError::InvalidKey(_))));
    assert!(matches!(
        db.batch([BatchOp::put("ok", &"1"), BatchOp::put(&long_key, &"2")]),
        Err(StrandError::InvalidKey(_))
    ));

    assert_eq!(db.get::<String>("").unwrap(), None);
    assert_eq!(db.get::<String>(&long_key).unwrap(), None);
    assert_eq!(db.get::<String>("ok").unwrap(), None);
    db.delete("").unwrap();
    db.delete(&long_key).unwrap();

    // The handle is still usable afterwards
    db.put("ok", "1").unwrap();
    assert_eq!(db.get::<String>("ok").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_unstorable_keys_rejected_fjall() {
    let (_temp, db) = setup_temp_db();
    assert_unstorable_keys_rejected(&db);
}

#[test]
fn test_unstorable_keys_rejected_memory() {
    let db = setup_memory_db();
    assert_unstorable_keys_rejected(&db);
}

#[test]
fn test_empty_logical_key_in_namespace() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let db = Database::open_with_namespace(temp.path(), "ns/").unwrap();

    db.put("", "namespace value").unwrap();
    assert_eq!(db.get::<String>("").unwrap().as_deref(), Some("namespace value"));

    let root = db.with_namespace("");
    assert_eq!(root.get::<String>("ns/").unwrap().as_deref(), Some("namespace value"));
}

#[test]
fn test_namespace_prefix_counts_toward_key_limit() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let db = Database::open_with_namespace(temp.path(), "ns/").unwrap();

    let fits = vec![b'k'; 65_535 - 3];
    db.put(&fits, "v").unwrap();
    assert_eq!(db.get::<String>(&fits).unwrap().as_deref(), Some("v"));

    let too_long = vec![b'k'; 65_535 - 2];
    assert!(matches!(db.put(&too_long, "v"), Err(StrandError::InvalidKey(_))));
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_asymmetric_codec_round_trip() {
    let (_temp, db) = setup_temp_db();

    db.put("testText", &TaggedText("test".into())).unwrap();

    let value: TaggedText = db.get("testText").unwrap().unwrap();
    assert_eq!(value, TaggedText("test-SERIALIZE-DESERIALIZE".into()));

    // The stored bytes carry only the encode-side transform
    let raw: Vec<u8> = db.get("testText").unwrap().unwrap();
    assert_eq!(raw, b"test-SERIALIZE");
}

#[test]
fn test_raw_bytes_fidelity() {
    let (_temp, db) = setup_temp_db();
    let data: Vec<u8> = (0..=255).collect();

    db.put(b"binary", &data).unwrap();

    assert_eq!(db.get::<Vec<u8>>(b"binary").unwrap(), Some(data));
}

#[test]
fn test_invalid_utf8_is_decode_error() {
    let (_temp, db) = setup_temp_db();

    db.put("bad", &[0xffu8, 0xfe, 0xfd][..]).unwrap();

    let result = db.get::<String>("bad");
    assert!(matches!(result, Err(StrandError::Decode(CodecError::InvalidUtf8(_)))));

    // Same bytes are still readable raw
    assert_eq!(db.get::<Vec<u8>>("bad").unwrap(), Some(vec![0xff, 0xfe, 0xfd]));
}

#[test]
fn test_encode_error_has_no_side_effect() {
    struct Unencodable;

    impl Encode for Unencodable {
        fn encode(&self) -> Result<Vec<u8>, CodecError> {
            Err(CodecError::Malformed("refuses to encode".into()))
        }
    }

    let (_temp, db) = setup_temp_db();
    db.put("key", "original").unwrap();

    let result = db.put("key", &Unencodable);

    assert!(matches!(result, Err(StrandError::Encode(_))));
    assert_eq!(db.get::<String>("key").unwrap().as_deref(), Some("original"));
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let db = Database::open(temp_dir.path()).unwrap();
        db.put("key1", "value1").unwrap();
        db.put("key2", "value2").unwrap();
        db.delete("key2").unwrap();
        db.close().unwrap();
    }

    let db = Database::open(temp_dir.path()).unwrap();
    assert_eq!(db.get::<String>("key1").unwrap().as_deref(), Some("value1"));
    assert_eq!(db.get::<String>("key2").unwrap(), None);
}

#[test]
fn test_drop_releases_handle() {
    let temp_dir = TempDir::new().unwrap();

    {
        let db = Database::open(temp_dir.path()).unwrap();
        db.put("key", "value").unwrap();
        // No explicit close
    }

    let db = Database::open(temp_dir.path()).unwrap();
    assert_eq!(db.get::<String>("key").unwrap().as_deref(), Some("value"));
}

#[test]
fn test_sync_every_write() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();

    let db = Database::open_with_config(config, Namespace::root()).unwrap();
    db.put("key", "value").unwrap();
    db.persist().unwrap();

    assert_eq!(db.get::<String>("key").unwrap().as_deref(), Some("value"));
}

#[test]
fn test_custom_partition_is_separate() {
    let temp_dir = TempDir::new().unwrap();

    {
        let db = Database::open(temp_dir.path()).unwrap();
        db.put("key", "in default").unwrap();
        db.close().unwrap();
    }

    let config = Config::builder()
        .data_dir(temp_dir.path())
        .partition("other")
        .build();
    let db = Database::open_with_config(config, Namespace::root()).unwrap();

    assert_eq!(db.get::<String>("key").unwrap(), None);
}

#[test]
fn test_memory_backend() {
    let config = Config::builder().backend(BackendKind::Memory).build();
    let db = Database::open_with_config(config, Namespace::new("mem/")).unwrap();

    db.put("key", "value").unwrap();
    assert_eq!(db.get::<String>("key").unwrap().as_deref(), Some("value"));
    assert_eq!(db.handle().backend_name(), "memory");

    db.close().unwrap();
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_use_after_close_fails() {
    let (_temp, db) = setup_temp_db();
    db.put("key", "value").unwrap();

    db.close().unwrap();

    assert!(db.is_closed());
    assert!(matches!(db.get::<String>("key"), Err(StrandError::Closed)));
    assert!(matches!(db.put("key", "value"), Err(StrandError::Closed)));
    assert!(matches!(db.delete("key"), Err(StrandError::Closed)));
    assert!(matches!(db.contains_key("key"), Err(StrandError::Closed)));
    assert!(matches!(db.batch(Vec::new()), Err(StrandError::Closed)));
    assert!(matches!(db.iter::<String, String>(), Err(StrandError::Closed)));
    assert!(matches!(db.persist(), Err(StrandError::Closed)));
}

#[test]
fn test_close_is_idempotent() {
    let (_temp, db) = setup_temp_db();

    db.close().unwrap();
    db.close().unwrap();

    assert!(db.is_closed());
}

#[test]
fn test_second_open_on_same_path_fails() {
    let (temp, db) = setup_temp_db();

    let second = Database::open(temp.path());
    assert!(matches!(second, Err(StrandError::Open(_))));

    // Released by close
    db.close().unwrap();
    let reopened = Database::open(temp.path()).unwrap();
    reopened.close().unwrap();
}

#[test]
fn test_open_on_file_path_fails() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("not_a_dir");
    std::fs::write(&file_path, b"occupied").unwrap();

    let result = Database::open(&file_path);
    assert!(matches!(result, Err(StrandError::Open(_))));
}

#[test]
fn test_invalid_config_fails_open() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .partition("not valid")
        .build();

    let result = Database::open_with_config(config, Namespace::root());
    assert!(matches!(result, Err(StrandError::Config(_))));
}

#[test]
fn test_close_is_shared_across_namespaces() {
    let (_temp, db) = setup_temp_db();
    let other = db.with_namespace("other/");

    db.close().unwrap();

    assert!(other.is_closed());
    assert!(matches!(other.get::<String>("key"), Err(StrandError::Closed)));
}
