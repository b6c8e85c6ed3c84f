use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tempfile::{tempdir, TempDir};

use userpass_core::codec;
use userpass_core::crypto;
use userpass_core::source::{discover, source_path};
use userpass_core::vault::PromptRequest;
use userpass_core::{
    AgeVault, DecryptOptions, KeyPattern, PassphrasePrompt, Record, Resolution, Result, Store,
    UserpassError, Vault,
};

const PASSPHRASE: &str = "test-passphrase-secure-123";

/// Vault that keeps sources in plaintext.
struct PlainVault;

impl Vault for PlainVault {
    fn decrypt(&mut self, source: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(source)?)
    }

    fn encrypt(&mut self, target: &Path, plaintext: &[u8]) -> Result<()> {
        Ok(fs::write(userpass_core::fs::pending_path(target), plaintext)?)
    }
}

/// Vault whose encryption leaves an empty pending file behind.
struct EmptyOutputVault;

impl Vault for EmptyOutputVault {
    fn decrypt(&mut self, source: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(source)?)
    }

    fn encrypt(&mut self, target: &Path, _plaintext: &[u8]) -> Result<()> {
        Ok(fs::write(userpass_core::fs::pending_path(target), b"")?)
    }
}

/// Vault whose encryption errors after writing a partial pending file.
struct CrashingVault;

impl Vault for CrashingVault {
    fn decrypt(&mut self, source: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(source)?)
    }

    fn encrypt(&mut self, target: &Path, _plaintext: &[u8]) -> Result<()> {
        fs::write(userpass_core::fs::pending_path(target), b"partial")?;
        Err(UserpassError::Crypto("encryptor crashed".to_string()))
    }
}

/// Prompt that always answers with the test passphrase.
struct FixedPrompt;

impl PassphrasePrompt for FixedPrompt {
    fn prompt(&mut self, _request: &PromptRequest) -> Result<Option<SecretString>> {
        Ok(Some(SecretString::from(PASSPHRASE.to_string())))
    }
}

fn record(key: &str, timestamp: i64, username: &str, secret: &str) -> Record {
    Record::new(key, timestamp, username, secret).expect("valid record")
}

fn write_plain_source(dir: &TempDir, host: &str, records: &[Record]) -> PathBuf {
    let path = source_path(dir.path(), host, "age");
    fs::write(&path, codec::encode(records)).expect("write source");
    path
}

fn two_host_sources(dir: &TempDir) -> (PathBuf, PathBuf) {
    let a = write_plain_source(
        dir,
        "laptop",
        &[
            record("site", 100, "alice", "p1"),
            record("mail", 400, "bob", "m1"),
            record("bank", 500, "carol", "b1"),
        ],
    );
    let b = write_plain_source(
        dir,
        "desktop",
        &[
            record("site", 200, "alice", "p2"),
            record("bank", 500, "carol", "b1"),
            record("forum", 50, "dave", "f1"),
        ],
    );
    (a, b)
}

#[test]
fn test_merge_is_commutative() {
    let dir = tempdir().unwrap();
    let (a, b) = two_host_sources(&dir);

    let mut forward = Store::new();
    forward.load(&[&a, &b], &mut PlainVault).unwrap();
    let mut backward = Store::new();
    backward.load(&[&b, &a], &mut PlainVault).unwrap();

    let forward_keys: Vec<&str> = forward.keys().collect();
    let backward_keys: Vec<&str> = backward.keys().collect();
    assert_eq!(forward_keys, backward_keys);
    for key in forward_keys {
        assert_eq!(forward.find(key), backward.find(key), "key {}", key);
    }
}

#[test]
fn test_merge_is_commutative_for_distinct_records_sharing_a_timestamp() {
    let dir = tempdir().unwrap();
    let a = write_plain_source(&dir, "laptop", &[record("site", 500, "alice", "x")]);
    let b = write_plain_source(&dir, "desktop", &[record("site", 500, "bob", "y")]);

    let mut forward = Store::new();
    forward.load(&[&a, &b], &mut PlainVault).unwrap();
    let mut backward = Store::new();
    backward.load(&[&b, &a], &mut PlainVault).unwrap();

    assert_eq!(forward.find("site"), backward.find("site"));
    assert_eq!(
        forward.current_username("site"),
        backward.current_username("site")
    );
    let pattern = KeyPattern::parse("site", true).unwrap();
    assert_eq!(
        forward.search(&pattern, Resolution::Latest).unwrap(),
        backward.search(&pattern, Resolution::Latest).unwrap()
    );
    assert_eq!(
        forward.search(&pattern, Resolution::All).unwrap(),
        backward.search(&pattern, Resolution::All).unwrap()
    );
}

#[test]
fn test_merged_view_resolves_by_timestamp() {
    let dir = tempdir().unwrap();
    let (a, b) = two_host_sources(&dir);

    let mut store = Store::new();
    store.load(&[a, b], &mut PlainVault).unwrap();

    // Both hosts' writes to "site" survive; the newest is last.
    let site = store.search(&KeyPattern::parse("^site$", false).unwrap(), Resolution::Latest);
    let secrets: Vec<String> = site.unwrap().into_iter().map(|r| r.secret).collect();
    assert_eq!(secrets, vec!["p1", "p2"]);

    // The same record present in both files shows once.
    let bank = store
        .search(&KeyPattern::parse("bank", true).unwrap(), Resolution::Latest)
        .unwrap();
    assert_eq!(bank, vec![record("bank", 500, "carol", "b1")]);
    let bank_all = store
        .search(&KeyPattern::parse("bank", true).unwrap(), Resolution::All)
        .unwrap();
    assert_eq!(bank_all.len(), 2);
}

#[test]
fn test_single_source_save_round_trips() {
    let dir = tempdir().unwrap();
    let (a, _) = two_host_sources(&dir);

    let mut store = Store::new();
    store.load(&[&a], &mut PlainVault).unwrap();
    store.add("site", 300, "alice", "p3").unwrap();
    let written = store.save(None, &mut PlainVault).unwrap();
    assert_eq!(written, a);

    let mut reloaded = Store::new();
    reloaded.load(&[&a], &mut PlainVault).unwrap();
    assert_eq!(
        reloaded.find("site"),
        vec![
            ("alice".to_string(), "p1".to_string()),
            ("alice".to_string(), "p3".to_string()),
        ]
    );
    assert_eq!(reloaded.len(), 4);
}

#[test]
fn test_multi_source_save_is_refused() {
    let dir = tempdir().unwrap();
    let (a, b) = two_host_sources(&dir);
    let before_a = fs::read(&a).unwrap();

    let mut store = Store::new();
    store.load(&[&a, &b], &mut PlainVault).unwrap();
    store.add("site", 300, "alice", "p3").unwrap();

    assert!(matches!(
        store.save(None, &mut PlainVault),
        Err(UserpassError::AmbiguousTarget { sources: 2 })
    ));
    assert!(matches!(
        store.save(Some(&a), &mut PlainVault),
        Err(UserpassError::AmbiguousTarget { sources: 2 })
    ));
    assert_eq!(fs::read(&a).unwrap(), before_a);
}

#[test]
fn test_empty_encryption_output_leaves_original_untouched() {
    let dir = tempdir().unwrap();
    let (a, _) = two_host_sources(&dir);
    let before = fs::read(&a).unwrap();

    let mut store = Store::new();
    store.load(&[&a], &mut PlainVault).unwrap();
    store.add("site", 300, "alice", "p3").unwrap();

    let result = store.save(None, &mut EmptyOutputVault);
    assert!(matches!(result, Err(UserpassError::EncryptionFailed(_))));
    assert_eq!(fs::read(&a).unwrap(), before);
    assert!(!userpass_core::fs::pending_path(&a).exists());
}

#[test]
fn test_encryption_error_leaves_original_untouched() {
    let dir = tempdir().unwrap();
    let (a, _) = two_host_sources(&dir);
    let before = fs::read(&a).unwrap();

    let mut store = Store::new();
    store.load(&[&a], &mut PlainVault).unwrap();

    let result = store.save(None, &mut CrashingVault);
    assert!(matches!(result, Err(UserpassError::Crypto(_))));
    assert_eq!(fs::read(&a).unwrap(), before);
    assert!(!userpass_core::fs::pending_path(&a).exists());
}

#[test]
fn test_loading_skips_corrupt_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("userpass.old.age");
    fs::write(
        &path,
        b"100\tsite\talice\tp1\n0\tsite\talice\tzero\n\nnot-a-number\tx\ty\tz\n200\tsite\tali",
    )
    .unwrap();

    let mut store = Store::new();
    assert_eq!(store.load(&[&path], &mut PlainVault).unwrap(), 1);
    assert_eq!(store.find("site"), vec![("alice".to_string(), "p1".to_string())]);
}

#[test]
fn test_age_encrypted_host_files_merge() {
    let dir = tempdir().unwrap();
    let passphrase = SecretString::from(PASSPHRASE.to_string());
    let laptop = source_path(dir.path(), "laptop", "age");
    let desktop = source_path(dir.path(), "desktop", "age");
    fs::write(
        &laptop,
        crypto::encrypt(&codec::encode(&[record("site", 100, "alice", "p1")]), &passphrase)
            .unwrap(),
    )
    .unwrap();
    fs::write(
        &desktop,
        crypto::encrypt(&codec::encode(&[record("site", 200, "alice", "p2")]), &passphrase)
            .unwrap(),
    )
    .unwrap();

    let mut vault = AgeVault::new(FixedPrompt, DecryptOptions::default());
    let sources = discover(dir.path(), "age").unwrap();
    assert_eq!(sources.len(), 2);

    let mut merged = Store::new();
    merged.load(&sources, &mut vault).unwrap();
    assert_eq!(merged.current_username("site").as_deref(), Some("alice"));
    assert_eq!(merged.find("site").last().map(|(_, s)| s.as_str()), Some("p2"));

    // Update protocol: write only to this host's file.
    let mut local = Store::new();
    local.load(&[&laptop], &mut vault).unwrap();
    local.add("site", 300, "alice", "p3").unwrap();
    local.save(None, &mut vault).unwrap();

    let on_disk = fs::read(&laptop).unwrap();
    assert!(!String::from_utf8_lossy(&on_disk).contains("p3"));

    let mut reread = Store::new();
    reread.load(&sources, &mut vault).unwrap();
    let secrets: Vec<String> = reread
        .find("site")
        .into_iter()
        .map(|(_, secret)| secret)
        .collect();
    assert_eq!(secrets, vec!["p1", "p2", "p3"]);
}

#[test]
fn test_new_host_file_created_from_empty_store() {
    let dir = tempdir().unwrap();
    let target = source_path(dir.path(), "fresh", "age");
    let mut vault = AgeVault::new(FixedPrompt, DecryptOptions::default());

    let mut store = Store::new();
    store.add("site", 100, "alice", "p1").unwrap();
    store.save(Some(&target), &mut vault).unwrap();

    let mut reloaded = Store::new();
    reloaded.load(&[&target], &mut vault).unwrap();
    assert_eq!(reloaded.find("site"), vec![("alice".to_string(), "p1".to_string())]);
}

#[test]
fn test_missing_source_is_reported() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("userpass.gone.age");
    let mut vault = AgeVault::new(FixedPrompt, DecryptOptions::default());

    let mut store = Store::new();
    match store.load(&[&missing], &mut vault) {
        Err(UserpassError::SourceNotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected SourceNotFound, got {:?}", other),
    }
}
