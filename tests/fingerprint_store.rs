use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use proptest::prelude::*;

use scriptgate::errors::ScriptgateError;
use scriptgate::fingerprint::{
    compute_file_hash, FingerprintSnapshot, FingerprintStore, DIGEST_HEX_LEN,
};
use scriptgate::fs::mock::MockFileSystem;
use scriptgate::fs::FileSystem;

type TestResult = Result<(), Box<dyn Error>>;

fn store(fs: &MockFileSystem) -> FingerprintStore {
    FingerprintStore::new(Arc::new(fs.clone()))
}

fn snapshot(entries: &[(&str, &str)]) -> FingerprintSnapshot {
    entries
        .iter()
        .map(|(p, d)| (p.to_string(), d.to_string()))
        .collect()
}

#[test]
fn hashing_uses_blake3() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("/p/test.txt", b"hello world");

    let hash = compute_file_hash(&fs, Path::new("/p/test.txt"))?;
    assert_eq!(hash, "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24");
    assert_eq!(hash.len(), DIGEST_HEX_LEN);
    Ok(())
}

#[test]
fn vanished_files_are_left_out_of_the_snapshot() {
    let fs = MockFileSystem::new();
    fs.add_file("/p/a.js", "a");
    fs.add_file("/p/b.js", "b");

    let files = vec![
        PathBuf::from("/p/a.js"),
        PathBuf::from("/p/gone.js"),
        PathBuf::from("/p/b.js"),
    ];
    let snap = store(&fs).compute_snapshot(&files);

    assert_eq!(snap.len(), 2);
    assert!(snap.contains_key("/p/a.js"));
    assert!(snap.contains_key("/p/b.js"));
}

#[test]
fn comparison_detects_additions_removals_and_edits() {
    let base = snapshot(&[("/p/a.js", "1"), ("/p/b.js", "2")]);

    assert!(FingerprintStore::unchanged(&base, &base.clone()));

    let added = snapshot(&[("/p/a.js", "1"), ("/p/b.js", "2"), ("/p/c.js", "3")]);
    let removed = snapshot(&[("/p/a.js", "1")]);
    let edited = snapshot(&[("/p/a.js", "1"), ("/p/b.js", "9")]);
    let renamed = snapshot(&[("/p/a.js", "1"), ("/p/x.js", "2")]);

    for other in [&added, &removed, &edited, &renamed] {
        assert!(!FingerprintStore::unchanged(&base, other));
        assert!(!FingerprintStore::unchanged(other, &base));
    }
}

#[test]
fn missing_state_file_means_never_run() -> TestResult {
    let fs = MockFileSystem::new();
    let previous = store(&fs).load_previous(Path::new("/p/target/scriptgate/build"))?;
    assert!(previous.is_empty());
    Ok(())
}

#[test]
fn state_file_lines_split_on_the_first_separator() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file(
        "/p/target/scriptgate/build",
        "/p/a.js::abc\n/p/odd::name.js::def\nnot-a-record\n\n",
    );

    let previous = store(&fs).load_previous(Path::new("/p/target/scriptgate/build"))?;

    let mut expected = BTreeMap::new();
    expected.insert("/p/a.js".to_string(), "abc".to_string());
    expected.insert("/p/odd".to_string(), "name.js::def".to_string());
    assert_eq!(previous, expected);
    Ok(())
}

#[test]
fn persisting_an_empty_snapshot_removes_the_state_file() -> TestResult {
    let fs = MockFileSystem::new();
    let state_file = Path::new("/p/target/scriptgate/build");
    let store = store(&fs);

    store.persist(state_file, &snapshot(&[("/p/a.js", "1")]))?;
    assert!(fs.exists(state_file));

    store.persist(state_file, &FingerprintSnapshot::new())?;
    assert!(!fs.exists(state_file));
    assert!(store.load_previous(state_file)?.is_empty());
    Ok(())
}

#[test]
fn state_directory_creation_failure_is_fatal() {
    let fs = MockFileSystem::new();
    fs.deny_dir_creation("/p/target");
    let state_file = Path::new("/p/target/scriptgate/build");

    let err = store(&fs)
        .persist(state_file, &snapshot(&[("/p/a.js", "1")]))
        .expect_err("directory creation is denied");

    match err {
        ScriptgateError::StateFile { path, .. } => assert_eq!(path, state_file),
        other => panic!("Expected StateFile error, got: {:?}", other),
    }
}

#[test]
fn persisted_file_has_one_line_per_entry() -> TestResult {
    let fs = MockFileSystem::new();
    let state_file = Path::new("/p/target/scriptgate/build");

    store(&fs).persist(state_file, &snapshot(&[("/p/b.js", "2"), ("/p/a.js", "1")]))?;

    let contents = String::from_utf8(fs.contents(state_file).unwrap_or_default())?;
    assert_eq!(contents, "/p/a.js::1\n/p/b.js::2\n");
    Ok(())
}

proptest! {
    #[test]
    fn persist_then_load_returns_the_same_snapshot(
        entries in proptest::collection::btree_map("/p/[a-z]{1,8}\\.js", "[0-9a-f]{64}", 0..12)
    ) {
        let fs = MockFileSystem::new();
        let store = store(&fs);
        let state_file = Path::new("/p/target/scriptgate/build");

        store.persist(state_file, &entries).unwrap();
        let loaded = store.load_previous(state_file).unwrap();

        prop_assert_eq!(&loaded, &entries);
        prop_assert!(FingerprintStore::unchanged(&loaded, &entries));
    }
}
