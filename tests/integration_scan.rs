//! Integration tests for orchestrated scans against a persistent store.
//!
//! These tests verify end-to-end behavior including:
//! - Cache reuse across consecutive scans
//! - Re-fingerprinting of touched files
//! - Replace-not-merge persistence
//! - Missing-root resilience
//! - Agreement between SQL and in-memory duplicate marking
//! - Non-UTF-8 file names surviving a round trip

use assert_fs::prelude::*;
use assert_fs::TempDir;
use filetime::{set_file_mtime, FileTime};
use media_indexer::core::classifier::{Category, CategoryConfig};
use media_indexer::core::duplicates::mark_duplicates;
use media_indexer::core::fingerprint::Fingerprint;
use media_indexer::core::record::IndexRecord;
use media_indexer::core::store::{SnapshotStore, SqliteStore};
use media_indexer::core::ScanOrchestrator;
use media_indexer::IndexerError;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

fn scan(roots: Vec<PathBuf>, db_path: &Path) -> media_indexer::Result<media_indexer::events::ScanSummary> {
    let store = Arc::new(SqliteStore::open(db_path)?);
    ScanOrchestrator::builder()
        .roots(roots)
        .store(store)
        .build()
        .run_silent()
}

fn media_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("films/a.mp4").write_binary(b"film content").unwrap();
    temp.child("films/copy/a.mp4").write_binary(b"film content").unwrap();
    temp.child("music/song.flac").write_binary(b"lossless").unwrap();
    temp.child("notes.txt").write_str("not media").unwrap();
    for path in ["films/a.mp4", "films/copy/a.mp4", "music/song.flac"] {
        set_file_mtime(temp.child(path).path(), FileTime::from_unix_time(1_600_000_000, 0)).unwrap();
    }
    temp
}

#[test]
fn second_scan_reuses_every_unchanged_file() {
    let media = media_tree();
    let data = TempDir::new().unwrap();
    let db_path = data.child("index.db");

    let first = scan(vec![media.path().to_path_buf()], db_path.path()).unwrap();
    let second = scan(vec![media.path().to_path_buf()], db_path.path()).unwrap();

    db_path.assert(predicate::path::exists());
    assert_eq!(first.total_files, 3);
    assert_eq!(first.cache_misses, 3);
    assert_eq!(second.total_files, 3);
    assert_eq!(second.cache_hits, 3);
    assert_eq!(second.cache_misses, 0);
}

#[test]
fn touched_file_is_fingerprinted_again() {
    let media = media_tree();
    let data = TempDir::new().unwrap();
    let db_path = data.child("index.db");
    scan(vec![media.path().to_path_buf()], db_path.path()).unwrap();

    // Same bytes, newer mtime
    set_file_mtime(
        media.child("music/song.flac").path(),
        FileTime::from_unix_time(1_600_000_001, 0),
    )
    .unwrap();
    let second = scan(vec![media.path().to_path_buf()], db_path.path()).unwrap();

    assert_eq!(second.cache_hits, 2);
    assert_eq!(second.cache_misses, 1);
}

#[test]
fn deleted_file_disappears_from_index() {
    let media = media_tree();
    let data = TempDir::new().unwrap();
    let db_path = data.child("index.db");
    scan(vec![media.path().to_path_buf()], db_path.path()).unwrap();

    std::fs::remove_file(media.child("films/copy/a.mp4").path()).unwrap();
    let second = scan(vec![media.path().to_path_buf()], db_path.path()).unwrap();

    let store = SqliteStore::open(db_path.path()).unwrap();
    assert_eq!(second.total_files, 2);
    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(second.duplicate_files, 0);
    assert!(!store
        .load_snapshot()
        .unwrap()
        .contains_key(&media.child("films/copy/a.mp4").path().to_path_buf()));
}

#[test]
fn identical_content_is_flagged_once() {
    let media = media_tree();
    let data = TempDir::new().unwrap();
    let db_path = data.child("index.db");

    let summary = scan(vec![media.path().to_path_buf()], db_path.path()).unwrap();

    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.duplicate_size_bytes, b"film content".len() as u64);

    let store = SqliteStore::open(db_path.path()).unwrap();
    let groups = store.duplicate_groups().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].survivor, media.child("films/a.mp4").path());
    assert_eq!(groups[0].duplicates, vec![media.child("films/copy/a.mp4").path().to_path_buf()]);
}

#[test]
fn missing_root_does_not_fail_scan() {
    let media = media_tree();
    let data = TempDir::new().unwrap();
    let db_path = data.child("index.db");
    let missing = media.path().join("unplugged-drive");

    let summary = scan(vec![missing, media.path().to_path_buf()], db_path.path()).unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.errors.len(), 1);
}

#[test]
fn other_category_picks_up_non_media() {
    let media = media_tree();
    let data = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(data.child("index.db").path()).unwrap());

    let summary = ScanOrchestrator::builder()
        .roots(vec![media.path().to_path_buf()])
        .categories(CategoryConfig {
            include_other: true,
            ..Default::default()
        })
        .store(store.clone())
        .build()
        .run_silent()
        .unwrap();

    assert_eq!(summary.total_files, 4);
    let snapshot = store.load_snapshot().unwrap();
    assert_eq!(
        snapshot[&media.child("notes.txt").path().to_path_buf()].category,
        Category::Other
    );
}

#[test]
fn corrupt_database_fails_before_scanning() {
    let media = media_tree();
    let data = TempDir::new().unwrap();
    let db_path = data.child("index.db");
    db_path.write_binary(&[0x5A; 8192]).unwrap();

    let result = scan(vec![media.path().to_path_buf()], db_path.path());

    assert!(matches!(result, Err(IndexerError::Store(_))));
}

#[test]
fn sql_and_in_memory_marking_agree() {
    let names = [
        ("/m/a-b/x.mp4", "d1"),
        ("/m/a/b.mp4", "d1"),
        ("/m/z.mp4", "d1"),
        ("/m/only.mp3", "d2"),
        ("/m/B.mkv", "d3"),
        ("/m/b.mkv", "d3"),
        ("/m/c/1.wav", "d4"),
        ("/m/c/2.wav", "d4"),
    ];
    let mut records: Vec<IndexRecord> = names
        .iter()
        .map(|(path, digest)| {
            IndexRecord::fingerprinted(
                PathBuf::from(path),
                7,
                UNIX_EPOCH + Duration::from_secs(1),
                Category::Video,
                Fingerprint {
                    digest: digest.to_string(),
                    duration: Duration::ZERO,
                },
            )
        })
        .collect();

    let store = SqliteStore::open_in_memory().unwrap();
    store.replace_snapshot(&records).unwrap();
    let marked_in_sql = store.mark_duplicates().unwrap();
    let groups = mark_duplicates(&mut records);

    let snapshot = store.load_snapshot().unwrap();
    for record in &records {
        assert_eq!(
            snapshot[&record.path].is_duplicate,
            record.is_duplicate,
            "disagreement on {}",
            record.path.display()
        );
    }
    assert_eq!(marked_in_sql, records.iter().filter(|r| r.is_duplicate).count());
    assert_eq!(store.duplicate_groups().unwrap(), groups);
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_names_are_reused_on_rescan() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let media = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    let db_path = data.child("index.db");
    for name in [&b"clip\xff.mp4"[..], &b"clip\xfe.mp4"[..]] {
        let path = media.path().join(OsStr::from_bytes(name));
        std::fs::write(&path, name).unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();
    }

    let first = scan(vec![media.path().to_path_buf()], db_path.path()).unwrap();
    let second = scan(vec![media.path().to_path_buf()], db_path.path()).unwrap();

    assert_eq!(first.total_files, 2);
    assert_eq!(second.cache_hits, 2);
    assert_eq!(second.cache_misses, 0);
    let snapshot = SqliteStore::open(db_path.path()).unwrap().load_snapshot().unwrap();
    assert!(snapshot.contains_key(&media.path().join(OsStr::from_bytes(b"clip\xff.mp4"))));
}
