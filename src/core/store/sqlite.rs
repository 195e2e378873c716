//! SQLite store backend for persistent storage.

use super::SnapshotStore;
use crate::core::classifier::Category;
use crate::core::record::{from_unix_nanos, to_unix_nanos, IndexRecord, Snapshot};
use crate::error::StoreError;
use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, ErrorCode};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// SQLite-backed persistent store
///
/// Uses WAL (Write-Ahead Logging) mode so report readers are not blocked
/// while a scan writes its replacement snapshot.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create an index database at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::OpenFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::init(conn, path.to_path_buf())
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::OpenFailed {
            path: PathBuf::from(":memory:"),
            reason: e.to_string(),
        })?;

        Self::init(conn, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, db_path: PathBuf) -> Result<Self, StoreError> {
        let corrupted = |e: rusqlite::Error| match e.sqlite_error_code() {
            Some(ErrorCode::NotADatabase) | Some(ErrorCode::DatabaseCorrupt) => {
                StoreError::Corrupted {
                    path: db_path.clone(),
                }
            }
            _ => StoreError::QueryFailed(e.to_string()),
        };

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(corrupted)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files (
                path BLOB PRIMARY KEY,
                size INTEGER NOT NULL,
                content_digest TEXT NOT NULL,
                duration_nanos INTEGER NOT NULL,
                last_modified INTEGER NOT NULL,
                scanned_at INTEGER NOT NULL,
                is_duplicate INTEGER NOT NULL DEFAULT 0,
                category TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_files_digest ON files(content_digest);",
        )
        .map_err(corrupted)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Where the database lives
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Number of persisted records
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Corrupted {
            path: self.db_path.clone(),
        })
    }
}

/// A row as stored, before validation
struct StoredRow {
    path: Vec<u8>,
    size: i64,
    content_digest: String,
    duration_nanos: i64,
    last_modified: i64,
    scanned_at: i64,
    is_duplicate: bool,
    category: String,
}

impl StoredRow {
    fn into_record(self, db_path: &Path) -> Result<IndexRecord, StoreError> {
        let category = Category::parse(&self.category).ok_or_else(|| StoreError::Corrupted {
            path: db_path.to_path_buf(),
        })?;

        Ok(IndexRecord {
            path: path_from_bytes(self.path).ok_or_else(|| StoreError::Corrupted {
                path: db_path.to_path_buf(),
            })?,
            size: self.size as u64,
            content_digest: self.content_digest,
            duration: Duration::from_nanos(self.duration_nanos.max(0) as u64),
            last_modified: from_unix_nanos(self.last_modified),
            scanned_at: DateTime::from_timestamp_nanos(self.scanned_at),
            is_duplicate: self.is_duplicate,
            category,
        })
    }
}

/// Paths are stored as their raw OS bytes so that non-UTF-8 names stay
/// distinct and `MIN(path)` orders the same way as `path_order`.
#[cfg(unix)]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> Option<PathBuf> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;
    (!bytes.is_empty()).then(|| PathBuf::from(OsString::from_vec(bytes)))
}

// Elsewhere only paths that are valid Unicode can be read back
#[cfg(not(unix))]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.as_os_str().as_encoded_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> Option<PathBuf> {
    String::from_utf8(bytes)
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn scanned_at_nanos(time: &DateTime<Utc>) -> i64 {
    time.timestamp_nanos_opt().unwrap_or(i64::MAX)
}

impl SnapshotStore for SqliteStore {
    fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT path, size, content_digest, duration_nanos, last_modified,
                    scanned_at, is_duplicate, category
             FROM files",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(StoredRow {
                path: match row.get_ref(0)? {
                    ValueRef::Blob(bytes) | ValueRef::Text(bytes) => bytes.to_vec(),
                    _ => Vec::new(),
                },
                size: row.get(1)?,
                content_digest: row.get(2)?,
                duration_nanos: row.get(3)?,
                last_modified: row.get(4)?,
                scanned_at: row.get(5)?,
                is_duplicate: row.get(6)?,
                category: row.get(7)?,
            })
        })?;

        let mut snapshot = Snapshot::new();
        for row in rows {
            let record = row?.into_record(&self.db_path)?;
            snapshot.insert(record.path.clone(), record);
        }

        debug!(records = snapshot.len(), "Loaded snapshot");
        Ok(snapshot)
    }

    fn replace_snapshot(&self, records: &[IndexRecord]) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM files", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT OR REPLACE INTO files
                 (path, size, content_digest, duration_nanos, last_modified,
                  scanned_at, is_duplicate, category)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )?;

            for record in records {
                insert.execute(params![
                    path_to_bytes(&record.path),
                    record.size as i64,
                    record.content_digest,
                    i64::try_from(record.duration.as_nanos()).unwrap_or(i64::MAX),
                    to_unix_nanos(record.last_modified),
                    scanned_at_nanos(&record.scanned_at),
                    record.is_duplicate,
                    record.category.as_str(),
                ])?;
            }
        }
        tx.commit()?;

        info!(records = records.len(), "Snapshot replaced");
        Ok(())
    }

    fn mark_duplicates(&self) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("UPDATE files SET is_duplicate = 0", [])?;
        let marked = tx.execute(
            "UPDATE files SET is_duplicate = 1
             WHERE content_digest IN (
                 SELECT content_digest FROM files
                 GROUP BY content_digest HAVING COUNT(*) > 1
             )
             AND path NOT IN (
                 SELECT MIN(path) FROM files GROUP BY content_digest
             )",
            [],
        )?;
        tx.commit()?;

        info!(marked, "Duplicates marked");
        Ok(marked)
    }
}
