//! # Record Module
//!
//! The index data model: one [`IndexRecord`] per indexed file, and the
//! [`Snapshot`] the store hands back for cache lookups.

use crate::core::classifier::Category;
use crate::core::fingerprint::Fingerprint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A previously persisted index, keyed by path
pub type Snapshot = HashMap<PathBuf, IndexRecord>;

/// One entry per indexed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Absolute path; unique within a snapshot
    pub path: PathBuf,
    /// Byte length at scan time
    pub size: u64,
    /// Lower-case hex SHA-256, or [`HASH_ERROR`](crate::core::fingerprint::HASH_ERROR)
    pub content_digest: String,
    /// Media duration, zero when not applicable
    pub duration: Duration,
    /// Filesystem modification time at scan time
    pub last_modified: SystemTime,
    /// When this record was produced
    pub scanned_at: DateTime<Utc>,
    /// Set by the duplicate classifier; never carried between scans
    pub is_duplicate: bool,
    /// Classifier output
    pub category: Category,
}

impl IndexRecord {
    /// Build a record from a fresh fingerprint
    pub fn fingerprinted(
        path: PathBuf,
        size: u64,
        last_modified: SystemTime,
        category: Category,
        fingerprint: Fingerprint,
    ) -> Self {
        Self {
            path,
            size,
            content_digest: fingerprint.digest,
            duration: fingerprint.duration,
            last_modified,
            scanned_at: Utc::now(),
            is_duplicate: false,
            category,
        }
    }

    /// Build a record reusing a previous record's digest and duration.
    ///
    /// Only the cheap attributes are refreshed; the duplicate flag starts
    /// cleared.
    pub fn reused(
        previous: &IndexRecord,
        size: u64,
        last_modified: SystemTime,
        category: Category,
    ) -> Self {
        Self {
            path: previous.path.clone(),
            size,
            content_digest: previous.content_digest.clone(),
            duration: previous.duration,
            last_modified,
            scanned_at: Utc::now(),
            is_duplicate: false,
            category,
        }
    }

    /// Whether the file still has the size and mtime this record saw
    pub fn matches_file(&self, size: u64, last_modified: SystemTime) -> bool {
        self.size == size && self.last_modified == last_modified
    }
}

/// Signed nanoseconds since the Unix epoch.
///
/// Persisting at full precision keeps a reloaded `last_modified` equal to
/// the value read from the filesystem, which the cache test depends on.
pub fn to_unix_nanos(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_nanos())
            .map(|n| -n)
            .unwrap_or(i64::MIN),
    }
}

/// Inverse of [`to_unix_nanos`]
pub fn from_unix_nanos(nanos: i64) -> SystemTime {
    if nanos >= 0 {
        UNIX_EPOCH + Duration::from_nanos(nanos as u64)
    } else {
        UNIX_EPOCH - Duration::from_nanos(nanos.unsigned_abs())
    }
}
