//! # Scanner Module
//!
//! Walks root directories and produces a fresh set of [`IndexRecord`]s,
//! reusing digests from the previous snapshot wherever a file is unchanged.
//!
//! ## Cache Rule
//! A file is a **hit** only if the previous snapshot holds a record for the
//! exact same path with identical size and modification time. Everything
//! else is a **miss** and gets fingerprinted again, even if the content
//! would turn out the same.
//!
//! ## Example
//! ```rust,ignore
//! let scanner = IncrementalScanner::new(classifier, fingerprinter, ScanConfig::default());
//! let output = scanner.scan(&roots, &previous, &events, &CancellationToken::new())?;
//! store.replace_snapshot(&output.records)?;
//! ```

mod incremental;
mod walker;

pub use incremental::IncrementalScanner;
pub use walker::{enumerate_root, Candidate, RootListing};

use crate::core::record::IndexRecord;
use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Configuration for the scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Fingerprint worker threads (0 = available parallelism)
    pub worker_threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            worker_threads: 0,
        }
    }
}

/// Whether a file's digest can be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision<'a> {
    /// Unchanged since the previous scan; carries the record to copy from
    Hit(&'a IndexRecord),
    /// New, resized or touched; must be fingerprinted
    Miss,
}

impl<'a> CacheDecision<'a> {
    /// Decide against the previous record for the same path, if any
    pub fn decide(previous: Option<&'a IndexRecord>, size: u64, modified: SystemTime) -> Self {
        match previous {
            Some(record) if record.matches_file(size, modified) => CacheDecision::Hit(record),
            _ => CacheDecision::Miss,
        }
    }
}

/// Counters for one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub roots_scanned: usize,
    pub roots_skipped: usize,
    pub files_seen: usize,
    pub files_skipped: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub hash_errors: usize,
    pub bytes_indexed: u64,
}

/// Result of a scan
#[derive(Debug)]
pub struct ScanOutput {
    /// New records, one per path, sorted by path
    pub records: Vec<IndexRecord>,
    /// Counters
    pub stats: ScanStats,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Cooperative cancellation flag shared between a caller and a running scan.
///
/// Checked before each file is processed, so a cancelled scan finishes at
/// most the files already in flight.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::Category;
    use crate::core::fingerprint::Fingerprint;
    use std::path::PathBuf;
    use std::time::Duration;

    fn previous(size: u64, modified: SystemTime) -> IndexRecord {
        IndexRecord::fingerprinted(
            PathBuf::from("/x/v.mp4"),
            size,
            modified,
            Category::Video,
            Fingerprint {
                digest: "digest1".to_string(),
                duration: Duration::from_secs(1),
            },
        )
    }

    #[test]
    fn unchanged_file_is_a_hit() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let record = previous(100, t);

        assert_eq!(
            CacheDecision::decide(Some(&record), 100, t),
            CacheDecision::Hit(&record)
        );
    }

    #[test]
    fn new_path_is_a_miss() {
        let t = SystemTime::now();
        assert_eq!(CacheDecision::decide(None, 100, t), CacheDecision::Miss);
    }

    #[test]
    fn size_or_mtime_change_is_a_miss() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let record = previous(100, t);

        assert_eq!(CacheDecision::decide(Some(&record), 101, t), CacheDecision::Miss);
        assert_eq!(
            CacheDecision::decide(Some(&record), 100, t + Duration::from_secs(1)),
            CacheDecision::Miss
        );
    }

    #[test]
    fn cancellation_token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }
}
