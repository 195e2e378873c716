//! The incremental scan: enumerate, decide hit or miss, fingerprint misses.

use super::walker::{enumerate_root, Candidate};
use super::{CacheDecision, CancellationToken, ScanConfig, ScanOutput, ScanStats};
use crate::core::classifier::PathClassifier;
use crate::core::duplicates::path_order;
use crate::core::fingerprint::{Fingerprinter, HASH_ERROR};
use crate::core::record::{IndexRecord, Snapshot};
use crate::error::ScanError;
use crate::events::{Event, EventSender};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds a new index from the filesystem and the previous snapshot
pub struct IncrementalScanner {
    classifier: PathClassifier,
    fingerprinter: Arc<dyn Fingerprinter>,
    config: ScanConfig,
}

impl IncrementalScanner {
    pub fn new(
        classifier: PathClassifier,
        fingerprinter: Arc<dyn Fingerprinter>,
        config: ScanConfig,
    ) -> Self {
        Self {
            classifier,
            fingerprinter,
            config,
        }
    }

    /// Scan `roots`, reusing unchanged entries from `previous`.
    ///
    /// Missing roots and unreadable directories are reported through
    /// `events` and [`ScanOutput::errors`]; they never fail the scan. The
    /// only errors returned are cancellation and a failure to start the
    /// worker pool.
    pub fn scan(
        &self,
        roots: &[PathBuf],
        previous: &Snapshot,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<ScanOutput, ScanError> {
        let mut stats = ScanStats::default();
        let mut errors = Vec::new();
        let mut by_path: HashMap<PathBuf, Candidate> = HashMap::new();

        for root in roots {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            match enumerate_root(
                root,
                &self.classifier,
                self.config.follow_symlinks,
                events,
                cancel,
            ) {
                Ok(listing) => {
                    stats.roots_scanned += 1;
                    stats.files_seen += listing.files_seen;
                    stats.files_skipped += listing.files_skipped;
                    errors.extend(listing.errors);

                    // Overlapping roots: the later entry wins
                    for candidate in listing.candidates {
                        by_path.insert(candidate.path.clone(), candidate);
                    }
                }
                Err(ScanError::Cancelled) => return Err(ScanError::Cancelled),
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Skipping root");
                    events.status(format!("Skipping missing root: {}", root.display()));
                    stats.roots_skipped += 1;
                    errors.push(e);
                }
            }
        }

        let mut candidates: Vec<Candidate> = by_path.into_values().collect();
        candidates.sort_by(|a, b| path_order(&a.path, &b.path));

        info!(
            candidates = candidates.len(),
            previous = previous.len(),
            "Enumeration finished"
        );

        let processed = self.process_candidates(candidates, previous, events, cancel)?;
        let mut records = processed.records;
        records.sort_by(|a, b| path_order(&a.path, &b.path));

        stats.cache_hits = processed.hits;
        stats.cache_misses = processed.misses;
        stats.hash_errors = records
            .iter()
            .filter(|r| r.content_digest == HASH_ERROR)
            .count();
        stats.bytes_indexed = records.iter().map(|r| r.size).sum();

        info!(
            files = records.len(),
            cache_hits = stats.cache_hits,
            cache_misses = stats.cache_misses,
            "Scan finished"
        );

        Ok(ScanOutput {
            records,
            stats,
            errors,
        })
    }

    /// Resolve every candidate to a record on the worker pool
    fn process_candidates(
        &self,
        candidates: Vec<Candidate>,
        previous: &Snapshot,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<ProcessedRecords, ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads())
            .thread_name(|i| format!("fingerprint-{i}"))
            .build()
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;

        let hits = AtomicUsize::new(0);
        let misses = AtomicUsize::new(0);
        let total = candidates.len();

        let records: Vec<IndexRecord> = pool.install(|| {
            candidates
                .into_par_iter()
                .map(|candidate| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    Some(self.resolve(candidate, previous, events, &hits, &misses))
                })
                .while_some()
                .collect()
        });

        if cancel.is_cancelled() || records.len() != total {
            info!(processed = records.len(), total, "Scan cancelled");
            return Err(ScanError::Cancelled);
        }

        Ok(ProcessedRecords {
            records,
            hits: hits.into_inner(),
            misses: misses.into_inner(),
        })
    }

    /// Apply the cache rule to one file
    fn resolve(
        &self,
        candidate: Candidate,
        previous: &Snapshot,
        events: &EventSender,
        hits: &AtomicUsize,
        misses: &AtomicUsize,
    ) -> IndexRecord {
        let Candidate {
            path,
            size,
            modified,
            category,
        } = candidate;

        match CacheDecision::decide(previous.get(&path), size, modified) {
            CacheDecision::Hit(old) => {
                hits.fetch_add(1, Ordering::Relaxed);
                debug!(path = %path.display(), "Cache hit");
                IndexRecord::reused(old, size, modified, category)
            }
            CacheDecision::Miss => {
                misses.fetch_add(1, Ordering::Relaxed);
                events.send(Event::found(
                    format!("Found [{}] {}", category, path.display()),
                    size,
                ));
                let fingerprint = self.fingerprinter.fingerprint(&path, category);
                IndexRecord::fingerprinted(path, size, modified, category, fingerprint)
            }
        }
    }

    fn worker_threads(&self) -> usize {
        match self.config.worker_threads {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }
}

struct ProcessedRecords {
    records: Vec<IndexRecord>,
    hits: usize,
    misses: usize,
}
