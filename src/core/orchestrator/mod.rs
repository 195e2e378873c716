//! # Orchestrator Module
//!
//! Runs one complete indexing batch.
//!
//! ## Stages
//! 1. **LoadingPrevious** - Read the previous snapshot from the store
//! 2. **Scanning** - Walk the roots, reuse or compute fingerprints
//! 3. **Persisting** - Replace the stored snapshot in one transaction
//! 4. **ClassifyingDuplicates** - Recompute duplicate flags in the store
//!
//! Any failure moves the run to `Failed`. Nothing is written before the
//! scan completes, so a failed or cancelled run leaves the previous
//! snapshot in place.

use crate::core::classifier::{CategoryConfig, PathClassifier};
use crate::core::fingerprint::{ContentFingerprinter, Fingerprinter};
use crate::core::scanner::{CancellationToken, IncrementalScanner, ScanConfig, ScanOutput};
use crate::core::store::{InMemoryStore, SnapshotStore};
use crate::error::{IndexerError, Result, ScanError};
use crate::events::{null_sender, Event, EventSender, ScanState, ScanSummary};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{error, info, info_span};
use uuid::Uuid;

/// Builder for an orchestrator
pub struct ScanOrchestratorBuilder {
    roots: Vec<PathBuf>,
    categories: CategoryConfig,
    scan_config: ScanConfig,
    store: Option<Arc<dyn SnapshotStore>>,
    fingerprinter: Option<Arc<dyn Fingerprinter>>,
}

impl ScanOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            categories: CategoryConfig::default(),
            scan_config: ScanConfig::default(),
            store: None,
            fingerprinter: None,
        }
    }

    /// Directories to index
    pub fn roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = roots;
        self
    }

    /// Which categories to index
    pub fn categories(mut self, categories: CategoryConfig) -> Self {
        self.categories = categories;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    /// Set the store backend
    pub fn store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the content fingerprinter
    pub fn fingerprinter(mut self, fingerprinter: Arc<dyn Fingerprinter>) -> Self {
        self.fingerprinter = Some(fingerprinter);
        self
    }

    pub fn build(self) -> ScanOrchestrator {
        let fingerprinter = self
            .fingerprinter
            .unwrap_or_else(|| Arc::new(ContentFingerprinter::new()));
        let scanner = IncrementalScanner::new(
            PathClassifier::new(self.categories),
            fingerprinter,
            self.scan_config,
        );

        ScanOrchestrator {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryStore::new())),
            scanner,
            roots: self.roots,
        }
    }
}

impl Default for ScanOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequences load, scan, persist and duplicate marking
pub struct ScanOrchestrator {
    store: Arc<dyn SnapshotStore>,
    scanner: IncrementalScanner,
    roots: Vec<PathBuf>,
}

impl ScanOrchestrator {
    pub fn builder() -> ScanOrchestratorBuilder {
        ScanOrchestratorBuilder::new()
    }

    pub fn new(store: Arc<dyn SnapshotStore>, scanner: IncrementalScanner, roots: Vec<PathBuf>) -> Self {
        Self {
            store,
            scanner,
            roots,
        }
    }

    /// The store this orchestrator writes to
    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Run on the calling thread without events
    pub fn run_silent(&self) -> Result<ScanSummary> {
        self.run(&null_sender(), &CancellationToken::new())
    }

    /// Run one batch on the calling thread.
    ///
    /// Ends with exactly one of `Event::Completed` or `Event::Failed`.
    pub fn run(&self, events: &EventSender, cancel: &CancellationToken) -> Result<ScanSummary> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("scan", run_id = %run_id);
        let _guard = span.enter();

        let started = Instant::now();
        info!(roots = self.roots.len(), "Scan started");

        match self.execute(run_id, events, cancel, started) {
            Ok(summary) => {
                transition(events, ScanState::Complete);
                info!(
                    files = summary.total_files,
                    duplicates = summary.duplicate_files,
                    duration_ms = summary.duration_ms,
                    "Scan complete"
                );
                events.send(Event::Completed(summary.clone()));
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "Scan failed");
                transition(events, ScanState::Failed);
                events.send(Event::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Run one batch on a dedicated thread
    pub fn spawn(self, events: EventSender) -> ScanHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let thread = std::thread::Builder::new()
            .name("media-index-scan".to_string())
            .spawn(move || self.run(&events, &token));

        ScanHandle { cancel, thread }
    }

    fn execute(
        &self,
        run_id: String,
        events: &EventSender,
        cancel: &CancellationToken,
        started: Instant,
    ) -> Result<ScanSummary> {
        transition(events, ScanState::LoadingPrevious);
        let previous = self.store.load_snapshot()?;
        events.status(format!("Loaded {} previous records", previous.len()));

        transition(events, ScanState::Scanning);
        let output = self
            .scanner
            .scan(&self.roots, &previous, events, cancel)
            .map_err(|e| match e {
                ScanError::Cancelled => IndexerError::Cancelled,
                other => IndexerError::Scan(other),
            })?;
        drop(previous);

        if cancel.is_cancelled() {
            return Err(IndexerError::Cancelled);
        }

        transition(events, ScanState::Persisting);
        self.store.replace_snapshot(&output.records)?;

        transition(events, ScanState::ClassifyingDuplicates);
        let marked = self.store.mark_duplicates()?;

        self.summarize(run_id, output, marked, started)
    }

    fn summarize(
        &self,
        run_id: String,
        output: ScanOutput,
        duplicate_files: usize,
        started: Instant,
    ) -> Result<ScanSummary> {
        let groups = self.store.duplicate_groups()?;

        Ok(ScanSummary {
            run_id,
            total_files: output.records.len(),
            cache_hits: output.stats.cache_hits,
            cache_misses: output.stats.cache_misses,
            hash_errors: output.stats.hash_errors,
            duplicate_groups: groups.len(),
            duplicate_files,
            duplicate_size_bytes: groups.iter().map(|g| g.duplicate_size_bytes).sum(),
            duration_ms: started.elapsed().as_millis() as u64,
            errors: output.errors.iter().map(|e| e.to_string()).collect(),
        })
    }
}

fn transition(events: &EventSender, state: ScanState) {
    info!(%state, "State changed");
    events.send(Event::StateChanged { state });
}

/// A scan running on its own thread
pub struct ScanHandle {
    cancel: CancellationToken,
    thread: std::io::Result<JoinHandle<Result<ScanSummary>>>,
}

impl ScanHandle {
    /// Ask the scan to stop at the next file boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this scan
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        match &self.thread {
            Ok(handle) => handle.is_finished(),
            Err(_) => true,
        }
    }

    /// Block until the scan ends
    pub fn wait(self) -> Result<ScanSummary> {
        let handle = self
            .thread
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;

        handle
            .join()
            .map_err(|_| IndexerError::Scan(ScanError::ThreadPool("scan thread panicked".to_string())))?
    }
}
