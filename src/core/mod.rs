//! # Core Module
//!
//! The UI-agnostic indexing engine.
//!
//! ## Modules
//! - `classifier` - Decides which category a path is indexed under
//! - `fingerprint` - Computes content digests and media durations
//! - `scanner` - Walks roots and reuses unchanged entries
//! - `duplicates` - Marks records that share content
//! - `store` - Persists the index between scans
//! - `orchestrator` - Runs one complete batch
//! - `report` - Totals, folder and volume usage
//! - `record` - The index data model
//! - `environment` - Platform default paths

pub mod classifier;
pub mod duplicates;
pub mod environment;
pub mod fingerprint;
pub mod orchestrator;
pub mod record;
pub mod report;
pub mod scanner;
pub mod store;

// Re-export commonly used types
pub use classifier::{Category, CategoryConfig, PathClassifier};
pub use duplicates::DuplicateGroup;
pub use fingerprint::{ContentFingerprinter, Fingerprint, Fingerprinter, HASH_ERROR};
pub use orchestrator::{ScanHandle, ScanOrchestrator};
pub use record::{IndexRecord, Snapshot};
pub use report::IndexReport;
pub use scanner::{CancellationToken, IncrementalScanner, ScanConfig};
pub use store::{InMemoryStore, SnapshotStore, SqliteStore};
