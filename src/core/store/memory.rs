//! In-memory store backend for testing.

use super::SnapshotStore;
use crate::core::duplicates::mark_duplicates;
use crate::core::record::{IndexRecord, Snapshot};
use crate::error::StoreError;
use std::path::PathBuf;
use std::sync::RwLock;

/// In-memory store backend
///
/// Useful for testing and dry runs where nothing should touch disk.
pub struct InMemoryStore {
    records: RwLock<Snapshot>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Snapshot::new()),
        }
    }

    /// Create a store pre-populated with `records`
    pub fn with_records(records: Vec<IndexRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.path.clone(), r)).collect()),
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Corrupted {
            path: PathBuf::from("memory"),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemoryStore {
    fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.clone())
    }

    fn replace_snapshot(&self, records: &[IndexRecord]) -> Result<(), StoreError> {
        let replacement: Snapshot = records
            .iter()
            .map(|r| (r.path.clone(), r.clone()))
            .collect();

        let mut current = self.records.write().map_err(|_| Self::poisoned())?;
        *current = replacement;
        Ok(())
    }

    fn mark_duplicates(&self) -> Result<usize, StoreError> {
        let mut current = self.records.write().map_err(|_| Self::poisoned())?;

        let mut records: Vec<IndexRecord> = current.drain().map(|(_, r)| r).collect();
        mark_duplicates(&mut records);
        let marked = records.iter().filter(|r| r.is_duplicate).count();

        current.extend(records.into_iter().map(|r| (r.path.clone(), r)));
        Ok(marked)
    }
}
