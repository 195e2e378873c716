//! Snapshot store trait definition.

use crate::core::duplicates::{collect_groups, path_order, DuplicateGroup};
use crate::core::record::{IndexRecord, Snapshot};
use crate::core::report::{IndexReport, SystemVolumes};
use crate::error::StoreError;

/// Persistence contract for the index.
///
/// The engine only ever reads a complete snapshot or writes a complete
/// replacement; there are no partial updates.
pub trait SnapshotStore: Send + Sync {
    /// Load every persisted record, keyed by path.
    ///
    /// An empty store (first run) yields an empty snapshot.
    fn load_snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Replace the whole snapshot with `records`.
    ///
    /// Must look atomic to the caller: on failure the previous snapshot is
    /// still in place.
    fn replace_snapshot(&self, records: &[IndexRecord]) -> Result<(), StoreError>;

    /// Recompute every `is_duplicate` flag from scratch.
    ///
    /// Returns the number of records marked.
    fn mark_duplicates(&self) -> Result<usize, StoreError>;

    /// All records in path order
    fn records(&self) -> Result<Vec<IndexRecord>, StoreError> {
        let mut records: Vec<IndexRecord> = self.load_snapshot()?.into_values().collect();
        records.sort_by(|a, b| path_order(&a.path, &b.path));
        Ok(records)
    }

    /// Duplicate groups as currently flagged
    fn duplicate_groups(&self) -> Result<Vec<DuplicateGroup>, StoreError> {
        Ok(collect_groups(&self.records()?))
    }

    /// Totals, folder breakdown and volume metrics
    fn report(&self) -> Result<IndexReport, StoreError> {
        Ok(IndexReport::build(&self.records()?, &SystemVolumes::new()))
    }
}
