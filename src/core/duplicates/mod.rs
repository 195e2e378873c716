//! # Duplicates Module
//!
//! Marks records that share content with another record.
//!
//! ## Rules
//! 1. Group by content digest; singleton groups are left alone
//! 2. The record with the lexicographically smallest path string survives
//! 3. Every other member of the group is marked duplicate
//!
//! Paths are compared as raw OS strings, byte by byte. That matches
//! SQLite's `BINARY` collation, so an in-memory pass and a store-side
//! query pick the same survivor. `Path`'s own ordering compares component
//! by component and would disagree on names like `a-b` vs `a/b`.
//!
//! The `HASH_ERROR` sentinel is grouped like any other digest, so two
//! unrelated unreadable files are reported as duplicates of each other.

use crate::core::record::IndexRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A set of records with identical content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Shared content digest
    pub digest: String,
    /// The canonical record that is not marked
    pub survivor: PathBuf,
    /// Members marked duplicate, in path order
    pub duplicates: Vec<PathBuf>,
    /// Total size of the marked members
    pub duplicate_size_bytes: u64,
}

impl DuplicateGroup {
    /// Number of members including the survivor
    pub fn member_count(&self) -> usize {
        self.duplicates.len() + 1
    }
}

/// Order two paths by their string bytes
pub fn path_order(a: &Path, b: &Path) -> std::cmp::Ordering {
    a.as_os_str().cmp(b.as_os_str())
}

/// Recompute `is_duplicate` for every record and return the groups found.
///
/// Previous flags are ignored. Running this twice over the same records
/// yields identical marks, whatever order the records arrive in.
pub fn mark_duplicates(records: &mut [IndexRecord]) -> Vec<DuplicateGroup> {
    let mut by_digest: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        by_digest
            .entry(record.content_digest.as_str())
            .or_default()
            .push(index);
    }

    let mut marked = Vec::new();
    let mut groups = Vec::new();

    for (digest, mut members) in by_digest {
        if members.len() < 2 {
            continue;
        }

        members.sort_by(|&a, &b| path_order(&records[a].path, &records[b].path));

        let survivor = records[members[0]].path.clone();
        let duplicates: Vec<PathBuf> = members[1..]
            .iter()
            .map(|&i| records[i].path.clone())
            .collect();
        let duplicate_size_bytes = members[1..].iter().map(|&i| records[i].size).sum();

        marked.extend_from_slice(&members[1..]);
        groups.push(DuplicateGroup {
            digest: digest.to_string(),
            survivor,
            duplicates,
            duplicate_size_bytes,
        });
    }

    for record in records.iter_mut() {
        record.is_duplicate = false;
    }
    for index in marked {
        records[index].is_duplicate = true;
    }

    groups
}

/// Rebuild groups from records whose flags are already set.
///
/// Used for reporting from a store that marked duplicates itself.
pub fn collect_groups(records: &[IndexRecord]) -> Vec<DuplicateGroup> {
    let mut by_digest: BTreeMap<&str, Vec<&IndexRecord>> = BTreeMap::new();
    for record in records {
        by_digest
            .entry(record.content_digest.as_str())
            .or_default()
            .push(record);
    }

    by_digest
        .into_iter()
        .filter(|(_, members)| members.len() > 1 && members.iter().any(|r| r.is_duplicate))
        .filter_map(|(digest, mut members)| {
            members.sort_by(|a, b| path_order(&a.path, &b.path));
            let survivor = members.iter().find(|r| !r.is_duplicate)?.path.clone();
            let marked: Vec<&IndexRecord> =
                members.into_iter().filter(|r| r.is_duplicate).collect();

            Some(DuplicateGroup {
                digest: digest.to_string(),
                survivor,
                duplicate_size_bytes: marked.iter().map(|r| r.size).sum(),
                duplicates: marked.into_iter().map(|r| r.path.clone()).collect(),
            })
        })
        .collect()
}
