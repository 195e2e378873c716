//! # Report Module
//!
//! Summaries over a persisted index: totals, space used per top-level
//! folder, and how much of each mounted volume the index covers.

use crate::core::record::IndexRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use sysinfo::Disks;

/// Space used under one top-level folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderUsage {
    pub folder: PathBuf,
    pub size_bytes: u64,
    pub file_count: u64,
}

/// Capacity of a volume alongside what the index holds on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeUsage {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub available_bytes: u64,
    /// Bytes of indexed files stored on this volume
    pub indexed_bytes: u64,
}

/// Capacity figures for one mounted volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

/// Source of mounted volume figures
pub trait VolumeProbe {
    fn volumes(&self) -> Vec<VolumeInfo>;
}

/// Reads mounted volumes from the operating system
#[derive(Debug, Default)]
pub struct SystemVolumes;

impl SystemVolumes {
    pub fn new() -> Self {
        Self
    }
}

impl VolumeProbe for SystemVolumes {
    fn volumes(&self) -> Vec<VolumeInfo> {
        let disks = Disks::new_with_refreshed_list();
        disks
            .list()
            .iter()
            .map(|disk| VolumeInfo {
                mount_point: disk.mount_point().to_path_buf(),
                total_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
            })
            .collect()
    }
}

/// Aggregate view of the index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub total_files: u64,
    pub total_size_bytes: u64,
    pub duplicate_files: u64,
    pub duplicate_size_bytes: u64,
    /// Largest first
    pub folders: Vec<FolderUsage>,
    /// Only volumes holding at least one indexed file
    pub volumes: Vec<VolumeUsage>,
}

impl IndexReport {
    /// Build a report from records and the volumes `probe` reports
    pub fn build(records: &[IndexRecord], probe: &dyn VolumeProbe) -> Self {
        let mut report = IndexReport::default();
        let mut folders: HashMap<PathBuf, FolderUsage> = HashMap::new();

        let volumes = probe.volumes();
        let mut indexed_per_volume: HashMap<usize, u64> = HashMap::new();

        for record in records {
            report.total_files += 1;
            report.total_size_bytes += record.size;
            if record.is_duplicate {
                report.duplicate_files += 1;
                report.duplicate_size_bytes += record.size;
            }

            let folder = top_level_folder(&record.path);
            let usage = folders.entry(folder.clone()).or_insert(FolderUsage {
                folder,
                size_bytes: 0,
                file_count: 0,
            });
            usage.size_bytes += record.size;
            usage.file_count += 1;

            if let Some(index) = volume_for(&record.path, &volumes) {
                *indexed_per_volume.entry(index).or_default() += record.size;
            }
        }

        report.folders = folders.into_values().collect();
        report
            .folders
            .sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes).then_with(|| a.folder.cmp(&b.folder)));

        report.volumes = volumes
            .into_iter()
            .enumerate()
            .filter_map(|(index, volume)| {
                indexed_per_volume.get(&index).map(|&indexed_bytes| VolumeUsage {
                    mount_point: volume.mount_point,
                    total_bytes: volume.total_bytes,
                    available_bytes: volume.available_bytes,
                    indexed_bytes,
                })
            })
            .collect();

        report
    }
}

/// Root (or drive prefix) plus the first directory under it.
///
/// A file sitting directly in the root reports the root itself.
pub fn top_level_folder(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(path);
    let mut folder = PathBuf::new();

    for component in parent.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => folder.push(component.as_os_str()),
            Component::Normal(name) => {
                folder.push(name);
                break;
            }
            Component::CurDir | Component::ParentDir => {}
        }
    }

    folder
}

/// Index of the volume whose mount point is the longest prefix of `path`
fn volume_for(path: &Path, volumes: &[VolumeInfo]) -> Option<usize> {
    volumes
        .iter()
        .enumerate()
        .filter(|(_, volume)| path.starts_with(&volume.mount_point))
        .max_by_key(|(_, volume)| volume.mount_point.components().count())
        .map(|(index, _)| index)
}
