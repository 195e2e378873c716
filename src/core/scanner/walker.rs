//! Directory enumeration using walkdir.

use super::CancellationToken;
use crate::core::classifier::{Category, PathClassifier};
use crate::error::ScanError;
use crate::events::EventSender;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::warn;
use walkdir::WalkDir;

/// A classified file waiting for its cache decision
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    pub category: Category,
}

/// Everything found under one root
#[derive(Debug, Default)]
pub struct RootListing {
    /// Files that passed classification
    pub candidates: Vec<Candidate>,
    /// Non-fatal errors below the root
    pub errors: Vec<ScanError>,
    /// Regular files encountered
    pub files_seen: usize,
    /// Files the classifier rejected
    pub files_skipped: usize,
}

/// Enumerate and classify every file below `root`.
///
/// Fails when the root itself is missing or not a directory, or when
/// `cancel` fires mid-walk. Errors further down are collected in the
/// listing and reported as status lines.
pub fn enumerate_root(
    root: &Path,
    classifier: &PathClassifier,
    follow_symlinks: bool,
    events: &EventSender,
    cancel: &CancellationToken,
) -> Result<RootListing, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut listing = RootListing::default();

    for entry_result in WalkDir::new(root).follow_links(follow_symlinks) {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());

                let error = if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::PermissionDenied) {
                    ScanError::PermissionDenied { path }
                } else {
                    ScanError::ReadDirectory {
                        path,
                        source: io::Error::other(e.to_string()),
                    }
                };

                warn!(error = %error, "Skipping unreadable entry");
                events.status(format!("Skipped: {}", error));
                listing.errors.push(error);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        listing.files_seen += 1;
        let path = entry.path();

        let Some(category) = classifier.classify(path) else {
            listing.files_skipped += 1;
            continue;
        };

        // The file may vanish between listing and stat
        let stamp = entry
            .metadata()
            .map_err(io::Error::from)
            .and_then(|metadata| Ok((metadata.len(), metadata.modified()?)));

        match to_candidate(path, category, stamp) {
            Ok(candidate) => listing.candidates.push(candidate),
            Err(error) => {
                warn!(error = %error, "Skipping file without metadata");
                listing.errors.push(error);
            }
        }
    }

    Ok(listing)
}

/// Build a candidate from its size and mtime.
///
/// A file without a modification time cannot be cache-checked, so it is
/// an error rather than a candidate.
fn to_candidate(
    path: &Path,
    category: Category,
    stamp: io::Result<(u64, SystemTime)>,
) -> Result<Candidate, ScanError> {
    match stamp {
        Ok((size, modified)) => Ok(Candidate {
            path: path.to_path_buf(),
            size,
            modified,
            category,
        }),
        Err(source) => Err(ScanError::ReadDirectory {
            path: path.to_path_buf(),
            source,
        }),
    }
}
