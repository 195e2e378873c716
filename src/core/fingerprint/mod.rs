//! # Fingerprint Module
//!
//! Computes the expensive per-file attributes: a content digest and, for
//! media files, a duration.
//!
//! ## Failure Policy
//! Fingerprinting never fails. An unreadable file gets the [`HASH_ERROR`]
//! digest; a file the metadata reader can't parse gets a zero duration.
//! Either way the scan moves on to the next file.
//!
//! ## Example
//! ```rust,ignore
//! use media_indexer::core::fingerprint::{ContentFingerprinter, Fingerprinter};
//!
//! let fingerprinter = ContentFingerprinter::new();
//! let fp = fingerprinter.fingerprint(&path, Category::Video);
//! println!("{} {:?}", fp.digest, fp.duration);
//! ```

mod digest;
mod duration;

pub use digest::{digest_file, digest_reader};
pub use duration::{DurationReader, MediaDurationReader, NoDuration};

use crate::core::classifier::Category;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Digest recorded when a file could not be read for hashing
pub const HASH_ERROR: &str = "HASH_ERROR";

/// The expensive attributes of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Lower-case hex SHA-256, or [`HASH_ERROR`]
    pub digest: String,
    /// Playing time, zero when not applicable
    pub duration: Duration,
}

impl Fingerprint {
    /// Whether hashing failed for this file
    pub fn is_hash_error(&self) -> bool {
        self.digest == HASH_ERROR
    }
}

/// Produces fingerprints for single files.
///
/// Implement this trait to substitute the hashing step (e.g., for testing).
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, path: &Path, category: Category) -> Fingerprint;
}

/// SHA-256 digest plus an optional media duration probe
pub struct ContentFingerprinter {
    durations: Box<dyn DurationReader>,
}

impl ContentFingerprinter {
    /// Fingerprinter using `lofty` for durations
    pub fn new() -> Self {
        Self::with_duration_reader(Box::new(MediaDurationReader))
    }

    /// Fingerprinter with a custom duration source
    pub fn with_duration_reader(durations: Box<dyn DurationReader>) -> Self {
        Self { durations }
    }
}

impl Default for ContentFingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter for ContentFingerprinter {
    fn fingerprint(&self, path: &Path, category: Category) -> Fingerprint {
        let digest = match digest_file(path) {
            Ok(digest) => digest,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to hash file");
                HASH_ERROR.to_string()
            }
        };

        let duration = if category.is_media() {
            self.durations.duration(path)
        } else {
            Duration::ZERO
        };

        Fingerprint { digest, duration }
    }
}
