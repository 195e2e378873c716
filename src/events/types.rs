//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};

/// All events emitted by the indexer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A human-readable progress line.
    ///
    /// `size_hint` is 0 for pure status lines and the file size for
    /// per-file "found" lines. Consumers use it for display only.
    Log { message: String, size_hint: u64 },
    /// The orchestrator moved to a new state
    StateChanged { state: ScanState },
    /// The scan finished and the index is queryable
    Completed(ScanSummary),
    /// The scan ended without persisting anything new
    Failed { message: String },
}

impl Event {
    /// Build a status line event
    pub fn status(message: impl Into<String>) -> Self {
        Event::Log {
            message: message.into(),
            size_hint: 0,
        }
    }

    /// Build a per-file event carrying the file size
    pub fn found(message: impl Into<String>, size: u64) -> Self {
        Event::Log {
            message: message.into(),
            size_hint: size,
        }
    }
}

/// States of a scan run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    Idle,
    LoadingPrevious,
    Scanning,
    Persisting,
    ClassifyingDuplicates,
    Complete,
    Failed,
}

impl ScanState {
    /// Whether no further transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Complete | ScanState::Failed)
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanState::Idle => write!(f, "Idle"),
            ScanState::LoadingPrevious => write!(f, "Loading previous index"),
            ScanState::Scanning => write!(f, "Scanning"),
            ScanState::Persisting => write!(f, "Saving index"),
            ScanState::ClassifyingDuplicates => write!(f, "Finding duplicates"),
            ScanState::Complete => write!(f, "Complete"),
            ScanState::Failed => write!(f, "Failed"),
        }
    }
}

/// Summary of a completed scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Identifier of the run that produced this summary
    pub run_id: String,
    /// Records in the new snapshot
    pub total_files: usize,
    /// Files whose digest was reused from the previous snapshot
    pub cache_hits: usize,
    /// Files that were fingerprinted
    pub cache_misses: usize,
    /// Files that could not be read while hashing
    pub hash_errors: usize,
    /// Number of digest groups with more than one member
    pub duplicate_groups: usize,
    /// Records marked as duplicate (survivors excluded)
    pub duplicate_files: usize,
    /// Bytes held by records marked as duplicate
    pub duplicate_size_bytes: u64,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Non-fatal root-level errors
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::found("Found [Video] /videos/a.mp4", 4096);

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Log { message, size_hint } => {
                assert!(message.contains("a.mp4"));
                assert_eq!(size_hint, 4096);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn status_events_have_zero_size_hint() {
        match Event::status("Scanning /videos") {
            Event::Log { size_hint, .. } => assert_eq!(size_hint, 0),
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn only_complete_and_failed_are_terminal() {
        assert!(ScanState::Complete.is_terminal());
        assert!(ScanState::Failed.is_terminal());
        assert!(!ScanState::Scanning.is_terminal());
        assert!(!ScanState::Idle.is_terminal());
    }

    #[test]
    fn summary_is_serializable() {
        let summary = ScanSummary {
            total_files: 10,
            duplicate_size_bytes: 500_000_000,
            ..Default::default()
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("500000000"));
    }
}
