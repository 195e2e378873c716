//! # Error Module
//!
//! Error types for the media indexer.
//!
//! ## Recovery Levels
//! - **Per item** (unreadable file, corrupt container) - never surfaces here;
//!   the scanner substitutes a sentinel value and keeps going
//! - **Per root** (missing root, enumeration denied) - collected as
//!   [`ScanError`] values alongside the scan output
//! - **Fatal** (store unreachable or corrupt) - returned as [`IndexerError`]
//!   and ends the scan

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scan was cancelled")]
    Cancelled,
}

/// Errors that occur while walking roots
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Root directory not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan was cancelled")]
    Cancelled,

    #[error("Failed to start fingerprint workers: {0}")]
    ThreadPool(String),
}

/// Errors raised by a snapshot store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open index database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Index corruption detected at {path}. Delete this file and rescan.")]
    Corrupted { path: PathBuf },
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        StoreError::QueryFailed(error.to_string())
    }
}

/// Errors loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, IndexerError>;
