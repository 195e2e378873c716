//! # Media Indexer
//!
//! An incremental local file indexer that spots duplicate media by content.
//!
//! ## How a scan works
//! - Files unchanged since the last scan (same size and mtime) reuse their
//!   stored digest; everything else is hashed again
//! - The new index replaces the old one wholesale
//! - Files sharing a digest are grouped and all but one are flagged
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - The indexing engine
//! - `events` - Event-driven progress reporting
//! - `config` - TOML configuration
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface

pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{IndexerError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Calling it again
/// after a subscriber is installed has no effect.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
