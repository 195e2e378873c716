//! # Store Module
//!
//! Persists the index snapshot between scans.
//!
//! ## Contract
//! - A scan reads the whole previous snapshot once, up front
//! - A scan writes the whole new snapshot once, at the end
//! - Duplicate flags are recomputed after every write
//!
//! ## Backends
//! - `SqliteStore` - Persistent storage using SQLite
//! - `InMemoryStore` - For testing

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::SnapshotStore;
