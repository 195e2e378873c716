//! # Events Module
//!
//! One-way progress notifications from the indexer to any observer.
//!
//! ## Design
//! The engine pushes events into a bounded channel and never waits on the
//! consumer. A slow or absent observer only loses events; it cannot stall
//! a scan.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! let observer = spawn_observer(receiver, |message: &str, size: u64| {
//!     println!("{message} ({size} bytes)");
//! });
//!
//! orchestrator.run(&sender, &CancellationToken::new())?;
//! drop(sender);
//! observer.join().ok();
//! ```

mod channel;
mod types;

pub use channel::{
    null_sender, spawn_observer, EventChannel, EventReceiver, EventSender, LogObserver,
    DEFAULT_CAPACITY,
};
pub use types::*;
