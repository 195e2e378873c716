//! # media-index CLI
//!
//! Command-line interface for the media indexer.
//!
//! ## Usage
//! ```bash
//! media-index scan ~/Videos ~/Music
//! media-index report --output json
//! media-index duplicates --output minimal
//! ```

mod cli;

use media_indexer::Result;

fn main() -> Result<()> {
    media_indexer::init_tracing();
    cli::run()
}
