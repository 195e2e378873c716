//! # CLI Module
//!
//! Command-line interface for the media indexer.
//!
//! ## Usage
//! ```bash
//! # Index the default folders
//! media-index scan
//!
//! # Index specific folders, including non-media files
//! media-index scan ~/Videos /mnt/archive --other
//!
//! # Space usage and duplicates from the last scan
//! media-index report
//! media-index duplicates --output minimal
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_indexer::config::IndexerConfig;
use media_indexer::core::duplicates::DuplicateGroup;
use media_indexer::core::environment::{Environment, SystemEnvironment};
use media_indexer::core::report::IndexReport;
use media_indexer::core::store::{SnapshotStore, SqliteStore};
use media_indexer::core::ScanOrchestrator;
use media_indexer::error::Result;
use media_indexer::events::{Event, EventChannel, ScanSummary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Media Indexer - Know what is on your disks
#[derive(Parser, Debug)]
#[command(name = "media-index")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan directories and update the index
    Scan {
        /// Directories to scan (defaults to your video, music and home folders)
        roots: Vec<PathBuf>,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Index database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Also index files that are neither video nor audio
        #[arg(long)]
        other: bool,

        /// Skip video files
        #[arg(long)]
        no_video: bool,

        /// Skip audio files
        #[arg(long)]
        no_audio: bool,

        /// Fingerprint worker threads (0 = all cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Show every file as it is fingerprinted
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show totals, folder breakdown and volume usage
    Report {
        /// Index database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// List duplicate groups from the last scan
    Duplicates {
        /// Index database path
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Flags given to `scan`
struct ScanArgs {
    roots: Vec<PathBuf>,
    config: Option<PathBuf>,
    db: Option<PathBuf>,
    other: bool,
    no_video: bool,
    no_audio: bool,
    threads: Option<usize>,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            roots,
            config,
            db,
            other,
            no_video,
            no_audio,
            threads,
            output,
            verbose,
        } => run_scan(
            ScanArgs {
                roots,
                config,
                db,
                other,
                no_video,
                no_audio,
                threads,
            },
            output,
            verbose,
        ),
        Commands::Report { db, output } => run_report(db, output),
        Commands::Duplicates { db, output } => run_duplicates(db, output),
    }
}

/// Merge the config file, CLI flags and platform defaults
fn build_config(args: ScanArgs, env: &dyn Environment) -> Result<IndexerConfig> {
    let mut config = match &args.config {
        Some(path) => IndexerConfig::load(path)?,
        None => IndexerConfig::default(),
    };

    if !args.roots.is_empty() {
        config.roots = args.roots;
    }
    if args.db.is_some() {
        config.database = args.db;
    }
    if args.other {
        config.categories.include_other = true;
    }
    if args.no_video {
        config.categories.include_video = false;
    }
    if args.no_audio {
        config.categories.include_audio = false;
    }
    if let Some(threads) = args.threads {
        config.worker_threads = threads;
    }

    config.validate()?;
    Ok(config.resolve_defaults(env))
}

fn run_scan(args: ScanArgs, output: OutputFormat, verbose: bool) -> Result<()> {
    let term = Term::stderr();
    let env = SystemEnvironment;
    let config = build_config(args, &env)?;
    let db_path = config.database_path(&env);

    // Print header
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Media Indexer").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        for root in &config.roots {
            term.write_line(&format!("  {} {}", style("root").dim(), display_path(root)))
                .ok();
        }
        term.write_line("").ok();
    }

    let store = Arc::new(SqliteStore::open(&db_path)?);
    let orchestrator = ScanOrchestrator::builder()
        .roots(config.roots.clone())
        .categories(config.categories)
        .scan_config(config.scan_config())
        .store(store)
        .build();

    // Set up event handling
    let (sender, receiver) = EventChannel::bounded(config.event_capacity);

    // Spinner for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {prefix:.bold} {pos} fingerprinted {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::StateChanged { state } => pb.set_prefix(state.to_string()),
                Event::Log { message, size_hint } => {
                    if size_hint > 0 {
                        pb.inc(1);
                    }
                    if size_hint == 0 {
                        pb.set_message(message);
                    } else if verbose {
                        pb.set_message(format!("{} {}", message, style(format_bytes(size_hint)).dim()));
                    }
                }
                Event::Completed(_) | Event::Failed { .. } => pb.finish_and_clear(),
            }
        }
    });

    // Run the scan on its own thread
    let handle = orchestrator.spawn(sender);
    let result = handle.wait();

    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let summary = result?;

    match output {
        OutputFormat::Pretty => print_pretty_summary(&term, &summary, &db_path),
        OutputFormat::Json | OutputFormat::Minimal => print_json(&summary),
    }

    Ok(())
}

fn run_report(db: Option<PathBuf>, output: OutputFormat) -> Result<()> {
    let db_path = db.unwrap_or_else(|| SystemEnvironment.default_database());
    let store = SqliteStore::open(&db_path)?;
    let report = store.report()?;

    match output {
        OutputFormat::Pretty => print_pretty_report(&Term::stdout(), &report),
        OutputFormat::Json | OutputFormat::Minimal => print_json(&report),
    }

    Ok(())
}

fn run_duplicates(db: Option<PathBuf>, output: OutputFormat) -> Result<()> {
    let db_path = db.unwrap_or_else(|| SystemEnvironment.default_database());
    let store = SqliteStore::open(&db_path)?;
    let groups = store.duplicate_groups()?;

    match output {
        OutputFormat::Pretty => print_pretty_groups(&Term::stdout(), &groups),
        OutputFormat::Json => print_json(&groups),
        OutputFormat::Minimal => print_minimal_groups(&groups),
    }

    Ok(())
}

fn print_pretty_summary(term: &Term, summary: &ScanSummary, db_path: &Path) {
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files indexed in {:.1}s",
        style(summary.total_files).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} unchanged, {} fingerprinted",
        style(summary.cache_hits).dim(),
        style(summary.cache_misses).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate files in {} groups",
        style(summary.duplicate_files).cyan(),
        summary.duplicate_groups
    ))
    .ok();
    term.write_line(&format!(
        "  {} potential space savings",
        style(format_bytes(summary.duplicate_size_bytes)).yellow()
    ))
    .ok();

    if summary.hash_errors > 0 {
        term.write_line(&format!(
            "  {} files could not be read",
            style(summary.hash_errors).red()
        ))
        .ok();
    }

    for error in &summary.errors {
        term.write_line(&format!("  {} {}", style("!").yellow(), error))
            .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!("Index saved to {}", display_path(db_path))).dim()
    ))
    .ok();
}

fn print_pretty_report(term: &Term, report: &IndexReport) {
    term.write_line(&format!("{}", style("Index Report").bold().underlined()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} files, {}",
        style(report.total_files).cyan(),
        style(format_bytes(report.total_size_bytes)).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicates, {}",
        style(report.duplicate_files).cyan(),
        style(format_bytes(report.duplicate_size_bytes)).yellow()
    ))
    .ok();

    if !report.folders.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Folders:").bold())).ok();
        for folder in &report.folders {
            term.write_line(&format!(
                "  {:>10}  {:>7} files  {}",
                format_bytes(folder.size_bytes),
                folder.file_count,
                folder.folder.display()
            ))
            .ok();
        }
    }

    if !report.volumes.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Volumes:").bold())).ok();
        for volume in &report.volumes {
            term.write_line(&format!(
                "  {}  {} indexed, {} free of {}",
                volume.mount_point.display(),
                style(format_bytes(volume.indexed_bytes)).cyan(),
                format_bytes(volume.available_bytes),
                format_bytes(volume.total_bytes)
            ))
            .ok();
        }
    }
}

fn print_pretty_groups(term: &Term, groups: &[DuplicateGroup]) {
    if groups.is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("✓").green()))
            .ok();
        return;
    }

    term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
        .ok();
    term.write_line("").ok();

    for (i, group) in groups.iter().enumerate() {
        term.write_line(&format!(
            "  {} ({} files, {} reclaimable)",
            style(format!("Group {}:", i + 1)).bold(),
            group.member_count(),
            format_bytes(group.duplicate_size_bytes)
        ))
        .ok();

        term.write_line(&format!(
            "    {} {}",
            style("★").green(),
            display_path(&group.survivor)
        ))
        .ok();
        for path in &group.duplicates {
            term.write_line(&format!("    {} {}", style("○").dim(), display_path(path)))
                .ok();
        }
        term.write_line("").ok();
    }

    term.write_line(&format!(
        "{}",
        style("No files were deleted. The starred file is the one kept as canonical.").dim()
    ))
    .ok();
}

fn print_minimal_groups(groups: &[DuplicateGroup]) {
    for group in groups {
        for path in &group.duplicates {
            println!("{}", path.display());
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// Show paths under the home directory as `~/...`
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEnvironment;

    impl Environment for FixedEnvironment {
        fn default_roots(&self) -> Vec<PathBuf> {
            vec![PathBuf::from("/home/me/Videos")]
        }

        fn data_dir(&self) -> PathBuf {
            PathBuf::from("/data")
        }
    }

    fn args() -> ScanArgs {
        ScanArgs {
            roots: Vec::new(),
            config: None,
            db: None,
            other: false,
            no_video: false,
            no_audio: false,
            threads: None,
        }
    }

    #[test]
    fn flags_override_defaults() {
        let config = build_config(
            ScanArgs {
                roots: vec![PathBuf::from("/srv/media")],
                db: Some(PathBuf::from("/tmp/i.db")),
                other: true,
                no_audio: true,
                threads: Some(3),
                ..args()
            },
            &FixedEnvironment,
        )
        .unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/srv/media")]);
        assert_eq!(config.database, Some(PathBuf::from("/tmp/i.db")));
        assert!(config.categories.include_other);
        assert!(!config.categories.include_audio);
        assert_eq!(config.worker_threads, 3);
    }

    #[test]
    fn no_flags_use_environment() {
        let config = build_config(args(), &FixedEnvironment).unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/home/me/Videos")]);
        assert_eq!(config.database, Some(PathBuf::from("/data/media-indexer/index.db")));
    }

    #[test]
    fn disabling_every_category_is_an_error() {
        let result = build_config(
            ScanArgs {
                no_video: true,
                no_audio: true,
                ..args()
            },
            &FixedEnvironment,
        );

        assert!(result.is_err());
    }

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
