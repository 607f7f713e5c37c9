//! CLI entry point for altsync
//!
//! Parses command line arguments, runs the scan, and drains both
//! execution lanes to a summary.

use altsync::{scan, CodecRegistry, LanePlan, Reporter, Scheduler, Settings, SyncOptions};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Mirror an audio library into an alternate encoding
#[derive(Parser, Debug)]
#[command(name = "altsync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Destination codec (e.g. opus, vorbis, mp3, flac)
    codec: String,

    /// Source library base directory
    source: PathBuf,

    /// Destination library base directory
    destination: PathBuf,

    /// Skip cover art images
    #[arg(long)]
    no_covers: bool,

    /// Reprocess every file regardless of modification times
    #[arg(long)]
    force: bool,

    /// Descend into directories carrying a .exclude marker
    #[arg(long)]
    ignore_exclude: bool,

    /// Transcode lane width (defaults to the host CPU count)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Report what would be done without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Copy lossy sources verbatim instead of re-encoding them
    #[arg(long)]
    copy_lossy: bool,

    /// Suppress per-file status lines
    #[arg(short, long)]
    quiet: bool,

    /// Path to the settings file
    #[arg(long, default_value = "altsync.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::load_or_default(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let registry = CodecRegistry::builtin();
    let opts = SyncOptions {
        codec: args.codec,
        source: args.source,
        destination: args.destination,
        no_covers: args.no_covers,
        force: args.force,
        ignore_exclude: args.ignore_exclude,
        jobs: args.jobs,
        dry_run: args.dry_run,
        copy_lossy: args.copy_lossy,
        quiet: args.quiet || settings.output.quiet,
    };

    let destination = match opts.validate(&registry) {
        Ok(codec) => codec,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let reporter = Arc::new(Reporter::new(opts.quiet));
    let outcome = scan(&registry, destination, &opts, &reporter);

    let plan = LanePlan::derive(&settings, opts.jobs);
    let scheduler = Scheduler::new(plan, reporter.clone(), opts.dry_run);

    let cancel = scheduler.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted; letting started work finish");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let counters = scheduler.run(outcome).await;
    println!(
        "{} up to date, {} copied, {} transcoded, {} failed",
        counters.up_to_date, counters.copied, counters.transcoded, counters.failed
    );

    if counters.failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
