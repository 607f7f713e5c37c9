//! Run counters and status output.
//!
//! The four run counters and every status line share one mutex, so
//! increments are never lost and lines from concurrent workers never
//! interleave. Counters are read for the summary only after both lanes
//! have drained.

use crate::task::{Completed, Task, TaskError};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Aggregate result counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub up_to_date: u64,
    pub copied: u64,
    pub transcoded: u64,
    pub failed: u64,
}

impl RunCounters {
    pub fn total(&self) -> u64 {
        self.up_to_date + self.copied + self.transcoded + self.failed
    }
}

/// Mutual-exclusion context for counters and per-file status lines.
pub struct Reporter {
    quiet: bool,
    counters: Mutex<RunCounters>,
}

/// Shared reporter handle for concurrent access across lanes.
pub type SharedReporter = Arc<Reporter>;

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            counters: Mutex::new(RunCounters::default()),
        }
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Incremental files-found indicator during the scan phase.
    pub fn found(&self, count: usize) {
        let _guard = self.lock();
        if !self.quiet {
            print!("\r{} files found", count);
            let _ = std::io::stdout().flush();
        }
    }

    /// Finish the files-found line at the end of the scan.
    pub fn scan_done(&self, count: usize) {
        let _guard = self.lock();
        if !self.quiet {
            println!("\r{} files found", count);
        }
    }

    /// Record a failure discovered during scanning (e.g. no transcoder).
    pub fn record_scan_failure(&self, relative: &Path, text: &str) {
        let mut counters = self.lock();
        counters.failed += 1;
        if !self.quiet {
            println!("{}: {}", relative.display(), text);
        }
    }

    /// Record a task outcome: bump the matching counter and emit the
    /// per-file status line.
    pub fn record(&self, task: &Task, outcome: &Result<Completed, TaskError>) {
        let mut counters = self.lock();
        let line = match outcome {
            Ok(Completed::UpToDate) => {
                counters.up_to_date += 1;
                None
            }
            Ok(Completed::Copied) => {
                counters.copied += 1;
                Some(task.describe())
            }
            Ok(Completed::Transcoded) => {
                counters.transcoded += 1;
                Some(task.describe())
            }
            Err(_) => {
                counters.failed += 1;
                Some(match task {
                    Task::Copy { .. } => "copy failed".to_string(),
                    _ => "transcode failed".to_string(),
                })
            }
        };
        if let Some(text) = line {
            if !self.quiet {
                println!("{}: {}", task.relative_path().display(), text);
            }
        }
    }

    /// Snapshot of the counters; meaningful once both lanes have drained.
    pub fn counters(&self) -> RunCounters {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RunCounters> {
        self.counters.lock().expect("reporter mutex poisoned")
    }
}
