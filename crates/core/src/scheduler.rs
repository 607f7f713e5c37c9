//! Two-lane concurrent task execution.
//!
//! Copies and transcodes drain on independent bounded lanes so slow
//! transcodes never stall fast copies. Each lane is bounded by a
//! semaphore; cancellation flips a shared flag checked before a task
//! starts, in-flight tasks finish naturally, and the run always drains
//! to a summary.

use crate::report::{RunCounters, SharedReporter};
use crate::scan::ScanOutcome;
use crate::task::{Lane, TaskError};
use altsync_config::Settings;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Copy lane width when settings leave it unset.
///
/// Intentionally low: copies are I/O-bound and must not starve disk
/// bandwidth needed by simultaneous transcodes.
pub const DEFAULT_COPY_WORKERS: usize = 2;

/// Worker counts for the two lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanePlan {
    pub copy_workers: usize,
    pub transcode_workers: usize,
}

impl LanePlan {
    /// Derive lane widths from settings and the `--jobs` flag.
    ///
    /// The flag wins over settings; a zero/unset transcode width falls
    /// back to the host CPU count.
    pub fn derive(settings: &Settings, jobs: Option<usize>) -> Self {
        let copy_workers = if settings.execution.copy_workers > 0 {
            settings.execution.copy_workers as usize
        } else {
            DEFAULT_COPY_WORKERS
        };

        let transcode_workers = jobs
            .filter(|j| *j > 0)
            .or_else(|| {
                (settings.execution.jobs > 0).then(|| settings.execution.jobs as usize)
            })
            .unwrap_or_else(num_cpus::get);

        Self {
            copy_workers,
            transcode_workers,
        }
    }
}

/// Drains the scan outcome through two bounded lanes.
pub struct Scheduler {
    plan: LanePlan,
    copy_permits: Arc<Semaphore>,
    transcode_permits: Arc<Semaphore>,
    cancel: Arc<AtomicBool>,
    reporter: SharedReporter,
    dry_run: bool,
}

impl Scheduler {
    pub fn new(plan: LanePlan, reporter: SharedReporter, dry_run: bool) -> Self {
        Self {
            plan,
            copy_permits: Arc::new(Semaphore::new(plan.copy_workers)),
            transcode_permits: Arc::new(Semaphore::new(plan.transcode_workers)),
            cancel: Arc::new(AtomicBool::new(false)),
            reporter,
            dry_run,
        }
    }

    pub fn plan(&self) -> LanePlan {
        self.plan
    }

    /// Shared flag that stops both lanes from starting queued work.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Available slots on a lane.
    pub fn available_permits(&self, lane: Lane) -> usize {
        match lane {
            Lane::Copy => self.copy_permits.available_permits(),
            Lane::Transcode => self.transcode_permits.available_permits(),
        }
    }

    /// Submit every task and wait for both lanes to drain.
    ///
    /// Tasks queued behind a flipped cancel flag return without running,
    /// so the drain never hangs on work that was never started. Returns
    /// the final counters.
    pub async fn run(&self, outcome: ScanOutcome) -> RunCounters {
        let mut handles = Vec::with_capacity(outcome.total());

        let tasks = outcome
            .copy_tasks
            .into_iter()
            .chain(outcome.transcode_tasks);
        for task in tasks {
            let permits = match task.lane() {
                Lane::Copy => self.copy_permits.clone(),
                Lane::Transcode => self.transcode_permits.clone(),
            };
            let cancel = self.cancel.clone();
            let reporter = self.reporter.clone();
            let dry_run = self.dry_run;

            handles.push(tokio::spawn(async move {
                if cancel.load(Ordering::SeqCst) {
                    return;
                }
                let _permit = permits
                    .acquire_owned()
                    .await
                    .expect("lane semaphore closed");
                if cancel.load(Ordering::SeqCst) {
                    return;
                }

                let blocking_task = task.clone();
                let result =
                    tokio::task::spawn_blocking(move || blocking_task.run(dry_run)).await;
                match result {
                    Ok(outcome) => reporter.record(&task, &outcome),
                    Err(join_err) => reporter.record(
                        &task,
                        &Err(TaskError::Io(io::Error::new(
                            io::ErrorKind::Other,
                            join_err.to_string(),
                        ))),
                    ),
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
        self.reporter.counters()
    }
}
