//! Executable task variants.
//!
//! The scan phase turns every recognized file into exactly one task:
//! up-to-date (nothing to do), copy verbatim, or transcode through an
//! external command resolved at construction time. Tasks run once,
//! report success or a task-local failure, and are safe to re-run.

use crate::paths::SplitPath;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Error type for task execution
#[derive(Debug, Error)]
pub enum TaskError {
    /// IO error during copy or process launch
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Transcoder process exited with non-zero status
    #[error("transcoder exited with code {0}")]
    TranscoderFailed(i32),

    /// Transcoder process was terminated by signal
    #[error("transcoder terminated by signal")]
    TranscoderTerminated,
}

/// Which worker lane a task runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Copy,
    Transcode,
}

/// Successful task outcome, naming the counter to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completed {
    UpToDate,
    Copied,
    Transcoded,
}

/// One unit of work produced by the scan phase.
#[derive(Debug, Clone)]
pub enum Task {
    /// Destination is already newer than the source; no side effect.
    UpToDate { source: SplitPath },
    /// Byte-for-byte copy into the mirror tree.
    Copy {
        source: SplitPath,
        destination: SplitPath,
    },
    /// Run the resolved external command to produce the destination.
    Transcode {
        source: SplitPath,
        destination: SplitPath,
        source_codec: String,
        destination_codec: String,
        command: Vec<OsString>,
    },
}

impl Task {
    /// UpToDate tasks are no-ops and ride the copy lane.
    pub fn lane(&self) -> Lane {
        match self {
            Task::UpToDate { .. } | Task::Copy { .. } => Lane::Copy,
            Task::Transcode { .. } => Lane::Transcode,
        }
    }

    /// Source path relative to the library base, for status lines.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Task::UpToDate { source }
            | Task::Copy { source, .. }
            | Task::Transcode { source, .. } => source.relative(),
        }
    }

    /// Short status text for the per-file report.
    pub fn describe(&self) -> String {
        match self {
            Task::UpToDate { .. } => "up to date".to_string(),
            Task::Copy { .. } => "Copy".to_string(),
            Task::Transcode {
                source_codec,
                destination_codec,
                ..
            } => format!("{} -> {}", source_codec, destination_codec),
        }
    }

    /// Execute the task.
    ///
    /// In dry-run mode nothing touches the filesystem; the task still
    /// reports the outcome it would have had. A failed transcode deletes
    /// any partially written destination file (best effort) before
    /// reporting failure. Failures are task-local: they never abort
    /// sibling tasks.
    pub fn run(&self, dry_run: bool) -> Result<Completed, TaskError> {
        match self {
            Task::UpToDate { .. } => Ok(Completed::UpToDate),
            Task::Copy {
                source,
                destination,
            } => {
                if !dry_run {
                    destination.ensure_directory()?;
                    fs::copy(source.full_path(), destination.full_path())?;
                }
                Ok(Completed::Copied)
            }
            Task::Transcode {
                destination,
                command,
                ..
            } => {
                if dry_run {
                    return Ok(Completed::Transcoded);
                }
                destination.ensure_directory()?;
                match run_command(command) {
                    Ok(status) if status.success() => Ok(Completed::Transcoded),
                    Ok(status) => {
                        let _ = fs::remove_file(destination.full_path());
                        match status.code() {
                            Some(code) => Err(TaskError::TranscoderFailed(code)),
                            None => Err(TaskError::TranscoderTerminated),
                        }
                    }
                    Err(e) => {
                        let _ = fs::remove_file(destination.full_path());
                        Err(TaskError::Io(e))
                    }
                }
            }
        }
    }
}

/// Spawn an argv list with no shell interpretation.
///
/// Standard input is attached to an empty source; standard output and
/// standard error are discarded. Success is exit code zero.
fn run_command(argv: &[OsString]) -> io::Result<ExitStatus> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
}
