//! altsync
//!
//! Maintains an alternate-encoding mirror of an audio library: scans a
//! source tree, decides per file whether to skip, copy, or transcode,
//! and executes copies and transcodes on two independent worker lanes.

pub mod classify;
pub mod codecs;
pub mod options;
pub mod paths;
pub mod report;
pub mod scan;
pub mod scheduler;
pub mod task;

pub use altsync_config as config;
pub use altsync_config::Settings;
pub use classify::{classify, decide_action, Classification, DecideOptions};
pub use codecs::{
    Codec, CodecRegistry, CommandToken, ConversionRule, NoTranscoder, RegistryError,
};
pub use options::{OptionsError, SyncOptions};
pub use paths::SplitPath;
pub use report::{Reporter, RunCounters, SharedReporter};
pub use scan::{scan, ScanOutcome, EXCLUDE_MARKER};
pub use scheduler::{LanePlan, Scheduler, DEFAULT_COPY_WORKERS};
pub use task::{Completed, Lane, Task, TaskError};
