//! Resolved run options and their preflight validation.

use crate::codecs::{Codec, CodecRegistry};
use std::path::PathBuf;
use thiserror::Error;

/// Error type for option validation
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Source base is missing or not a directory
    #[error("source is not a directory: {0}")]
    BadSource(PathBuf),

    /// Destination base is missing or not a directory
    #[error("destination is not a directory: {0}")]
    BadDestination(PathBuf),

    /// Requested codec is unknown or not destination-capable
    #[error("{name} is not a supported destination codec (choose from: {known})")]
    UnsupportedCodec { name: String, known: String },
}

/// Fully resolved options for one run, as handed over by the CLI.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Destination codec name
    pub codec: String,
    /// Source library base directory
    pub source: PathBuf,
    /// Destination library base directory
    pub destination: PathBuf,
    /// Ignore cover art images
    pub no_covers: bool,
    /// Reprocess regardless of modification times
    pub force: bool,
    /// Descend into `.exclude`-marked subtrees
    pub ignore_exclude: bool,
    /// Transcode lane width override
    pub jobs: Option<usize>,
    /// Simulate without touching the filesystem
    pub dry_run: bool,
    /// Copy lossy sources verbatim when the destination is lossy too
    pub copy_lossy: bool,
    /// Suppress per-file status lines
    pub quiet: bool,
}

impl SyncOptions {
    /// Validate the options against the filesystem and the registry.
    ///
    /// Both base directories must exist before scanning begins; the
    /// codec must be one of the registry's destination-capable codecs.
    /// Returns the resolved destination codec.
    pub fn validate<'a>(&self, registry: &'a CodecRegistry) -> Result<&'a Codec, OptionsError> {
        if !self.source.is_dir() {
            return Err(OptionsError::BadSource(self.source.clone()));
        }
        if !self.destination.is_dir() {
            return Err(OptionsError::BadDestination(self.destination.clone()));
        }
        registry
            .by_name(&self.codec)
            .filter(|c| c.destination)
            .ok_or_else(|| OptionsError::UnsupportedCodec {
                name: self.codec.clone(),
                known: registry
                    .destination_codecs()
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
