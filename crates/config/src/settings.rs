//! Core settings structures and loading logic

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Error type for settings operations
#[derive(Debug)]
pub enum SettingsError {
    /// IO error reading settings file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Failed to read settings file: {}", e),
            SettingsError::Parse(e) => write!(f, "Failed to parse settings: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<toml::de::Error> for SettingsError {
    fn from(e: toml::de::Error) -> Self {
        SettingsError::Parse(e)
    }
}

/// Worker-lane configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionSettings {
    /// Copy lane width (0 = built-in default)
    #[serde(default = "default_copy_workers")]
    pub copy_workers: u32,
    /// Transcode lane width (0 = auto-detect from CPU count)
    #[serde(default)]
    pub jobs: u32,
}

fn default_copy_workers() -> u32 {
    2
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            copy_workers: default_copy_workers(),
            jobs: 0,
        }
    }
}

/// Status output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputSettings {
    /// Suppress per-file status lines (default false)
    #[serde(default)]
    pub quiet: bool,
}

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

impl Settings {
    /// Load settings from a TOML file
    ///
    /// Parses the settings file and fills in missing optional fields with defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse settings from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Apply environment variable overrides to the settings
    ///
    /// Overrides the following values if environment variables are set:
    /// - ALTSYNC_COPY_WORKERS -> execution.copy_workers
    /// - ALTSYNC_JOBS -> execution.jobs
    /// - ALTSYNC_QUIET -> output.quiet
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("ALTSYNC_COPY_WORKERS") {
            if let Ok(workers) = val.parse::<u32>() {
                self.execution.copy_workers = workers;
            }
        }

        if let Ok(val) = env::var("ALTSYNC_JOBS") {
            if let Ok(jobs) = val.parse::<u32>() {
                self.execution.jobs = jobs;
            }
        }

        if let Ok(val) = env::var("ALTSYNC_QUIET") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.output.quiet = true,
                "false" | "0" | "no" => self.output.quiet = false,
                _ => {} // Invalid value, keep existing
            }
        }
    }

    /// Load settings from file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let mut settings = Self::load_from_file(path)?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Load settings from file if it exists, falling back to defaults
    ///
    /// A missing file yields default settings; a present but malformed
    /// file is still an error. Environment overrides apply either way.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        if path.as_ref().is_file() {
            Self::load(path)
        } else {
            let mut settings = Self::default();
            settings.apply_env_overrides();
            Ok(settings)
        }
    }
}
