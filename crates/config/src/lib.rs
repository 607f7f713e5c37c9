//! Settings module for altsync
//!
//! Handles loading optional settings from TOML files and environment variable overrides.

pub mod settings;

pub use settings::*;
