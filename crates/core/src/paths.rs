//! Split path model for mirrored library trees.
//!
//! A discovered file is held as (base directory, relative subdirectory,
//! stem, extension) so the destination mirror path can be derived by
//! swapping the base and extension while preserving the rest.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Immutable decomposition of a file path under a library base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPath {
    base: PathBuf,
    subdir: PathBuf,
    stem: String,
    extension: String,
}

impl SplitPath {
    /// Decompose `path` relative to `base`.
    ///
    /// Returns `None` when the path is not under `base` or has no file
    /// name. The extension is everything after the last `.`; a name
    /// without a dot has an empty extension. The extension is stored as
    /// found; comparisons elsewhere lowercase it.
    pub fn parse(base: &Path, path: &Path) -> Option<SplitPath> {
        let parent = path.parent()?;
        let subdir = parent.strip_prefix(base).ok()?.to_path_buf();
        let name = path.file_name()?.to_str()?;
        let (stem, extension) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
            _ => (name.to_string(), String::new()),
        };
        Some(Self {
            base: base.to_path_buf(),
            subdir,
            stem,
            extension,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn subdir(&self) -> &Path {
        &self.subdir
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name with extension, if any.
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.stem.clone()
        } else {
            format!("{}.{}", self.stem, self.extension)
        }
    }

    /// Full directory holding the file.
    pub fn directory(&self) -> PathBuf {
        self.base.join(&self.subdir)
    }

    /// Full absolute path to the file.
    pub fn full_path(&self) -> PathBuf {
        self.directory().join(self.file_name())
    }

    /// Path relative to the base directory.
    pub fn relative(&self) -> PathBuf {
        self.subdir.join(self.file_name())
    }

    /// Same subdirectory and stem under a new base with a new extension.
    ///
    /// This is how a source file's destination mirror path is computed.
    pub fn rebase(&self, new_base: &Path, new_extension: &str) -> SplitPath {
        Self {
            base: new_base.to_path_buf(),
            subdir: self.subdir.clone(),
            stem: self.stem.clone(),
            extension: new_extension.to_string(),
        }
    }

    /// Create the full directory tree, idempotently.
    ///
    /// Must succeed before any file is written into the directory; call
    /// sites are the Copy and Transcode execution paths.
    pub fn ensure_directory(&self) -> io::Result<()> {
        fs::create_dir_all(self.directory())
    }
}
