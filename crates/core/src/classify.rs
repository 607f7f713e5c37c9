//! Per-file classification and action decision.
//!
//! `classify` recognizes a file as cover art, a known audio encoding,
//! or unsupported, purely from its stem and extension. `decide_action`
//! turns a recognized source file into at most one task by comparing it
//! against its mirrored destination path.

use crate::codecs::{Codec, CodecRegistry, NoTranscoder};
use crate::paths::SplitPath;
use crate::task::Task;
use std::fs;
use std::path::Path;

/// What a source file was recognized as.
#[derive(Debug, Clone, Copy)]
pub struct Classification<'a> {
    /// jpg/jpeg file whose stem is `cover` (case-insensitive)
    pub cover_art: bool,
    /// Source codec matching the extension, if any
    pub codec: Option<&'a Codec>,
}

impl Classification<'_> {
    pub fn is_supported(&self) -> bool {
        self.cover_art || self.codec.is_some()
    }
}

/// Flags steering the per-file decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecideOptions {
    /// Ignore cover art entirely
    pub no_covers: bool,
    /// Bypass the up-to-date check
    pub force: bool,
    /// Copy lossy sources verbatim when the destination is also lossy
    pub copy_lossy: bool,
}

/// What the file will become at the destination.
enum Action<'a> {
    Copy,
    Transcode(&'a Codec),
}

/// Recognize a file from its stem and extension.
///
/// Pure in (extension, stem): identical inputs always yield the same
/// classification.
pub fn classify<'a>(registry: &'a CodecRegistry, file: &SplitPath) -> Classification<'a> {
    let ext = file.extension();
    let cover_ext = ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg");
    if cover_ext && file.stem().eq_ignore_ascii_case("cover") {
        return Classification {
            cover_art: true,
            codec: None,
        };
    }
    let codec = registry.by_extension(ext).filter(|c| c.source);
    Classification {
        cover_art: false,
        codec,
    }
}

/// Decide what to do with one source file.
///
/// Returns `Ok(None)` for files that produce no task (unsupported, or
/// cover art under `no_covers`). A transcode's command is resolved here,
/// during the scan, so a missing transcoder surfaces as a per-file
/// `NoTranscoder` error instead of an execution-time failure.
pub fn decide_action(
    registry: &CodecRegistry,
    source: &SplitPath,
    destination: &Codec,
    destination_base: &Path,
    opts: &DecideOptions,
) -> Result<Option<Task>, NoTranscoder> {
    let class = classify(registry, source);

    let action = if class.cover_art {
        if opts.no_covers {
            return Ok(None);
        }
        Action::Copy
    } else if let Some(codec) = class.codec {
        let same_codec = codec.name == destination.name;
        let lossy_copy = opts.copy_lossy && codec.lossy && destination.lossy;
        if same_codec || lossy_copy {
            Action::Copy
        } else {
            Action::Transcode(codec)
        }
    } else {
        return Ok(None);
    };

    let out_extension = match action {
        Action::Copy => source.extension(),
        Action::Transcode(_) => destination.extension.as_str(),
    };
    let mirror = source.rebase(destination_base, out_extension);

    if !opts.force && up_to_date(&source.full_path(), &mirror.full_path()) {
        return Ok(Some(Task::UpToDate {
            source: source.clone(),
        }));
    }

    let task = match action {
        Action::Copy => Task::Copy {
            source: source.clone(),
            destination: mirror,
        },
        Action::Transcode(codec) => {
            let command =
                destination.conversion_command(codec, &source.full_path(), &mirror.full_path())?;
            Task::Transcode {
                source: source.clone(),
                destination: mirror,
                source_codec: codec.name.clone(),
                destination_codec: destination.name.clone(),
                command,
            }
        }
    };
    Ok(Some(task))
}

/// True when the destination exists and the source's modification time
/// is strictly earlier. Equal timestamps count as stale and reprocess.
fn up_to_date(source: &Path, destination: &Path) -> bool {
    let dst_meta = match fs::metadata(destination) {
        Ok(meta) => meta,
        Err(_) => return false,
    };
    let src_meta = match fs::metadata(source) {
        Ok(meta) => meta,
        Err(_) => return false,
    };
    match (src_meta.modified(), dst_meta.modified()) {
        (Ok(src), Ok(dst)) => src < dst,
        _ => false,
    }
}
