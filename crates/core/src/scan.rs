//! Scanner for discovering source files and building the task queues.
//!
//! The scan phase is single-threaded and fully synchronous: it walks
//! the source tree, classifies every file, and resolves every
//! transcode command before any execution starts. Hidden directories
//! are skipped, as is any subtree carrying a `.exclude` marker file.

use crate::classify::{decide_action, DecideOptions};
use crate::codecs::{Codec, CodecRegistry};
use crate::options::SyncOptions;
use crate::paths::SplitPath;
use crate::report::Reporter;
use crate::task::{Lane, Task};
use walkdir::WalkDir;

/// Marker file excluding a directory subtree from the scan.
pub const EXCLUDE_MARKER: &str = ".exclude";

/// The two task queues produced by a completed scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub copy_tasks: Vec<Task>,
    pub transcode_tasks: Vec<Task>,
}

impl ScanOutcome {
    pub fn total(&self) -> usize {
        self.copy_tasks.len() + self.transcode_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Walk the source tree and classify every file into a task queue.
///
/// Per-file `NoTranscoder` conditions are recorded as failures through
/// the reporter and scanning continues; nothing here aborts the run.
pub fn scan(
    registry: &CodecRegistry,
    destination: &Codec,
    opts: &SyncOptions,
    reporter: &Reporter,
) -> ScanOutcome {
    let decide_opts = DecideOptions {
        no_covers: opts.no_covers,
        force: opts.force,
        copy_lossy: opts.copy_lossy,
    };

    let ignore_exclude = opts.ignore_exclude;
    let walker = WalkDir::new(&opts.source).into_iter().filter_entry(move |entry| {
        if entry.file_type().is_dir() {
            // Skip hidden directories, but allow a hidden source root
            if entry.depth() > 0 {
                if let Some(name) = entry.file_name().to_str() {
                    if name.starts_with('.') {
                        return false;
                    }
                }
            }
            if !ignore_exclude && entry.path().join(EXCLUDE_MARKER).exists() {
                return false;
            }
        }
        true
    });

    let mut outcome = ScanOutcome::default();
    let mut found = 0usize;

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let split = match SplitPath::parse(&opts.source, entry.path()) {
            Some(split) => split,
            None => continue,
        };

        match decide_action(registry, &split, destination, &opts.destination, &decide_opts) {
            Ok(Some(task)) => {
                found += 1;
                reporter.found(found);
                match task.lane() {
                    Lane::Copy => outcome.copy_tasks.push(task),
                    Lane::Transcode => outcome.transcode_tasks.push(task),
                }
            }
            Ok(None) => {}
            Err(_) => {
                found += 1;
                reporter.found(found);
                reporter.record_scan_failure(&split.relative(), "No transcoder");
            }
        }
    }

    reporter.scan_done(found);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn options(source: &Path, destination: &Path) -> SyncOptions {
        SyncOptions {
            codec: "opus".to_string(),
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            no_covers: false,
            force: false,
            ignore_exclude: false,
            jobs: None,
            dry_run: false,
            copy_lossy: false,
            quiet: true,
        }
    }

    fn make_tree(files: &[&str]) -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(&dst).unwrap();
        for rel in files {
            let full = src.join(rel);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            File::create(full).unwrap();
        }
        (temp, src, dst)
    }

    fn relative_paths(tasks: &[Task]) -> Vec<PathBuf> {
        tasks.iter().map(|t| t.relative_path()).collect()
    }

    #[test]
    fn test_scan_splits_tasks_into_lanes() {
        let (_temp, src, dst) = make_tree(&["album/track1.flac", "album/cover.jpg"]);
        let registry = CodecRegistry::builtin();
        let opus = registry.by_name("opus").unwrap();
        let reporter = Reporter::new(true);

        let outcome = scan(&registry, opus, &options(&src, &dst), &reporter);

        assert_eq!(outcome.total(), 2);
        assert_eq!(
            relative_paths(&outcome.copy_tasks),
            vec![PathBuf::from("album/cover.jpg")]
        );
        assert_eq!(
            relative_paths(&outcome.transcode_tasks),
            vec![PathBuf::from("album/track1.flac")]
        );

        // The flac transcode resolves the dedicated encoder rule
        match &outcome.transcode_tasks[0] {
            Task::Transcode { command, .. } => {
                assert_eq!(command[0], std::ffi::OsString::from("opusenc"));
            }
            other => panic!("expected Transcode, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_skips_hidden_directories() {
        let (_temp, src, dst) =
            make_tree(&["album/track.flac", ".stversions/old.flac"]);
        let registry = CodecRegistry::builtin();
        let opus = registry.by_name("opus").unwrap();
        let reporter = Reporter::new(true);

        let outcome = scan(&registry, opus, &options(&src, &dst), &reporter);

        assert_eq!(outcome.total(), 1);
        assert_eq!(
            relative_paths(&outcome.transcode_tasks),
            vec![PathBuf::from("album/track.flac")]
        );
    }

    #[test]
    fn test_scan_skips_excluded_subtrees() {
        let (_temp, src, dst) = make_tree(&[
            "keep/track.flac",
            "bootlegs/track.flac",
            "bootlegs/nested/other.flac",
        ]);
        File::create(src.join("bootlegs").join(EXCLUDE_MARKER)).unwrap();
        let registry = CodecRegistry::builtin();
        let opus = registry.by_name("opus").unwrap();

        let outcome = scan(
            &registry,
            opus,
            &options(&src, &dst),
            &Reporter::new(true),
        );
        assert_eq!(
            relative_paths(&outcome.transcode_tasks),
            vec![PathBuf::from("keep/track.flac")]
        );

        // ignore_exclude descends anyway
        let mut opts = options(&src, &dst);
        opts.ignore_exclude = true;
        let outcome = scan(&registry, opus, &opts, &Reporter::new(true));
        assert_eq!(outcome.total(), 3);
    }

    #[test]
    fn test_scan_ignores_unsupported_files() {
        let (_temp, src, dst) = make_tree(&["album/track.flac", "album/notes.txt", "album/rip.log"]);
        let registry = CodecRegistry::builtin();
        let opus = registry.by_name("opus").unwrap();
        let reporter = Reporter::new(true);

        let outcome = scan(&registry, opus, &options(&src, &dst), &reporter);

        assert_eq!(outcome.total(), 1);
        assert_eq!(reporter.counters().failed, 0);
    }

    #[tokio::test]
    async fn test_second_run_is_all_up_to_date() {
        use crate::report::Reporter as R;
        use crate::scheduler::{LanePlan, Scheduler};
        use std::sync::Arc;
        use std::time::{Duration, SystemTime};

        let (_temp, src, dst) = make_tree(&["album/track.mp3", "album/cover.jpg"]);
        // Age the sources so the mirrored copies end up strictly newer
        let old = SystemTime::now() - Duration::from_secs(60);
        for rel in ["album/track.mp3", "album/cover.jpg"] {
            File::options()
                .write(true)
                .open(src.join(rel))
                .unwrap()
                .set_modified(old)
                .unwrap();
        }

        let registry = CodecRegistry::builtin();
        let mp3 = registry.by_name("mp3").unwrap();
        let mut opts = options(&src, &dst);
        opts.codec = "mp3".to_string();
        let plan = LanePlan {
            copy_workers: 2,
            transcode_workers: 1,
        };

        // First run: mp3 -> mp3 and the cover are both straight copies
        let reporter = Arc::new(R::new(true));
        let outcome = scan(&registry, mp3, &opts, &reporter);
        let counters = Scheduler::new(plan, reporter, false).run(outcome).await;
        assert_eq!(counters.copied, 2);

        // Second run over the unchanged tree: everything is up to date
        let reporter = Arc::new(R::new(true));
        let outcome = scan(&registry, mp3, &opts, &reporter);
        let counters = Scheduler::new(plan, reporter, false).run(outcome).await;
        assert_eq!(counters.up_to_date, 2);
        assert_eq!(counters.copied, 0);
        assert_eq!(counters.transcoded, 0);
        assert_eq!(counters.failed, 0);
    }

    #[test]
    fn test_scan_records_missing_transcoder_and_continues() {
        let (_temp, src, dst) = make_tree(&["album/track.wma", "album/track.flac"]);

        // flac destination that can only encode from flac sources
        let mut registry = CodecRegistry::new();
        registry
            .register(Codec {
                name: "wma".to_string(),
                extension: "wma".to_string(),
                aliases: vec![],
                source: true,
                destination: false,
                lossy: true,
                rules: Default::default(),
                wildcard: None,
            })
            .unwrap();
        registry
            .register(Codec {
                name: "flac".to_string(),
                extension: "flac".to_string(),
                aliases: vec![],
                source: true,
                destination: true,
                lossy: false,
                rules: Default::default(),
                wildcard: None,
            })
            .unwrap();
        let flac = registry.by_name("flac").unwrap();

        let mut opts = options(&src, &dst);
        opts.codec = "flac".to_string();
        let reporter = Reporter::new(true);
        let outcome = scan(&registry, flac, &opts, &reporter);

        // wma failed during scanning; flac -> flac still became a copy task
        assert_eq!(reporter.counters().failed, 1);
        assert_eq!(
            relative_paths(&outcome.copy_tasks),
            vec![PathBuf::from("album/track.flac")]
        );
    }
}
