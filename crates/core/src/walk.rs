use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::model::{FailureStage, TraversalFailure};

#[derive(Debug, Clone, Copy, Default)]
pub struct WalkCounters {
    pub files: u64,
    pub directories: u64,
}

/// List the immediate subdirectories of `root`, sorted by path.
///
/// A failure to read the directory, or to stat an individual entry, is
/// recorded in `failures` and that entry (or the whole listing) yields
/// nothing. Used once per share root for job-folder filtering.
pub fn list_subdirs(root: &Path, failures: &mut Vec<TraversalFailure>) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("failed to list {}: {}", root.display(), err);
            failures.push(TraversalFailure {
                stage: FailureStage::ListDir,
                path: root.to_string_lossy().to_string(),
                message: err.to_string(),
            });
            return Vec::new();
        }
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("failed to read entry under {}: {}", root.display(), err);
                failures.push(TraversalFailure {
                    stage: FailureStage::ListDir,
                    path: root.to_string_lossy().to_string(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => dirs.push(entry.path()),
            Ok(_) => {}
            Err(err) => {
                warn!("failed to stat {}: {}", entry.path().display(), err);
                failures.push(TraversalFailure {
                    stage: FailureStage::Stat,
                    path: entry.path().to_string_lossy().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
    dirs.sort();
    dirs
}

/// Recursively enumerate all files beneath `root`, sorted within each
/// directory.
///
/// Any error while descending (unreadable directory, failed stat) is recorded
/// in `failures` and the affected subtree is treated as empty; enumeration of
/// the remainder continues.
pub fn walk_files(
    root: &Path,
    failures: &mut Vec<TraversalFailure>,
    counters: &mut WalkCounters,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for item in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .unwrap_or(root)
                    .to_string_lossy()
                    .to_string();
                warn!("walk error under {}: {}", root.display(), err);
                failures.push(TraversalFailure {
                    stage: FailureStage::Walk,
                    path,
                    message: err.to_string(),
                });
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        if entry.file_type().is_dir() {
            counters.directories += 1;
        } else if entry.file_type().is_file() {
            counters.files += 1;
            files.push(entry.into_path());
        }
    }
    files
}
