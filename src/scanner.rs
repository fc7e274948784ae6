//! Target folder discovery and concurrent size calculation.

use crate::classify::{is_deletable_target, is_ignored_dir};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// Ceiling on concurrently running sizing/deletion units. Bounds simultaneous
/// open file descriptors and spawned child processes; tune with `--workers`.
pub const DEFAULT_WORKERS: usize = 20;

/// A discovered target folder with its recursive size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFolder {
    pub path: PathBuf,
    pub size: u64,
}

/// Build a fixed-size rayon pool for one fan-out phase.
pub(crate) fn worker_pool(workers: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .context("failed to build worker pool")
}

/// Walk `root` depth-first and collect every directory whose basename is a
/// deletable target. Matched folders are recorded without descending into
/// them, so no result is ever nested beneath another result. Ignored subtrees
/// (VCS metadata, platform caches, editor state) are pruned silently.
///
/// Traversal errors on individual entries are swallowed; an unreadable
/// subtree must never abort discovery of the rest of the tree. The only
/// fatal error is a root that cannot be walked at all.
pub fn find_target_folders(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("cannot scan '{}': not a directory", root.display());
    }

    let mut targets = Vec::new();
    // Sorted traversal keeps discovery order stable across runs.
    let mut it = WalkDir::new(root).sort_by_file_name().into_iter();

    while let Some(entry) = it.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();

        if is_ignored_dir(&name) {
            it.skip_current_dir();
            continue;
        }

        if is_deletable_target(&name) {
            targets.push(entry.into_path());
            // A target's insides are irrelevant to discovery.
            it.skip_current_dir();
        }
    }

    Ok(targets)
}

/// Recursive apparent size of all regular files under `path`. Directories
/// contribute 0, symlinks are not followed, and traversal errors simply
/// reduce the reported size.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Size every candidate folder on a bounded worker pool, blocking until all
/// units complete, then sort by descending size (path as tiebreak so output
/// is deterministic). A per-folder failure degrades its size to zero rather
/// than excluding it.
pub fn calculate_folder_sizes(targets: Vec<PathBuf>, workers: usize) -> Result<Vec<TargetFolder>> {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message(format!("Calculating sizes of {} folders...", targets.len()));
    progress.enable_steady_tick(Duration::from_millis(100));

    let pool = worker_pool(workers)?;
    let mut folders: Vec<TargetFolder> = pool.install(|| {
        targets
            .into_par_iter()
            .map(|path| {
                let size = dir_size(&path);
                TargetFolder { path, size }
            })
            .collect()
    });

    progress.finish_and_clear();

    folders.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    Ok(folders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_targets_without_descending_into_them() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        // node_modules containing a nested node_modules must yield one result
        fs::create_dir_all(root.join("app/node_modules/pkg/node_modules")).unwrap();
        fs::create_dir_all(root.join("app/src")).unwrap();

        let targets = find_target_folders(root).unwrap();
        assert_eq!(targets, vec![root.join("app/node_modules")]);
    }

    #[test]
    fn never_reports_nested_results() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("a/node_modules")).unwrap();
        fs::create_dir_all(root.join("a/web/dist")).unwrap();
        fs::create_dir_all(root.join("b/target/debug/build")).unwrap();

        let targets = find_target_folders(root).unwrap();
        for t in &targets {
            for other in &targets {
                if t != other {
                    assert!(!t.starts_with(other), "{t:?} nested under {other:?}");
                }
            }
        }
        assert_eq!(targets.len(), 3);
    }

    #[test]
    fn skips_ignored_subtrees() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join(".cache/node_modules")).unwrap();
        fs::create_dir_all(root.join(".git/build")).unwrap();
        fs::create_dir_all(root.join("proj/node_modules")).unwrap();

        let targets = find_target_folders(root).unwrap();
        assert_eq!(targets, vec![root.join("proj/node_modules")]);
    }

    #[test]
    fn discovery_is_idempotent() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("z/node_modules")).unwrap();
        fs::create_dir_all(root.join("a/dist")).unwrap();
        fs::create_dir_all(root.join("m/.venv")).unwrap();

        let first = find_target_folders(root).unwrap();
        let second = find_target_folders(root).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_root_is_a_fatal_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(find_target_folders(&missing).is_err());
    }

    #[test]
    fn empty_dir_has_zero_size() {
        let dir = tempdir().unwrap();
        assert_eq!(dir_size(dir.path()), 0);
    }

    #[test]
    fn size_sums_files_at_any_depth() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("a.txt"), vec![0u8; 100]).unwrap();
        fs::create_dir_all(root.join("deep/deeper")).unwrap();
        fs::write(root.join("deep/b.txt"), vec![0u8; 250]).unwrap();
        fs::write(root.join("deep/deeper/c.txt"), vec![0u8; 50]).unwrap();

        assert_eq!(dir_size(root), 400);
    }

    #[test]
    fn sizes_sorted_descending() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("small")).unwrap();
        fs::write(root.join("small/f"), vec![0u8; 10]).unwrap();
        fs::create_dir_all(root.join("big")).unwrap();
        fs::write(root.join("big/f"), vec![0u8; 1000]).unwrap();

        let folders = calculate_folder_sizes(
            vec![root.join("small"), root.join("big")],
            DEFAULT_WORKERS,
        )
        .unwrap();

        assert_eq!(folders[0].path, root.join("big"));
        assert_eq!(folders[0].size, 1000);
        assert_eq!(folders[1].size, 10);
    }

    #[test]
    fn missing_folder_degrades_to_zero_size() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("vanished");

        let folders = calculate_folder_sizes(vec![gone.clone()], 2).unwrap();
        assert_eq!(folders, vec![TargetFolder { path: gone, size: 0 }]);
    }
}
