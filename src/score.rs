//! Safety scoring for discovered target folders.
//!
//! Each folder gets exactly one score in 0-100 (higher = safer to delete)
//! and one human-readable reason. Heuristics run in strict priority order
//! and the first match wins; nothing is averaged or combined.

use crate::manager::{self, ManagerKind};
use crate::scanner::{worker_pool, TargetFolder};
use crate::classify::is_build_cache;

use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};

/// How many ancestor levels to search for a `.git` directory when the
/// project itself is not a repository root.
const GIT_SEARCH_RADIUS: usize = 5;

/// The analysis verdict for one target folder.
#[derive(Debug, Clone)]
pub struct PruneResult {
    pub path: PathBuf,
    pub size: u64,
    /// 0-100; higher means safer to delete.
    pub score: u8,
    pub reason: String,
    /// Whether the score meets the caller's threshold.
    pub safe_to_delete: bool,
}

/// Evaluate whether a dependency/build folder is safe to prune.
///
/// Priority order: build-cache exemption, orphan folder, lockfile staleness,
/// uncommitted changes, recent activity, then a moderate default.
pub fn analyze_folder(folder_path: &Path, size: u64, threshold: u8) -> PruneResult {
    let (score, reason) = classify(folder_path);
    PruneResult {
        path: folder_path.to_path_buf(),
        size,
        score,
        safe_to_delete: score >= threshold,
        reason,
    }
}

fn classify(folder_path: &Path) -> (u8, String) {
    let folder_name = folder_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let project_dir = folder_path.parent().unwrap_or(folder_path);

    // Build output is always re-generable.
    if is_build_cache(&folder_name) {
        return (90, "Build cache (re-generable)".to_string());
    }

    // No manifest or lockfile anywhere in the owning directory: presumed
    // abandoned, highest deletion confidence.
    let kind = manager::detect(project_dir);
    if kind == ManagerKind::Unknown {
        return (95, "No lockfile (orphan folder)".to_string());
    }

    let age = lockfile_age(project_dir, kind);

    if let Some(age) = age {
        let days = age.as_secs() / 3600 / 24;
        if days > 90 {
            return (80, format!("Lockfile very stale ({})", format_days(days)));
        }
        if days > 30 {
            return (60, format!("Lockfile stale ({})", format_days(days)));
        }
    }

    if has_uncommitted_changes(project_dir) {
        return (15, "Uncommitted lockfile changes (active work)".to_string());
    }

    if let Some(age) = age {
        if age.as_secs() / 3600 / 24 < 7 {
            return (20, "Active project (recently modified)".to_string());
        }
    }

    (45, "Dependency folder with lockfile".to_string())
}

/// Concurrently analyze all folders on a bounded pool and sort the results
/// by descending score (path as tiebreak).
pub fn analyze_all(
    folders: &[TargetFolder],
    threshold: u8,
    workers: usize,
) -> Result<Vec<PruneResult>> {
    let pool = worker_pool(workers)?;
    let mut results: Vec<PruneResult> = pool.install(|| {
        folders
            .par_iter()
            .map(|f| analyze_folder(&f.path, f.size, threshold))
            .collect()
    });

    results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    Ok(results)
}

/// Wall-clock age of the project's lockfile, or `None` when no lockfile
/// exists (or its mtime lies in the future).
fn lockfile_age(dir: &Path, kind: ManagerKind) -> Option<Duration> {
    for name in manager::lockfile_names(kind) {
        let path = dir.join(name);
        if let Ok(meta) = std::fs::metadata(&path) {
            if let Ok(modified) = meta.modified() {
                return SystemTime::now().duration_since(modified).ok();
            }
        }
    }
    None
}

/// Check whether git reports pending changes for `dir`. The repository root
/// is searched within a small ancestor radius; if none is found, or the git
/// call fails for any reason, this reports `false` and scoring falls through
/// to the staleness-based rules (fail-open).
fn has_uncommitted_changes(dir: &Path) -> bool {
    if !git_root_within_radius(dir) {
        return false;
    }

    let output = Command::new("git")
        .arg("status")
        .arg("--porcelain")
        .arg(dir)
        .current_dir(dir)
        .output();

    match output {
        Ok(output) if output.status.success() => !output.stdout.is_empty(),
        _ => false,
    }
}

fn git_root_within_radius(dir: &Path) -> bool {
    dir.ancestors()
        .take(GIT_SEARCH_RADIUS + 1)
        .any(|p| p.join(".git").exists())
}

/// Render a day count as days (<30) or approximate 30-day months.
fn format_days(days: u64) -> String {
    if days == 1 {
        return "1 day".to_string();
    }
    if days < 30 {
        return format!("{days} days");
    }
    let months = days / 30;
    if months == 1 {
        "~1 month".to_string()
    } else {
        format!("~{months} months")
    }
}
