//! Destructive phase: concurrent folder deletion and sequential reinstalls.

use crate::manager::{self, ManagerKind};
use crate::scanner::{worker_pool, TargetFolder};

use anyhow::Result;
use colored::Colorize;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Aggregated outcome of one deletion fan-out.
#[derive(Debug, Default)]
pub struct DeleteStats {
    /// Bytes actually freed: only folders that were successfully removed.
    pub freed: u64,
    /// Number of folders successfully removed.
    pub deleted: usize,
    /// Per-folder failures; these do not abort sibling deletions.
    pub failures: Vec<(PathBuf, String)>,
}

/// Recursively remove every folder on a bounded worker pool, blocking until
/// all units finish. A per-folder failure is reported inline, excluded from
/// the freed total, and never aborts the batch.
pub fn delete_folders(folders: &[TargetFolder], workers: usize) -> Result<DeleteStats> {
    let pool = worker_pool(workers)?;
    let freed = AtomicU64::new(0);
    let failures: Mutex<Vec<(PathBuf, String)>> = Mutex::new(Vec::new());

    pool.install(|| {
        folders.par_iter().for_each(|folder| {
            match fs::remove_dir_all(&folder.path) {
                Ok(()) => {
                    freed.fetch_add(folder.size, Ordering::Relaxed);
                }
                Err(err) => {
                    eprintln!(
                        "{}",
                        format!("Failed to remove {}: {}", folder.path.display(), err).red()
                    );
                    failures
                        .lock()
                        .expect("failure list poisoned")
                        .push((folder.path.clone(), err.to_string()));
                }
            }
        });
    });

    let failures = failures.into_inner().expect("failure list poisoned");
    Ok(DeleteStats {
        freed: freed.into_inner(),
        deleted: folders.len() - failures.len(),
        failures,
    })
}

/// The owning project directory of one or more deleted target folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReinstallTarget {
    pub dir: PathBuf,
    pub kind: ManagerKind,
}

/// Dedupe deleted folders into reinstall targets by owning project
/// directory, preserving first-seen order. Projects with no detectable
/// manager have nothing to reinstall with; they come back in the second
/// list so the caller can report each one.
pub fn reinstall_targets(folders: &[TargetFolder]) -> (Vec<ReinstallTarget>, Vec<PathBuf>) {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut targets = Vec::new();
    let mut skipped = Vec::new();

    for folder in folders {
        let Some(dir) = folder.path.parent() else {
            continue;
        };
        if !seen.insert(dir.to_path_buf()) {
            continue;
        }

        let kind = manager::detect(dir);
        if kind == ManagerKind::Unknown {
            skipped.push(dir.to_path_buf());
        } else {
            targets.push(ReinstallTarget {
                dir: dir.to_path_buf(),
                kind,
            });
        }
    }

    (targets, skipped)
}

/// Reinstall dependencies one project at a time. Concurrent package-manager
/// invocations against shared global caches are unsafe, so this is strictly
/// sequential. A per-project failure is reported and does not stop the rest.
/// Returns the number of successful reinstalls.
pub fn reinstall_all(targets: &[ReinstallTarget]) -> usize {
    let mut succeeded = 0;

    for target in targets {
        println!(
            "Reinstalling for {} ({})...",
            target.dir.display(),
            target.kind
        );
        match manager::install(&target.dir, target.kind, true) {
            Ok(()) => {
                println!("{}", format!("Reinstalled {}", target.dir.display()).green());
                succeeded += 1;
            }
            Err(err) => {
                eprintln!(
                    "{}",
                    format!("Failed to reinstall {}: {}", target.dir.display(), err).red()
                );
            }
        }
    }

    succeeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DEFAULT_WORKERS;
    use tempfile::tempdir;

    #[test]
    fn deletes_folders_and_counts_freed_bytes() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("node_modules");
        let b = dir.path().join("dist");
        fs::create_dir_all(a.join("pkg")).unwrap();
        fs::write(a.join("pkg/f"), vec![0u8; 64]).unwrap();
        fs::create_dir(&b).unwrap();

        let folders = vec![
            TargetFolder { path: a.clone(), size: 64 },
            TargetFolder { path: b.clone(), size: 0 },
        ];

        let stats = delete_folders(&folders, DEFAULT_WORKERS).unwrap();
        assert_eq!(stats.deleted, 2);
        assert_eq!(stats.freed, 64);
        assert!(stats.failures.is_empty());
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn failed_deletion_is_excluded_from_freed_total() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("dist");
        fs::create_dir(&present).unwrap();
        let missing = dir.path().join("gone/node_modules");

        let folders = vec![
            TargetFolder { path: missing.clone(), size: 500 },
            TargetFolder { path: present.clone(), size: 10 },
        ];

        let stats = delete_folders(&folders, 2).unwrap();
        assert_eq!(stats.deleted, 1);
        assert_eq!(stats.freed, 10);
        assert_eq!(stats.failures.len(), 1);
        assert_eq!(stats.failures[0].0, missing);
        assert!(!present.exists());
    }

    #[test]
    fn reinstall_targets_dedupe_by_project_dir() {
        let dir = tempdir().unwrap();
        let proj = dir.path().join("app");
        fs::create_dir_all(&proj).unwrap();
        fs::write(proj.join("package-lock.json"), "{}").unwrap();

        // Two deleted subfolders under one project yield one target.
        let folders = vec![
            TargetFolder { path: proj.join("node_modules"), size: 0 },
            TargetFolder { path: proj.join("dist"), size: 0 },
        ];

        let (targets, skipped) = reinstall_targets(&folders);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].dir, proj);
        assert_eq!(targets[0].kind, ManagerKind::Npm);
        assert!(skipped.is_empty());
    }

    #[test]
    fn reinstall_targets_report_unknown_managers_as_skipped() {
        let dir = tempdir().unwrap();
        let proj = dir.path().join("mystery");
        fs::create_dir_all(&proj).unwrap();

        let folders = vec![TargetFolder { path: proj.join("node_modules"), size: 0 }];
        let (targets, skipped) = reinstall_targets(&folders);
        assert!(targets.is_empty());
        assert_eq!(skipped, vec![proj]);
    }

    #[test]
    fn unknown_manager_projects_do_not_hide_known_ones() {
        let dir = tempdir().unwrap();
        let known = dir.path().join("app");
        let unknown = dir.path().join("mystery");
        fs::create_dir_all(&known).unwrap();
        fs::create_dir_all(&unknown).unwrap();
        fs::write(known.join("Cargo.toml"), "[package]").unwrap();

        let folders = vec![
            TargetFolder { path: unknown.join("node_modules"), size: 0 },
            TargetFolder { path: known.join("target"), size: 0 },
        ];

        let (targets, skipped) = reinstall_targets(&folders);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].dir, known);
        assert_eq!(targets[0].kind, ManagerKind::Cargo);
        assert_eq!(skipped, vec![unknown]);
    }

    #[test]
    fn reinstall_targets_preserve_first_seen_order() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("b-proj");
        let second = dir.path().join("a-proj");
        for p in [&first, &second] {
            fs::create_dir_all(p).unwrap();
            fs::write(p.join("go.mod"), "module x").unwrap();
        }

        let folders = vec![
            TargetFolder { path: first.join("dist"), size: 0 },
            TargetFolder { path: second.join("dist"), size: 0 },
        ];

        let (targets, _) = reinstall_targets(&folders);
        assert_eq!(targets[0].dir, first);
        assert_eq!(targets[1].dir, second);
    }
}
