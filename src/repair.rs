//! The repair and refresh flows: health-check projects and reinstall broken ones.

use crate::classify::{is_deletable_target, is_ignored_dir};
use crate::manager::{self, ManagerKind};

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// A detected project directory with its package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub dir: PathBuf,
    pub kind: ManagerKind,
}

/// Recursively find directories with a recognized manifest/lockfile,
/// pruning ignored subtrees and target folders. Traversal errors are
/// swallowed like the target walk.
pub fn find_projects(root: &Path) -> Result<Vec<Project>> {
    if !root.is_dir() {
        anyhow::bail!("cannot scan '{}': not a directory", root.display());
    }

    let mut projects = Vec::new();
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
        if is_ignored_dir(&name) || is_deletable_target(&name) {
            it.skip_current_dir();
            continue;
        }

        let kind = manager::detect(entry.path());
        if kind != ManagerKind::Unknown {
            projects.push(Project {
                dir: entry.into_path(),
                kind,
            });
        }
    }

    Ok(projects)
}

/// Health-check every project under `root` and repair the unhealthy ones by
/// removing the manager's target folder and reinstalling. A per-project
/// failure is reported and does not stop subsequent projects.
pub fn repair_dir(root: &Path, verbose: bool) -> Result<()> {
    println!(
        "{}",
        format!(
            "Scanning for projects with broken dependencies in '{}'...",
            root.display()
        )
        .cyan()
    );

    let projects = find_projects(root)?;
    if projects.is_empty() {
        println!("{}", "No projects found!".green());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} projects. Checking health...", projects.len()).yellow()
    );

    let mut repaired = 0usize;

    for project in &projects {
        let health = manager::check_health(&project.dir, project.kind);

        if health.healthy {
            if verbose {
                println!("\n{} ({})", project.dir.display(), project.kind);
                println!("{}", "   Healthy, skipping.".green());
            }
            continue;
        }

        println!("\n{} ({})", project.dir.display(), project.kind);
        for issue in &health.issues {
            println!("{}", format!("   {issue}").red());
        }

        let target = project.dir.join(manager::target_folder(project.kind));
        if target.is_dir() {
            println!("   Removing {}...", target.display());
            if let Err(err) = fs::remove_dir_all(&target) {
                println!(
                    "{}",
                    format!("   Failed to remove {}: {}", target.display(), err).red()
                );
                continue;
            }
        }

        println!("   Reinstalling...");
        if let Err(err) = manager::install(&project.dir, project.kind, true) {
            println!("{}", format!("   Failed to reinstall: {err}").red());
            continue;
        }

        println!("{}", "   Repaired!".green());
        repaired += 1;
    }

    println!("\n{}", "-".repeat(40));
    println!(
        "{}",
        format!("Repair complete! Fixed {repaired}/{} projects.", projects.len()).green()
    );

    Ok(())
}

/// Refresh one directory: remove its target folder and reinstall. This is
/// the bare-command flow; an undetectable manager is a hard error here.
pub fn refresh_dir(dir: &Path) -> Result<()> {
    let kind = manager::detect(dir);
    if kind == ManagerKind::Unknown {
        anyhow::bail!(
            "could not detect package manager in '{}'",
            dir.display()
        );
    }

    println!("Detected package manager: {kind}");

    let target = dir.join(manager::target_folder(kind));
    if target.is_dir() {
        println!("Removing {}...", target.display());
        let start = Instant::now();
        fs::remove_dir_all(&target)
            .with_context(|| format!("failed to remove {}", target.display()))?;
        println!("Removed in {:.2?}", start.elapsed());
    } else {
        println!("No {} found, skipping deletion.", target.display());
    }

    manager::install(dir, kind, false)
        .map_err(anyhow::Error::msg)
        .context("failed to install dependencies")?;

    println!("{}", "Refresh complete!".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn finds_projects_and_skips_target_subtrees() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("app")).unwrap();
        fs::write(root.join("app/package-lock.json"), "{}").unwrap();
        // A manifest inside node_modules must not be reported.
        fs::create_dir_all(root.join("app/node_modules/dep")).unwrap();
        fs::write(root.join("app/node_modules/dep/package-lock.json"), "{}").unwrap();
        fs::create_dir_all(root.join("plain")).unwrap();

        let projects = find_projects(root).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].dir, root.join("app"));
        assert_eq!(projects[0].kind, ManagerKind::Npm);
    }

    #[test]
    fn nested_projects_are_all_found() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("outer/inner")).unwrap();
        fs::write(root.join("outer/go.mod"), "module outer").unwrap();
        fs::write(root.join("outer/inner/go.mod"), "module inner").unwrap();

        let projects = find_projects(root).unwrap();
        assert_eq!(projects.len(), 2);
    }

    #[test]
    fn refresh_fails_without_a_manager() {
        let dir = tempdir().unwrap();
        assert!(refresh_dir(dir.path()).is_err());
    }
}
