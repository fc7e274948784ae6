//! The sweep/list flow: discover, size, select, delete, reinstall.

use crate::executor::{self, ReinstallTarget};
use crate::report;
use crate::scanner::{self, TargetFolder};
use crate::select::{SelectableItem, Selector};

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Runtime options for one sweep invocation.
#[derive(Clone, Copy)]
pub struct SweepOptions {
    /// Report only; perform no filesystem mutation.
    pub dry_run: bool,
    /// Reinstall dependencies for affected projects after deletion.
    pub reinstall: bool,
    /// Worker-pool ceiling for the sizing and deletion fan-outs.
    pub workers: usize,
}

/// Scan `root` for heavy folders and (unless dry-run) delete them, with an
/// optional interactive selection step. `selector` is `None` in batch mode.
pub fn sweep_dir(root: &Path, options: SweepOptions, selector: Option<&dyn Selector>) -> Result<()> {
    if options.dry_run {
        println!(
            "{}",
            format!("Listing heavy dependency folders in '{}'...", root.display()).cyan()
        );
    } else {
        println!(
            "{}",
            format!("Scanning for heavy dependency folders in '{}'...", root.display()).cyan()
        );
    }

    let targets = scanner::find_target_folders(root)?;
    if targets.is_empty() {
        println!("{}", "No heavy folders found!".green());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} folders. Calculating sizes concurrently...", targets.len()).yellow()
    );
    let mut folders = scanner::calculate_folder_sizes(targets, options.workers)?;

    // Interactive filtering happens before anything destructive.
    if !options.dry_run {
        if let Some(selector) = selector {
            match filter_folders(folders, selector)? {
                FilterOutcome::Canceled => {
                    println!("{}", "\nOperation canceled.".yellow());
                    return Ok(());
                }
                FilterOutcome::Selected(selected) => folders = selected,
            }
        }
    }

    if folders.is_empty() {
        println!("{}", "\nNo folders selected for deletion.".green());
        return Ok(());
    }

    let total_found: u64 = folders.iter().map(|f| f.size).sum();

    report::print_sweep_header();
    for folder in &folders {
        report::print_folder_row(folder);
    }

    if options.dry_run {
        report::print_sweep_summary(true, folders.len(), total_found, 0);
        return Ok(());
    }

    println!("{}", "\nDeleting folders concurrently...".yellow());
    let stats = executor::delete_folders(&folders, options.workers)?;
    report::print_sweep_summary(false, folders.len(), total_found, stats.freed);

    if options.reinstall {
        reinstall_dependencies(&folders, selector)?;
    }

    Ok(())
}

enum FilterOutcome {
    Canceled,
    Selected(Vec<TargetFolder>),
}

fn filter_folders(folders: Vec<TargetFolder>, selector: &dyn Selector) -> Result<FilterOutcome> {
    let items: Vec<SelectableItem> = folders
        .iter()
        .map(|f| {
            SelectableItem::new(f.path.display().to_string(), report::human_size(f.size))
        })
        .collect();

    let result = selector.select("Select folders to delete:", items)?;
    if result.canceled {
        return Ok(FilterOutcome::Canceled);
    }

    let selected = folders
        .into_iter()
        .zip(result.items)
        .filter_map(|(folder, item)| item.selected.then_some(folder))
        .collect();
    Ok(FilterOutcome::Selected(selected))
}

/// Reinstall dependencies for the owning projects of the deleted folders.
/// Runs strictly after the deletion fan-out has completed.
fn reinstall_dependencies(
    folders: &[TargetFolder],
    selector: Option<&dyn Selector>,
) -> Result<()> {
    let (mut targets, skipped) = executor::reinstall_targets(folders);

    for dir in &skipped {
        println!(
            "{}",
            format!(
                "Skipping {}: no package manager detected, nothing to reinstall.",
                dir.display()
            )
            .yellow()
        );
    }

    if targets.is_empty() {
        println!(
            "{}",
            "\nNo projects with known package managers found for reinstallation.".yellow()
        );
        return Ok(());
    }

    if let Some(selector) = selector {
        let items: Vec<SelectableItem> = targets
            .iter()
            .map(|t| SelectableItem::new(t.dir.display().to_string(), t.kind.to_string()))
            .collect();

        let result = selector.select("Select projects to reinstall:", items)?;
        if result.canceled {
            println!("{}", "\nReinstallation canceled.".yellow());
            return Ok(());
        }

        targets = targets
            .into_iter()
            .zip(result.items)
            .filter_map(|(target, item): (ReinstallTarget, SelectableItem)| {
                item.selected.then_some(target)
            })
            .collect();
    }

    if targets.is_empty() {
        println!("{}", "\nNo projects selected for reinstallation.".green());
        return Ok(());
    }

    println!("{}", "\nReinstalling dependencies sequentially...".yellow());
    let succeeded = executor::reinstall_all(&targets);
    println!(
        "{}",
        format!("Reinstallation complete: {succeeded}/{} projects.", targets.len()).green()
    );

    Ok(())
}
