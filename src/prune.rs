//! The prune flow: score folders and delete those above the threshold.

use crate::executor;
use crate::report;
use crate::scanner::{self, TargetFolder};
use crate::score;

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Runtime options for one prune invocation.
#[derive(Clone, Copy)]
pub struct PruneOptions {
    /// Minimum safety score (0-100) for a folder to be deleted.
    pub threshold: u8,
    /// Analyze and report only; perform no filesystem mutation.
    pub dry_run: bool,
    /// Worker-pool ceiling for the sizing, analysis and deletion fan-outs.
    pub workers: usize,
}

/// Scan `root`, score every target folder, report the table, and (unless
/// dry-run) delete the folders whose score meets the threshold.
pub fn prune_dir(root: &Path, options: PruneOptions) -> Result<()> {
    if options.dry_run {
        println!(
            "{}",
            format!(
                "Analyzing safely deletable folders in '{}' (dry-run)...",
                root.display()
            )
            .cyan()
        );
    } else {
        println!(
            "{}",
            format!("Pruning safely deletable folders in '{}'...", root.display()).cyan()
        );
    }

    let targets = scanner::find_target_folders(root)?;
    if targets.is_empty() {
        println!("{}", "No heavy folders found!".green());
        return Ok(());
    }

    let folders = scanner::calculate_folder_sizes(targets, options.workers)?;

    println!("{}", format!("Analyzing {} folders...", folders.len()).yellow());
    let results = score::analyze_all(&folders, options.threshold, options.workers)?;

    report::print_prune_header();

    let mut prunable = 0usize;
    let mut prunable_size = 0u64;
    let mut total_size = 0u64;

    for result in &results {
        total_size += result.size;
        report::print_prune_row(result);
        if result.safe_to_delete {
            prunable += 1;
            prunable_size += result.size;
        }
    }

    if options.dry_run || prunable == 0 {
        report::print_prune_analysis_summary(
            options.threshold,
            prunable,
            results.len(),
            prunable_size,
            total_size,
        );
        return Ok(());
    }

    println!(
        "{}",
        format!("\nDeleting {prunable} folders concurrently...").yellow()
    );

    let to_delete: Vec<TargetFolder> = results
        .iter()
        .filter(|r| r.safe_to_delete)
        .map(|r| TargetFolder {
            path: r.path.clone(),
            size: r.size,
        })
        .collect();

    let stats = executor::delete_folders(&to_delete, options.workers)?;
    report::print_prune_delete_summary(options.threshold, stats.deleted, stats.freed, total_size);

    Ok(())
}
