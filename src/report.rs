//! Terminal reporting: per-folder rows and end-of-run summaries.
//!
//! Presentation only; all decisions about what to delete are made upstream.

use crate::scanner::TargetFolder;
use crate::score::PruneResult;

use colored::Colorize;
use humansize::{format_size, BINARY};

/// One mebibyte. Severity thresholds use binary units so they line up with
/// the `BINARY`-formatted sizes shown next to them: a row only earns a
/// marker once its displayed size reads over 100 MiB / 1000 MiB.
const MB: u64 = 1024 * 1024;
const SWEEP_PATH_WIDTH: usize = 80;
const PRUNE_PATH_WIDTH: usize = 55;

/// Human-readable byte count, binary units.
pub fn human_size(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Magnitude-based severity marker: folders over 1000 MB get the strong
/// marker, over 100 MB the mild one.
pub fn severity_marker(bytes: u64) -> &'static str {
    if bytes > 1000 * MB {
        " !!"
    } else if bytes > 100 * MB {
        " !"
    } else {
        ""
    }
}

fn size_cell(bytes: u64) -> String {
    let text = format!("{:>10}{}", human_size(bytes), severity_marker(bytes));
    if bytes > 1000 * MB {
        text.red().to_string()
    } else if bytes > 100 * MB {
        text.yellow().to_string()
    } else {
        text.green().to_string()
    }
}

/// Tail-truncate a path string to at most `width` characters, keeping the
/// most specific part. The cut is snapped forward to a char boundary so
/// multibyte path components cannot split mid-character.
pub fn truncate_path(path: &str, width: usize) -> String {
    if path.len() <= width {
        return path.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut cut = path.len() - keep;
    while !path.is_char_boundary(cut) {
        cut += 1;
    }
    format!("...{}", &path[cut..])
}

pub fn print_sweep_header() {
    println!();
    println!(
        "{}",
        format!("{:<width$} | {}", "Folder Path", "Size", width = SWEEP_PATH_WIDTH).underline()
    );
}

pub fn print_folder_row(folder: &TargetFolder) {
    let path = truncate_path(&folder.path.display().to_string(), SWEEP_PATH_WIDTH);
    println!(
        "{:<width$} | {}",
        path,
        size_cell(folder.size),
        width = SWEEP_PATH_WIDTH
    );
}

/// End-of-run sweep summary. "Found" counts everything reported; "freed"
/// counts only folders that were both selected and successfully deleted.
pub fn print_sweep_summary(dry_run: bool, count: usize, total_found: u64, total_freed: u64) {
    println!("{}", "-".repeat(100));
    if dry_run {
        println!(
            "{}",
            format!("List complete! Found {count} heavy folders.").green()
        );
        println!(
            "{}",
            format!("Total space that can be freed: {}", human_size(total_found)).cyan()
        );
    } else {
        println!(
            "{}",
            format!("Sweep complete! Processed {count} heavy folders.").green()
        );
        println!(
            "{}",
            format!("Total space actually freed: {}", human_size(total_freed)).cyan()
        );
    }
}

pub fn print_prune_header() {
    println!();
    println!(
        "{}",
        format!(
            "{:<width$} | {:>10} | {:>5} | {}",
            "Folder Path",
            "Size",
            "Score",
            "Reason",
            width = PRUNE_PATH_WIDTH
        )
        .underline()
    );
}

/// One scored row. Rows below the threshold are dimmed so the prunable set
/// stands out.
pub fn print_prune_row(result: &PruneResult) {
    let path = truncate_path(&result.path.display().to_string(), PRUNE_PATH_WIDTH);
    let size = format!("{:>10}", human_size(result.size));

    let score = if result.score >= 80 {
        format!("{:>5}", result.score).red().to_string()
    } else if result.score >= 50 {
        format!("{:>5}", result.score).yellow().to_string()
    } else {
        format!("{:>5}", result.score).bright_black().to_string()
    };

    if result.safe_to_delete {
        println!(
            "{:<width$} | {} | {} | {}",
            path,
            size,
            score,
            result.reason,
            width = PRUNE_PATH_WIDTH
        );
    } else {
        println!(
            "{:<width$} | {} | {} | {}",
            path.bright_black(),
            size.bright_black(),
            score,
            result.reason.bright_black(),
            width = PRUNE_PATH_WIDTH
        );
    }
}

/// Prune summary for the dry-run/analysis path.
pub fn print_prune_analysis_summary(
    threshold: u8,
    prunable: usize,
    total: usize,
    prunable_size: u64,
    total_size: u64,
) {
    println!("{}", "-".repeat(110));
    if prunable == 0 {
        println!(
            "{}",
            format!("No folders meet the prune threshold (score >= {threshold}).").green()
        );
        println!(
            "{}",
            format!(
                "Total found: {} across {total} folders",
                human_size(total_size)
            )
            .cyan()
        );
        return;
    }
    println!(
        "{}",
        format!("Analysis complete! {prunable}/{total} folders can be pruned (score >= {threshold}).")
            .green()
    );
    println!(
        "{}",
        format!(
            "Space that can be freed: {} (of {} total found)",
            human_size(prunable_size),
            human_size(total_size)
        )
        .cyan()
    );
}

/// Prune summary after actual deletion.
pub fn print_prune_delete_summary(threshold: u8, deleted: usize, freed: u64, total_size: u64) {
    println!(
        "{}",
        format!("\nPrune complete! Removed {deleted} folders (score >= {threshold}).").green()
    );
    println!(
        "{}",
        format!(
            "Space freed: {} (of {} total found)",
            human_size(freed),
            human_size(total_size)
        )
        .cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_thresholds_are_strict() {
        assert_eq!(severity_marker(100 * MB), "");
        assert_eq!(severity_marker(100 * MB + 1), " !");
        assert_eq!(severity_marker(1000 * MB), " !");
        assert_eq!(severity_marker(1000 * MB + 1), " !!");
    }

    #[test]
    fn short_paths_are_untouched() {
        assert_eq!(truncate_path("/a/b", 55), "/a/b");
    }

    #[test]
    fn long_paths_keep_their_tail() {
        let long = format!("/root/{}/node_modules", "x".repeat(80));
        let out = truncate_path(&long, 55);
        assert_eq!(out.len(), 55);
        assert!(out.starts_with("..."));
        assert!(out.ends_with("node_modules"));
    }

    #[test]
    fn truncation_never_splits_a_multibyte_character() {
        // The naive byte cut lands inside a two-byte character here; the
        // boundary snap must absorb it instead of panicking.
        let long = format!("/root/{}/node_modules", "é".repeat(60));
        let out = truncate_path(&long, 55);
        assert!(out.starts_with("..."));
        assert!(out.ends_with("node_modules"));
        assert!(out.len() <= 55);

        // Same property across every width around the boundary.
        for width in 4..long.len() {
            let out = truncate_path(&long, width);
            assert!(out.len() <= width);
        }
    }

    #[test]
    fn human_size_uses_binary_units() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(2048), "2 KiB");
    }
}
