use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use depsweep::prune::{prune_dir, PruneOptions};
use depsweep::repair::{refresh_dir, repair_dir};
use depsweep::scanner::DEFAULT_WORKERS;
use depsweep::select::{Selector, TermSelector};
use depsweep::sweep::{sweep_dir, SweepOptions};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Clean heavy dependency and build folders from your projects",
    long_about = "depsweep scans your filesystem for heavy dependency folders \
                  (node_modules, target, .venv, ...) and lets you list, sweep, \
                  prune or repair them.\n\n\
                  Running depsweep with no subcommand refreshes the current directory."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory to scan
    #[arg(short, long, global = true, default_value = ".")]
    path: PathBuf,

    /// Concurrent workers for sizing and deletion
    #[arg(long, global = true, default_value_t = DEFAULT_WORKERS)]
    workers: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List heavy dependency folders (dry-run)
    List,

    /// Sweep (delete) heavy dependency folders
    Sweep {
        /// Reinstall packages after removing their folders
        #[arg(long)]
        reinstall: bool,

        /// Skip interactive selection (delete/reinstall all found folders)
        #[arg(long)]
        no_select: bool,
    },

    /// Prune dependency folders by safety score
    Prune {
        /// Minimum safety score to prune (0-100)
        #[arg(long, default_value_t = 50)]
        threshold: u8,

        /// Only analyze and list, don't delete
        #[arg(long)]
        dry_run: bool,
    },

    /// Repair projects with broken dependency folders
    Repair {
        /// Show details for all projects, including healthy ones
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            println!("Running refresh in '{}'...", cli.path.display());
            refresh_dir(&cli.path)
        }
        Some(Command::List) => sweep_dir(
            &cli.path,
            SweepOptions {
                dry_run: true,
                reinstall: false,
                workers: cli.workers,
            },
            None,
        ),
        Some(Command::Sweep {
            reinstall,
            no_select,
        }) => {
            let selector = TermSelector;
            let selector: Option<&dyn Selector> = if no_select { None } else { Some(&selector) };
            sweep_dir(
                &cli.path,
                SweepOptions {
                    dry_run: false,
                    reinstall,
                    workers: cli.workers,
                },
                selector,
            )
        }
        Some(Command::Prune { threshold, dry_run }) => prune_dir(
            &cli.path,
            PruneOptions {
                threshold,
                dry_run,
                workers: cli.workers,
            },
        ),
        Some(Command::Repair { verbose }) => repair_dir(&cli.path, verbose),
    }
}
