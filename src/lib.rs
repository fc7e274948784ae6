//! depsweep - heavy dependency folder cleaner
//!
//! depsweep discovers regenerable dependency/build folders (`node_modules`,
//! `target`, `.venv`, `dist`, ...) across a project tree, sizes them
//! concurrently, scores how safe each is to delete, and removes or
//! reinstalls them under batch or interactive selection.
//!
//! ## Pipeline
//!
//! Walker → Sizer → (Scorer, prune flow) → Selector → Executor → Reporter.
//! Discovery is single-threaded; sizing and deletion fan out on a bounded
//! worker pool. Transient I/O errors degrade individual items but never
//! abort a run; only a root that cannot be walked at all is fatal.

pub mod classify;
pub mod executor;
pub mod manager;
pub mod prune;
pub mod repair;
pub mod report;
pub mod scanner;
pub mod score;
pub mod select;
pub mod sweep;

pub use executor::{DeleteStats, ReinstallTarget};
pub use manager::{check_health, detect, HealthReport, ManagerKind};
pub use prune::{prune_dir, PruneOptions};
pub use repair::{refresh_dir, repair_dir, Project};
pub use scanner::{
    calculate_folder_sizes, dir_size, find_target_folders, TargetFolder, DEFAULT_WORKERS,
};
pub use score::{analyze_all, analyze_folder, PruneResult};
pub use select::{SelectableItem, Selection, Selector, TermSelector};
pub use sweep::{sweep_dir, SweepOptions};
