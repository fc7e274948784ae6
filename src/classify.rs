//! Directory-name classification: deletable targets, ignored subtrees, build caches.

/// Folder names that mark a directory as regenerable dependency/build output.
/// Matching is by exact basename; a matched folder is recorded and never
/// descended into.
pub const DELETABLE_TARGETS: &[&str] = &[
    "node_modules",
    "target",
    ".next",
    ".svelte-kit",
    ".venv",
    "dist",
    "build",
];

/// Folder names that are irrelevant but expensive to walk (platform caches,
/// tooling state, editor metadata). The walker never descends into these and
/// never reports them.
pub const IGNORED_DIRS: &[&str] = &[
    ".Trash", ".cache", ".npm", ".yarn", ".cargo", ".rustup",
    "Library", "AppData", "Local", "Roaming", ".vscode", ".idea",
];

/// The subset of targets that is pure build output, always re-generable from
/// source regardless of lockfile state.
pub const BUILD_CACHES: &[&str] = &[".next", ".svelte-kit", "dist", "build"];

/// Version control metadata folder; never descended into.
pub const VCS_DIR: &str = ".git";

pub fn is_deletable_target(name: &str) -> bool {
    DELETABLE_TARGETS.contains(&name)
}

pub fn is_ignored_dir(name: &str) -> bool {
    name == VCS_DIR || IGNORED_DIRS.contains(&name)
}

pub fn is_build_cache(name: &str) -> bool {
    BUILD_CACHES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_targets_are_deletable() {
        for name in DELETABLE_TARGETS {
            assert!(is_deletable_target(name), "{name} should be a target");
        }
    }

    #[test]
    fn all_ignored_names_are_ignored() {
        for name in IGNORED_DIRS {
            assert!(is_ignored_dir(name), "{name} should be ignored");
        }
        assert!(is_ignored_dir(".git"));
    }

    #[test]
    fn target_and_ignore_sets_are_disjoint() {
        for name in DELETABLE_TARGETS {
            assert!(
                !IGNORED_DIRS.contains(name) && *name != VCS_DIR,
                "{name} is in both sets"
            );
        }
    }

    #[test]
    fn unrelated_name_is_neither() {
        assert!(!is_deletable_target("src"));
        assert!(!is_ignored_dir("src"));
        assert!(!is_build_cache("src"));
    }

    #[test]
    fn build_caches_are_a_subset_of_targets() {
        for name in BUILD_CACHES {
            assert!(is_deletable_target(name), "{name} should also be a target");
        }
    }

    #[test]
    fn dependency_folders_are_not_build_caches() {
        assert!(!is_build_cache("node_modules"));
        assert!(!is_build_cache("target"));
        assert!(!is_build_cache(".venv"));
    }
}
