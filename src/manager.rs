//! Package manager detection and the install/health-check collaborators.
//!
//! Detection is a pure lookup against manifest/lockfile basenames in a single
//! directory. Install and health checks shell out to the ecosystem's own
//! tool; both are synchronous and report failure as data rather than
//! panicking across the pipeline boundary.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// The inferred dependency-ecosystem owner of a project directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerKind {
    Bun,
    Pnpm,
    Yarn,
    Npm,
    Deno,
    Cargo,
    Go,
    Pip,
    Unknown,
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManagerKind::Bun => "bun",
            ManagerKind::Pnpm => "pnpm",
            ManagerKind::Yarn => "yarn",
            ManagerKind::Npm => "npm",
            ManagerKind::Deno => "deno",
            ManagerKind::Cargo => "cargo",
            ManagerKind::Go => "go",
            ManagerKind::Pip => "pip",
            ManagerKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Signature files checked during detection, in priority order. Lockfiles
/// come before manifests so a pnpm project with a stray `package-lock.json`
/// still resolves deterministically.
const SIGNATURES: &[(ManagerKind, &[&str])] = &[
    (ManagerKind::Bun, &["bun.lockb", "bun.lock"]),
    (ManagerKind::Pnpm, &["pnpm-lock.yaml"]),
    (ManagerKind::Yarn, &["yarn.lock"]),
    (ManagerKind::Npm, &["package-lock.json"]),
    (ManagerKind::Deno, &["deno.json", "deno.jsonc"]),
    (ManagerKind::Cargo, &["Cargo.toml"]),
    (ManagerKind::Go, &["go.mod"]),
    (ManagerKind::Pip, &["requirements.txt", "pyproject.toml"]),
];

fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Infer which package manager owns `dir` from its immediate contents.
/// Not recursive; absence of any signature yields `Unknown`.
pub fn detect(dir: &Path) -> ManagerKind {
    for (kind, files) in SIGNATURES {
        if files.iter().any(|f| file_exists(&dir.join(f))) {
            return *kind;
        }
    }
    ManagerKind::Unknown
}

/// Lockfile basenames consulted for staleness scoring.
pub fn lockfile_names(kind: ManagerKind) -> &'static [&'static str] {
    match kind {
        ManagerKind::Npm => &["package-lock.json"],
        ManagerKind::Pnpm => &["pnpm-lock.yaml"],
        ManagerKind::Yarn => &["yarn.lock"],
        ManagerKind::Bun => &["bun.lockb", "bun.lock"],
        ManagerKind::Deno => &["deno.lock"],
        ManagerKind::Cargo => &["Cargo.lock"],
        ManagerKind::Go => &["go.sum"],
        ManagerKind::Pip => &["requirements.txt", "pyproject.toml"],
        ManagerKind::Unknown => &[],
    }
}

/// The heavy folder a manager regenerates on install.
pub fn target_folder(kind: ManagerKind) -> &'static str {
    match kind {
        ManagerKind::Cargo => "target",
        ManagerKind::Pip => ".venv",
        _ => "node_modules",
    }
}

fn install_command(kind: ManagerKind) -> Option<(&'static str, &'static [&'static str])> {
    match kind {
        ManagerKind::Bun => Some(("bun", &["install"])),
        ManagerKind::Pnpm => Some(("pnpm", &["install"])),
        ManagerKind::Yarn => Some(("yarn", &["install"])),
        ManagerKind::Npm => Some(("npm", &["install"])),
        ManagerKind::Deno => Some(("deno", &["install"])),
        ManagerKind::Cargo => Some(("cargo", &["build"])),
        ManagerKind::Go => Some(("go", &["mod", "tidy"])),
        ManagerKind::Pip => Some(("pip", &["install", "-r", "requirements.txt"])),
        ManagerKind::Unknown => None,
    }
}

/// Run the manager's install command in `dir`. Silent mode captures output
/// to keep the summary readable; non-silent inherits the terminal.
pub fn install(dir: &Path, kind: ManagerKind, silent: bool) -> Result<(), String> {
    let (program, args) =
        install_command(kind).ok_or_else(|| "unknown package manager, cannot run install".to_string())?;

    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(dir);

    let status = if silent {
        cmd.stdout(Stdio::null()).stderr(Stdio::null()).status()
    } else {
        cmd.status()
    };

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(format!("{program} install exited with {status}")),
        Err(err) => Err(format!("failed to run {program}: {err}")),
    }
}

/// Result of a project health check.
#[derive(Debug)]
pub struct HealthReport {
    pub healthy: bool,
    pub issues: Vec<String>,
}

impl HealthReport {
    fn healthy() -> Self {
        HealthReport {
            healthy: true,
            issues: Vec::new(),
        }
    }

    fn broken(issue: impl Into<String>) -> Self {
        HealthReport {
            healthy: false,
            issues: vec![issue.into()],
        }
    }
}

/// Verify the integrity of a project's installed dependencies by asking the
/// ecosystem tool. Any failure of the external call is reported as an issue,
/// never as an error of the run.
pub fn check_health(dir: &Path, kind: ManagerKind) -> HealthReport {
    match kind {
        ManagerKind::Npm => check_node_health(dir, "npm", &["ls", "--json", "--depth=0"]),
        ManagerKind::Pnpm => check_node_health(dir, "pnpm", &["ls", "--json", "--depth=0"]),
        ManagerKind::Yarn => check_node_health(dir, "yarn", &["check", "--verify-tree"]),
        ManagerKind::Bun => check_node_health(dir, "bun", &["install", "--dry-run"]),
        ManagerKind::Deno => check_node_health(dir, "deno", &["check", "."]),
        ManagerKind::Cargo => check_cargo_health(dir),
        ManagerKind::Go => check_tool_health(dir, "go", &["mod", "verify"]),
        ManagerKind::Pip => check_pip_health(dir),
        ManagerKind::Unknown => HealthReport::broken("unknown package manager, cannot check health"),
    }
}

/// Shape of `npm ls --json` / `pnpm ls --json` diagnostics.
#[derive(Debug, Deserialize)]
struct LsOutput {
    #[serde(default)]
    problems: Vec<String>,
}

/// Extract problem descriptions from npm/pnpm `ls --json` output, capped at
/// five to keep the report readable.
fn parse_ls_problems(output: &[u8]) -> Vec<String> {
    let Ok(parsed) = serde_json::from_slice::<LsOutput>(output) else {
        return Vec::new();
    };

    let mut problems = parsed.problems;
    if problems.len() > 5 {
        let extra = problems.len() - 5;
        problems.truncate(5);
        problems.push(format!("... and {extra} more issues"));
    }
    problems
}

fn check_node_health(dir: &Path, binary: &str, args: &[&str]) -> HealthReport {
    let modules = dir.join("node_modules");
    if binary != "deno" && !modules.is_dir() {
        return HealthReport::broken("node_modules not found");
    }

    let output = Command::new(binary).args(args).current_dir(dir).output();

    match output {
        Ok(output) if output.status.success() => HealthReport::healthy(),
        Ok(output) => {
            let mut issues = if binary == "npm" || binary == "pnpm" {
                parse_ls_problems(&output.stdout)
            } else {
                Vec::new()
            };
            if issues.is_empty() {
                issues.push(format!("{binary} reports dependency issues"));
            }
            HealthReport {
                healthy: false,
                issues,
            }
        }
        Err(err) => HealthReport::broken(format!("failed to run {binary}: {err}")),
    }
}

fn check_cargo_health(dir: &Path) -> HealthReport {
    if !dir.join("target").is_dir() {
        return HealthReport::broken("target/ not found (never built)");
    }
    check_tool_health(dir, "cargo", &["check"])
}

fn check_pip_health(dir: &Path) -> HealthReport {
    let venv = dir.join(".venv");
    if !venv.is_dir() {
        return HealthReport::broken(".venv not found");
    }

    let pip: PathBuf = venv.join("bin").join("pip");
    let output = Command::new(&pip).arg("check").current_dir(dir).output();
    issues_from_output("pip check", output)
}

fn check_tool_health(dir: &Path, program: &str, args: &[&str]) -> HealthReport {
    let output = Command::new(program).args(args).current_dir(dir).output();
    issues_from_output(program, output)
}

/// Turn a failed tool invocation into at most five trimmed issue lines.
fn issues_from_output(
    label: &str,
    output: std::io::Result<std::process::Output>,
) -> HealthReport {
    match output {
        Ok(output) if output.status.success() => HealthReport::healthy(),
        Ok(output) => {
            let text = String::from_utf8_lossy(&output.stderr);
            let mut issues: Vec<String> = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .take(5)
                .map(String::from)
                .collect();
            if issues.is_empty() {
                issues.push(format!("{label} failed"));
            }
            HealthReport {
                healthy: false,
                issues,
            }
        }
        Err(err) => HealthReport::broken(format!("failed to run {label}: {err}")),
    }
}
