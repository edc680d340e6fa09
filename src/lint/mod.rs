//! Adapters for the external linters.
//!
//! Each adapter turns one job from the configuration into linter invocations, runs
//! them in the working directory and decodes their JSON output into [`FileReport`]s.
//! A linter exiting non-zero is normal when it found problems; only failures to run
//! it or to decode its output are errors.

pub mod conftest;
pub mod kubeval;

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use log::debug;

/// Messages a linter reported for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Path relative to the working directory
    pub filename: String,
    pub messages: Vec<String>,
}

/// Expands a glob pattern relative to `work_dir`.
///
/// Matches come back sorted and relative to `work_dir`, so output order does not
/// depend on the filesystem.
pub fn expand_glob(work_dir: &Path, pattern: &str) -> Result<Vec<String>> {
    let base = Pattern::escape(&work_dir.to_string_lossy());
    let full = format!("{}/{}", base.trim_end_matches('/'), pattern);

    let mut files = Vec::new();
    for entry in glob(&full).with_context(|| format!("searching files matching {}", pattern))? {
        let path = entry.with_context(|| format!("searching files matching {}", pattern))?;
        let relative = path.strip_prefix(work_dir).unwrap_or(&path);
        files.push(relative.to_string_lossy().into_owned());
    }
    Ok(files)
}

/// Runs `program` in `work_dir` and returns its stdout.
pub fn run_linter(program: &str, args: &[String], work_dir: &Path) -> Result<Vec<u8>> {
    debug!("running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .current_dir(work_dir)
        .output()
        .with_context(|| format!("running {} {}", program, args.join(" ")))?;

    if !output.status.success() {
        debug!(
            "{} {} exited with {}",
            program,
            args.join(" "),
            output.status
        );
    }
    if !output.stderr.is_empty() {
        debug!("{} stderr: {}", program, String::from_utf8_lossy(&output.stderr));
    }

    Ok(output.stdout)
}

/// Treats blank output as "nothing reported".
fn is_blank(output: &[u8]) -> bool {
    output.iter().all(|b| b.is_ascii_whitespace())
}
