//! kubeval: Kubernetes schema validation.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;

use super::{expand_glob, is_blank, run_linter, FileReport};
use crate::config::KubevalConfig;

pub const PROGRAM: &str = "kubeval";

/// kubeval always separates the field path from the message with this.
pub const DELIMITER: &str = ": ";

#[derive(Debug, Deserialize)]
struct KubevalFileResult {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

impl KubevalConfig {
    /// Command line for validating a single file.
    pub fn args(&self, file: &str) -> Vec<String> {
        let mut args = vec![file.to_string(), "-o".to_string(), "json".to_string()];

        if self.strict {
            args.push("--strict".to_string());
        }
        if self.ignore_missing_schemas {
            args.push("--ignore-missing-schemas".to_string());
        }
        if !self.ignored_filename_patterns.is_empty() {
            args.extend([
                "--ignored-filename-patterns".to_string(),
                self.ignored_filename_patterns.join(","),
            ]);
        }
        if !self.skip_kinds.is_empty() {
            args.extend(["--skip-kinds".to_string(), self.skip_kinds.join(",")]);
        }
        if let Some((first, rest)) = self.schema_locations.split_first() {
            args.extend(["--schema-location".to_string(), first.clone()]);
            if !rest.is_empty() {
                args.extend([
                    "--additional-schema-locations".to_string(),
                    rest.join(","),
                ]);
            }
        }

        args
    }
}

/// Decodes `kubeval -o json` output for `file`.
///
/// kubeval reports one entry per document; all of them are attributed to `file`, the
/// path it was invoked with.
pub fn parse_output(output: &[u8], file: &str) -> Result<Vec<FileReport>> {
    if is_blank(output) {
        return Ok(Vec::new());
    }

    let results: Vec<KubevalFileResult> =
        serde_json::from_slice(output).context("decoding kubeval output")?;

    Ok(results
        .into_iter()
        .map(|result| {
            debug!(
                "kubeval {} ({}): {} {}",
                file, result.filename, result.kind, result.status
            );
            FileReport {
                filename: file.to_string(),
                messages: result.errors.unwrap_or_default(),
            }
        })
        .collect())
}

/// Runs kubeval once per file matched by the patterns of `config`.
pub fn run(config: &KubevalConfig, work_dir: &Path) -> Result<Vec<FileReport>> {
    let mut reports = Vec::new();

    for pattern in &config.files {
        let files = expand_glob(work_dir, pattern)?;
        if files.is_empty() {
            warn!("no files match {}", pattern);
        }

        for file in files {
            let output = run_linter(PROGRAM, &config.args(&file), work_dir)?;
            let parsed =
                parse_output(&output, &file).with_context(|| format!("running kubeval on {}", file))?;
            reports.extend(parsed);
        }
    }

    Ok(reports)
}
