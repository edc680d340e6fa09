//! conftest: policy checks written in Rego.

use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;

use super::{expand_glob, is_blank, run_linter, FileReport};
use crate::config::ConftestConfig;

pub const PROGRAM: &str = "conftest";

#[derive(Debug, Deserialize)]
struct ConftestFileResult {
    filename: String,
    #[serde(default)]
    warnings: Option<Vec<ConftestResult>>,
    #[serde(default)]
    failures: Option<Vec<ConftestResult>>,
}

#[derive(Debug, Deserialize)]
struct ConftestResult {
    msg: String,
}

impl ConftestConfig {
    /// Command line for `conftest test` over `files`.
    pub fn args(&self, files: &[String]) -> Vec<String> {
        let mut args = vec!["test".to_string()];
        args.extend(files.iter().cloned());
        args.extend(["-p".to_string(), self.policy.clone()]);
        args.extend(["-o".to_string(), "json".to_string()]);

        if let Some(input) = self.input.as_ref().filter(|input| !input.is_empty()) {
            args.extend(["-i".to_string(), input.clone()]);
        }
        if self.combine {
            args.push("--combine".to_string());
        }
        if self.all_namespaces {
            args.push("--all-namespaces".to_string());
        }
        if !self.data.is_empty() {
            args.extend(["--data".to_string(), self.data.join(",")]);
        }
        if !self.namespaces.is_empty() {
            args.extend(["--namespace".to_string(), self.namespaces.join(",")]);
        }

        args
    }
}

/// Decodes `conftest -o json` output.
///
/// Failures are always reported; warnings only when `fail_on_warn` is set.
pub fn parse_output(output: &[u8], fail_on_warn: bool) -> Result<Vec<FileReport>> {
    if is_blank(output) {
        return Ok(Vec::new());
    }

    let results: Vec<ConftestFileResult> =
        serde_json::from_slice(output).context("decoding conftest output")?;

    Ok(results
        .into_iter()
        .map(|result| {
            let mut messages: Vec<String> = result
                .failures
                .unwrap_or_default()
                .into_iter()
                .map(|r| r.msg)
                .collect();
            if fail_on_warn {
                messages.extend(result.warnings.unwrap_or_default().into_iter().map(|r| r.msg));
            }
            FileReport {
                filename: result.filename,
                messages,
            }
        })
        .collect())
}

/// Runs conftest once per file pattern of `config`.
pub fn run(config: &ConftestConfig, work_dir: &Path) -> Result<Vec<FileReport>> {
    let mut reports = Vec::new();

    for pattern in &config.files {
        let files = expand_glob(work_dir, pattern)?;
        if files.is_empty() {
            warn!("no files match {}", pattern);
            continue;
        }

        let output = run_linter(PROGRAM, &config.args(&files), work_dir)?;
        let parsed = parse_output(&output, config.fail_on_warn)
            .with_context(|| format!("running conftest on {}", pattern))?;
        reports.extend(parsed);
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"[
  {
    "filename": "app1/nginx.deploy.yaml",
    "namespace": "main",
    "successes": 1,
    "warnings": [{"msg": "metadata.labels: app label is missing"}],
    "failures": [{"msg": "spec.template.spec.containers.0.privileged: `privileged: true` is forbidden", "metadata": {}}]
  },
  {
    "filename": "app1/svc.yaml",
    "failures": null
  }
]"#;

    #[test]
    fn test_args_minimal() {
        let config = ConftestConfig {
            policy: "policy".to_string(),
            ..Default::default()
        };
        let args = config.args(&["a.yaml".to_string(), "b.yaml".to_string()]);
        assert_eq!(
            args,
            vec!["test", "a.yaml", "b.yaml", "-p", "policy", "-o", "json"]
        );
    }

    #[test]
    fn test_args_all_options() {
        let config = ConftestConfig {
            files: vec!["*.yaml".to_string()],
            policy: "policy".to_string(),
            input: Some("yaml".to_string()),
            combine: true,
            fail_on_warn: true,
            data: vec!["d1".to_string(), "d2".to_string()],
            all_namespaces: true,
            namespaces: vec!["main".to_string(), "k8s".to_string()],
        };
        let args = config.args(&["a.yaml".to_string()]);
        assert_eq!(
            args,
            vec![
                "test",
                "a.yaml",
                "-p",
                "policy",
                "-o",
                "json",
                "-i",
                "yaml",
                "--combine",
                "--all-namespaces",
                "--data",
                "d1,d2",
                "--namespace",
                "main,k8s",
            ]
        );
    }

    #[test]
    fn test_parse_output_failures_only() {
        let reports = parse_output(OUTPUT.as_bytes(), false).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].filename, "app1/nginx.deploy.yaml");
        assert_eq!(
            reports[0].messages,
            vec!["spec.template.spec.containers.0.privileged: `privileged: true` is forbidden"]
        );
        assert!(reports[1].messages.is_empty());
    }

    #[test]
    fn test_parse_output_with_warnings() {
        let reports = parse_output(OUTPUT.as_bytes(), true).unwrap();
        assert_eq!(reports[0].messages.len(), 2);
        assert_eq!(reports[0].messages[1], "metadata.labels: app label is missing");
    }

    #[test]
    fn test_parse_output_blank_and_invalid() {
        assert!(parse_output(b"\n", false).unwrap().is_empty());
        assert!(parse_output(b"FAIL - policy error", false).is_err());
    }
}
