//! Runs the configured linters and prints their messages as located diagnostics.
//!
//! A linter message such as `spec.replicas: must be at least 2` is split on the
//! delimiter into a path fragment and a human message. The fragment is resolved as
//! `$.spec.replicas` against the reported file, and the diagnostic is printed with an
//! errorformat such as `%f:%l:%c: %m`, which reviewdog and editors understand.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::warn;

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::document::node::Position;
use crate::file::locator::resolve;
use crate::lint::{conftest, kubeval, FileReport};

/// errorformat used when none is given.
pub const DEFAULT_ERRORFORMAT: &str = "%f:%l:%c: %m";

/// Separator between the path fragment and the message.
pub const DEFAULT_DELIMITER: &str = ": ";

pub struct Runner<W: Write> {
    pub output: W,
    /// Configuration file, relative to `work_dir`
    pub config_file: PathBuf,
    pub errformat: String,
    pub work_dir: PathBuf,
    pub delim: String,
}

impl<W: Write> Runner<W> {
    /// Creates a runner with the default config file, errorformat and delimiter.
    pub fn new(output: W, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            output,
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            errformat: DEFAULT_ERRORFORMAT.to_string(),
            work_dir: work_dir.into(),
            delim: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Runs every configured job and returns the number of diagnostics printed.
    ///
    /// Jobs run in configuration order (conftest first, then kubeval) so the output is
    /// stable between runs.
    pub fn run(&mut self) -> Result<usize> {
        let config = Config::load(self.work_dir.join(&self.config_file))?;
        let delim = self.delim.clone();
        let mut printed = 0;

        for job in &config.conftest {
            for report in conftest::run(job, &self.work_dir)? {
                printed += self.report(&report, &delim)?;
            }
        }

        for job in &config.kubeval {
            for report in kubeval::run(job, &self.work_dir)? {
                printed += self.report(&report, kubeval::DELIMITER)?;
            }
        }

        Ok(printed)
    }

    /// Locates and prints each message of `report`; returns how many were printed.
    ///
    /// Messages without `delim` cannot be located and are skipped with a warning.
    pub fn report(&mut self, report: &FileReport, delim: &str) -> Result<usize> {
        let mut printed = 0;

        for msg in &report.messages {
            let Some((fragment, text)) = msg.split_once(delim) else {
                warn!("ignoring unsupported output: {}", msg);
                continue;
            };

            let expr = format!("$.{}", fragment);
            let position = resolve(self.work_dir.join(&report.filename), &expr)
                .with_context(|| format!("processing {}", fragment))?;

            self.print(&report.filename, position, text)
                .with_context(|| format!("printing {}", text))?;
            printed += 1;
        }

        Ok(printed)
    }

    /// Writes one diagnostic line.
    pub fn print(&mut self, file: &str, position: Position, msg: &str) -> Result<()> {
        let line = format_diagnostic(&self.errformat, file, position, msg);
        writeln!(self.output, "{}", line)?;
        Ok(())
    }
}

/// Expands `%f`, `%l`, `%c` and `%m` in `errformat`.
///
/// Substitution is a single left-to-right pass, so a `%m` inside the message itself is
/// left alone. Other `%` sequences are copied through.
pub fn format_diagnostic(errformat: &str, file: &str, position: Position, msg: &str) -> String {
    let mut out = String::with_capacity(errformat.len() + file.len() + msg.len());
    let mut chars = errformat.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('f') => out.push_str(file),
            Some('l') => out.push_str(&position.line.to_string()),
            Some('c') => out.push_str(&position.column.to_string()),
            Some('m') => out.push_str(msg),
            _ => {
                out.push('%');
                continue;
            }
        }
        chars.next();
    }

    out
}
