//! Resolving path expressions to source locations.
//!
//! A file may hold several documents (`---`-separated manifests). The locator decodes
//! them in order and returns the position of the first node the path reaches; later
//! documents are never decoded once one matches.
//!
//! # Examples
//!
//! ```no_run
//! use conflint::file::locator::resolve;
//!
//! let pos = resolve("app1/nginx.deploy.yaml", "$.spec.template.spec.containers.0.privileged").unwrap();
//! println!("{}:{}", pos.line, pos.column);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;
use yaml_rust2::scanner::ScanError;

use crate::document::node::{NodeKind, Position};
use crate::document::parser::parse_documents;
use crate::yamlpath::{compile_path, NavError, ParseError, YamlPath};

/// Errors raised while resolving an expression against a file.
#[derive(Debug, Error)]
pub enum LocateError {
    /// Resolution only accepts document-rooted expressions.
    #[error("expression must start with $, but got: `{expr}`")]
    NotAbsolute { expr: String },

    #[error("parsing jsonpath `{expr}`: {inner}")]
    Parse { expr: String, inner: ParseError },

    #[error("opening file {}: {inner}", .path.display())]
    Read {
        path: PathBuf,
        inner: std::io::Error,
    },

    #[error("decoding yaml from {}: {inner}", .path.display())]
    Decode { path: PathBuf, inner: ScanError },

    /// A document whose top-level node is not a mapping; this stops the scan.
    #[error("document {document} of {}: the top-level node must be a mapping, got {found}", .path.display())]
    NotAMapping {
        path: PathBuf,
        document: usize,
        found: NodeKind,
    },

    /// No document matched; carries the failure from the last document tried.
    #[error("getting line and column numbers from {}: getting node at {expr}: {inner}", .path.display())]
    Navigation {
        path: PathBuf,
        expr: String,
        inner: NavError,
    },

    /// The file holds no (non-empty) documents.
    #[error("getting line and column numbers from {}: no value found at {expr}", .path.display())]
    NotFound { path: PathBuf, expr: String },
}

impl LocateError {
    /// True for failures of a well-formed path against the file's contents.
    pub fn is_navigation(&self) -> bool {
        matches!(self, LocateError::Navigation { .. })
    }
}

/// Compiles an expression for use with [`resolve_path`], requiring a `$` root.
pub fn compile_absolute(expr: &str) -> Result<YamlPath, LocateError> {
    if !expr.starts_with('$') {
        return Err(LocateError::NotAbsolute {
            expr: expr.to_string(),
        });
    }

    compile_path(expr).map_err(|inner| LocateError::Parse {
        expr: expr.to_string(),
        inner,
    })
}

/// Returns the position of the node `expr` refers to in `file`.
pub fn resolve<P: AsRef<Path>>(file: P, expr: &str) -> Result<Position, LocateError> {
    let path = compile_absolute(expr)?;
    let file = file.as_ref();
    let source = read_source(file)?;
    locate_in(&source, &path, file, expr)
}

/// Like [`resolve`] for an already compiled path.
pub fn resolve_path<P: AsRef<Path>>(file: P, path: &YamlPath) -> Result<Position, LocateError> {
    let file = file.as_ref();
    let source = read_source(file)?;
    locate_in(&source, path, file, &path.to_string())
}

fn read_source(file: &Path) -> Result<String, LocateError> {
    fs::read_to_string(file).map_err(|inner| LocateError::Read {
        path: file.to_path_buf(),
        inner,
    })
}

/// Scans the documents of `source` in order. `file` and `expr` only label errors.
pub fn locate_in(
    source: &str,
    path: &YamlPath,
    file: &Path,
    expr: &str,
) -> Result<Position, LocateError> {
    let mut last_err = None;

    for (document, decoded) in parse_documents(source).enumerate() {
        let root = decoded.map_err(|inner| LocateError::Decode {
            path: file.to_path_buf(),
            inner,
        })?;

        if root.is_null() {
            debug!("skipping empty document {} in {}", document, file.display());
            continue;
        }
        if root.kind() != NodeKind::Mapping {
            return Err(LocateError::NotAMapping {
                path: file.to_path_buf(),
                document,
                found: root.kind(),
            });
        }

        match path.evaluate(&root) {
            Ok(node) => return Ok(node.position()),
            Err(err) => {
                debug!(
                    "{} not found in document {} of {}: {}",
                    expr,
                    document,
                    file.display(),
                    err
                );
                last_err = Some(err);
            }
        }
    }

    Err(match last_err {
        Some(inner) => LocateError::Navigation {
            path: file.to_path_buf(),
            expr: expr.to_string(),
            inner,
        },
        None => LocateError::NotFound {
            path: file.to_path_buf(),
            expr: expr.to_string(),
        },
    })
}
