//! conflint aggregates the output of configuration linters for CI.
//!
//! Linters such as conftest and kubeval report problems against field paths
//! (`spec.template.spec.containers.0.privileged`). conflint resolves those paths in the
//! linted YAML/JSON files and prints `file:line:column: message` diagnostics.
//!
//! The building blocks are usable on their own:
//!
//! - [`document`] parses YAML/JSON into trees that remember source positions
//! - [`yamlpath`] compiles and evaluates path expressions against those trees
//! - [`file::locator`] resolves an expression against a multi-document file
//! - [`runner`] drives the linters configured in [`config`] through [`lint`]

pub mod config;
pub mod document;
pub mod file;
pub mod lint;
pub mod runner;
pub mod yamlpath;
