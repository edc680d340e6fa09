//! File-level operations: locating path expressions inside YAML/JSON files.

pub mod locator;

pub use locator::{resolve, resolve_path, LocateError};
