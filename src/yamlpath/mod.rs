//! Path query language for locating nodes in positioned YAML/JSON trees.
//!
//! A path is compiled once into a chain of selectors and can then be evaluated against
//! any number of trees. Compiled paths are immutable and `Send + Sync`.
//!
//! # Supported Syntax
//!
//! - `$` or `@` followed by `.` - start of every path
//! - `.name` - mapping key, or a decimal index when applied to a sequence
//! - `[N]` - sequence index
//! - `[?( cond )]` or `[*]?( cond )` - first sequence element matching `cond`
//!
//! Conditions are `||`-separated groups of `&&`-separated `path == literal` clauses,
//! where the literal is a quoted string, a number or `true`/`false`. Comparison is
//! purely textual.
//!
//! # Examples
//!
//! ```
//! use conflint::document::parser::parse_document;
//! use conflint::yamlpath::compile_path;
//!
//! let yaml = "spec:\n  containers:\n  - name: nginx\n    privileged: true\n";
//! let root = parse_document(yaml).unwrap().unwrap();
//!
//! let path = compile_path("$.spec.containers[?(@.privileged == true)].privileged").unwrap();
//! let node = path.evaluate(&root).unwrap();
//! assert_eq!((node.line(), node.column()), (4, 17));
//! ```

pub mod ast;
pub mod condition;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use ast::{BoolExpr, Root, Selector, YamlPath};
pub use condition::parse_condition;
pub use error::{NavError, NavErrorKind, ParseError};
pub use evaluator::{evaluate, EvalContext};
pub use parser::{compile_path, Parser};
