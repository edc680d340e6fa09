//! Error types for path parsing and evaluation.
//!
//! Parsing and navigation fail in different ways and are recovered from at different
//! levels, so they are separate types: a [`ParseError`] means the expression itself is
//! malformed, a [`NavError`] means a well-formed path does not fit the shape of one
//! particular tree.

use thiserror::Error;

use crate::document::node::{NodeKind, Position};

/// Errors raised while compiling a path or condition expression.
///
/// Positions are byte offsets into the expression being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The expression does not start with `$` or `@`.
    #[error("expression must start with $ or @, but got `{found}` in `{expr}`")]
    MissingRoot { found: String, expr: String },

    /// The root marker is not followed by `.`.
    #[error("the root element must be queried by .KEY, but got `{found}` at position {position} in `{expr}`")]
    MissingDot {
        position: usize,
        found: String,
        expr: String,
    },

    /// Something other than `.` or `[` where the next step should start.
    #[error("unexpected `{found}` at position {position}, expected {expected}")]
    UnexpectedToken {
        position: usize,
        found: String,
        expected: String,
    },

    /// The expression ended inside a step.
    #[error("unexpected end of expression at position {position}, expected {expected}")]
    UnexpectedEnd { position: usize, expected: String },

    /// A property name starting with `-` or `+`.
    #[error("property name `{name}` at position {position} must not begin with `-` or `+`")]
    InvalidProperty { position: usize, name: String },

    /// A bracket index that is not a decimal number.
    #[error("converting `{found}` at position {position} to an index: expected decimal digits")]
    InvalidIndex { position: usize, found: String },

    /// A condition clause that is not a single `A == B` comparison.
    #[error("unsupported expression `{clause}`: wanted an equality expression like `A == B` in `{condition}`")]
    InvalidClause { clause: String, condition: String },

    /// The right side of a comparison is not a string, number or boolean literal.
    #[error("parsing right side of `{clause}`: unexpected literal `{literal}` in `{condition}`")]
    InvalidLiteral {
        literal: String,
        clause: String,
        condition: String,
    },

    /// The left side of a comparison is not a valid path.
    #[error("parsing left side of `{clause}` in `{condition}`: {inner}")]
    ClausePath {
        clause: String,
        condition: String,
        inner: Box<ParseError>,
    },

    /// A predicate step whose condition failed to compile.
    #[error("parsing predicate `{condition}` at position {position}: {inner}")]
    InPredicate {
        position: usize,
        condition: String,
        inner: Box<ParseError>,
    },
}

/// Why a selector could not be applied to a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavErrorKind {
    #[error("mapping does not have child named `{name}`")]
    NoChild { name: String },

    #[error("converting `{name}` to a sequence index: not a non-negative integer")]
    NotAnIndex { name: String },

    #[error("index out of range: index = {index}, len = {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("expected mapping or sequence node, got {found}")]
    ExpectedContainer { found: NodeKind },

    #[error("expected sequence node, got {found}")]
    ExpectedSequence { found: NodeKind },

    #[error("reading element {element} in sequence: {inner}")]
    Predicate { element: usize, inner: Box<NavError> },

    #[error("no sequence element matching `{condition}` found")]
    NoMatch { condition: String },
}

/// A navigation failure: the step that failed, where, and why.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("evaluating `{selector}` at step {step} (node at {position}): {kind}")]
pub struct NavError {
    /// Zero-based index of the failing selector in its path
    pub step: usize,
    /// The failing selector as written
    pub selector: String,
    /// Position of the node the selector was applied to
    pub position: Position,
    pub kind: NavErrorKind,
}
