//! Compiled forms of path and condition expressions.

use std::fmt;

/// The marker a path starts with.
///
/// Both markers compile to the same no-op start: evaluation always begins at the node
/// the path is applied to. Inside a predicate that node is the element under test, so
/// `$` there cannot reach the enclosing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    /// `$`
    Absolute,
    /// `@`
    Current,
}

impl Root {
    pub fn as_char(self) -> char {
        match self {
            Root::Absolute => '$',
            Root::Current => '@',
        }
    }
}

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// `.name`; a mapping key, or a decimal index when applied to a sequence
    PropertyOrIndex(String),
    /// `[N]`
    Index(usize),
    /// `[?( cond )]` or `[*]?( cond )`
    Predicate(BoolExpr),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::PropertyOrIndex(name) => write!(f, ".{}", name),
            Selector::Index(idx) => write!(f, "[{}]", idx),
            Selector::Predicate(expr) => write!(f, "[?({})]", expr),
        }
    }
}

/// A compiled path expression: an ordered chain of selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlPath {
    pub root: Root,
    pub selectors: Vec<Selector>,
}

impl YamlPath {
    pub fn new(root: Root, selectors: Vec<Selector>) -> Self {
        Self { root, selectors }
    }
}

impl fmt::Display for YamlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.as_char())?;
        for selector in &self.selectors {
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}

/// A predicate condition.
///
/// The grammar only produces an `Or` of `And`s of `Eq`s. Single-member groups are
/// collapsed, so a lone comparison compiles to a bare `Eq`.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr {
    Or(Vec<BoolExpr>),
    And(Vec<BoolExpr>),
    Eq {
        path: YamlPath,
        literal: String,
        /// The clause as written, for diagnostics
        source: String,
    },
}

fn join(f: &mut fmt::Formatter<'_>, exprs: &[BoolExpr], op: &str) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op)?;
        }
        write!(f, "{}", expr)?;
    }
    Ok(())
}

impl fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolExpr::Or(exprs) => join(f, exprs, "||"),
            BoolExpr::And(exprs) => join(f, exprs, "&&"),
            BoolExpr::Eq { source, .. } => f.write_str(source),
        }
    }
}
