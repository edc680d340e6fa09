use super::ast::{BoolExpr, Selector, YamlPath};
use super::error::{NavError, NavErrorKind};
use crate::document::node::{TreeNode, TreeValue};

/// The node a condition's left-hand path is evaluated against.
///
/// A predicate step sets `current` to each candidate element in turn. There is no
/// separate document root: `$` and `@` both start from `current`.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub current: &'a TreeNode,
}

impl<'a> EvalContext<'a> {
    pub fn new(current: &'a TreeNode) -> Self {
        Self { current }
    }
}

impl YamlPath {
    /// Walks the selector chain from `root`, each step consuming the previous result.
    pub fn evaluate<'a>(&self, root: &'a TreeNode) -> Result<&'a TreeNode, NavError> {
        self.selectors
            .iter()
            .enumerate()
            .try_fold(root, |node, (step, selector)| {
                apply(selector, node).map_err(|kind| NavError {
                    step,
                    selector: selector.to_string(),
                    position: node.position(),
                    kind,
                })
            })
    }
}

/// Evaluates `path` against `root`.
pub fn evaluate<'a>(path: &YamlPath, root: &'a TreeNode) -> Result<&'a TreeNode, NavError> {
    path.evaluate(root)
}

fn apply<'a>(selector: &Selector, node: &'a TreeNode) -> Result<&'a TreeNode, NavErrorKind> {
    match selector {
        Selector::PropertyOrIndex(name) => property_or_index(node, name),
        Selector::Index(idx) => {
            let items = sequence_items(node)?;
            element(items, *idx)
        }
        Selector::Predicate(expr) => {
            let items = sequence_items(node)?;
            first_match(items, expr)
        }
    }
}

fn property_or_index<'a>(node: &'a TreeNode, name: &str) -> Result<&'a TreeNode, NavErrorKind> {
    match node.value() {
        TreeValue::Mapping(entries) => entries
            .iter()
            .find(|(key, _)| key.text() == name)
            .map(|(_, value)| value)
            .ok_or_else(|| NavErrorKind::NoChild {
                name: name.to_string(),
            }),
        TreeValue::Sequence(items) => {
            // Digits only: `+1` would otherwise parse as an index.
            let idx = Some(name)
                .filter(|n| n.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| NavErrorKind::NotAnIndex {
                    name: name.to_string(),
                })?;
            element(items, idx)
        }
        TreeValue::Scalar(_) => Err(NavErrorKind::ExpectedContainer { found: node.kind() }),
    }
}

fn sequence_items(node: &TreeNode) -> Result<&[TreeNode], NavErrorKind> {
    match node.value() {
        TreeValue::Sequence(items) => Ok(items.as_slice()),
        _ => Err(NavErrorKind::ExpectedSequence { found: node.kind() }),
    }
}

fn element(items: &[TreeNode], idx: usize) -> Result<&TreeNode, NavErrorKind> {
    items.get(idx).ok_or(NavErrorKind::IndexOutOfRange {
        index: idx,
        len: items.len(),
    })
}

/// Returns the first element, in document order, for which `expr` holds.
///
/// An evaluation error on any element aborts the scan.
fn first_match<'a>(items: &'a [TreeNode], expr: &BoolExpr) -> Result<&'a TreeNode, NavErrorKind> {
    for (element, item) in items.iter().enumerate() {
        let matched = expr
            .eval(&EvalContext::new(item))
            .map_err(|err| NavErrorKind::Predicate {
                element,
                inner: Box::new(err),
            })?;
        if matched {
            return Ok(item);
        }
    }

    Err(NavErrorKind::NoMatch {
        condition: expr.to_string(),
    })
}

impl BoolExpr {
    /// Evaluates the condition against `ctx.current`.
    ///
    /// `Or` and `And` evaluate every member even once the outcome is decided; only an
    /// error stops them early.
    pub fn eval(&self, ctx: &EvalContext<'_>) -> Result<bool, NavError> {
        match self {
            BoolExpr::Or(exprs) => {
                let mut any = false;
                for expr in exprs {
                    let matched = expr.eval(ctx)?;
                    any = any || matched;
                }
                Ok(any)
            }
            BoolExpr::And(exprs) => {
                let mut all = true;
                for expr in exprs {
                    let matched = expr.eval(ctx)?;
                    all = all && matched;
                }
                Ok(all)
            }
            BoolExpr::Eq { path, literal, .. } => {
                let got = path.evaluate(ctx.current)?;
                Ok(got.text() == literal)
            }
        }
    }
}
