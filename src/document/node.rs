//! Positioned document tree.
//!
//! A `TreeNode` is the read-only view of one parsed YAML (or JSON) node together with
//! the 1-based line and column where it starts in the source text. Trees are produced
//! by [`crate::document::parser`] and only ever borrowed by the query engine.
//!
//! # Example
//!
//! ```
//! use conflint::document::node::{NodeKind, Position, TreeNode};
//!
//! let key = TreeNode::scalar("name", Position::new(1, 1));
//! let value = TreeNode::scalar("nginx", Position::new(1, 7));
//! let map = TreeNode::mapping(vec![(key, value)], Position::new(1, 1));
//!
//! assert_eq!(map.kind(), NodeKind::Mapping);
//! assert_eq!(map.get("name").map(|n| n.text()), Some("nginx"));
//! ```

use std::fmt;

/// A 1-based line/column pair pointing at the first character of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The shape of a node, without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Scalar => "scalar",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// The content of a node.
///
/// Scalars keep their text exactly as the parser produced it: `true`, `1` and `"1"`
/// are all just text, no type coercion is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeValue {
    /// A scalar with its textual value
    Scalar(String),
    /// Elements in document order
    Sequence(Vec<TreeNode>),
    /// Key/value pairs in document order; keys are nodes too
    Mapping(Vec<(TreeNode, TreeNode)>),
}

/// A parsed node with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    value: TreeValue,
    position: Position,
}

impl TreeNode {
    pub fn new(value: TreeValue, position: Position) -> Self {
        Self { value, position }
    }

    pub fn scalar(text: impl Into<String>, position: Position) -> Self {
        Self::new(TreeValue::Scalar(text.into()), position)
    }

    pub fn sequence(items: Vec<TreeNode>, position: Position) -> Self {
        Self::new(TreeValue::Sequence(items), position)
    }

    pub fn mapping(entries: Vec<(TreeNode, TreeNode)>, position: Position) -> Self {
        Self::new(TreeValue::Mapping(entries), position)
    }

    pub fn value(&self) -> &TreeValue {
        &self.value
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    pub fn kind(&self) -> NodeKind {
        match self.value {
            TreeValue::Scalar(_) => NodeKind::Scalar,
            TreeValue::Sequence(_) => NodeKind::Sequence,
            TreeValue::Mapping(_) => NodeKind::Mapping,
        }
    }

    /// Returns the textual value of a scalar, or an empty string for containers.
    pub fn text(&self) -> &str {
        match &self.value {
            TreeValue::Scalar(text) => text,
            TreeValue::Sequence(_) | TreeValue::Mapping(_) => "",
        }
    }

    /// Returns true for a plain YAML null, which is what an empty document decodes to.
    pub fn is_null(&self) -> bool {
        matches!(&self.value, TreeValue::Scalar(text) if text == "~" || text == "null" || text.is_empty())
    }

    /// Looks up the value of the first mapping entry whose key text equals `key`.
    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        match &self.value {
            TreeValue::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| k.text() == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Number of elements (sequence) or entries (mapping); zero for scalars.
    pub fn len(&self) -> usize {
        match &self.value {
            TreeValue::Scalar(_) => 0,
            TreeValue::Sequence(items) => items.len(),
            TreeValue::Mapping(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new(1, 1)
    }

    #[test]
    fn test_container_text_is_empty() {
        let seq = TreeNode::sequence(vec![TreeNode::scalar("a", pos())], pos());
        assert_eq!(seq.text(), "");
        assert_eq!(seq.kind(), NodeKind::Sequence);
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_get_returns_first_matching_key() {
        let map = TreeNode::mapping(
            vec![
                (
                    TreeNode::scalar("a", pos()),
                    TreeNode::scalar("first", Position::new(1, 4)),
                ),
                (
                    TreeNode::scalar("a", Position::new(2, 1)),
                    TreeNode::scalar("second", Position::new(2, 4)),
                ),
            ],
            pos(),
        );

        let found = map.get("a").unwrap();
        assert_eq!(found.text(), "first");
        assert_eq!(found.position(), Position::new(1, 4));
        assert!(map.get("b").is_none());
    }

    #[test]
    fn test_is_null() {
        assert!(TreeNode::scalar("~", pos()).is_null());
        assert!(!TreeNode::scalar("false", pos()).is_null());
        assert!(!TreeNode::mapping(vec![], pos()).is_null());
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(15, 11).to_string(), "15:11");
    }
}
