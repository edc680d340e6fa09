//! YAML parsing into positioned trees.
//!
//! This module turns source text into a lazy stream of [`TreeNode`] documents using the
//! marked event API of `yaml-rust2`. Every node keeps the 1-based line and column where
//! it starts. JSON is a subset of YAML, so JSON files go through the same path.
//!
//! Documents are decoded one at a time: a caller that stops iterating never pays for
//! the rest of the file.
//!
//! # Example
//!
//! ```
//! use conflint::document::parser::parse_documents;
//!
//! let yaml = "foo:\n  bar: 1\n---\nfoo: 2\n";
//! let docs: Vec<_> = parse_documents(yaml).collect::<Result<_, _>>().unwrap();
//!
//! assert_eq!(docs.len(), 2);
//! let bar = docs[0].get("foo").and_then(|foo| foo.get("bar")).unwrap();
//! assert_eq!((bar.line(), bar.column()), (2, 8));
//! ```

use std::collections::HashMap;

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError};

use super::node::{Position, TreeNode};

/// Containers that are still being filled while events arrive.
enum Frame {
    Sequence {
        anchor: usize,
        position: Position,
        items: Vec<TreeNode>,
    },
    Mapping {
        anchor: usize,
        position: Position,
        entries: Vec<(TreeNode, TreeNode)>,
        pending_key: Option<TreeNode>,
    },
}

/// Receives the events of a single document and assembles its tree.
struct TreeBuilder<'s> {
    lines: &'s [&'s str],
    stack: Vec<Frame>,
    anchors: HashMap<usize, TreeNode>,
    document: Option<TreeNode>,
}

fn position_of(mark: &Marker) -> Position {
    // yaml-rust2 lines are 1-based, columns 0-based
    Position::new(mark.line(), mark.col() + 1)
}

impl<'s> TreeBuilder<'s> {
    fn new(lines: &'s [&'s str]) -> Self {
        Self {
            lines,
            stack: Vec::new(),
            anchors: HashMap::new(),
            document: None,
        }
    }

    fn remember(&mut self, anchor: usize, node: &TreeNode) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
    }

    fn push_node(&mut self, node: TreeNode) {
        match self.stack.last_mut() {
            None => self.document = Some(node),
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                None => *pending_key = Some(node),
            },
        }
    }

    fn close_frame(&mut self) {
        let (anchor, node) = match self.stack.pop() {
            Some(Frame::Sequence {
                anchor,
                position,
                items,
            }) => {
                let position = match items.first() {
                    Some(first) if !is_flow(position, first) => self.dash_before(first.position()),
                    _ => position,
                };
                (anchor, TreeNode::sequence(items, position))
            }
            Some(Frame::Mapping {
                anchor,
                position,
                entries,
                ..
            }) => {
                let position = match entries.first() {
                    Some((key, _)) if !is_flow(position, key) => key.position(),
                    _ => position,
                };
                (anchor, TreeNode::mapping(entries, position))
            }
            None => return,
        };
        self.remember(anchor, &node);
        self.push_node(node);
    }

    /// Finds the `-` indicator that introduces a block sequence item starting at `item`.
    ///
    /// Anchors or tags may sit between the indicator and the item, and the item may start
    /// on a later line than its indicator.
    fn dash_before(&self, item: Position) -> Position {
        let fallback = Position::new(item.line, item.column.saturating_sub(2).max(1));
        let mut line = item.line;
        let mut limit = item.column.saturating_sub(1);

        while let Some(text) = line.checked_sub(1).and_then(|idx| self.lines.get(idx)) {
            let before: Vec<char> = text.chars().take(limit).collect();
            let mut seen_text = false;
            for idx in (0..before.len()).rev() {
                match before[idx] {
                    '-' if before.get(idx + 1).map_or(true, |next| next.is_whitespace()) => {
                        return Position::new(line, idx + 1);
                    }
                    ch if ch.is_whitespace() => {}
                    _ => seen_text = true,
                }
            }
            if seen_text {
                return fallback;
            }
            line -= 1;
            limit = usize::MAX;
        }

        fallback
    }
}

/// Flow collections report their opening bracket, which precedes their first child.
/// Block collections are reported by yaml-rust2 at or after their first child.
fn is_flow(marker: Position, first: &TreeNode) -> bool {
    marker < first.position()
}

impl MarkedEventReceiver for TreeBuilder<'_> {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        let position = position_of(&mark);
        match ev {
            Event::Scalar(text, _, anchor, _) => {
                let node = TreeNode::scalar(text, position);
                self.remember(anchor, &node);
                self.push_node(node);
            }
            Event::SequenceStart(anchor, ..) => self.stack.push(Frame::Sequence {
                anchor,
                position,
                items: Vec::new(),
            }),
            Event::MappingStart(anchor, ..) => self.stack.push(Frame::Mapping {
                anchor,
                position,
                entries: Vec::new(),
                pending_key: None,
            }),
            Event::SequenceEnd { .. } | Event::MappingEnd { .. } => self.close_frame(),
            Event::Alias(id) => {
                // The scanner rejects unknown anchors, so a miss only happens on
                // malformed event streams.
                let node = self
                    .anchors
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| TreeNode::scalar(String::new(), position));
                self.push_node(node);
            }
            _ => {}
        }
    }
}

type LoadFn<'a> = Box<dyn FnMut(&mut TreeBuilder<'_>) -> Result<(), ScanError> + 'a>;

/// A lazy iterator over the documents of a YAML stream.
///
/// Yields one `TreeNode` per document in source order. A scan error is yielded once,
/// after which the stream is finished.
pub struct DocumentStream<'a> {
    load: LoadFn<'a>,
    lines: Vec<&'a str>,
    finished: bool,
}

impl Iterator for DocumentStream<'_> {
    type Item = Result<TreeNode, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut builder = TreeBuilder::new(&self.lines);
        if let Err(err) = (self.load)(&mut builder) {
            self.finished = true;
            return Some(Err(err));
        }

        match builder.document {
            Some(doc) => Some(Ok(doc)),
            None => {
                self.finished = true;
                None
            }
        }
    }
}

/// Returns a lazy stream over all documents in `source`.
pub fn parse_documents(source: &str) -> DocumentStream<'_> {
    let mut parser = Parser::new_from_str(source);
    DocumentStream {
        load: Box::new(move |builder: &mut TreeBuilder<'_>| parser.load(builder, false)),
        lines: source.lines().collect(),
        finished: false,
    }
}

/// Parses a source that is expected to hold exactly one document.
///
/// Returns `Ok(None)` for an empty stream; documents after the first are ignored.
pub fn parse_document(source: &str) -> Result<Option<TreeNode>, ScanError> {
    parse_documents(source).next().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::{NodeKind, TreeValue};

    fn parse_one(yaml: &str) -> TreeNode {
        parse_document(yaml).unwrap().unwrap()
    }

    #[test]
    fn test_scalar_positions() {
        let root = parse_one("foo:\n  bar: 1\n");
        let foo = root.get("foo").unwrap();
        let bar = foo.get("bar").unwrap();

        assert_eq!(root.kind(), NodeKind::Mapping);
        assert_eq!(bar.text(), "1");
        assert_eq!(bar.position(), Position::new(2, 8));
    }

    #[test]
    fn test_block_sequence_position() {
        let yaml = "spec:\n  containers:\n  - name: fluentd\n  - name: nginx\n";
        let root = parse_one(yaml);
        let containers = root.get("spec").and_then(|s| s.get("containers")).unwrap();

        assert_eq!(containers.kind(), NodeKind::Sequence);
        assert_eq!(containers.position(), Position::new(3, 3));
        match containers.value() {
            TreeValue::Sequence(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].get("name").unwrap().position(), Position::new(4, 11));
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_block_mapping_starts_at_first_key() {
        let yaml = "spec:\n  containers:\n  - name: fluentd\n    image: f\n  - name: nginx\n    image: n\n";
        let root = parse_one(yaml);
        assert_eq!(root.position(), Position::new(1, 1));

        let spec = root.get("spec").unwrap();
        assert_eq!(spec.kind(), NodeKind::Mapping);
        assert_eq!(spec.position(), Position::new(2, 3));

        match spec.get("containers").unwrap().value() {
            TreeValue::Sequence(items) => {
                assert_eq!(items[0].position(), Position::new(3, 5));
                assert_eq!(items[1].position(), Position::new(5, 5));
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_block_sequences() {
        let root = parse_one("matrix:\n- - a\n  - b\n- - c\n");
        match root.get("matrix").unwrap().value() {
            TreeValue::Sequence(rows) => {
                assert_eq!(rows[0].position(), Position::new(2, 3));
                assert_eq!(rows[1].position(), Position::new(4, 3));
            }
            other => panic!("expected sequence, got {:?}", other),
        }
        assert_eq!(root.get("matrix").unwrap().position(), Position::new(2, 1));
    }

    #[test]
    fn test_flow_collections_start_at_bracket() {
        let root = parse_one("a: {b: 1}\nc: [1, 2]\n");
        assert_eq!(root.get("a").unwrap().position(), Position::new(1, 4));
        assert_eq!(root.get("c").unwrap().position(), Position::new(2, 4));
    }

    #[test]
    fn test_quoted_scalar_keeps_text_only() {
        let root = parse_one("a: \"true\"\nb: '01'\n");
        assert_eq!(root.get("a").unwrap().text(), "true");
        assert_eq!(root.get("a").unwrap().column(), 4);
        assert_eq!(root.get("b").unwrap().text(), "01");
    }

    #[test]
    fn test_json_input() {
        let root = parse_one("{\"spec\": {\"replicas\": 3}}");
        let replicas = root.get("spec").and_then(|s| s.get("replicas")).unwrap();
        assert_eq!(replicas.text(), "3");
        assert_eq!(replicas.line(), 1);
    }

    #[test]
    fn test_multiple_documents_in_order() {
        let yaml = "---\nname: first\n---\nname: second\n---\nname: third\n";
        let names: Vec<String> = parse_documents(yaml)
            .map(|doc| doc.unwrap().get("name").unwrap().text().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_stream() {
        assert!(parse_document("").unwrap().is_none());
        assert_eq!(parse_documents("# only a comment\n").count(), 0);
    }

    #[test]
    fn test_alias_resolves_to_anchored_node() {
        let yaml = "defaults: &cfg\n  timeout: 30\nprod: *cfg\n";
        let root = parse_one(yaml);
        let timeout = root.get("prod").and_then(|p| p.get("timeout")).unwrap();
        assert_eq!(timeout.text(), "30");
        assert_eq!(timeout.position(), Position::new(2, 12));
    }

    #[test]
    fn test_scan_error_ends_stream() {
        let mut docs = parse_documents("a: [1, 2\n");
        assert!(matches!(docs.next(), Some(Err(_))));
        assert!(docs.next().is_none());
    }
}
