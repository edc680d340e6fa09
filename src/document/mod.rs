//! Positioned document trees and the YAML/JSON parser that produces them.

pub mod node;
pub mod parser;

pub use node::{NodeKind, Position, TreeNode, TreeValue};
pub use parser::{parse_document, parse_documents, DocumentStream};
