//! Syntax tree data model.
//!
//! This module defines the closed kind set, the node/payload types, and the
//! predicate library shared by the edge schema and the visitors.

pub mod kind;
pub mod node;
pub mod predicates;

pub use kind::SyntaxKind;
pub use node::{BinaryOperator, Node, NodeArray, NodeData, NodeFlags, UnaryOperator};
pub use predicates::NodeTest;
