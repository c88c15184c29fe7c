//! Copy-on-write tree rewriting for multi-pass source-to-source lowering.
//!
//! The crate provides the machinery a chain of lowering passes runs on: a
//! persistent `Rc`-shared syntax tree, a factory whose `update_*` functions
//! preserve node identity when nothing changed, a declarative per-kind edge
//! schema, the `visit_node` / `visit_nodes` / `visit_each_child` protocol,
//! a lexical environment stack for hoisting synthesized declarations, and a
//! memoized transform-flag aggregator that lets later passes skip subtrees
//! containing nothing they care about.
//!
//! A pass is a [`visitor::Visitor`] driven top-down: it rewrites the nodes it
//! understands and delegates everything else to
//! [`visitor::visit_each_child`], which rebuilds only the spine above actual
//! changes and shares every untouched subtree between the input and output
//! trees.

pub mod error;
pub mod factory;
pub mod parenthesizer;
pub mod schema;
pub mod syntax;
pub mod transform_context;
pub mod transform_flags;
pub mod visitor;

pub use error::InvariantViolation;
pub use syntax::{
    BinaryOperator, Node, NodeArray, NodeData, NodeFlags, NodeTest, SyntaxKind, UnaryOperator,
};
pub use transform_context::{AssertionLevel, TransformContext, merge_lexical_environment};
pub use transform_flags::{TransformFlags, aggregate_transform_flags};
pub use visitor::{
    VisitResult, Visitor, visit_each_child, visit_lexical_environment, visit_node, visit_nodes,
};

#[cfg(test)]
#[path = "tests/visitor_tests.rs"]
mod visitor_tests;

#[cfg(test)]
#[path = "tests/environment_tests.rs"]
mod environment_tests;
