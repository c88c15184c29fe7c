//! Fatal invariant errors raised by the rewriting core.
//!
//! Every variant represents a caller contract violation (a malformed visitor
//! or an illegal merge target), not a recoverable runtime condition. A
//! violation aborts the whole transformation pass; there is no retry or
//! partial-result policy.

use crate::syntax::SyntaxKind;
use thiserror::Error;

/// A broken contract detected during a visit or an environment merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A visitor returned no node for a child that is not optional.
    #[error("node was not optional")]
    NotOptional,

    /// A visit result failed the validity predicate declared for its edge.
    #[error("unexpected node kind {actual:?}, expected {expected}")]
    UnexpectedKind {
        /// Name of the predicate that rejected the node.
        expected: &'static str,
        actual: SyntaxKind,
    },

    /// A visitor returned a list for a single-node slot and no lift function
    /// was available to collapse it.
    #[error("expected at most one node, found {found}")]
    TooManyNodes { found: usize },

    /// A statement was hoisted while no lexical environment frame was open.
    #[error("cannot hoist a declaration outside a lexical environment")]
    NoOpenLexicalEnvironment,

    /// `merge_lexical_environment` was invoked on a node kind that cannot
    /// host hoisted declarations.
    #[error("{kind:?} is not a valid lexical environment host")]
    InvalidEnvironmentHost { kind: SyntaxKind },

    /// A function-like or module host was missing the body its kind requires
    /// while declarations were pending.
    #[error("{kind:?} has no body to receive hoisted declarations")]
    MissingEnvironmentBody { kind: SyntaxKind },
}
