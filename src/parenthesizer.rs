//! Per-edge parenthesization rules.
//!
//! Each rule receives a freshly visited replacement node together with its
//! parent and wraps it in a `ParenthesizedExpression` only when omitting the
//! parentheses would change parsed meaning. Rules must preserve identity when
//! no wrapping is needed, so an identity-preserving visit stays
//! identity-preserving through the schema.

use crate::factory;
use crate::syntax::node::NodeData;
use crate::syntax::{BinaryOperator, Node, SyntaxKind};
use std::rc::Rc;

/// Signature shared by every rule: `(node, parent) -> node`.
pub type ParenthesizeFn = fn(Rc<Node>, &Rc<Node>) -> Rc<Node>;

fn is_comma_sequence(node: &Node) -> bool {
    matches!(
        &node.data,
        NodeData::BinaryExpression(b) if b.operator == BinaryOperator::Comma
    )
}

/// A comma sequence in a position where `,` is a list separator (arguments,
/// array elements, initializers) must keep its own parentheses.
pub fn parenthesize_expression_for_disallowed_comma(node: Rc<Node>, _parent: &Rc<Node>) -> Rc<Node> {
    if is_comma_sequence(&node) {
        factory::create_paren(node)
    } else {
        node
    }
}

/// The callee/object position of a call, `new`, or access expression must be
/// a left-hand-side expression.
pub fn parenthesize_left_side_of_access(node: Rc<Node>, _parent: &Rc<Node>) -> Rc<Node> {
    match node.kind {
        SyntaxKind::BinaryExpression
        | SyntaxKind::ConditionalExpression
        | SyntaxKind::ArrowFunction
        | SyntaxKind::PrefixUnaryExpression
        | SyntaxKind::AwaitExpression
        | SyntaxKind::SpreadElement => factory::create_paren(node),
        _ => node,
    }
}

/// `new` binds tighter than a call in its callee: a callee that is itself a
/// call (or anything looser) must be wrapped.
pub fn parenthesize_expression_of_new(node: Rc<Node>, parent: &Rc<Node>) -> Rc<Node> {
    match node.kind {
        SyntaxKind::CallExpression => factory::create_paren(node),
        _ => parenthesize_left_side_of_access(node, parent),
    }
}

/// A function or object literal at the head of an expression statement would
/// parse as a declaration or a block.
pub fn parenthesize_expression_of_expression_statement(
    node: Rc<Node>,
    _parent: &Rc<Node>,
) -> Rc<Node> {
    match node.kind {
        SyntaxKind::FunctionExpression | SyntaxKind::ObjectLiteralExpression => {
            factory::create_paren(node)
        }
        _ => node,
    }
}

/// A comma sequence inside `[...]` of a computed property name would change
/// the computed key.
pub fn parenthesize_expression_of_computed_property_name(
    node: Rc<Node>,
    _parent: &Rc<Node>,
) -> Rc<Node> {
    if is_comma_sequence(&node) {
        factory::create_paren(node)
    } else {
        node
    }
}

/// An object literal as an arrow concise body would parse as a block.
pub fn parenthesize_concise_body_of_arrow_function(node: Rc<Node>, _parent: &Rc<Node>) -> Rc<Node> {
    if node.kind == SyntaxKind::ObjectLiteralExpression || is_comma_sequence(&node) {
        factory::create_paren(node)
    } else {
        node
    }
}
