use crate::error::InvariantViolation;
use crate::factory;
use crate::syntax::predicates::{IS_EXPRESSION, IS_STATEMENT};
use crate::syntax::{BinaryOperator, Node, NodeArray, NodeData, SyntaxKind};
use crate::transform_context::{AssertionLevel, TransformContext};
use crate::transform_flags::{TransformFlags, aggregate_transform_flags};
use crate::visitor::{VisitResult, visit_each_child, visit_node, visit_nodes};
use smallvec::smallvec;
use std::rc::Rc;

fn ident(text: &str) -> Rc<Node> {
    factory::create_identifier(text)
}

fn expr_stmt(expression: Rc<Node>) -> Rc<Node> {
    factory::create_expression_statement(expression)
}

fn identity(
    node: &Rc<Node>,
    _ctx: &mut TransformContext,
) -> Result<VisitResult, InvariantViolation> {
    Ok(VisitResult::Node(node.clone()))
}

// =============================================================================
// visit_node
// =============================================================================

#[test]
fn test_absent_input_skips_the_visitor() {
    let mut ctx = TransformContext::new();
    let mut calls = 0usize;
    let mut counting = |node: &Rc<Node>,
                        _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        calls += 1;
        Ok(VisitResult::Node(node.clone()))
    };
    let result = visit_node(None, &mut counting, &mut ctx, Some(&IS_EXPRESSION), true, None);
    assert!(result.unwrap().is_none());
    assert_eq!(calls, 0);
}

#[test]
fn test_identity_result_bypasses_validation() {
    // An unchanged node is returned as-is even when it would not satisfy the
    // edge's predicate, so a no-op visitor can never introduce an error.
    let node = ident("x");
    let mut ctx = TransformContext::new();
    let result = visit_node(
        Some(&node),
        &mut identity,
        &mut ctx,
        Some(&IS_STATEMENT),
        false,
        None,
    )
    .unwrap()
    .unwrap();
    assert!(Rc::ptr_eq(&result, &node));
}

#[test]
fn test_deleting_a_required_slot_is_an_error() {
    let node = ident("x");
    let mut delete = |_: &Rc<Node>,
                      _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> { Ok(VisitResult::None) };

    let mut ctx = TransformContext::new();
    let err = visit_node(Some(&node), &mut delete, &mut ctx, Some(&IS_EXPRESSION), false, None)
        .unwrap_err();
    assert_eq!(err, InvariantViolation::NotOptional);

    let ok = visit_node(Some(&node), &mut delete, &mut ctx, Some(&IS_EXPRESSION), true, None)
        .unwrap();
    assert!(ok.is_none());
}

#[test]
fn test_empty_list_result_counts_as_deletion() {
    let node = ident("x");
    let mut empty = |_: &Rc<Node>,
                     _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> { Ok(VisitResult::Nodes(smallvec![])) };

    let mut ctx = TransformContext::new();
    let ok = visit_node(Some(&node), &mut empty, &mut ctx, Some(&IS_EXPRESSION), true, None)
        .unwrap();
    assert!(ok.is_none());

    let err = visit_node(Some(&node), &mut empty, &mut ctx, Some(&IS_EXPRESSION), false, None)
        .unwrap_err();
    assert_eq!(err, InvariantViolation::NotOptional);
}

#[test]
fn test_multi_node_result_needs_a_lift() {
    let node = ident("x");
    let mut ctx = TransformContext::new();

    let mut two = |_: &Rc<Node>,
                   _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        Ok(VisitResult::Nodes(smallvec![ident("a"), ident("b")]))
    };
    let err = visit_node(Some(&node), &mut two, &mut ctx, Some(&IS_EXPRESSION), false, None)
        .unwrap_err();
    assert_eq!(err, InvariantViolation::TooManyNodes { found: 2 });

    // A single-element list in a single-node slot unwraps without a lift.
    let only = ident("a");
    let captured = only.clone();
    let mut one = move |_: &Rc<Node>,
                        _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        Ok(VisitResult::Nodes(smallvec![captured.clone()]))
    };
    let result = visit_node(Some(&node), &mut one, &mut ctx, Some(&IS_EXPRESSION), false, None)
        .unwrap()
        .unwrap();
    assert!(Rc::ptr_eq(&result, &only));
}

#[test]
fn test_lift_collapses_statements_into_a_block() {
    let node = expr_stmt(ident("x"));
    let mut split = |_: &Rc<Node>,
                     _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        Ok(VisitResult::Nodes(smallvec![
            expr_stmt(ident("a")),
            expr_stmt(ident("b")),
        ]))
    };
    let mut ctx = TransformContext::new();
    let result = visit_node(
        Some(&node),
        &mut split,
        &mut ctx,
        Some(&IS_STATEMENT),
        false,
        Some(factory::lift_to_block),
    )
    .unwrap()
    .unwrap();
    let NodeData::Block(block) = &result.data else {
        panic!("expected a block");
    };
    assert!(block.multi_line);
    assert_eq!(block.statements.len(), 2);
}

#[test]
fn test_replacement_is_checked_against_the_edge_predicate() {
    let node = ident("x");
    let mut replace = |_: &Rc<Node>,
                       _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> { Ok(VisitResult::Node(ident("y"))) };

    let mut ctx = TransformContext::new();
    let err = visit_node(Some(&node), &mut replace, &mut ctx, Some(&IS_STATEMENT), false, None)
        .unwrap_err();
    assert_eq!(
        err,
        InvariantViolation::UnexpectedKind {
            expected: "statement",
            actual: SyntaxKind::Identifier,
        }
    );

    // With assertions off, the same replacement is trusted.
    let mut relaxed = TransformContext::with_assertion_level(AssertionLevel::None);
    let result = visit_node(
        Some(&node),
        &mut replace,
        &mut relaxed,
        Some(&IS_STATEMENT),
        false,
        None,
    );
    assert!(result.is_ok());
}

// =============================================================================
// visit_nodes
// =============================================================================

#[test]
fn test_unchanged_sequence_returns_the_original_instance() {
    let nodes = factory::create_node_array(vec![ident("a"), ident("b")], false, None);
    let mut ctx = TransformContext::new();
    let result = visit_nodes(Some(&nodes), &mut identity, &mut ctx, Some(&IS_EXPRESSION), None, None)
        .unwrap()
        .unwrap();
    assert!(Rc::ptr_eq(&result, &nodes));
}

#[test]
fn test_splice_preserves_relative_order() {
    let a = ident("a");
    let b = ident("b");
    let c = ident("c");
    let nodes = factory::create_node_array(vec![a.clone(), b.clone(), c.clone()], false, None);
    let target = b.clone();
    let mut split = move |node: &Rc<Node>,
                          _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        if Rc::ptr_eq(node, &target) {
            Ok(VisitResult::Nodes(smallvec![ident("b1"), ident("b2")]))
        } else {
            Ok(VisitResult::Node(node.clone()))
        }
    };
    let mut ctx = TransformContext::new();
    let result = visit_nodes(Some(&nodes), &mut split, &mut ctx, Some(&IS_EXPRESSION), None, None)
        .unwrap()
        .unwrap();
    assert_eq!(result.len(), 4);
    assert!(Rc::ptr_eq(&result[0], &a));
    assert!(Rc::ptr_eq(&result[3], &c));
    let NodeData::Identifier(first) = &result[1].data else {
        panic!("expected identifier");
    };
    let NodeData::Identifier(second) = &result[2].data else {
        panic!("expected identifier");
    };
    assert_eq!(first.text, "b1");
    assert_eq!(second.text, "b2");
}

#[test]
fn test_deleted_elements_are_dropped_from_the_sequence() {
    let b = ident("b");
    let nodes = factory::create_node_array(vec![ident("a"), b.clone(), ident("c")], false, None);
    let mut drop_b = move |node: &Rc<Node>,
                           _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        if Rc::ptr_eq(node, &b) {
            Ok(VisitResult::None)
        } else {
            Ok(VisitResult::Node(node.clone()))
        }
    };
    let mut ctx = TransformContext::new();
    let result = visit_nodes(Some(&nodes), &mut drop_b, &mut ctx, Some(&IS_EXPRESSION), None, None)
        .unwrap()
        .unwrap();
    assert_eq!(result.len(), 2);
    assert!(!Rc::ptr_eq(&result, &nodes));
}

#[test]
fn test_window_visits_only_its_elements() {
    let nodes = factory::create_node_array(
        vec![ident("a"), ident("b"), ident("c"), ident("d"), ident("e")],
        true,
        None,
    );
    let mut seen = Vec::new();
    let mut record = |node: &Rc<Node>,
                      _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        if let NodeData::Identifier(id) = &node.data {
            seen.push(id.text.clone());
        }
        Ok(VisitResult::Node(node.clone()))
    };
    let mut ctx = TransformContext::new();
    let result = visit_nodes(
        Some(&nodes),
        &mut record,
        &mut ctx,
        Some(&IS_EXPRESSION),
        Some(1),
        Some(2),
    )
    .unwrap()
    .unwrap();

    assert_eq!(seen, vec!["b".to_string(), "c".to_string()]);
    // A partial window always yields a fresh sequence holding only the window.
    assert_eq!(result.len(), 2);
    assert!(Rc::ptr_eq(&result[0], &nodes[1]));
    assert!(Rc::ptr_eq(&result[1], &nodes[2]));
    // The window stops short of the end, so the trailing separator is gone.
    assert!(!result.has_trailing_comma);
}

#[test]
fn test_window_reaching_the_end_keeps_the_trailing_separator() {
    let nodes = factory::create_node_array(
        vec![ident("a"), ident("b"), ident("c"), ident("d"), ident("e")],
        true,
        None,
    );
    let mut ctx = TransformContext::new();
    let result = visit_nodes(
        Some(&nodes),
        &mut identity,
        &mut ctx,
        Some(&IS_EXPRESSION),
        Some(3),
        Some(2),
    )
    .unwrap()
    .unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.has_trailing_comma);
}

#[test]
fn test_rebuilt_sequence_keeps_the_source_span() {
    let nodes = Rc::new(NodeArray {
        elements: vec![ident("a"), ident("b"), ident("c")],
        has_trailing_comma: false,
        pos: 10,
        end: 42,
    });
    let mut ctx = TransformContext::new();
    let windowed = visit_nodes(
        Some(&nodes),
        &mut identity,
        &mut ctx,
        Some(&IS_EXPRESSION),
        Some(1),
        Some(1),
    )
    .unwrap()
    .unwrap();
    assert_eq!(windowed.pos, 10);
    assert_eq!(windowed.end, 42);

    let mut replace_all = |_: &Rc<Node>,
                           _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> { Ok(VisitResult::Node(ident("z"))) };
    let rebuilt = visit_nodes(
        Some(&nodes),
        &mut replace_all,
        &mut ctx,
        Some(&IS_EXPRESSION),
        None,
        None,
    )
    .unwrap()
    .unwrap();
    assert_eq!(rebuilt.pos, 10);
    assert_eq!(rebuilt.end, 42);
}

// =============================================================================
// visit_each_child
// =============================================================================

#[test]
fn test_identity_visit_returns_the_original_node() {
    let call = factory::create_call(
        ident("f"),
        None,
        factory::create_node_array(vec![ident("a"), ident("b")], false, None),
    );
    let mut ctx = TransformContext::new();
    let result = visit_each_child(&call, &mut identity, &mut ctx).unwrap();
    assert!(Rc::ptr_eq(&result, &call));
}

#[test]
fn test_leaf_kinds_never_invoke_the_visitor() {
    let leaf = ident("x");
    let mut calls = 0usize;
    let mut counting = |node: &Rc<Node>,
                        _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        calls += 1;
        Ok(VisitResult::Node(node.clone()))
    };
    let mut ctx = TransformContext::new();
    let result = visit_each_child(&leaf, &mut counting, &mut ctx).unwrap();
    assert!(Rc::ptr_eq(&result, &leaf));
    assert_eq!(calls, 0);
}

#[test]
fn test_rebuild_shares_untouched_siblings() {
    let left = ident("a");
    let right = ident("b");
    let node = factory::create_binary(left.clone(), BinaryOperator::Plus, right.clone());

    let replacement = ident("c");
    let target = right.clone();
    let new_right = replacement.clone();
    let mut swap = move |n: &Rc<Node>,
                         _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        if Rc::ptr_eq(n, &target) {
            Ok(VisitResult::Node(new_right.clone()))
        } else {
            Ok(VisitResult::Node(n.clone()))
        }
    };
    let mut ctx = TransformContext::new();
    let result = visit_each_child(&node, &mut swap, &mut ctx).unwrap();

    assert!(!Rc::ptr_eq(&result, &node));
    let NodeData::BinaryExpression(b) = &result.data else {
        panic!("expected binary expression");
    };
    assert!(Rc::ptr_eq(&b.left, &left));
    assert!(Rc::ptr_eq(&b.right, &replacement));
    // The rebuilt node remembers what it was derived from.
    assert!(Rc::ptr_eq(result.original.as_ref().unwrap(), &node));
}

#[test]
fn test_if_branches_lift_multiple_statements_to_a_block() {
    let then_stmt = expr_stmt(ident("a"));
    let node = factory::create_if(ident("cond"), then_stmt.clone(), None);
    let target = then_stmt.clone();
    let mut split = move |n: &Rc<Node>,
                          _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        if Rc::ptr_eq(n, &target) {
            Ok(VisitResult::Nodes(smallvec![
                expr_stmt(ident("x")),
                expr_stmt(ident("y")),
            ]))
        } else {
            Ok(VisitResult::Node(n.clone()))
        }
    };
    let mut ctx = TransformContext::new();
    let result = visit_each_child(&node, &mut split, &mut ctx).unwrap();
    let NodeData::IfStatement(i) = &result.data else {
        panic!("expected if statement");
    };
    let NodeData::Block(block) = &i.then_statement.data else {
        panic!("expected lifted block");
    };
    assert_eq!(block.statements.len(), 2);
}

#[test]
fn test_comma_expression_in_argument_position_is_parenthesized() {
    let arg = ident("a");
    let call = factory::create_call(
        ident("f"),
        None,
        factory::create_node_array(vec![arg.clone()], false, None),
    );
    let target = arg.clone();
    let mut to_comma = move |n: &Rc<Node>,
                             _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        if Rc::ptr_eq(n, &target) {
            Ok(VisitResult::Node(factory::create_binary(
                ident("x"),
                BinaryOperator::Comma,
                ident("y"),
            )))
        } else {
            Ok(VisitResult::Node(n.clone()))
        }
    };
    let mut ctx = TransformContext::new();
    let result = visit_each_child(&call, &mut to_comma, &mut ctx).unwrap();
    let NodeData::CallExpression(c) = &result.data else {
        panic!("expected call");
    };
    assert_eq!(c.arguments[0].kind, SyntaxKind::ParenthesizedExpression);
}

#[test]
fn test_object_literal_heading_a_statement_is_parenthesized() {
    let expression = ident("x");
    let stmt = expr_stmt(expression.clone());
    let target = expression.clone();
    let mut to_object = move |n: &Rc<Node>,
                              _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        if Rc::ptr_eq(n, &target) {
            Ok(VisitResult::Node(factory::create_object_literal(
                factory::create_node_array(vec![], false, None),
                false,
            )))
        } else {
            Ok(VisitResult::Node(n.clone()))
        }
    };
    let mut ctx = TransformContext::new();
    let result = visit_each_child(&stmt, &mut to_object, &mut ctx).unwrap();
    let NodeData::ExpressionStatement(e) = &result.data else {
        panic!("expected expression statement");
    };
    assert_eq!(e.expression.kind, SyntaxKind::ParenthesizedExpression);
}

#[test]
fn test_generic_path_clones_once_and_shares_the_rest() {
    // Conditional expressions have no hand-routed arm; they go through the
    // schema-driven fallback.
    let condition = ident("c");
    let when_true = ident("t");
    let when_false = ident("f");
    let node = factory::create_conditional(condition.clone(), when_true.clone(), when_false.clone());

    let target = when_true.clone();
    let mut swap = move |n: &Rc<Node>,
                         _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        if Rc::ptr_eq(n, &target) {
            Ok(VisitResult::Node(ident("u")))
        } else {
            Ok(VisitResult::Node(n.clone()))
        }
    };
    let mut ctx = TransformContext::new();
    let result = visit_each_child(&node, &mut swap, &mut ctx).unwrap();

    assert!(!Rc::ptr_eq(&result, &node));
    let NodeData::ConditionalExpression(c) = &result.data else {
        panic!("expected conditional");
    };
    assert!(Rc::ptr_eq(&c.condition, &condition));
    assert!(Rc::ptr_eq(&c.when_false, &when_false));
    assert!(!Rc::ptr_eq(&c.when_true, &when_true));
    assert!(Rc::ptr_eq(result.original.as_ref().unwrap(), &node));
}

#[test]
fn test_rebuilt_nodes_recompute_transform_flags() {
    let initializer = ident("x");
    let decl = factory::create_variable_declaration(ident("v"), None, Some(initializer.clone()));

    let target = initializer.clone();
    let mut to_arrow = move |n: &Rc<Node>,
                             _: &mut TransformContext|
     -> Result<VisitResult, InvariantViolation> {
        if Rc::ptr_eq(n, &target) {
            Ok(VisitResult::Node(factory::create_arrow_function(
                None,
                factory::create_node_array(vec![], false, None),
                None,
                ident("y"),
            )))
        } else {
            Ok(VisitResult::Node(n.clone()))
        }
    };
    let mut ctx = TransformContext::new();
    let result = visit_each_child(&decl, &mut to_arrow, &mut ctx).unwrap();

    assert!(
        result
            .transform_flags
            .get()
            .contains(TransformFlags::HAS_COMPUTED_FLAGS)
    );
    assert!(
        aggregate_transform_flags(&result).contains(TransformFlags::CONTAINS_LEXICAL_THIS)
    );
}
