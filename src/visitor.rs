//! Copy-on-write tree visitation.
//!
//! The three entry points mirror the shape of a lowering pass: `visit_node`
//! rewrites a single child slot, `visit_nodes` rewrites an ordered sequence,
//! and `visit_each_child` rebuilds a node from its visited children. All of
//! them preserve identity: a visitor that touches nothing gets the exact
//! input `Rc` back, so unchanged subtrees are shared between the input and
//! output trees with no allocation.
//!
//! Scope-aware kinds (source files, namespaces, everything function-like)
//! bracket their parameter list and body with a lexical environment frame and
//! absorb hoisted declarations on the way out. The frame is popped on every
//! exit path, including when a nested visit fails.

use crate::error::InvariantViolation;
use crate::factory;
use crate::parenthesizer::ParenthesizeFn;
use crate::schema::{self, EdgeRef, EdgeUpdate};
use crate::syntax::predicates::*;
use crate::syntax::{Node, NodeArray, NodeData, NodeTest};
use crate::transform_context::{
    AssertionLevel, TransformContext, merge_concise_body, merge_lexical_environment,
};
use crate::transform_flags::aggregate_transform_flags;
use smallvec::SmallVec;
use std::rc::Rc;
use tracing::trace;

/// What a visitor produced for one input node: a replacement, a splice of
/// several nodes (meaningful only in list positions or under a lift
/// function), or deletion.
#[derive(Debug, Clone)]
pub enum VisitResult {
    Node(Rc<Node>),
    Nodes(SmallVec<[Rc<Node>; 2]>),
    None,
}

impl From<Rc<Node>> for VisitResult {
    fn from(node: Rc<Node>) -> Self {
        VisitResult::Node(node)
    }
}

impl From<Option<Rc<Node>>> for VisitResult {
    fn from(node: Option<Rc<Node>>) -> Self {
        match node {
            Some(node) => VisitResult::Node(node),
            None => VisitResult::None,
        }
    }
}

impl From<Vec<Rc<Node>>> for VisitResult {
    fn from(nodes: Vec<Rc<Node>>) -> Self {
        VisitResult::Nodes(nodes.into())
    }
}

/// A tree-rewriting callback. Implemented for any `FnMut` closure with the
/// matching signature; named types implement it directly when they carry
/// pass-local state.
pub trait Visitor {
    fn visit(
        &mut self,
        node: &Rc<Node>,
        ctx: &mut TransformContext,
    ) -> Result<VisitResult, InvariantViolation>;
}

impl<F> Visitor for F
where
    F: FnMut(&Rc<Node>, &mut TransformContext) -> Result<VisitResult, InvariantViolation>,
{
    fn visit(
        &mut self,
        node: &Rc<Node>,
        ctx: &mut TransformContext,
    ) -> Result<VisitResult, InvariantViolation> {
        self(node, ctx)
    }
}

// =============================================================================
// Single-node visit
// =============================================================================

/// Visit one node slot.
///
/// An absent input is returned as-is without invoking the visitor. A visitor
/// that hands back the same instance short-circuits all post-processing. A
/// deleted node is an error unless `optional`; a multi-node result collapses
/// through `lift`, or must have exactly one element.
pub fn visit_node<V: Visitor + ?Sized>(
    node: Option<&Rc<Node>>,
    visitor: &mut V,
    ctx: &mut TransformContext,
    test: Option<&NodeTest>,
    optional: bool,
    lift: Option<fn(&[Rc<Node>]) -> Rc<Node>>,
) -> Result<Option<Rc<Node>>, InvariantViolation> {
    visit_node_worker(node, visitor, ctx, test, optional, lift, None, None)
}

#[allow(clippy::too_many_arguments)]
fn visit_node_worker<V: Visitor + ?Sized>(
    node: Option<&Rc<Node>>,
    visitor: &mut V,
    ctx: &mut TransformContext,
    test: Option<&NodeTest>,
    optional: bool,
    lift: Option<fn(&[Rc<Node>]) -> Rc<Node>>,
    parenthesize: Option<ParenthesizeFn>,
    parent: Option<&Rc<Node>>,
) -> Result<Option<Rc<Node>>, InvariantViolation> {
    let Some(node) = node else {
        return Ok(None);
    };

    let result = visitor.visit(node, ctx)?;

    // Identity short-circuit: same instance back means no re-validation, no
    // re-parenthesization, no flag recomputation.
    if let VisitResult::Node(n) = &result {
        if Rc::ptr_eq(n, node) {
            return Ok(Some(n.clone()));
        }
    }

    let resolved = match result {
        VisitResult::Node(n) => Some(n),
        VisitResult::None => None,
        VisitResult::Nodes(list) => {
            if list.is_empty() {
                None
            } else if let Some(lift) = lift {
                Some(lift(&list))
            } else if list.len() == 1 {
                list.into_iter().next()
            } else {
                return Err(InvariantViolation::TooManyNodes { found: list.len() });
            }
        }
    };
    let Some(resolved) = resolved else {
        return if optional {
            Ok(None)
        } else {
            Err(InvariantViolation::NotOptional)
        };
    };

    let resolved = match (parenthesize, parent) {
        (Some(parenthesize), Some(parent)) => parenthesize(resolved, parent),
        _ => resolved,
    };

    if let Some(test) = test {
        if ctx.assertion_level() == AssertionLevel::Normal && !test.matches(&resolved) {
            return Err(InvariantViolation::UnexpectedKind {
                expected: test.name,
                actual: resolved.kind,
            });
        }
    }

    if !Rc::ptr_eq(&resolved, node) {
        aggregate_transform_flags(&resolved);
    }
    Ok(Some(resolved))
}

// =============================================================================
// Node-list visit
// =============================================================================

/// Visit an ordered sequence, optionally restricted to a `[start, count)`
/// window. A window narrower than the whole sequence always produces a new
/// sequence containing only the window; the trailing-separator bit survives
/// only when the window reaches the original end.
pub fn visit_nodes<V: Visitor + ?Sized>(
    nodes: Option<&Rc<NodeArray>>,
    visitor: &mut V,
    ctx: &mut TransformContext,
    test: Option<&NodeTest>,
    start: Option<usize>,
    count: Option<usize>,
) -> Result<Option<Rc<NodeArray>>, InvariantViolation> {
    visit_nodes_worker(nodes, visitor, ctx, test, start, count, None, None)
}

#[allow(clippy::too_many_arguments)]
fn visit_nodes_worker<V: Visitor + ?Sized>(
    nodes: Option<&Rc<NodeArray>>,
    visitor: &mut V,
    ctx: &mut TransformContext,
    test: Option<&NodeTest>,
    start: Option<usize>,
    count: Option<usize>,
    parenthesize: Option<ParenthesizeFn>,
    parent: Option<&Rc<Node>>,
) -> Result<Option<Rc<NodeArray>>, InvariantViolation> {
    let Some(nodes) = nodes else {
        return Ok(None);
    };
    let len = nodes.len();
    let start = start.unwrap_or(0).min(len);
    let count = count.unwrap_or(len - start).min(len - start);
    let whole = start == 0 && count == len;

    // A partial view can never alias the original sequence.
    let mut updated: Option<Vec<Rc<Node>>> = if whole {
        None
    } else {
        Some(Vec::with_capacity(count))
    };

    for (offset, element) in nodes.elements[start..start + count].iter().enumerate() {
        let result = visitor.visit(element, ctx)?;

        let unchanged = matches!(&result, VisitResult::Node(n) if Rc::ptr_eq(n, element));
        if !unchanged && updated.is_none() {
            // First change: everything already passed is carried over as-is.
            updated = Some(nodes.elements[start..start + offset].to_vec());
        }

        match result {
            VisitResult::Node(n) => {
                if unchanged {
                    if let Some(out) = updated.as_mut() {
                        out.push(n);
                    }
                } else if let Some(out) = updated.as_mut() {
                    out.push(finish_list_element(n, ctx, test, parenthesize, parent)?);
                }
            }
            VisitResult::Nodes(list) => {
                if let Some(out) = updated.as_mut() {
                    for n in list {
                        out.push(finish_list_element(n, ctx, test, parenthesize, parent)?);
                    }
                }
            }
            VisitResult::None => {}
        }
    }

    match updated {
        Some(elements) => {
            let has_trailing_comma = nodes.has_trailing_comma && start + count == len;
            // Rebuilt sequences, windowed or not, keep the source span of the
            // sequence they were derived from.
            Ok(Some(factory::create_node_array(
                elements,
                has_trailing_comma,
                Some(&**nodes),
            )))
        }
        None => Ok(Some(nodes.clone())),
    }
}

fn finish_list_element(
    node: Rc<Node>,
    ctx: &TransformContext,
    test: Option<&NodeTest>,
    parenthesize: Option<ParenthesizeFn>,
    parent: Option<&Rc<Node>>,
) -> Result<Rc<Node>, InvariantViolation> {
    let node = match (parenthesize, parent) {
        (Some(parenthesize), Some(parent)) => parenthesize(node, parent),
        _ => node,
    };
    if let Some(test) = test {
        if ctx.assertion_level() == AssertionLevel::Normal && !test.matches(&node) {
            return Err(InvariantViolation::UnexpectedKind {
                expected: test.name,
                actual: node.kind,
            });
        }
    }
    Ok(node)
}

// =============================================================================
// Child visit
// =============================================================================

// Carries the invariant that a present required slot stays present: the
// worker errs before returning `None` for a non-optional edge.
fn visit_required<V: Visitor + ?Sized>(
    child: &Rc<Node>,
    visitor: &mut V,
    ctx: &mut TransformContext,
    test: &NodeTest,
    lift: Option<fn(&[Rc<Node>]) -> Rc<Node>>,
    parenthesize: Option<ParenthesizeFn>,
    parent: &Rc<Node>,
) -> Result<Rc<Node>, InvariantViolation> {
    visit_node_worker(
        Some(child),
        visitor,
        ctx,
        Some(test),
        false,
        lift,
        parenthesize,
        Some(parent),
    )?
    .ok_or(InvariantViolation::NotOptional)
}

fn visit_optional<V: Visitor + ?Sized>(
    child: Option<&Rc<Node>>,
    visitor: &mut V,
    ctx: &mut TransformContext,
    test: &NodeTest,
    lift: Option<fn(&[Rc<Node>]) -> Rc<Node>>,
    parenthesize: Option<ParenthesizeFn>,
    parent: &Rc<Node>,
) -> Result<Option<Rc<Node>>, InvariantViolation> {
    visit_node_worker(
        child,
        visitor,
        ctx,
        Some(test),
        true,
        lift,
        parenthesize,
        Some(parent),
    )
}

fn visit_required_list<V: Visitor + ?Sized>(
    list: &Rc<NodeArray>,
    visitor: &mut V,
    ctx: &mut TransformContext,
    test: &NodeTest,
    parenthesize: Option<ParenthesizeFn>,
    parent: &Rc<Node>,
) -> Result<Rc<NodeArray>, InvariantViolation> {
    visit_nodes_worker(
        Some(list),
        visitor,
        ctx,
        Some(test),
        None,
        None,
        parenthesize,
        Some(parent),
    )?
    .ok_or(InvariantViolation::NotOptional)
}

fn visit_optional_list<V: Visitor + ?Sized>(
    list: Option<&Rc<NodeArray>>,
    visitor: &mut V,
    ctx: &mut TransformContext,
    test: &NodeTest,
    parent: &Rc<Node>,
) -> Result<Option<Rc<NodeArray>>, InvariantViolation> {
    visit_nodes_worker(list, visitor, ctx, Some(test), None, None, None, Some(parent))
}

/// Visit a top-level statement sequence bracketed by its own lexical
/// environment frame, appending any hoisted declarations to the result.
pub fn visit_lexical_environment<V: Visitor + ?Sized>(
    statements: &Rc<NodeArray>,
    visitor: &mut V,
    ctx: &mut TransformContext,
) -> Result<Rc<NodeArray>, InvariantViolation> {
    ctx.start_lexical_environment();
    let visited = visit_nodes(Some(statements), visitor, ctx, Some(&IS_STATEMENT), None, None);
    let declarations = ctx.end_lexical_environment()?;
    let visited = visited?.ok_or(InvariantViolation::NotOptional)?;
    if declarations.is_empty() {
        return Ok(visited);
    }
    let mut elements = visited.elements.clone();
    elements.extend(declarations);
    Ok(factory::create_node_array(
        elements,
        visited.has_trailing_comma,
        Some(&visited),
    ))
}

/// Rebuild `node` with each schema-declared child replaced by its visited
/// counterpart. Returns the original instance when nothing changed.
///
/// High-frequency kinds are hand-routed; everything else walks its schema
/// generically. Either way, the result of a changed node has its transform
/// flags recomputed before it is returned.
pub fn visit_each_child<V: Visitor + ?Sized>(
    node: &Rc<Node>,
    visitor: &mut V,
    ctx: &mut TransformContext,
) -> Result<Rc<Node>, InvariantViolation> {
    // Tokens and leaf kinds have no schema entry and no visitor calls.
    if node.kind.is_token() || schema::edges(node.kind).is_empty() {
        return Ok(node.clone());
    }

    let result = match &node.data {
        NodeData::Parameter(p) => {
            let decorators = visit_optional_list(p.decorators.as_ref(), visitor, ctx, &IS_DECORATOR, node)?;
            let modifiers = visit_optional_list(p.modifiers.as_ref(), visitor, ctx, &IS_MODIFIER, node)?;
            let name = visit_required(&p.name, visitor, ctx, &IS_BINDING_NAME, None, None, node)?;
            let ty = visit_optional(p.ty.as_ref(), visitor, ctx, &IS_TYPE_NODE, None, None, node)?;
            let initializer = visit_optional(
                p.initializer.as_ref(),
                visitor,
                ctx,
                &IS_EXPRESSION,
                None,
                Some(crate::parenthesizer::parenthesize_expression_for_disallowed_comma),
                node,
            )?;
            factory::update_parameter(node, decorators, modifiers, name, ty, initializer)
        }
        NodeData::PropertyAccessExpression(p) => {
            let expression = visit_required(
                &p.expression,
                visitor,
                ctx,
                &IS_EXPRESSION,
                None,
                Some(crate::parenthesizer::parenthesize_left_side_of_access),
                node,
            )?;
            let name = visit_required(&p.name, visitor, ctx, &IS_IDENTIFIER, None, None, node)?;
            factory::update_property_access(node, expression, name)
        }
        NodeData::CallExpression(c) => {
            let expression = visit_required(
                &c.expression,
                visitor,
                ctx,
                &IS_EXPRESSION,
                None,
                Some(crate::parenthesizer::parenthesize_left_side_of_access),
                node,
            )?;
            let type_arguments =
                visit_optional_list(c.type_arguments.as_ref(), visitor, ctx, &IS_TYPE_NODE, node)?;
            let arguments = visit_required_list(
                &c.arguments,
                visitor,
                ctx,
                &IS_EXPRESSION,
                Some(crate::parenthesizer::parenthesize_expression_for_disallowed_comma),
                node,
            )?;
            factory::update_call(node, expression, type_arguments, arguments)
        }
        NodeData::NewExpression(n) => {
            let expression = visit_required(
                &n.expression,
                visitor,
                ctx,
                &IS_EXPRESSION,
                None,
                Some(crate::parenthesizer::parenthesize_expression_of_new),
                node,
            )?;
            let type_arguments =
                visit_optional_list(n.type_arguments.as_ref(), visitor, ctx, &IS_TYPE_NODE, node)?;
            let arguments = visit_nodes_worker(
                n.arguments.as_ref(),
                visitor,
                ctx,
                Some(&IS_EXPRESSION),
                None,
                None,
                Some(crate::parenthesizer::parenthesize_expression_for_disallowed_comma),
                Some(node),
            )?;
            factory::update_new(node, expression, type_arguments, arguments)
        }
        NodeData::BinaryExpression(b) => {
            let left = visit_required(&b.left, visitor, ctx, &IS_EXPRESSION, None, None, node)?;
            let right = visit_required(&b.right, visitor, ctx, &IS_EXPRESSION, None, None, node)?;
            factory::update_binary(node, left, right)
        }
        NodeData::FunctionExpression(f) => {
            let modifiers = visit_optional_list(f.modifiers.as_ref(), visitor, ctx, &IS_MODIFIER, node)?;
            let name = visit_optional(f.name.as_ref(), visitor, ctx, &IS_IDENTIFIER, None, None, node)?;
            let (parameters, ty, body, declarations) =
                visit_function_scope(node, visitor, ctx, &f.parameters, f.ty.as_ref(), Some(&f.body))?;
            let body = merge_required_body(body, &declarations)?;
            factory::update_function_expression(node, modifiers, name, parameters, ty, body)
        }
        NodeData::ArrowFunction(a) => {
            let modifiers = visit_optional_list(a.modifiers.as_ref(), visitor, ctx, &IS_MODIFIER, node)?;
            ctx.start_lexical_environment();
            let visited = (|| -> Result<_, InvariantViolation> {
                let parameters = visit_required_list(
                    &a.parameters,
                    visitor,
                    ctx,
                    &IS_PARAMETER_DECLARATION,
                    None,
                    node,
                )?;
                let ty = visit_optional(a.ty.as_ref(), visitor, ctx, &IS_TYPE_NODE, None, None, node)?;
                let body = visit_required(
                    &a.body,
                    visitor,
                    ctx,
                    &IS_CONCISE_BODY,
                    Some(factory::lift_to_block),
                    Some(crate::parenthesizer::parenthesize_concise_body_of_arrow_function),
                    node,
                )?;
                Ok((parameters, ty, body))
            })();
            let declarations = ctx.end_lexical_environment()?;
            let (parameters, ty, body) = visited?;
            // Only a block can host hoisted statements; a concise expression
            // body is normalized when declarations were generated.
            let body = merge_concise_body(&body, &declarations)?;
            factory::update_arrow_function(node, modifiers, parameters, ty, body)
        }
        NodeData::Block(b) => {
            let statements =
                visit_required_list(&b.statements, visitor, ctx, &IS_STATEMENT, None, node)?;
            factory::update_block(node, statements)
        }
        NodeData::VariableStatement(v) => {
            let modifiers = visit_optional_list(v.modifiers.as_ref(), visitor, ctx, &IS_MODIFIER, node)?;
            let declaration_list = visit_required(
                &v.declaration_list,
                visitor,
                ctx,
                &IS_VARIABLE_DECLARATION_LIST,
                None,
                None,
                node,
            )?;
            factory::update_variable_statement(node, modifiers, declaration_list)
        }
        NodeData::IfStatement(i) => {
            let expression = visit_required(&i.expression, visitor, ctx, &IS_EXPRESSION, None, None, node)?;
            let then_statement = visit_required(
                &i.then_statement,
                visitor,
                ctx,
                &IS_STATEMENT,
                Some(factory::lift_to_block),
                None,
                node,
            )?;
            let else_statement = visit_optional(
                i.else_statement.as_ref(),
                visitor,
                ctx,
                &IS_STATEMENT,
                Some(factory::lift_to_block),
                None,
                node,
            )?;
            factory::update_if(node, expression, then_statement, else_statement)
        }
        NodeData::ReturnStatement(r) => {
            let expression =
                visit_optional(r.expression.as_ref(), visitor, ctx, &IS_EXPRESSION, None, None, node)?;
            factory::update_return(node, expression)
        }
        NodeData::VariableDeclaration(v) => {
            let name = visit_required(&v.name, visitor, ctx, &IS_BINDING_NAME, None, None, node)?;
            let ty = visit_optional(v.ty.as_ref(), visitor, ctx, &IS_TYPE_NODE, None, None, node)?;
            let initializer = visit_optional(
                v.initializer.as_ref(),
                visitor,
                ctx,
                &IS_EXPRESSION,
                None,
                Some(crate::parenthesizer::parenthesize_expression_for_disallowed_comma),
                node,
            )?;
            factory::update_variable_declaration(node, name, ty, initializer)
        }
        NodeData::VariableDeclarationList(v) => {
            let declarations = visit_required_list(
                &v.declarations,
                visitor,
                ctx,
                &IS_VARIABLE_DECLARATION,
                None,
                node,
            )?;
            factory::update_variable_declaration_list(node, declarations)
        }
        NodeData::FunctionDeclaration(f) => {
            let decorators = visit_optional_list(f.decorators.as_ref(), visitor, ctx, &IS_DECORATOR, node)?;
            let modifiers = visit_optional_list(f.modifiers.as_ref(), visitor, ctx, &IS_MODIFIER, node)?;
            let name = visit_optional(f.name.as_ref(), visitor, ctx, &IS_IDENTIFIER, None, None, node)?;
            let (parameters, ty, body, declarations) =
                visit_function_scope(node, visitor, ctx, &f.parameters, f.ty.as_ref(), f.body.as_ref())?;
            let body = merge_optional_body(node, body, &declarations)?;
            factory::update_function_declaration(node, decorators, modifiers, name, parameters, ty, body)
        }
        NodeData::MethodDeclaration(m) | NodeData::GetAccessor(m) | NodeData::SetAccessor(m) => {
            let decorators = visit_optional_list(m.decorators.as_ref(), visitor, ctx, &IS_DECORATOR, node)?;
            let modifiers = visit_optional_list(m.modifiers.as_ref(), visitor, ctx, &IS_MODIFIER, node)?;
            let name = visit_required(&m.name, visitor, ctx, &IS_PROPERTY_NAME, None, None, node)?;
            let (parameters, ty, body, declarations) =
                visit_function_scope(node, visitor, ctx, &m.parameters, m.ty.as_ref(), m.body.as_ref())?;
            let body = merge_optional_body(node, body, &declarations)?;
            factory::update_method_like(node, decorators, modifiers, name, parameters, ty, body)
        }
        NodeData::Constructor(c) => {
            let decorators = visit_optional_list(c.decorators.as_ref(), visitor, ctx, &IS_DECORATOR, node)?;
            let modifiers = visit_optional_list(c.modifiers.as_ref(), visitor, ctx, &IS_MODIFIER, node)?;
            let (parameters, _, body, declarations) =
                visit_function_scope(node, visitor, ctx, &c.parameters, None, c.body.as_ref())?;
            let body = merge_optional_body(node, body, &declarations)?;
            factory::update_constructor(node, decorators, modifiers, parameters, body)
        }
        NodeData::SourceFile(f) => {
            ctx.start_lexical_environment();
            let visited =
                visit_required_list(&f.statements, visitor, ctx, &IS_STATEMENT, None, node);
            let declarations = ctx.end_lexical_environment()?;
            let statements = visited?;
            let updated = factory::update_source_file(node, statements);
            if declarations.is_empty() {
                updated
            } else {
                merge_lexical_environment(&updated, &declarations)?
            }
        }
        _ => visit_each_child_generic(node, visitor, ctx)?,
    };

    if !Rc::ptr_eq(&result, node) {
        trace!(kind = ?node.kind, "node rebuilt by child visit");
        aggregate_transform_flags(&result);
    }
    Ok(result)
}

/// The frame-bracketed portion of every function-like visit: parameters,
/// return type, then body, with the lexical environment opened before the
/// parameter list and closed on all paths.
type FunctionScopeResult = (
    Rc<NodeArray>,
    Option<Rc<Node>>,
    Option<Rc<Node>>,
    Vec<Rc<Node>>,
);

fn visit_function_scope<V: Visitor + ?Sized>(
    node: &Rc<Node>,
    visitor: &mut V,
    ctx: &mut TransformContext,
    parameters: &Rc<NodeArray>,
    ty: Option<&Rc<Node>>,
    body: Option<&Rc<Node>>,
) -> Result<FunctionScopeResult, InvariantViolation> {
    ctx.start_lexical_environment();
    let visited = (|| -> Result<_, InvariantViolation> {
        let parameters =
            visit_required_list(parameters, visitor, ctx, &IS_PARAMETER_DECLARATION, None, node)?;
        let ty = visit_optional(ty, visitor, ctx, &IS_TYPE_NODE, None, None, node)?;
        let body = visit_optional(body, visitor, ctx, &IS_BLOCK, None, None, node)?;
        Ok((parameters, ty, body))
    })();
    let declarations = ctx.end_lexical_environment()?;
    let (parameters, ty, body) = visited?;
    Ok((parameters, ty, body, declarations))
}

fn merge_required_body(
    body: Option<Rc<Node>>,
    declarations: &[Rc<Node>],
) -> Result<Rc<Node>, InvariantViolation> {
    // The slot was present on the input, so a deleted body is a visitor bug.
    let body = body.ok_or(InvariantViolation::NotOptional)?;
    merge_concise_body(&body, declarations)
}

fn merge_optional_body(
    node: &Rc<Node>,
    body: Option<Rc<Node>>,
    declarations: &[Rc<Node>],
) -> Result<Option<Rc<Node>>, InvariantViolation> {
    match body {
        Some(body) => Ok(Some(merge_concise_body(&body, declarations)?)),
        None if declarations.is_empty() => Ok(None),
        None => Err(InvariantViolation::MissingEnvironmentBody { kind: node.kind }),
    }
}

/// Schema-driven fallback for kinds without a hand-routed visit. Walks the
/// kind's edges in declared order and clones the node at most once, on the
/// first changed field.
fn visit_each_child_generic<V: Visitor + ?Sized>(
    node: &Rc<Node>,
    visitor: &mut V,
    ctx: &mut TransformContext,
) -> Result<Rc<Node>, InvariantViolation> {
    let opens_environment = node.kind.starts_new_lexical_environment();
    if opens_environment {
        ctx.start_lexical_environment();
    }

    let visited = visit_edges_generic(node, visitor, ctx);

    let declarations = if opens_environment {
        ctx.end_lexical_environment()?
    } else {
        Vec::new()
    };
    let result = visited?;
    if declarations.is_empty() {
        Ok(result)
    } else {
        merge_lexical_environment(&result, &declarations)
    }
}

fn visit_edges_generic<V: Visitor + ?Sized>(
    node: &Rc<Node>,
    visitor: &mut V,
    ctx: &mut TransformContext,
) -> Result<Rc<Node>, InvariantViolation> {
    let mut mutated: Option<Node> = None;

    for edge in schema::edges(node.kind) {
        match (edge.get)(&node.data) {
            EdgeRef::Single(Some(child)) => {
                let visited = visit_node_worker(
                    Some(child),
                    visitor,
                    ctx,
                    Some(&edge.test),
                    edge.optional,
                    edge.lift,
                    edge.parenthesize,
                    Some(node),
                )?;
                let changed = match &visited {
                    Some(n) => !Rc::ptr_eq(n, child),
                    None => true,
                };
                if changed {
                    let target = mutated.get_or_insert_with(|| factory::clone_node(node));
                    (edge.set)(&mut target.data, EdgeUpdate::Single(visited));
                }
            }
            EdgeRef::List(Some(list)) => {
                let visited = visit_nodes_worker(
                    Some(list),
                    visitor,
                    ctx,
                    Some(&edge.test),
                    None,
                    None,
                    edge.parenthesize,
                    Some(node),
                )?;
                let changed = match &visited {
                    Some(l) => !Rc::ptr_eq(l, list),
                    None => true,
                };
                if changed {
                    let target = mutated.get_or_insert_with(|| factory::clone_node(node));
                    (edge.set)(&mut target.data, EdgeUpdate::List(visited));
                }
            }
            // Absent optional fields are not visited at all.
            EdgeRef::Single(None) | EdgeRef::List(None) => {}
        }
    }

    Ok(match mutated {
        Some(rebuilt) => Rc::new(rebuilt),
        None => node.clone(),
    })
}
