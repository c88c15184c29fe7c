//! Memoized syntactic-facts aggregation.
//!
//! Transform flags summarize which lowering-relevant constructs appear in a
//! subtree, so later passes can skip whole regions without walking them. The
//! aggregate is computed lazily on first query, cached in the node's flag
//! cell, and recomputed naturally for rebuilt nodes because factory
//! construction always leaves the cache empty.

use crate::schema;
use crate::syntax::{Node, NodeData, SyntaxKind};
use bitflags::bitflags;

bitflags! {
    /// Subtree facts, plus the cache marker bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TransformFlags: u32 {
        /// Type-system syntax that erasure must strip.
        const CONTAINS_TYPESCRIPT = 1 << 0;
        /// An arrow function captures `this` lexically somewhere below.
        const CONTAINS_LEXICAL_THIS = 1 << 1;
        /// Rest parameters or spread elements.
        const CONTAINS_REST_OR_SPREAD = 1 << 2;
        const CONTAINS_DECORATORS = 1 << 3;
        const CONTAINS_ASYNC = 1 << 4;
        /// `let` or `const` declarations.
        const CONTAINS_BLOCK_SCOPED_BINDING = 1 << 5;
        const CONTAINS_COMPUTED_PROPERTY_NAME = 1 << 6;
        /// Hoisted declarations or completion statements (`return`).
        const CONTAINS_HOISTED_DECLARATION_OR_COMPLETION = 1 << 7;

        /// Marker recording that the cache cell holds a computed value.
        /// Never meaningful as a fact; stripped before any flags escape.
        const HAS_COMPUTED_FLAGS = 1 << 31;
    }
}

// Exclusion masks. Each mask names the facts a kind "handles" itself, which
// therefore must not propagate past it to ancestors. The marker bit is in
// every mask so it never leaks out of the cache cell.
const NODE_EXCLUDES: TransformFlags = TransformFlags::HAS_COMPUTED_FLAGS;

const ARRAY_LITERAL_OR_CALL_OR_NEW_EXCLUDES: TransformFlags = NODE_EXCLUDES
    .union(TransformFlags::CONTAINS_REST_OR_SPREAD);

const VARIABLE_DECLARATION_LIST_EXCLUDES: TransformFlags = NODE_EXCLUDES
    .union(TransformFlags::CONTAINS_BLOCK_SCOPED_BINDING);

const FUNCTION_EXCLUDES: TransformFlags = NODE_EXCLUDES
    .union(TransformFlags::CONTAINS_ASYNC)
    .union(TransformFlags::CONTAINS_REST_OR_SPREAD)
    .union(TransformFlags::CONTAINS_BLOCK_SCOPED_BINDING)
    .union(TransformFlags::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION)
    .union(TransformFlags::CONTAINS_LEXICAL_THIS);

// Arrows do not establish a `this` binding, so lexical-this travels through.
const ARROW_EXCLUDES: TransformFlags =
    FUNCTION_EXCLUDES.difference(TransformFlags::CONTAINS_LEXICAL_THIS);

const CLASS_EXCLUDES: TransformFlags = NODE_EXCLUDES
    .union(TransformFlags::CONTAINS_DECORATORS)
    .union(TransformFlags::CONTAINS_COMPUTED_PROPERTY_NAME);

const MODULE_EXCLUDES: TransformFlags = NODE_EXCLUDES
    .union(TransformFlags::CONTAINS_LEXICAL_THIS)
    .union(TransformFlags::CONTAINS_BLOCK_SCOPED_BINDING)
    .union(TransformFlags::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION);

// Type syntax is erased wholesale. Nothing below it matters to ancestors.
const TYPE_EXCLUDES: TransformFlags = TransformFlags::all();

/// The facts a node of this kind stops from propagating to its parent.
pub fn exclusion_mask(kind: SyntaxKind) -> TransformFlags {
    match kind {
        SyntaxKind::ArrayLiteralExpression
        | SyntaxKind::CallExpression
        | SyntaxKind::NewExpression => ARRAY_LITERAL_OR_CALL_OR_NEW_EXCLUDES,
        SyntaxKind::VariableDeclarationList => VARIABLE_DECLARATION_LIST_EXCLUDES,
        SyntaxKind::FunctionDeclaration
        | SyntaxKind::FunctionExpression
        | SyntaxKind::Constructor
        | SyntaxKind::MethodDeclaration
        | SyntaxKind::GetAccessor
        | SyntaxKind::SetAccessor => FUNCTION_EXCLUDES,
        SyntaxKind::ArrowFunction => ARROW_EXCLUDES,
        SyntaxKind::ClassDeclaration => CLASS_EXCLUDES,
        SyntaxKind::ModuleDeclaration => MODULE_EXCLUDES,
        kind if kind.is_type_node_kind() => TYPE_EXCLUDES,
        _ => NODE_EXCLUDES,
    }
}

fn has_rest_parameter(parameters: &[std::rc::Rc<Node>]) -> bool {
    parameters.iter().any(|p| match &p.data {
        NodeData::Parameter(param) => param.dot_dot_dot,
        _ => false,
    })
}

fn parameter_list_facts(parameters: &[std::rc::Rc<Node>]) -> TransformFlags {
    let mut facts = TransformFlags::empty();
    if has_rest_parameter(parameters) {
        facts |= TransformFlags::CONTAINS_REST_OR_SPREAD;
    }
    for p in parameters {
        if let NodeData::Parameter(param) = &p.data {
            if param.decorators.as_ref().is_some_and(|d| !d.is_empty()) {
                // Parameter decorators lower as part of the class.
                facts |= TransformFlags::CONTAINS_TYPESCRIPT | TransformFlags::CONTAINS_DECORATORS;
            }
            if param.ty.is_some() || param.question || param.modifiers.is_some() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
        }
    }
    facts
}

fn has_decorators(decorators: &Option<std::rc::Rc<crate::syntax::NodeArray>>) -> bool {
    decorators.as_ref().is_some_and(|d| !d.is_empty())
}

/// Facts contributed by the node itself, independent of its subtree.
fn own_flags(node: &Node) -> TransformFlags {
    let mut facts = TransformFlags::empty();
    match &node.data {
        NodeData::ComputedPropertyName(_) => {
            facts |= TransformFlags::CONTAINS_COMPUTED_PROPERTY_NAME;
        }
        NodeData::Parameter(param) => {
            if param.dot_dot_dot {
                facts |= TransformFlags::CONTAINS_REST_OR_SPREAD;
            }
            if param.ty.is_some() || param.question || param.modifiers.is_some() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
            if has_decorators(&param.decorators) {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT | TransformFlags::CONTAINS_DECORATORS;
            }
        }
        NodeData::Decorator(_) => {
            facts |= TransformFlags::CONTAINS_TYPESCRIPT | TransformFlags::CONTAINS_DECORATORS;
        }
        NodeData::SpreadElement(_) => {
            facts |= TransformFlags::CONTAINS_REST_OR_SPREAD;
        }
        NodeData::AwaitExpression(_) => {
            facts |= TransformFlags::CONTAINS_ASYNC;
        }
        NodeData::ArrowFunction(arrow) => {
            facts |= TransformFlags::CONTAINS_LEXICAL_THIS;
            facts |= parameter_list_facts(&arrow.parameters);
            if arrow.ty.is_some() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
            if node.has_modifier(SyntaxKind::AsyncKeyword) {
                facts |= TransformFlags::CONTAINS_ASYNC;
            }
        }
        NodeData::FunctionExpression(func) => {
            facts |= parameter_list_facts(&func.parameters);
            if func.ty.is_some() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
            if node.has_modifier(SyntaxKind::AsyncKeyword) {
                facts |= TransformFlags::CONTAINS_ASYNC;
            }
        }
        NodeData::FunctionDeclaration(func) => {
            facts |= TransformFlags::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION;
            facts |= parameter_list_facts(&func.parameters);
            if func.ty.is_some() || func.body.is_none() || node.is_ambient() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
            if node.has_modifier(SyntaxKind::AsyncKeyword) {
                facts |= TransformFlags::CONTAINS_ASYNC;
            }
            if has_decorators(&func.decorators) {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT | TransformFlags::CONTAINS_DECORATORS;
            }
        }
        NodeData::MethodDeclaration(method)
        | NodeData::GetAccessor(method)
        | NodeData::SetAccessor(method) => {
            facts |= parameter_list_facts(&method.parameters);
            if method.ty.is_some() || method.body.is_none() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
            if node.has_modifier(SyntaxKind::AsyncKeyword) {
                facts |= TransformFlags::CONTAINS_ASYNC;
            }
            if has_decorators(&method.decorators) {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT | TransformFlags::CONTAINS_DECORATORS;
            }
        }
        NodeData::Constructor(ctor) => {
            facts |= parameter_list_facts(&ctor.parameters);
            if ctor.body.is_none() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
        }
        NodeData::PropertyDeclaration(prop) => {
            // Class fields are themselves a lowered construct.
            facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            if has_decorators(&prop.decorators) {
                facts |= TransformFlags::CONTAINS_DECORATORS;
            }
        }
        NodeData::ClassDeclaration(class) => {
            if has_decorators(&class.decorators) || node.is_ambient() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
            if has_decorators(&class.decorators) {
                facts |= TransformFlags::CONTAINS_DECORATORS;
            }
        }
        NodeData::VariableStatement(stmt) => {
            if let NodeData::VariableDeclarationList(_) = &stmt.declaration_list.data {
                if stmt
                    .declaration_list
                    .flags
                    .intersects(crate::syntax::NodeFlags::LET | crate::syntax::NodeFlags::CONST)
                {
                    facts |= TransformFlags::CONTAINS_BLOCK_SCOPED_BINDING;
                }
            }
            if node.is_ambient() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
        }
        NodeData::VariableDeclarationList(_) => {
            facts |= TransformFlags::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION;
            if node
                .flags
                .intersects(crate::syntax::NodeFlags::LET | crate::syntax::NodeFlags::CONST)
            {
                facts |= TransformFlags::CONTAINS_BLOCK_SCOPED_BINDING;
            }
        }
        NodeData::VariableDeclaration(decl) => {
            if decl.ty.is_some() {
                facts |= TransformFlags::CONTAINS_TYPESCRIPT;
            }
        }
        NodeData::ReturnStatement(_) => {
            facts |= TransformFlags::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION;
        }
        NodeData::ModuleDeclaration(_) => {
            // Namespaces are TypeScript-only syntax.
            facts |= TransformFlags::CONTAINS_TYPESCRIPT;
        }
        _ => {}
    }
    if node.kind.is_type_node_kind() {
        facts |= TransformFlags::CONTAINS_TYPESCRIPT;
    }
    if node.kind == SyntaxKind::ThisKeyword {
        facts |= TransformFlags::CONTAINS_LEXICAL_THIS;
    }
    if matches!(
        node.kind,
        SyntaxKind::DeclareKeyword | SyntaxKind::ReadonlyKeyword
    ) {
        facts |= TransformFlags::CONTAINS_TYPESCRIPT;
    }
    facts
}

/// Whether a child's subtree facts are visible to this parent at all.
///
/// Type positions and ambient declarations are erased wholesale, so nothing
/// below them can ever need lowering in emitted output.
fn child_contributes(child: &Node) -> bool {
    if child.kind.is_type_node_kind() {
        return false;
    }
    !child.is_ambient()
}

/// Compute (or fetch) the aggregate transform flags of a subtree, masked for
/// consumption by the node's parent.
///
/// The unmasked aggregate is cached on the node; the exclusion mask is
/// applied on the way out so a node can answer for different parents. The
/// cache marker bit never escapes.
pub fn aggregate_transform_flags(node: &Node) -> TransformFlags {
    let cached = node.transform_flags.get();
    if cached.contains(TransformFlags::HAS_COMPUTED_FLAGS) {
        return cached.difference(exclusion_mask(node.kind));
    }

    let subtree = schema::reduce_each_child(node, TransformFlags::empty(), |acc, child| {
        if child_contributes(child) {
            acc | aggregate_transform_flags(child)
        } else {
            acc
        }
    });
    let full = own_flags(node) | subtree;

    node.transform_flags
        .set(full | TransformFlags::HAS_COMPUTED_FLAGS);
    full.difference(exclusion_mask(node.kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;
    use crate::syntax::{NodeFlags, UnaryOperator};

    fn empty_args() -> std::rc::Rc<crate::syntax::NodeArray> {
        factory::create_node_array(vec![], false, None)
    }

    #[test]
    fn test_spread_propagates_until_call_boundary() {
        // f(...xs) inside g(h())
        let spread = factory::create_spread(factory::create_identifier("xs"));
        let call = factory::create_call(
            factory::create_identifier("f"),
            None,
            factory::create_node_array(vec![spread], false, None),
        );
        // The call reports spread to nobody above it.
        let stmt = factory::create_expression_statement(call.clone());
        assert!(
            !aggregate_transform_flags(&call).contains(TransformFlags::CONTAINS_REST_OR_SPREAD),
            "call masks rest/spread from its parent"
        );
        // But the spread element itself reports it.
        let inner = match &call.data {
            crate::syntax::NodeData::CallExpression(c) => c.arguments[0].clone(),
            _ => unreachable!(),
        };
        assert!(aggregate_transform_flags(&inner)
            .contains(TransformFlags::CONTAINS_REST_OR_SPREAD));
        assert!(!aggregate_transform_flags(&stmt)
            .contains(TransformFlags::CONTAINS_REST_OR_SPREAD));
    }

    #[test]
    fn test_let_binding_masked_by_declaration_list() {
        let decl = factory::create_variable_declaration(
            factory::create_identifier("x"),
            None,
            Some(factory::create_numeric_literal("1")),
        );
        let list = factory::create_variable_declaration_list(
            factory::create_node_array(vec![decl], false, None),
            NodeFlags::LET,
        );
        let full = {
            aggregate_transform_flags(&list);
            list.transform_flags.get()
        };
        assert!(full.contains(TransformFlags::CONTAINS_BLOCK_SCOPED_BINDING));
        // Masked on the way out.
        assert!(!aggregate_transform_flags(&list)
            .contains(TransformFlags::CONTAINS_BLOCK_SCOPED_BINDING));
    }

    #[test]
    fn test_type_annotations_do_not_contribute_subtree_facts() {
        // let x: Array<() => void> = 1; the type subtree must be invisible.
        let ty = factory::create_type_reference(factory::create_identifier("Array"), None);
        let decl = factory::create_variable_declaration(
            factory::create_identifier("x"),
            Some(ty),
            Some(factory::create_numeric_literal("1")),
        );
        let flags = aggregate_transform_flags(&decl);
        // The annotation makes the declaration TypeScript-flavored, but that
        // fact comes from the declaration itself, not from walking the type.
        assert!(flags.contains(TransformFlags::CONTAINS_TYPESCRIPT));
    }

    #[test]
    fn test_ambient_declaration_contributes_nothing_below() {
        let declare = factory::create_token(SyntaxKind::DeclareKeyword);
        let body = factory::create_block(
            factory::create_node_array(
                vec![factory::create_return(Some(factory::create_identifier("x")))],
                false,
                None,
            ),
            true,
        );
        let func = factory::create_function_declaration(
            None,
            Some(factory::create_node_array(vec![declare], false, None)),
            Some(factory::create_identifier("f")),
            empty_args(),
            None,
            Some(body),
        );
        let file = factory::create_source_file(
            "t.ts",
            factory::create_node_array(vec![func], false, None),
        );
        let flags = aggregate_transform_flags(&file);
        assert!(!flags.contains(TransformFlags::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION));
    }

    #[test]
    fn test_cache_marker_never_escapes() {
        let id = factory::create_identifier("x");
        let flags = aggregate_transform_flags(&id);
        assert!(!flags.contains(TransformFlags::HAS_COMPUTED_FLAGS));
        assert!(id
            .transform_flags
            .get()
            .contains(TransformFlags::HAS_COMPUTED_FLAGS));
        // Second query takes the cached path and still strips the marker.
        assert!(!aggregate_transform_flags(&id).contains(TransformFlags::HAS_COMPUTED_FLAGS));
    }

    #[test]
    fn test_cached_aggregate_skips_children() {
        let child = factory::create_identifier("x");
        let stmt = factory::create_expression_statement(child.clone());
        let first = aggregate_transform_flags(&stmt);

        // Poison the child's cache. A cached parent never consults it, so the
        // planted fact must not show up in the parent's answer.
        child.transform_flags.set(
            TransformFlags::HAS_COMPUTED_FLAGS | TransformFlags::CONTAINS_TYPESCRIPT,
        );
        let second = aggregate_transform_flags(&stmt);
        assert_eq!(first, second);
        assert!(!second.contains(TransformFlags::CONTAINS_TYPESCRIPT));
    }

    #[test]
    fn test_decorator_bit_stops_at_the_class_boundary() {
        let decorated = factory::create_method_declaration(
            Some(factory::create_node_array(
                vec![factory::create_decorator(factory::create_identifier("dec"))],
                false,
                None,
            )),
            None,
            factory::create_identifier("m"),
            empty_args(),
            None,
            Some(factory::create_block(empty_args(), false)),
        );
        // The decorated declaration reports the fact itself.
        assert!(
            aggregate_transform_flags(&decorated).contains(TransformFlags::CONTAINS_DECORATORS)
        );

        let class = factory::create_class_declaration(
            None,
            None,
            Some(factory::create_identifier("C")),
            None,
            factory::create_node_array(vec![decorated], false, None),
        );
        let class_flags = aggregate_transform_flags(&class);
        // The class handles member decorators, so the bit never reaches an
        // ancestor of the class; the TypeScript fact still travels through.
        assert!(!class_flags.contains(TransformFlags::CONTAINS_DECORATORS));
        assert!(class_flags.contains(TransformFlags::CONTAINS_TYPESCRIPT));
    }

    #[test]
    fn test_own_facts_across_remaining_kinds() {
        let awaited = factory::create_await(factory::create_identifier("p"));
        assert!(aggregate_transform_flags(&awaited).contains(TransformFlags::CONTAINS_ASYNC));

        let assignment = factory::create_property_assignment(
            factory::create_computed_property_name(factory::create_identifier("k")),
            factory::create_identifier("v"),
        );
        assert!(
            aggregate_transform_flags(&assignment)
                .contains(TransformFlags::CONTAINS_COMPUTED_PROPERTY_NAME)
        );

        // Element access and unaries carry subtree facts transparently.
        let access = factory::create_element_access(
            factory::create_identifier("arr"),
            factory::create_await(factory::create_identifier("i")),
        );
        assert!(aggregate_transform_flags(&access).contains(TransformFlags::CONTAINS_ASYNC));

        let prefix = factory::create_prefix_unary(
            UnaryOperator::Exclamation,
            factory::create_token(SyntaxKind::ThisKeyword),
        );
        assert!(
            aggregate_transform_flags(&prefix).contains(TransformFlags::CONTAINS_LEXICAL_THIS)
        );

        let postfix =
            factory::create_postfix_unary(factory::create_identifier("n"), UnaryOperator::PlusPlus);
        assert!(aggregate_transform_flags(&postfix).is_empty());

        // Accessors report TypeScript syntax the way methods do.
        let getter = factory::create_get_accessor(
            None,
            None,
            factory::create_identifier("x"),
            empty_args(),
            Some(factory::create_type_reference(factory::create_identifier("T"), None)),
            Some(factory::create_block(empty_args(), false)),
        );
        assert!(aggregate_transform_flags(&getter).contains(TransformFlags::CONTAINS_TYPESCRIPT));

        let setter = factory::create_set_accessor(
            None,
            None,
            factory::create_identifier("x"),
            factory::create_node_array(
                vec![factory::create_parameter(
                    None,
                    None,
                    false,
                    factory::create_identifier("v"),
                    false,
                    None,
                    None,
                )],
                false,
                None,
            ),
            Some(factory::create_block(empty_args(), false)),
        );
        assert!(aggregate_transform_flags(&setter).is_empty());
    }

    #[test]
    fn test_arrow_reports_lexical_this_function_does_not() {
        let this_expr = factory::create_token(SyntaxKind::ThisKeyword);
        let arrow = factory::create_arrow_function(
            None,
            empty_args(),
            None,
            factory::create_return(Some(this_expr.clone())),
        );
        // The arrow lets lexical-this escape upward.
        assert!(aggregate_transform_flags(&arrow)
            .contains(TransformFlags::CONTAINS_LEXICAL_THIS));

        let body = factory::create_block(
            factory::create_node_array(
                vec![factory::create_return(Some(factory::create_token(
                    SyntaxKind::ThisKeyword,
                )))],
                false,
                None,
            ),
            true,
        );
        let func = factory::create_function_expression(None, None, empty_args(), None, body);
        assert!(!aggregate_transform_flags(&func)
            .contains(TransformFlags::CONTAINS_LEXICAL_THIS));
    }
}
