//! Edge schema: per-kind ordered child-field descriptors.
//!
//! Every node kind with children declares its child-bearing fields here, in
//! the order the generic visitor walks them. A descriptor bundles the field
//! name, optionality, the validity predicate for replacements, an optional
//! lift function for list-into-single results, an optional parenthesization
//! rule, and get/set thunks so the generic path can read and write the field
//! without kind-specific code.
//!
//! Fields outside the schema are never visited, even if they structurally
//! contain nodes. Kinds with no entry (tokens, leaf literals) are returned
//! unchanged by every visit.

use crate::factory::lift_to_block;
use crate::parenthesizer::{
    ParenthesizeFn, parenthesize_concise_body_of_arrow_function,
    parenthesize_expression_for_disallowed_comma, parenthesize_expression_of_computed_property_name,
    parenthesize_expression_of_expression_statement, parenthesize_expression_of_new,
    parenthesize_left_side_of_access,
};
use crate::syntax::predicates::*;
use crate::syntax::{Node, NodeArray, NodeData, NodeTest, SyntaxKind};
use std::rc::Rc;

/// Borrowed view of one child field.
pub enum EdgeRef<'a> {
    Single(Option<&'a Rc<Node>>),
    List(Option<&'a Rc<NodeArray>>),
}

/// Replacement value for one child field.
pub enum EdgeUpdate {
    Single(Option<Rc<Node>>),
    List(Option<Rc<NodeArray>>),
}

/// A declared child-bearing field of a node kind.
pub struct EdgeDescriptor {
    pub name: &'static str,
    pub optional: bool,
    pub test: NodeTest,
    pub lift: Option<fn(&[Rc<Node>]) -> Rc<Node>>,
    pub parenthesize: Option<ParenthesizeFn>,
    pub get: fn(&NodeData) -> EdgeRef<'_>,
    pub set: fn(&mut NodeData, EdgeUpdate),
}

macro_rules! opt_or_none {
    () => {
        None
    };
    ($e:expr) => {
        Some($e)
    };
}

/// Required single-node field.
macro_rules! node_edge {
    ($variant:ident, $field:ident, $name:literal, $test:expr $(, paren = $paren:expr)? $(, lift = $lift:expr)?) => {
        EdgeDescriptor {
            name: $name,
            optional: false,
            test: $test,
            lift: opt_or_none!($($lift)?),
            parenthesize: opt_or_none!($($paren)?),
            get: |data| match data {
                NodeData::$variant(n) => EdgeRef::Single(Some(&n.$field)),
                _ => EdgeRef::Single(None),
            },
            set: |data, value| {
                if let NodeData::$variant(n) = data {
                    if let EdgeUpdate::Single(Some(v)) = value {
                        n.$field = v;
                    }
                }
            },
        }
    };
}

/// Optional single-node field.
macro_rules! opt_node_edge {
    ($variant:ident, $field:ident, $name:literal, $test:expr $(, paren = $paren:expr)? $(, lift = $lift:expr)?) => {
        EdgeDescriptor {
            name: $name,
            optional: true,
            test: $test,
            lift: opt_or_none!($($lift)?),
            parenthesize: opt_or_none!($($paren)?),
            get: |data| match data {
                NodeData::$variant(n) => EdgeRef::Single(n.$field.as_ref()),
                _ => EdgeRef::Single(None),
            },
            set: |data, value| {
                if let NodeData::$variant(n) = data {
                    if let EdgeUpdate::Single(v) = value {
                        n.$field = v;
                    }
                }
            },
        }
    };
}

/// Required node-list field.
macro_rules! list_edge {
    ($variant:ident, $field:ident, $name:literal, $test:expr $(, paren = $paren:expr)?) => {
        EdgeDescriptor {
            name: $name,
            optional: false,
            test: $test,
            lift: None,
            parenthesize: opt_or_none!($($paren)?),
            get: |data| match data {
                NodeData::$variant(n) => EdgeRef::List(Some(&n.$field)),
                _ => EdgeRef::List(None),
            },
            set: |data, value| {
                if let NodeData::$variant(n) = data {
                    if let EdgeUpdate::List(Some(v)) = value {
                        n.$field = v;
                    }
                }
            },
        }
    };
}

/// Optional node-list field.
macro_rules! opt_list_edge {
    ($variant:ident, $field:ident, $name:literal, $test:expr $(, paren = $paren:expr)?) => {
        EdgeDescriptor {
            name: $name,
            optional: true,
            test: $test,
            lift: None,
            parenthesize: opt_or_none!($($paren)?),
            get: |data| match data {
                NodeData::$variant(n) => EdgeRef::List(n.$field.as_ref()),
                _ => EdgeRef::List(None),
            },
            set: |data, value| {
                if let NodeData::$variant(n) = data {
                    if let EdgeUpdate::List(v) = value {
                        n.$field = v;
                    }
                }
            },
        }
    };
}

// =============================================================================
// Per-kind tables, in visit order
// =============================================================================

static COMPUTED_PROPERTY_NAME_EDGES: &[EdgeDescriptor] = &[node_edge!(
    ComputedPropertyName,
    expression,
    "expression",
    IS_EXPRESSION,
    paren = parenthesize_expression_of_computed_property_name
)];

static PARAMETER_EDGES: &[EdgeDescriptor] = &[
    opt_list_edge!(Parameter, decorators, "decorators", IS_DECORATOR),
    opt_list_edge!(Parameter, modifiers, "modifiers", IS_MODIFIER),
    node_edge!(Parameter, name, "name", IS_BINDING_NAME),
    opt_node_edge!(Parameter, ty, "type", IS_TYPE_NODE),
    opt_node_edge!(
        Parameter,
        initializer,
        "initializer",
        IS_EXPRESSION,
        paren = parenthesize_expression_for_disallowed_comma
    ),
];

static DECORATOR_EDGES: &[EdgeDescriptor] = &[node_edge!(
    Decorator,
    expression,
    "expression",
    IS_EXPRESSION,
    paren = parenthesize_left_side_of_access
)];

static TYPE_REFERENCE_EDGES: &[EdgeDescriptor] = &[
    node_edge!(TypeReference, type_name, "typeName", IS_ENTITY_NAME),
    opt_list_edge!(TypeReference, type_arguments, "typeArguments", IS_TYPE_NODE),
];

static ARRAY_TYPE_EDGES: &[EdgeDescriptor] =
    &[node_edge!(ArrayType, element_type, "elementType", IS_TYPE_NODE)];

static UNION_TYPE_EDGES: &[EdgeDescriptor] =
    &[list_edge!(UnionType, types, "types", IS_TYPE_NODE)];

static ARRAY_LITERAL_EDGES: &[EdgeDescriptor] = &[list_edge!(
    ArrayLiteralExpression,
    elements,
    "elements",
    IS_EXPRESSION,
    paren = parenthesize_expression_for_disallowed_comma
)];

static OBJECT_LITERAL_EDGES: &[EdgeDescriptor] = &[list_edge!(
    ObjectLiteralExpression,
    properties,
    "properties",
    IS_OBJECT_LITERAL_ELEMENT
)];

static PROPERTY_ASSIGNMENT_EDGES: &[EdgeDescriptor] = &[
    node_edge!(PropertyAssignment, name, "name", IS_PROPERTY_NAME),
    node_edge!(
        PropertyAssignment,
        initializer,
        "initializer",
        IS_EXPRESSION,
        paren = parenthesize_expression_for_disallowed_comma
    ),
];

static PROPERTY_ACCESS_EDGES: &[EdgeDescriptor] = &[
    node_edge!(
        PropertyAccessExpression,
        expression,
        "expression",
        IS_EXPRESSION,
        paren = parenthesize_left_side_of_access
    ),
    node_edge!(PropertyAccessExpression, name, "name", IS_IDENTIFIER),
];

static ELEMENT_ACCESS_EDGES: &[EdgeDescriptor] = &[
    node_edge!(
        ElementAccessExpression,
        expression,
        "expression",
        IS_EXPRESSION,
        paren = parenthesize_left_side_of_access
    ),
    node_edge!(
        ElementAccessExpression,
        argument_expression,
        "argumentExpression",
        IS_EXPRESSION
    ),
];

static CALL_EDGES: &[EdgeDescriptor] = &[
    node_edge!(
        CallExpression,
        expression,
        "expression",
        IS_EXPRESSION,
        paren = parenthesize_left_side_of_access
    ),
    opt_list_edge!(CallExpression, type_arguments, "typeArguments", IS_TYPE_NODE),
    list_edge!(
        CallExpression,
        arguments,
        "arguments",
        IS_EXPRESSION,
        paren = parenthesize_expression_for_disallowed_comma
    ),
];

static NEW_EDGES: &[EdgeDescriptor] = &[
    node_edge!(
        NewExpression,
        expression,
        "expression",
        IS_EXPRESSION,
        paren = parenthesize_expression_of_new
    ),
    opt_list_edge!(NewExpression, type_arguments, "typeArguments", IS_TYPE_NODE),
    opt_list_edge!(
        NewExpression,
        arguments,
        "arguments",
        IS_EXPRESSION,
        paren = parenthesize_expression_for_disallowed_comma
    ),
];

static PAREN_EDGES: &[EdgeDescriptor] = &[node_edge!(
    ParenthesizedExpression,
    expression,
    "expression",
    IS_EXPRESSION
)];

static FUNCTION_EXPRESSION_EDGES: &[EdgeDescriptor] = &[
    opt_list_edge!(FunctionExpression, modifiers, "modifiers", IS_MODIFIER),
    opt_node_edge!(FunctionExpression, name, "name", IS_IDENTIFIER),
    list_edge!(
        FunctionExpression,
        parameters,
        "parameters",
        IS_PARAMETER_DECLARATION
    ),
    opt_node_edge!(FunctionExpression, ty, "type", IS_TYPE_NODE),
    node_edge!(FunctionExpression, body, "body", IS_BLOCK),
];

static ARROW_FUNCTION_EDGES: &[EdgeDescriptor] = &[
    opt_list_edge!(ArrowFunction, modifiers, "modifiers", IS_MODIFIER),
    list_edge!(ArrowFunction, parameters, "parameters", IS_PARAMETER_DECLARATION),
    opt_node_edge!(ArrowFunction, ty, "type", IS_TYPE_NODE),
    node_edge!(
        ArrowFunction,
        body,
        "body",
        IS_CONCISE_BODY,
        paren = parenthesize_concise_body_of_arrow_function
    ),
];

static PREFIX_UNARY_EDGES: &[EdgeDescriptor] = &[node_edge!(
    PrefixUnaryExpression,
    operand,
    "operand",
    IS_EXPRESSION
)];

static POSTFIX_UNARY_EDGES: &[EdgeDescriptor] = &[node_edge!(
    PostfixUnaryExpression,
    operand,
    "operand",
    IS_EXPRESSION
)];

static BINARY_EDGES: &[EdgeDescriptor] = &[
    node_edge!(BinaryExpression, left, "left", IS_EXPRESSION),
    node_edge!(BinaryExpression, right, "right", IS_EXPRESSION),
];

static CONDITIONAL_EDGES: &[EdgeDescriptor] = &[
    node_edge!(ConditionalExpression, condition, "condition", IS_EXPRESSION),
    node_edge!(ConditionalExpression, when_true, "whenTrue", IS_EXPRESSION),
    node_edge!(ConditionalExpression, when_false, "whenFalse", IS_EXPRESSION),
];

static SPREAD_EDGES: &[EdgeDescriptor] = &[node_edge!(
    SpreadElement,
    expression,
    "expression",
    IS_EXPRESSION,
    paren = parenthesize_expression_for_disallowed_comma
)];

static AWAIT_EDGES: &[EdgeDescriptor] =
    &[node_edge!(AwaitExpression, expression, "expression", IS_EXPRESSION)];

static BLOCK_EDGES: &[EdgeDescriptor] =
    &[list_edge!(Block, statements, "statements", IS_STATEMENT)];

static VARIABLE_STATEMENT_EDGES: &[EdgeDescriptor] = &[
    opt_list_edge!(VariableStatement, modifiers, "modifiers", IS_MODIFIER),
    node_edge!(
        VariableStatement,
        declaration_list,
        "declarationList",
        IS_VARIABLE_DECLARATION_LIST
    ),
];

static EXPRESSION_STATEMENT_EDGES: &[EdgeDescriptor] = &[node_edge!(
    ExpressionStatement,
    expression,
    "expression",
    IS_EXPRESSION,
    paren = parenthesize_expression_of_expression_statement
)];

static IF_EDGES: &[EdgeDescriptor] = &[
    node_edge!(IfStatement, expression, "expression", IS_EXPRESSION),
    node_edge!(
        IfStatement,
        then_statement,
        "thenStatement",
        IS_STATEMENT,
        lift = lift_to_block
    ),
    opt_node_edge!(
        IfStatement,
        else_statement,
        "elseStatement",
        IS_STATEMENT,
        lift = lift_to_block
    ),
];

static RETURN_EDGES: &[EdgeDescriptor] =
    &[opt_node_edge!(ReturnStatement, expression, "expression", IS_EXPRESSION)];

static VARIABLE_DECLARATION_EDGES: &[EdgeDescriptor] = &[
    node_edge!(VariableDeclaration, name, "name", IS_BINDING_NAME),
    opt_node_edge!(VariableDeclaration, ty, "type", IS_TYPE_NODE),
    opt_node_edge!(
        VariableDeclaration,
        initializer,
        "initializer",
        IS_EXPRESSION,
        paren = parenthesize_expression_for_disallowed_comma
    ),
];

static VARIABLE_DECLARATION_LIST_EDGES: &[EdgeDescriptor] = &[list_edge!(
    VariableDeclarationList,
    declarations,
    "declarations",
    IS_VARIABLE_DECLARATION
)];

static FUNCTION_DECLARATION_EDGES: &[EdgeDescriptor] = &[
    opt_list_edge!(FunctionDeclaration, decorators, "decorators", IS_DECORATOR),
    opt_list_edge!(FunctionDeclaration, modifiers, "modifiers", IS_MODIFIER),
    opt_node_edge!(FunctionDeclaration, name, "name", IS_IDENTIFIER),
    list_edge!(
        FunctionDeclaration,
        parameters,
        "parameters",
        IS_PARAMETER_DECLARATION
    ),
    opt_node_edge!(FunctionDeclaration, ty, "type", IS_TYPE_NODE),
    opt_node_edge!(FunctionDeclaration, body, "body", IS_BLOCK),
];

static CLASS_DECLARATION_EDGES: &[EdgeDescriptor] = &[
    opt_list_edge!(ClassDeclaration, decorators, "decorators", IS_DECORATOR),
    opt_list_edge!(ClassDeclaration, modifiers, "modifiers", IS_MODIFIER),
    opt_node_edge!(ClassDeclaration, name, "name", IS_IDENTIFIER),
    opt_node_edge!(
        ClassDeclaration,
        extends_clause,
        "extendsClause",
        IS_EXPRESSION,
        paren = parenthesize_left_side_of_access
    ),
    list_edge!(ClassDeclaration, members, "members", IS_CLASS_ELEMENT),
];

static PROPERTY_DECLARATION_EDGES: &[EdgeDescriptor] = &[
    opt_list_edge!(PropertyDeclaration, decorators, "decorators", IS_DECORATOR),
    opt_list_edge!(PropertyDeclaration, modifiers, "modifiers", IS_MODIFIER),
    node_edge!(PropertyDeclaration, name, "name", IS_PROPERTY_NAME),
    opt_node_edge!(PropertyDeclaration, ty, "type", IS_TYPE_NODE),
    opt_node_edge!(
        PropertyDeclaration,
        initializer,
        "initializer",
        IS_EXPRESSION,
        paren = parenthesize_expression_for_disallowed_comma
    ),
];

macro_rules! method_like_edges {
    ($variant:ident) => {
        &[
            opt_list_edge!($variant, decorators, "decorators", IS_DECORATOR),
            opt_list_edge!($variant, modifiers, "modifiers", IS_MODIFIER),
            node_edge!($variant, name, "name", IS_PROPERTY_NAME),
            list_edge!($variant, parameters, "parameters", IS_PARAMETER_DECLARATION),
            opt_node_edge!($variant, ty, "type", IS_TYPE_NODE),
            opt_node_edge!($variant, body, "body", IS_BLOCK),
        ]
    };
}

static METHOD_DECLARATION_EDGES: &[EdgeDescriptor] = method_like_edges!(MethodDeclaration);
static GET_ACCESSOR_EDGES: &[EdgeDescriptor] = method_like_edges!(GetAccessor);
static SET_ACCESSOR_EDGES: &[EdgeDescriptor] = method_like_edges!(SetAccessor);

static CONSTRUCTOR_EDGES: &[EdgeDescriptor] = &[
    opt_list_edge!(Constructor, decorators, "decorators", IS_DECORATOR),
    opt_list_edge!(Constructor, modifiers, "modifiers", IS_MODIFIER),
    list_edge!(Constructor, parameters, "parameters", IS_PARAMETER_DECLARATION),
    opt_node_edge!(Constructor, body, "body", IS_BLOCK),
];

static MODULE_DECLARATION_EDGES: &[EdgeDescriptor] = &[
    opt_list_edge!(ModuleDeclaration, decorators, "decorators", IS_DECORATOR),
    opt_list_edge!(ModuleDeclaration, modifiers, "modifiers", IS_MODIFIER),
    node_edge!(ModuleDeclaration, name, "name", IS_IDENTIFIER),
    opt_node_edge!(ModuleDeclaration, body, "body", IS_MODULE_BODY),
];

static MODULE_BLOCK_EDGES: &[EdgeDescriptor] =
    &[list_edge!(ModuleBlock, statements, "statements", IS_STATEMENT)];

static SOURCE_FILE_EDGES: &[EdgeDescriptor] =
    &[list_edge!(SourceFile, statements, "statements", IS_STATEMENT)];

/// Schema lookup. Kinds without children return an empty slice.
pub fn edges(kind: SyntaxKind) -> &'static [EdgeDescriptor] {
    match kind {
        SyntaxKind::ComputedPropertyName => COMPUTED_PROPERTY_NAME_EDGES,
        SyntaxKind::Parameter => PARAMETER_EDGES,
        SyntaxKind::Decorator => DECORATOR_EDGES,
        SyntaxKind::TypeReference => TYPE_REFERENCE_EDGES,
        SyntaxKind::ArrayType => ARRAY_TYPE_EDGES,
        SyntaxKind::UnionType => UNION_TYPE_EDGES,
        SyntaxKind::ArrayLiteralExpression => ARRAY_LITERAL_EDGES,
        SyntaxKind::ObjectLiteralExpression => OBJECT_LITERAL_EDGES,
        SyntaxKind::PropertyAssignment => PROPERTY_ASSIGNMENT_EDGES,
        SyntaxKind::PropertyAccessExpression => PROPERTY_ACCESS_EDGES,
        SyntaxKind::ElementAccessExpression => ELEMENT_ACCESS_EDGES,
        SyntaxKind::CallExpression => CALL_EDGES,
        SyntaxKind::NewExpression => NEW_EDGES,
        SyntaxKind::ParenthesizedExpression => PAREN_EDGES,
        SyntaxKind::FunctionExpression => FUNCTION_EXPRESSION_EDGES,
        SyntaxKind::ArrowFunction => ARROW_FUNCTION_EDGES,
        SyntaxKind::PrefixUnaryExpression => PREFIX_UNARY_EDGES,
        SyntaxKind::PostfixUnaryExpression => POSTFIX_UNARY_EDGES,
        SyntaxKind::BinaryExpression => BINARY_EDGES,
        SyntaxKind::ConditionalExpression => CONDITIONAL_EDGES,
        SyntaxKind::SpreadElement => SPREAD_EDGES,
        SyntaxKind::AwaitExpression => AWAIT_EDGES,
        SyntaxKind::Block => BLOCK_EDGES,
        SyntaxKind::VariableStatement => VARIABLE_STATEMENT_EDGES,
        SyntaxKind::ExpressionStatement => EXPRESSION_STATEMENT_EDGES,
        SyntaxKind::IfStatement => IF_EDGES,
        SyntaxKind::ReturnStatement => RETURN_EDGES,
        SyntaxKind::VariableDeclaration => VARIABLE_DECLARATION_EDGES,
        SyntaxKind::VariableDeclarationList => VARIABLE_DECLARATION_LIST_EDGES,
        SyntaxKind::FunctionDeclaration => FUNCTION_DECLARATION_EDGES,
        SyntaxKind::ClassDeclaration => CLASS_DECLARATION_EDGES,
        SyntaxKind::PropertyDeclaration => PROPERTY_DECLARATION_EDGES,
        SyntaxKind::MethodDeclaration => METHOD_DECLARATION_EDGES,
        SyntaxKind::GetAccessor => GET_ACCESSOR_EDGES,
        SyntaxKind::SetAccessor => SET_ACCESSOR_EDGES,
        SyntaxKind::Constructor => CONSTRUCTOR_EDGES,
        SyntaxKind::ModuleDeclaration => MODULE_DECLARATION_EDGES,
        SyntaxKind::ModuleBlock => MODULE_BLOCK_EDGES,
        SyntaxKind::SourceFile => SOURCE_FILE_EDGES,
        _ => &[],
    }
}

/// Fold an accumulator over the direct children of a node, in schema order.
/// Kinds with no schema entry contribute nothing. Used by the flag
/// aggregator.
pub fn reduce_each_child<T>(node: &Node, initial: T, mut f: impl FnMut(T, &Rc<Node>) -> T) -> T {
    let mut acc = initial;
    for edge in edges(node.kind) {
        match (edge.get)(&node.data) {
            EdgeRef::Single(Some(child)) => acc = f(acc, child),
            EdgeRef::List(Some(list)) => {
                for child in list.iter() {
                    acc = f(acc, child);
                }
            }
            _ => {}
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;

    #[test]
    fn test_token_kinds_have_no_schema_entry() {
        assert!(edges(SyntaxKind::ThisKeyword).is_empty());
        assert!(edges(SyntaxKind::Identifier).is_empty());
        assert!(edges(SyntaxKind::NumericLiteral).is_empty());
        assert!(edges(SyntaxKind::EmptyStatement).is_empty());
    }

    #[test]
    fn test_reduce_each_child_visits_schema_order() {
        // if (cond) { } else { }
        let cond = factory::create_identifier("cond");
        let then_block = factory::create_block(factory::create_node_array(vec![], false, None), false);
        let else_block = factory::create_block(factory::create_node_array(vec![], false, None), false);
        let stmt = factory::create_if(cond.clone(), then_block.clone(), Some(else_block.clone()));

        let seen = reduce_each_child(&stmt, Vec::new(), |mut acc, child| {
            acc.push(child.clone());
            acc
        });
        assert_eq!(seen.len(), 3);
        assert!(Rc::ptr_eq(&seen[0], &cond));
        assert!(Rc::ptr_eq(&seen[1], &then_block));
        assert!(Rc::ptr_eq(&seen[2], &else_block));
    }

    #[test]
    fn test_reduce_each_child_flattens_lists() {
        let a = factory::create_identifier("a");
        let b = factory::create_identifier("b");
        let call = factory::create_call(
            factory::create_identifier("f"),
            None,
            factory::create_node_array(vec![a, b], false, None),
        );
        let count = reduce_each_child(&call, 0usize, |acc, _| acc + 1);
        // callee + two arguments
        assert_eq!(count, 3);
    }
}
