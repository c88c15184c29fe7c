//! Validity predicates for schema edges.
//!
//! Each edge of the schema names the predicate its replacement node must
//! satisfy. Predicates are carried as a `NodeTest`, an explicit name plus a
//! function pointer, so diagnostics never depend on reflective introspection
//! of function values.

use super::kind::SyntaxKind;
use super::node::Node;

/// A named validity predicate attached to a schema edge.
#[derive(Clone, Copy)]
pub struct NodeTest {
    pub name: &'static str,
    pub test: fn(&Node) -> bool,
}

impl NodeTest {
    pub const fn new(name: &'static str, test: fn(&Node) -> bool) -> NodeTest {
        NodeTest { name, test }
    }

    pub fn matches(&self, node: &Node) -> bool {
        (self.test)(node)
    }
}

impl std::fmt::Debug for NodeTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTest").field("name", &self.name).finish()
    }
}

pub fn is_expression(node: &Node) -> bool {
    matches!(
        node.kind,
        SyntaxKind::ThisKeyword
            | SyntaxKind::Identifier
            | SyntaxKind::NumericLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::ArrayLiteralExpression
            | SyntaxKind::ObjectLiteralExpression
            | SyntaxKind::PropertyAccessExpression
            | SyntaxKind::ElementAccessExpression
            | SyntaxKind::CallExpression
            | SyntaxKind::NewExpression
            | SyntaxKind::ParenthesizedExpression
            | SyntaxKind::FunctionExpression
            | SyntaxKind::ArrowFunction
            | SyntaxKind::PrefixUnaryExpression
            | SyntaxKind::PostfixUnaryExpression
            | SyntaxKind::BinaryExpression
            | SyntaxKind::ConditionalExpression
            | SyntaxKind::SpreadElement
            | SyntaxKind::AwaitExpression
    )
}

pub fn is_statement(node: &Node) -> bool {
    matches!(
        node.kind,
        SyntaxKind::Block
            | SyntaxKind::EmptyStatement
            | SyntaxKind::VariableStatement
            | SyntaxKind::ExpressionStatement
            | SyntaxKind::IfStatement
            | SyntaxKind::ReturnStatement
            | SyntaxKind::FunctionDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::ModuleDeclaration
    )
}

pub fn is_identifier(node: &Node) -> bool {
    node.kind == SyntaxKind::Identifier
}

pub fn is_binding_name(node: &Node) -> bool {
    node.kind == SyntaxKind::Identifier
}

pub fn is_property_name(node: &Node) -> bool {
    matches!(
        node.kind,
        SyntaxKind::Identifier
            | SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::ComputedPropertyName
    )
}

pub fn is_entity_name(node: &Node) -> bool {
    node.kind == SyntaxKind::Identifier
}

pub fn is_modifier(node: &Node) -> bool {
    node.kind.is_modifier_kind()
}

pub fn is_decorator(node: &Node) -> bool {
    node.kind == SyntaxKind::Decorator
}

pub fn is_parameter_declaration(node: &Node) -> bool {
    node.kind == SyntaxKind::Parameter
}

pub fn is_type_node(node: &Node) -> bool {
    node.kind.is_type_node_kind()
}

pub fn is_block(node: &Node) -> bool {
    node.kind == SyntaxKind::Block
}

/// Arrow function bodies: a block or a bare expression.
pub fn is_concise_body(node: &Node) -> bool {
    is_block(node) || is_expression(node)
}

pub fn is_module_body(node: &Node) -> bool {
    node.kind == SyntaxKind::ModuleBlock
}

pub fn is_class_element(node: &Node) -> bool {
    matches!(
        node.kind,
        SyntaxKind::PropertyDeclaration
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::Constructor
            | SyntaxKind::GetAccessor
            | SyntaxKind::SetAccessor
    )
}

pub fn is_object_literal_element(node: &Node) -> bool {
    node.kind == SyntaxKind::PropertyAssignment
}

pub fn is_variable_declaration(node: &Node) -> bool {
    node.kind == SyntaxKind::VariableDeclaration
}

pub fn is_variable_declaration_list(node: &Node) -> bool {
    node.kind == SyntaxKind::VariableDeclarationList
}

// Named tests wired into the edge schema.
pub const IS_EXPRESSION: NodeTest = NodeTest::new("expression", is_expression);
pub const IS_STATEMENT: NodeTest = NodeTest::new("statement", is_statement);
pub const IS_IDENTIFIER: NodeTest = NodeTest::new("identifier", is_identifier);
pub const IS_BINDING_NAME: NodeTest = NodeTest::new("binding name", is_binding_name);
pub const IS_PROPERTY_NAME: NodeTest = NodeTest::new("property name", is_property_name);
pub const IS_ENTITY_NAME: NodeTest = NodeTest::new("entity name", is_entity_name);
pub const IS_MODIFIER: NodeTest = NodeTest::new("modifier", is_modifier);
pub const IS_DECORATOR: NodeTest = NodeTest::new("decorator", is_decorator);
pub const IS_PARAMETER_DECLARATION: NodeTest =
    NodeTest::new("parameter declaration", is_parameter_declaration);
pub const IS_TYPE_NODE: NodeTest = NodeTest::new("type node", is_type_node);
pub const IS_BLOCK: NodeTest = NodeTest::new("block", is_block);
pub const IS_CONCISE_BODY: NodeTest = NodeTest::new("concise body", is_concise_body);
pub const IS_MODULE_BODY: NodeTest = NodeTest::new("module body", is_module_body);
pub const IS_CLASS_ELEMENT: NodeTest = NodeTest::new("class element", is_class_element);
pub const IS_OBJECT_LITERAL_ELEMENT: NodeTest =
    NodeTest::new("object literal element", is_object_literal_element);
pub const IS_VARIABLE_DECLARATION: NodeTest =
    NodeTest::new("variable declaration", is_variable_declaration);
pub const IS_VARIABLE_DECLARATION_LIST: NodeTest =
    NodeTest::new("variable declaration list", is_variable_declaration_list);
