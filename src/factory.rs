//! Node construction and copy-on-write reconstruction.
//!
//! `create_*` builds synthesized nodes. `update_*` is the reconstruction half
//! of the visitor protocol: given the original node and its visited children,
//! it returns the original instance when every child is identical
//! (`Rc::ptr_eq`) and otherwise derives a fresh node that records the
//! original it came from. `clone_node` is the shallow mutable copy used by
//! the schema-driven generic path, which edits at most one clone per visit.

use crate::syntax::node::*;
use crate::syntax::{BinaryOperator, SyntaxKind, UnaryOperator};
use crate::transform_flags::TransformFlags;
use std::cell::Cell;
use std::rc::Rc;

// =============================================================================
// Identity helpers
// =============================================================================

pub(crate) fn same_node(a: &Rc<Node>, b: &Rc<Node>) -> bool {
    Rc::ptr_eq(a, b)
}

pub(crate) fn same_opt_node(a: &Option<Rc<Node>>, b: &Option<Rc<Node>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

pub(crate) fn same_array(a: &Rc<NodeArray>, b: &Rc<NodeArray>) -> bool {
    Rc::ptr_eq(a, b)
}

pub(crate) fn same_opt_array(a: &Option<Rc<NodeArray>>, b: &Option<Rc<NodeArray>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

// =============================================================================
// Core constructors
// =============================================================================

fn make(kind: SyntaxKind, data: NodeData) -> Rc<Node> {
    Rc::new(Node {
        kind,
        flags: NodeFlags::SYNTHESIZED,
        pos: 0,
        end: 0,
        transform_flags: Cell::new(TransformFlags::empty()),
        original: None,
        data,
    })
}

/// Derive a replacement node from `original`: same kind, flags, and source
/// range, fresh payload, cleared flag cache, and an `original` backpointer.
fn derive(original: &Rc<Node>, data: NodeData) -> Rc<Node> {
    Rc::new(Node {
        kind: original.kind,
        flags: original.flags,
        pos: original.pos,
        end: original.end,
        transform_flags: Cell::new(TransformFlags::empty()),
        original: Some(original.clone()),
        data,
    })
}

/// Shallow mutable copy of a node, not yet shared. The caller edits its
/// fields and publishes it with `Rc::new`. The flag cache is cleared because
/// cached flags are only valid for the children the node had when computed.
pub fn clone_node(node: &Rc<Node>) -> Node {
    Node {
        kind: node.kind,
        flags: node.flags,
        pos: node.pos,
        end: node.end,
        transform_flags: Cell::new(TransformFlags::empty()),
        original: Some(node.clone()),
        data: node.data.clone(),
    }
}

/// Build a node sequence. `position_source` carries over the source-position
/// association of an existing sequence.
pub fn create_node_array(
    elements: Vec<Rc<Node>>,
    has_trailing_comma: bool,
    position_source: Option<&NodeArray>,
) -> Rc<NodeArray> {
    let (pos, end) = position_source.map_or((0, 0), |s| (s.pos, s.end));
    Rc::new(NodeArray {
        elements,
        has_trailing_comma,
        pos,
        end,
    })
}

/// The canonical lift function for statement positions: a single statement
/// passes through, several become a synthesized multi-line block.
pub fn lift_to_block(nodes: &[Rc<Node>]) -> Rc<Node> {
    if nodes.len() == 1 {
        nodes[0].clone()
    } else {
        create_block(create_node_array(nodes.to_vec(), false, None), true)
    }
}

// =============================================================================
// Tokens, names, literals
// =============================================================================

pub fn create_token(kind: SyntaxKind) -> Rc<Node> {
    make(kind, NodeData::Token)
}

pub fn create_identifier(text: impl Into<String>) -> Rc<Node> {
    make(
        SyntaxKind::Identifier,
        NodeData::Identifier(Identifier { text: text.into() }),
    )
}

pub fn create_numeric_literal(text: impl Into<String>) -> Rc<Node> {
    make(
        SyntaxKind::NumericLiteral,
        NodeData::NumericLiteral(LiteralData { text: text.into() }),
    )
}

pub fn create_string_literal(text: impl Into<String>) -> Rc<Node> {
    make(
        SyntaxKind::StringLiteral,
        NodeData::StringLiteral(LiteralData { text: text.into() }),
    )
}

pub fn create_computed_property_name(expression: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::ComputedPropertyName,
        NodeData::ComputedPropertyName(ComputedPropertyName { expression }),
    )
}

// =============================================================================
// Signature elements and type nodes
// =============================================================================

pub fn create_parameter(
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    dot_dot_dot: bool,
    name: Rc<Node>,
    question: bool,
    ty: Option<Rc<Node>>,
    initializer: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::Parameter,
        NodeData::Parameter(ParameterDeclaration {
            decorators,
            modifiers,
            dot_dot_dot,
            name,
            question,
            ty,
            initializer,
        }),
    )
}

pub fn update_parameter(
    node: &Rc<Node>,
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Rc<Node>,
    ty: Option<Rc<Node>>,
    initializer: Option<Rc<Node>>,
) -> Rc<Node> {
    if let NodeData::Parameter(old) = &node.data {
        if same_opt_array(&old.decorators, &decorators)
            && same_opt_array(&old.modifiers, &modifiers)
            && same_node(&old.name, &name)
            && same_opt_node(&old.ty, &ty)
            && same_opt_node(&old.initializer, &initializer)
        {
            return node.clone();
        }
        return derive(
            node,
            NodeData::Parameter(ParameterDeclaration {
                decorators,
                modifiers,
                dot_dot_dot: old.dot_dot_dot,
                name,
                question: old.question,
                ty,
                initializer,
            }),
        );
    }
    node.clone()
}

pub fn create_decorator(expression: Rc<Node>) -> Rc<Node> {
    make(SyntaxKind::Decorator, NodeData::Decorator(Decorator { expression }))
}

pub fn create_type_reference(
    type_name: Rc<Node>,
    type_arguments: Option<Rc<NodeArray>>,
) -> Rc<Node> {
    make(
        SyntaxKind::TypeReference,
        NodeData::TypeReference(TypeReference {
            type_name,
            type_arguments,
        }),
    )
}

pub fn create_array_type(element_type: Rc<Node>) -> Rc<Node> {
    make(SyntaxKind::ArrayType, NodeData::ArrayType(ArrayType { element_type }))
}

pub fn create_union_type(types: Rc<NodeArray>) -> Rc<Node> {
    make(SyntaxKind::UnionType, NodeData::UnionType(UnionType { types }))
}

// =============================================================================
// Expressions
// =============================================================================

pub fn create_array_literal(elements: Rc<NodeArray>, multi_line: bool) -> Rc<Node> {
    make(
        SyntaxKind::ArrayLiteralExpression,
        NodeData::ArrayLiteralExpression(ArrayLiteralExpression {
            elements,
            multi_line,
        }),
    )
}

pub fn create_object_literal(properties: Rc<NodeArray>, multi_line: bool) -> Rc<Node> {
    make(
        SyntaxKind::ObjectLiteralExpression,
        NodeData::ObjectLiteralExpression(ObjectLiteralExpression {
            properties,
            multi_line,
        }),
    )
}

pub fn create_property_assignment(name: Rc<Node>, initializer: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::PropertyAssignment,
        NodeData::PropertyAssignment(PropertyAssignment { name, initializer }),
    )
}

pub fn create_property_access(expression: Rc<Node>, name: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::PropertyAccessExpression,
        NodeData::PropertyAccessExpression(PropertyAccessExpression { expression, name }),
    )
}

pub fn update_property_access(node: &Rc<Node>, expression: Rc<Node>, name: Rc<Node>) -> Rc<Node> {
    if let NodeData::PropertyAccessExpression(old) = &node.data {
        if same_node(&old.expression, &expression) && same_node(&old.name, &name) {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::PropertyAccessExpression(PropertyAccessExpression { expression, name }),
    )
}

pub fn create_element_access(expression: Rc<Node>, argument_expression: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::ElementAccessExpression,
        NodeData::ElementAccessExpression(ElementAccessExpression {
            expression,
            argument_expression,
        }),
    )
}

pub fn create_call(
    expression: Rc<Node>,
    type_arguments: Option<Rc<NodeArray>>,
    arguments: Rc<NodeArray>,
) -> Rc<Node> {
    make(
        SyntaxKind::CallExpression,
        NodeData::CallExpression(CallExpression {
            expression,
            type_arguments,
            arguments,
        }),
    )
}

pub fn update_call(
    node: &Rc<Node>,
    expression: Rc<Node>,
    type_arguments: Option<Rc<NodeArray>>,
    arguments: Rc<NodeArray>,
) -> Rc<Node> {
    if let NodeData::CallExpression(old) = &node.data {
        if same_node(&old.expression, &expression)
            && same_opt_array(&old.type_arguments, &type_arguments)
            && same_array(&old.arguments, &arguments)
        {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::CallExpression(CallExpression {
            expression,
            type_arguments,
            arguments,
        }),
    )
}

pub fn create_new(
    expression: Rc<Node>,
    type_arguments: Option<Rc<NodeArray>>,
    arguments: Option<Rc<NodeArray>>,
) -> Rc<Node> {
    make(
        SyntaxKind::NewExpression,
        NodeData::NewExpression(NewExpression {
            expression,
            type_arguments,
            arguments,
        }),
    )
}

pub fn update_new(
    node: &Rc<Node>,
    expression: Rc<Node>,
    type_arguments: Option<Rc<NodeArray>>,
    arguments: Option<Rc<NodeArray>>,
) -> Rc<Node> {
    if let NodeData::NewExpression(old) = &node.data {
        if same_node(&old.expression, &expression)
            && same_opt_array(&old.type_arguments, &type_arguments)
            && same_opt_array(&old.arguments, &arguments)
        {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::NewExpression(NewExpression {
            expression,
            type_arguments,
            arguments,
        }),
    )
}

pub fn create_paren(expression: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::ParenthesizedExpression,
        NodeData::ParenthesizedExpression(ParenthesizedExpression { expression }),
    )
}

pub fn create_function_expression(
    modifiers: Option<Rc<NodeArray>>,
    name: Option<Rc<Node>>,
    parameters: Rc<NodeArray>,
    ty: Option<Rc<Node>>,
    body: Rc<Node>,
) -> Rc<Node> {
    make(
        SyntaxKind::FunctionExpression,
        NodeData::FunctionExpression(FunctionExpression {
            modifiers,
            name,
            parameters,
            ty,
            body,
        }),
    )
}

pub fn update_function_expression(
    node: &Rc<Node>,
    modifiers: Option<Rc<NodeArray>>,
    name: Option<Rc<Node>>,
    parameters: Rc<NodeArray>,
    ty: Option<Rc<Node>>,
    body: Rc<Node>,
) -> Rc<Node> {
    if let NodeData::FunctionExpression(old) = &node.data {
        if same_opt_array(&old.modifiers, &modifiers)
            && same_opt_node(&old.name, &name)
            && same_array(&old.parameters, &parameters)
            && same_opt_node(&old.ty, &ty)
            && same_node(&old.body, &body)
        {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::FunctionExpression(FunctionExpression {
            modifiers,
            name,
            parameters,
            ty,
            body,
        }),
    )
}

pub fn create_arrow_function(
    modifiers: Option<Rc<NodeArray>>,
    parameters: Rc<NodeArray>,
    ty: Option<Rc<Node>>,
    body: Rc<Node>,
) -> Rc<Node> {
    make(
        SyntaxKind::ArrowFunction,
        NodeData::ArrowFunction(ArrowFunction {
            modifiers,
            parameters,
            ty,
            body,
        }),
    )
}

pub fn update_arrow_function(
    node: &Rc<Node>,
    modifiers: Option<Rc<NodeArray>>,
    parameters: Rc<NodeArray>,
    ty: Option<Rc<Node>>,
    body: Rc<Node>,
) -> Rc<Node> {
    if let NodeData::ArrowFunction(old) = &node.data {
        if same_opt_array(&old.modifiers, &modifiers)
            && same_array(&old.parameters, &parameters)
            && same_opt_node(&old.ty, &ty)
            && same_node(&old.body, &body)
        {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::ArrowFunction(ArrowFunction {
            modifiers,
            parameters,
            ty,
            body,
        }),
    )
}

pub fn create_prefix_unary(operator: UnaryOperator, operand: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::PrefixUnaryExpression,
        NodeData::PrefixUnaryExpression(PrefixUnaryExpression { operator, operand }),
    )
}

pub fn create_postfix_unary(operand: Rc<Node>, operator: UnaryOperator) -> Rc<Node> {
    make(
        SyntaxKind::PostfixUnaryExpression,
        NodeData::PostfixUnaryExpression(PostfixUnaryExpression { operand, operator }),
    )
}

pub fn create_binary(left: Rc<Node>, operator: BinaryOperator, right: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::BinaryExpression,
        NodeData::BinaryExpression(BinaryExpression {
            left,
            operator,
            right,
        }),
    )
}

pub fn update_binary(node: &Rc<Node>, left: Rc<Node>, right: Rc<Node>) -> Rc<Node> {
    if let NodeData::BinaryExpression(old) = &node.data {
        if same_node(&old.left, &left) && same_node(&old.right, &right) {
            return node.clone();
        }
        return derive(
            node,
            NodeData::BinaryExpression(BinaryExpression {
                left,
                operator: old.operator,
                right,
            }),
        );
    }
    node.clone()
}

pub fn create_conditional(
    condition: Rc<Node>,
    when_true: Rc<Node>,
    when_false: Rc<Node>,
) -> Rc<Node> {
    make(
        SyntaxKind::ConditionalExpression,
        NodeData::ConditionalExpression(ConditionalExpression {
            condition,
            when_true,
            when_false,
        }),
    )
}

pub fn create_spread(expression: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::SpreadElement,
        NodeData::SpreadElement(SpreadElement { expression }),
    )
}

pub fn create_await(expression: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::AwaitExpression,
        NodeData::AwaitExpression(AwaitExpression { expression }),
    )
}

// =============================================================================
// Statements
// =============================================================================

pub fn create_block(statements: Rc<NodeArray>, multi_line: bool) -> Rc<Node> {
    make(
        SyntaxKind::Block,
        NodeData::Block(Block {
            statements,
            multi_line,
        }),
    )
}

pub fn update_block(node: &Rc<Node>, statements: Rc<NodeArray>) -> Rc<Node> {
    if let NodeData::Block(old) = &node.data {
        if same_array(&old.statements, &statements) {
            return node.clone();
        }
        return derive(
            node,
            NodeData::Block(Block {
                statements,
                multi_line: old.multi_line,
            }),
        );
    }
    node.clone()
}

pub fn create_empty_statement() -> Rc<Node> {
    make(SyntaxKind::EmptyStatement, NodeData::EmptyStatement)
}

pub fn create_variable_statement(
    modifiers: Option<Rc<NodeArray>>,
    declaration_list: Rc<Node>,
) -> Rc<Node> {
    make(
        SyntaxKind::VariableStatement,
        NodeData::VariableStatement(VariableStatement {
            modifiers,
            declaration_list,
        }),
    )
}

pub fn update_variable_statement(
    node: &Rc<Node>,
    modifiers: Option<Rc<NodeArray>>,
    declaration_list: Rc<Node>,
) -> Rc<Node> {
    if let NodeData::VariableStatement(old) = &node.data {
        if same_opt_array(&old.modifiers, &modifiers)
            && same_node(&old.declaration_list, &declaration_list)
        {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::VariableStatement(VariableStatement {
            modifiers,
            declaration_list,
        }),
    )
}

pub fn create_expression_statement(expression: Rc<Node>) -> Rc<Node> {
    make(
        SyntaxKind::ExpressionStatement,
        NodeData::ExpressionStatement(ExpressionStatement { expression }),
    )
}

pub fn create_if(
    expression: Rc<Node>,
    then_statement: Rc<Node>,
    else_statement: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::IfStatement,
        NodeData::IfStatement(IfStatement {
            expression,
            then_statement,
            else_statement,
        }),
    )
}

pub fn update_if(
    node: &Rc<Node>,
    expression: Rc<Node>,
    then_statement: Rc<Node>,
    else_statement: Option<Rc<Node>>,
) -> Rc<Node> {
    if let NodeData::IfStatement(old) = &node.data {
        if same_node(&old.expression, &expression)
            && same_node(&old.then_statement, &then_statement)
            && same_opt_node(&old.else_statement, &else_statement)
        {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::IfStatement(IfStatement {
            expression,
            then_statement,
            else_statement,
        }),
    )
}

pub fn create_return(expression: Option<Rc<Node>>) -> Rc<Node> {
    make(
        SyntaxKind::ReturnStatement,
        NodeData::ReturnStatement(ReturnStatement { expression }),
    )
}

pub fn update_return(node: &Rc<Node>, expression: Option<Rc<Node>>) -> Rc<Node> {
    if let NodeData::ReturnStatement(old) = &node.data {
        if same_opt_node(&old.expression, &expression) {
            return node.clone();
        }
    }
    derive(node, NodeData::ReturnStatement(ReturnStatement { expression }))
}

// =============================================================================
// Declarations
// =============================================================================

pub fn create_variable_declaration(
    name: Rc<Node>,
    ty: Option<Rc<Node>>,
    initializer: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::VariableDeclaration,
        NodeData::VariableDeclaration(VariableDeclaration {
            name,
            ty,
            initializer,
        }),
    )
}

pub fn update_variable_declaration(
    node: &Rc<Node>,
    name: Rc<Node>,
    ty: Option<Rc<Node>>,
    initializer: Option<Rc<Node>>,
) -> Rc<Node> {
    if let NodeData::VariableDeclaration(old) = &node.data {
        if same_node(&old.name, &name)
            && same_opt_node(&old.ty, &ty)
            && same_opt_node(&old.initializer, &initializer)
        {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::VariableDeclaration(VariableDeclaration {
            name,
            ty,
            initializer,
        }),
    )
}

/// `flags` selects `var` (empty), `NodeFlags::LET`, or `NodeFlags::CONST`.
pub fn create_variable_declaration_list(
    declarations: Rc<NodeArray>,
    flags: NodeFlags,
) -> Rc<Node> {
    Rc::new(Node {
        kind: SyntaxKind::VariableDeclarationList,
        flags: NodeFlags::SYNTHESIZED | flags,
        pos: 0,
        end: 0,
        transform_flags: Cell::new(TransformFlags::empty()),
        original: None,
        data: NodeData::VariableDeclarationList(VariableDeclarationList { declarations }),
    })
}

pub fn update_variable_declaration_list(node: &Rc<Node>, declarations: Rc<NodeArray>) -> Rc<Node> {
    if let NodeData::VariableDeclarationList(old) = &node.data {
        if same_array(&old.declarations, &declarations) {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::VariableDeclarationList(VariableDeclarationList { declarations }),
    )
}

pub fn create_function_declaration(
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Option<Rc<Node>>,
    parameters: Rc<NodeArray>,
    ty: Option<Rc<Node>>,
    body: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::FunctionDeclaration,
        NodeData::FunctionDeclaration(FunctionDeclaration {
            decorators,
            modifiers,
            name,
            parameters,
            ty,
            body,
        }),
    )
}

pub fn update_function_declaration(
    node: &Rc<Node>,
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Option<Rc<Node>>,
    parameters: Rc<NodeArray>,
    ty: Option<Rc<Node>>,
    body: Option<Rc<Node>>,
) -> Rc<Node> {
    if let NodeData::FunctionDeclaration(old) = &node.data {
        if same_opt_array(&old.decorators, &decorators)
            && same_opt_array(&old.modifiers, &modifiers)
            && same_opt_node(&old.name, &name)
            && same_array(&old.parameters, &parameters)
            && same_opt_node(&old.ty, &ty)
            && same_opt_node(&old.body, &body)
        {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::FunctionDeclaration(FunctionDeclaration {
            decorators,
            modifiers,
            name,
            parameters,
            ty,
            body,
        }),
    )
}

pub fn create_class_declaration(
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Option<Rc<Node>>,
    extends_clause: Option<Rc<Node>>,
    members: Rc<NodeArray>,
) -> Rc<Node> {
    make(
        SyntaxKind::ClassDeclaration,
        NodeData::ClassDeclaration(ClassDeclaration {
            decorators,
            modifiers,
            name,
            extends_clause,
            members,
        }),
    )
}

pub fn create_property_declaration(
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Rc<Node>,
    question: bool,
    ty: Option<Rc<Node>>,
    initializer: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::PropertyDeclaration,
        NodeData::PropertyDeclaration(PropertyDeclaration {
            decorators,
            modifiers,
            name,
            question,
            ty,
            initializer,
        }),
    )
}

pub fn create_method_declaration(
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Rc<Node>,
    parameters: Rc<NodeArray>,
    ty: Option<Rc<Node>>,
    body: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::MethodDeclaration,
        NodeData::MethodDeclaration(MethodDeclaration {
            decorators,
            modifiers,
            name,
            parameters,
            ty,
            body,
        }),
    )
}

/// Shared reconstruction for methods and accessors; `node.kind` is preserved.
pub fn update_method_like(
    node: &Rc<Node>,
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Rc<Node>,
    parameters: Rc<NodeArray>,
    ty: Option<Rc<Node>>,
    body: Option<Rc<Node>>,
) -> Rc<Node> {
    let old = match &node.data {
        NodeData::MethodDeclaration(m) | NodeData::GetAccessor(m) | NodeData::SetAccessor(m) => m,
        _ => return node.clone(),
    };
    if same_opt_array(&old.decorators, &decorators)
        && same_opt_array(&old.modifiers, &modifiers)
        && same_node(&old.name, &name)
        && same_array(&old.parameters, &parameters)
        && same_opt_node(&old.ty, &ty)
        && same_opt_node(&old.body, &body)
    {
        return node.clone();
    }
    let data = MethodDeclaration {
        decorators,
        modifiers,
        name,
        parameters,
        ty,
        body,
    };
    let data = match node.kind {
        SyntaxKind::GetAccessor => NodeData::GetAccessor(data),
        SyntaxKind::SetAccessor => NodeData::SetAccessor(data),
        _ => NodeData::MethodDeclaration(data),
    };
    derive(node, data)
}

pub fn create_constructor(
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    parameters: Rc<NodeArray>,
    body: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::Constructor,
        NodeData::Constructor(ConstructorDeclaration {
            decorators,
            modifiers,
            parameters,
            body,
        }),
    )
}

pub fn update_constructor(
    node: &Rc<Node>,
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    parameters: Rc<NodeArray>,
    body: Option<Rc<Node>>,
) -> Rc<Node> {
    if let NodeData::Constructor(old) = &node.data {
        if same_opt_array(&old.decorators, &decorators)
            && same_opt_array(&old.modifiers, &modifiers)
            && same_array(&old.parameters, &parameters)
            && same_opt_node(&old.body, &body)
        {
            return node.clone();
        }
    }
    derive(
        node,
        NodeData::Constructor(ConstructorDeclaration {
            decorators,
            modifiers,
            parameters,
            body,
        }),
    )
}

pub fn create_get_accessor(
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Rc<Node>,
    parameters: Rc<NodeArray>,
    ty: Option<Rc<Node>>,
    body: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::GetAccessor,
        NodeData::GetAccessor(MethodDeclaration {
            decorators,
            modifiers,
            name,
            parameters,
            ty,
            body,
        }),
    )
}

pub fn create_set_accessor(
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Rc<Node>,
    parameters: Rc<NodeArray>,
    body: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::SetAccessor,
        NodeData::SetAccessor(MethodDeclaration {
            decorators,
            modifiers,
            name,
            parameters,
            ty: None,
            body,
        }),
    )
}

pub fn create_module_declaration(
    decorators: Option<Rc<NodeArray>>,
    modifiers: Option<Rc<NodeArray>>,
    name: Rc<Node>,
    body: Option<Rc<Node>>,
) -> Rc<Node> {
    make(
        SyntaxKind::ModuleDeclaration,
        NodeData::ModuleDeclaration(ModuleDeclaration {
            decorators,
            modifiers,
            name,
            body,
        }),
    )
}

pub fn update_module_declaration(node: &Rc<Node>, body: Option<Rc<Node>>) -> Rc<Node> {
    if let NodeData::ModuleDeclaration(old) = &node.data {
        if same_opt_node(&old.body, &body) {
            return node.clone();
        }
        return derive(
            node,
            NodeData::ModuleDeclaration(ModuleDeclaration {
                decorators: old.decorators.clone(),
                modifiers: old.modifiers.clone(),
                name: old.name.clone(),
                body,
            }),
        );
    }
    node.clone()
}

pub fn create_module_block(statements: Rc<NodeArray>) -> Rc<Node> {
    make(
        SyntaxKind::ModuleBlock,
        NodeData::ModuleBlock(ModuleBlock { statements }),
    )
}

pub fn update_module_block(node: &Rc<Node>, statements: Rc<NodeArray>) -> Rc<Node> {
    if let NodeData::ModuleBlock(old) = &node.data {
        if same_array(&old.statements, &statements) {
            return node.clone();
        }
    }
    derive(node, NodeData::ModuleBlock(ModuleBlock { statements }))
}

pub fn create_source_file(file_name: impl Into<String>, statements: Rc<NodeArray>) -> Rc<Node> {
    make(
        SyntaxKind::SourceFile,
        NodeData::SourceFile(SourceFile {
            file_name: file_name.into(),
            statements,
        }),
    )
}

pub fn update_source_file(node: &Rc<Node>, statements: Rc<NodeArray>) -> Rc<Node> {
    if let NodeData::SourceFile(old) = &node.data {
        if same_array(&old.statements, &statements) {
            return node.clone();
        }
        return derive(
            node,
            NodeData::SourceFile(SourceFile {
                file_name: old.file_name.clone(),
                statements,
            }),
        );
    }
    node.clone()
}
