//! Tree node representation for the rewriting core.
//!
//! Nodes are shared through `Rc` and are conceptually immutable once
//! published: a visit never mutates a node in place, it produces a fresh node
//! and lets the parent's reference swap. Identity of untouched subtrees is
//! preserved (`Rc::ptr_eq`), which is what lets copy-on-write reconstruction
//! skip unchanged children entirely.
//!
//! The only interior mutability is the `transform_flags` cache cell, written
//! by the flag aggregator after a node stabilizes. The whole core is
//! single-threaded (`Rc` is `!Send`), so a `Cell` is sufficient.

use super::kind::SyntaxKind;
use crate::transform_flags::TransformFlags;
use bitflags::bitflags;
use serde::Serialize;
use std::cell::Cell;
use std::ops::Deref;
use std::rc::Rc;

bitflags! {
    /// Structural flags carried on a node, distinct from transform flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u16 {
        const NONE = 0;
        /// `let` declaration list.
        const LET = 1 << 0;
        /// `const` declaration list.
        const CONST = 1 << 1;
        /// Node was synthesized by a transform rather than parsed.
        const SYNTHESIZED = 1 << 2;
    }
}

/// Binary operators, stored as metadata on a binary expression rather than as
/// an operator token child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    EqualsEquals,
    ExclamationEquals,
    LessThan,
    GreaterThan,
    AmpersandAmpersand,
    BarBar,
    Equals,
    Comma,
}

/// Prefix/postfix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Plus,
    Minus,
    Exclamation,
    Tilde,
    PlusPlus,
    MinusMinus,
}

/// An ordered, immutable sequence of nodes with a trailing-separator bit and
/// an optional source-position association.
///
/// A `NodeArray` is always handled through `Rc`; producing a sub-range or an
/// edited version yields a new array value, never an aliased view.
#[derive(Debug, Serialize)]
pub struct NodeArray {
    pub elements: Vec<Rc<Node>>,
    pub has_trailing_comma: bool,
    pub pos: u32,
    pub end: u32,
}

impl NodeArray {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rc<Node>> {
        self.elements.iter()
    }
}

impl Deref for NodeArray {
    type Target = [Rc<Node>];

    fn deref(&self) -> &Self::Target {
        &self.elements
    }
}

/// One syntax tree node.
#[derive(Debug, Serialize)]
pub struct Node {
    pub kind: SyntaxKind,
    #[serde(skip)]
    pub flags: NodeFlags,
    pub pos: u32,
    pub end: u32,
    /// Cached subtree transform flags. `TransformFlags::HAS_COMPUTED_FLAGS`
    /// marks the cache as valid; the cache is only valid with respect to the
    /// node's current children, so shallow clones always reset it.
    #[serde(skip)]
    pub transform_flags: Cell<TransformFlags>,
    /// The node this one was derived from during a rewrite, if any.
    #[serde(skip)]
    pub original: Option<Rc<Node>>,
    pub data: NodeData,
}

impl Node {
    /// True if the node carries the given modifier kind in its modifier list.
    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.data
            .modifiers()
            .is_some_and(|mods| mods.iter().any(|m| m.kind == kind))
    }

    /// Ambient declarations (`declare` modifier) have no runtime
    /// representation and are excluded from flag propagation.
    pub fn is_ambient(&self) -> bool {
        self.has_modifier(SyntaxKind::DeclareKeyword)
    }
}

// =============================================================================
// Per-kind payloads
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Identifier {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiteralData {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComputedPropertyName {
    pub expression: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterDeclaration {
    pub decorators: Option<Rc<NodeArray>>,
    pub modifiers: Option<Rc<NodeArray>>,
    pub dot_dot_dot: bool,
    pub name: Rc<Node>,
    pub question: bool,
    pub ty: Option<Rc<Node>>,
    pub initializer: Option<Rc<Node>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Decorator {
    pub expression: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeReference {
    pub type_name: Rc<Node>,
    pub type_arguments: Option<Rc<NodeArray>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrayType {
    pub element_type: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnionType {
    pub types: Rc<NodeArray>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrayLiteralExpression {
    pub elements: Rc<NodeArray>,
    pub multi_line: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectLiteralExpression {
    pub properties: Rc<NodeArray>,
    pub multi_line: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyAssignment {
    pub name: Rc<Node>,
    pub initializer: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyAccessExpression {
    pub expression: Rc<Node>,
    pub name: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementAccessExpression {
    pub expression: Rc<Node>,
    pub argument_expression: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallExpression {
    pub expression: Rc<Node>,
    pub type_arguments: Option<Rc<NodeArray>>,
    pub arguments: Rc<NodeArray>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewExpression {
    pub expression: Rc<Node>,
    pub type_arguments: Option<Rc<NodeArray>>,
    pub arguments: Option<Rc<NodeArray>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParenthesizedExpression {
    pub expression: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionExpression {
    pub modifiers: Option<Rc<NodeArray>>,
    pub name: Option<Rc<Node>>,
    pub parameters: Rc<NodeArray>,
    pub ty: Option<Rc<Node>>,
    pub body: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArrowFunction {
    pub modifiers: Option<Rc<NodeArray>>,
    pub parameters: Rc<NodeArray>,
    pub ty: Option<Rc<Node>>,
    /// A block or a bare expression (concise body).
    pub body: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrefixUnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostfixUnaryExpression {
    pub operand: Rc<Node>,
    pub operator: UnaryOperator,
}

#[derive(Debug, Clone, Serialize)]
pub struct BinaryExpression {
    pub left: Rc<Node>,
    pub operator: BinaryOperator,
    pub right: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionalExpression {
    pub condition: Rc<Node>,
    pub when_true: Rc<Node>,
    pub when_false: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpreadElement {
    pub expression: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AwaitExpression {
    pub expression: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub statements: Rc<NodeArray>,
    pub multi_line: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableStatement {
    pub modifiers: Option<Rc<NodeArray>>,
    pub declaration_list: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpressionStatement {
    pub expression: Rc<Node>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IfStatement {
    pub expression: Rc<Node>,
    pub then_statement: Rc<Node>,
    pub else_statement: Option<Rc<Node>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnStatement {
    pub expression: Option<Rc<Node>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableDeclaration {
    pub name: Rc<Node>,
    pub ty: Option<Rc<Node>>,
    pub initializer: Option<Rc<Node>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableDeclarationList {
    pub declarations: Rc<NodeArray>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub decorators: Option<Rc<NodeArray>>,
    pub modifiers: Option<Rc<NodeArray>>,
    pub name: Option<Rc<Node>>,
    pub parameters: Rc<NodeArray>,
    pub ty: Option<Rc<Node>>,
    /// Absent for ambient (`declare`) functions.
    pub body: Option<Rc<Node>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassDeclaration {
    pub decorators: Option<Rc<NodeArray>>,
    pub modifiers: Option<Rc<NodeArray>>,
    pub name: Option<Rc<Node>>,
    pub extends_clause: Option<Rc<Node>>,
    pub members: Rc<NodeArray>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyDeclaration {
    pub decorators: Option<Rc<NodeArray>>,
    pub modifiers: Option<Rc<NodeArray>>,
    pub name: Rc<Node>,
    pub question: bool,
    pub ty: Option<Rc<Node>>,
    pub initializer: Option<Rc<Node>>,
}

/// Shared payload for methods and accessors; the node kind distinguishes
/// them.
#[derive(Debug, Clone, Serialize)]
pub struct MethodDeclaration {
    pub decorators: Option<Rc<NodeArray>>,
    pub modifiers: Option<Rc<NodeArray>>,
    pub name: Rc<Node>,
    pub parameters: Rc<NodeArray>,
    pub ty: Option<Rc<Node>>,
    pub body: Option<Rc<Node>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstructorDeclaration {
    pub decorators: Option<Rc<NodeArray>>,
    pub modifiers: Option<Rc<NodeArray>>,
    pub parameters: Rc<NodeArray>,
    pub body: Option<Rc<Node>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleDeclaration {
    pub decorators: Option<Rc<NodeArray>>,
    pub modifiers: Option<Rc<NodeArray>>,
    pub name: Rc<Node>,
    /// Module block, or absent for a bodiless ambient module.
    pub body: Option<Rc<Node>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleBlock {
    pub statements: Rc<NodeArray>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    pub file_name: String,
    pub statements: Rc<NodeArray>,
}

/// Kind-specific payload. One variant per syntax kind; token kinds share the
/// empty `Token` variant and are distinguished by `Node::kind`.
#[derive(Debug, Clone, Serialize)]
pub enum NodeData {
    Token,
    Identifier(Identifier),
    NumericLiteral(LiteralData),
    StringLiteral(LiteralData),
    ComputedPropertyName(ComputedPropertyName),
    Parameter(ParameterDeclaration),
    Decorator(Decorator),
    TypeReference(TypeReference),
    ArrayType(ArrayType),
    UnionType(UnionType),
    ArrayLiteralExpression(ArrayLiteralExpression),
    ObjectLiteralExpression(ObjectLiteralExpression),
    PropertyAssignment(PropertyAssignment),
    PropertyAccessExpression(PropertyAccessExpression),
    ElementAccessExpression(ElementAccessExpression),
    CallExpression(CallExpression),
    NewExpression(NewExpression),
    ParenthesizedExpression(ParenthesizedExpression),
    FunctionExpression(FunctionExpression),
    ArrowFunction(ArrowFunction),
    PrefixUnaryExpression(PrefixUnaryExpression),
    PostfixUnaryExpression(PostfixUnaryExpression),
    BinaryExpression(BinaryExpression),
    ConditionalExpression(ConditionalExpression),
    SpreadElement(SpreadElement),
    AwaitExpression(AwaitExpression),
    Block(Block),
    EmptyStatement,
    VariableStatement(VariableStatement),
    ExpressionStatement(ExpressionStatement),
    IfStatement(IfStatement),
    ReturnStatement(ReturnStatement),
    VariableDeclaration(VariableDeclaration),
    VariableDeclarationList(VariableDeclarationList),
    FunctionDeclaration(FunctionDeclaration),
    ClassDeclaration(ClassDeclaration),
    PropertyDeclaration(PropertyDeclaration),
    MethodDeclaration(MethodDeclaration),
    Constructor(ConstructorDeclaration),
    GetAccessor(MethodDeclaration),
    SetAccessor(MethodDeclaration),
    ModuleDeclaration(ModuleDeclaration),
    ModuleBlock(ModuleBlock),
    SourceFile(SourceFile),
}

impl NodeData {
    /// Modifier list of the node, for kinds that carry one.
    pub fn modifiers(&self) -> Option<&Rc<NodeArray>> {
        match self {
            NodeData::Parameter(n) => n.modifiers.as_ref(),
            NodeData::FunctionExpression(n) => n.modifiers.as_ref(),
            NodeData::ArrowFunction(n) => n.modifiers.as_ref(),
            NodeData::VariableStatement(n) => n.modifiers.as_ref(),
            NodeData::FunctionDeclaration(n) => n.modifiers.as_ref(),
            NodeData::ClassDeclaration(n) => n.modifiers.as_ref(),
            NodeData::PropertyDeclaration(n) => n.modifiers.as_ref(),
            NodeData::MethodDeclaration(n)
            | NodeData::GetAccessor(n)
            | NodeData::SetAccessor(n) => n.modifiers.as_ref(),
            NodeData::Constructor(n) => n.modifiers.as_ref(),
            NodeData::ModuleDeclaration(n) => n.modifiers.as_ref(),
            _ => None,
        }
    }

    /// Statement list of the node, for block-shaped kinds.
    pub fn statements(&self) -> Option<&Rc<NodeArray>> {
        match self {
            NodeData::Block(n) => Some(&n.statements),
            NodeData::ModuleBlock(n) => Some(&n.statements),
            NodeData::SourceFile(n) => Some(&n.statements),
            _ => None,
        }
    }

    /// Body of a function-like node, if present.
    pub fn function_body(&self) -> Option<&Rc<Node>> {
        match self {
            NodeData::FunctionExpression(n) => Some(&n.body),
            NodeData::ArrowFunction(n) => Some(&n.body),
            NodeData::FunctionDeclaration(n) => n.body.as_ref(),
            NodeData::MethodDeclaration(n)
            | NodeData::GetAccessor(n)
            | NodeData::SetAccessor(n) => n.body.as_ref(),
            NodeData::Constructor(n) => n.body.as_ref(),
            _ => None,
        }
    }
}
