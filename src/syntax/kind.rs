//! Syntax kinds and kind classification.
//!
//! `SyntaxKind` is the closed tag set over which the edge schema, the
//! specialized child visitor, and the flag aggregator dispatch. The helpers
//! here classify kinds structurally (token, type node, function-like); the
//! per-node predicates used by visit edges live in `syntax::predicates`.

use serde::Serialize;

/// The kind of a syntax tree node.
///
/// Token kinds carry no children and are returned unchanged by every visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxKind {
    // Tokens
    ExportKeyword,
    DeclareKeyword,
    AsyncKeyword,
    StaticKeyword,
    ReadonlyKeyword,
    ThisKeyword,

    // Names and literals
    Identifier,
    NumericLiteral,
    StringLiteral,
    ComputedPropertyName,

    // Signature elements
    Parameter,
    Decorator,

    // Type nodes
    TypeReference,
    ArrayType,
    UnionType,

    // Expressions
    ArrayLiteralExpression,
    ObjectLiteralExpression,
    PropertyAssignment,
    PropertyAccessExpression,
    ElementAccessExpression,
    CallExpression,
    NewExpression,
    ParenthesizedExpression,
    FunctionExpression,
    ArrowFunction,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    BinaryExpression,
    ConditionalExpression,
    SpreadElement,
    AwaitExpression,

    // Statements
    Block,
    EmptyStatement,
    VariableStatement,
    ExpressionStatement,
    IfStatement,
    ReturnStatement,

    // Declarations
    VariableDeclaration,
    VariableDeclarationList,
    FunctionDeclaration,
    ClassDeclaration,
    PropertyDeclaration,
    MethodDeclaration,
    Constructor,
    GetAccessor,
    SetAccessor,
    ModuleDeclaration,
    ModuleBlock,

    // Top level
    SourceFile,
}

impl SyntaxKind {
    /// Token and keyword kinds: leaves with no schema entry and no children.
    pub fn is_token(self) -> bool {
        matches!(
            self,
            SyntaxKind::ExportKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::AsyncKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::ThisKeyword
        )
    }

    /// Modifier token kinds, valid inside a `modifiers` list.
    pub fn is_modifier_kind(self) -> bool {
        matches!(
            self,
            SyntaxKind::ExportKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::AsyncKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::ReadonlyKeyword
        )
    }

    /// Pure type annotations. Never lowered: the flag aggregator does not
    /// descend into these and their flags never reach an ancestor.
    pub fn is_type_node_kind(self) -> bool {
        matches!(
            self,
            SyntaxKind::TypeReference | SyntaxKind::ArrayType | SyntaxKind::UnionType
        )
    }

    /// Kinds whose body introduces a hoisting scope handled by the
    /// specialized child visitor.
    pub fn is_function_like_kind(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ArrowFunction
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::Constructor
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
        )
    }

    /// Kinds handled by the schema-driven generic path that nevertheless open
    /// a lexical environment frame around their children.
    pub fn starts_new_lexical_environment(self) -> bool {
        matches!(self, SyntaxKind::ModuleDeclaration)
    }
}
