//! Per-pass transformation state: the lexical environment frame stack, the
//! hoisting protocol, and temporary-name allocation.
//!
//! A frame is opened around every hoisting scope (source file, namespace
//! body, function-like parameter list and body). Statements registered while
//! a frame is open are collected on that frame; closing the frame hands them
//! back so the scope's host node can absorb them through
//! [`merge_lexical_environment`]. Frames nest, and popping is unconditional
//! on every exit path of a scoped visit, including error paths.

use crate::error::InvariantViolation;
use crate::factory;
use crate::syntax::{Node, NodeData, NodeFlags, SyntaxKind};
use std::rc::Rc;
use tracing::trace;

/// How aggressively visit results are checked against edge predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssertionLevel {
    /// Skip predicate checks; trust the visitor.
    None,
    /// Check every replacement node against its edge's predicate.
    #[default]
    Normal,
}

#[derive(Debug, Default)]
struct EnvironmentFrame {
    /// Whole statements registered by visitors (function declarations and
    /// other pre-built statements), emitted in registration order.
    statements: Vec<Rc<Node>>,
    /// Variable declarations to be folded into a single trailing `var`
    /// statement when the frame closes.
    variables: Vec<Rc<Node>>,
}

/// Mutable state threaded through one transformation pass.
#[derive(Debug, Default)]
pub struct TransformContext {
    frames: Vec<EnvironmentFrame>,
    assertion_level: AssertionLevel,
    temp_count: u32,
}

impl TransformContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assertion_level(assertion_level: AssertionLevel) -> Self {
        Self {
            assertion_level,
            ..Self::default()
        }
    }

    pub fn assertion_level(&self) -> AssertionLevel {
        self.assertion_level
    }

    /// Number of currently open frames. Zero outside any hoisting scope.
    pub fn environment_depth(&self) -> usize {
        self.frames.len()
    }

    /// Open a new, empty frame for the hoisting scope being entered.
    pub fn start_lexical_environment(&mut self) {
        self.frames.push(EnvironmentFrame::default());
        trace!(depth = self.frames.len(), "lexical environment opened");
    }

    /// Register a pre-built statement on the innermost frame.
    pub fn hoist_statement(&mut self, statement: Rc<Node>) -> Result<(), InvariantViolation> {
        let frame = self
            .frames
            .last_mut()
            .ok_or(InvariantViolation::NoOpenLexicalEnvironment)?;
        frame.statements.push(statement);
        Ok(())
    }

    /// Register a `var`-scoped binding for `name` on the innermost frame. All
    /// bindings of a frame are emitted as one variable statement.
    pub fn hoist_variable_declaration(
        &mut self,
        name: Rc<Node>,
    ) -> Result<(), InvariantViolation> {
        let frame = self
            .frames
            .last_mut()
            .ok_or(InvariantViolation::NoOpenLexicalEnvironment)?;
        frame
            .variables
            .push(factory::create_variable_declaration(name, None, None));
        Ok(())
    }

    /// Allocate a fresh temporary (`_a` through `_z`, then `_{n}`) and hoist
    /// a `var` binding for it into the innermost frame.
    pub fn create_temp_variable(&mut self) -> Result<Rc<Node>, InvariantViolation> {
        let n = self.temp_count;
        self.temp_count += 1;
        let text = if n < 26 {
            format!("_{}", (b'a' + n as u8) as char)
        } else {
            format!("_{n}")
        };
        let name = factory::create_identifier(text);
        self.hoist_variable_declaration(name.clone())?;
        Ok(name)
    }

    /// Close the innermost frame and return the statements it collected, in
    /// registration order with the combined variable statement last. An empty
    /// result means no merge is needed.
    pub fn end_lexical_environment(&mut self) -> Result<Vec<Rc<Node>>, InvariantViolation> {
        let frame = self
            .frames
            .pop()
            .ok_or(InvariantViolation::NoOpenLexicalEnvironment)?;
        trace!(
            depth = self.frames.len(),
            statements = frame.statements.len(),
            variables = frame.variables.len(),
            "lexical environment closed"
        );
        let mut statements = frame.statements;
        if !frame.variables.is_empty() {
            statements.push(factory::create_variable_statement(
                None,
                factory::create_variable_declaration_list(
                    factory::create_node_array(frame.variables, false, None),
                    NodeFlags::empty(),
                ),
            ));
        }
        Ok(statements)
    }
}

fn append_statements(
    existing: &crate::syntax::NodeArray,
    declarations: &[Rc<Node>],
) -> Rc<crate::syntax::NodeArray> {
    let mut elements = existing.elements.clone();
    elements.extend_from_slice(declarations);
    factory::create_node_array(elements, existing.has_trailing_comma, Some(existing))
}

/// Absorb hoisted declarations into the node that hosts the closed scope.
///
/// An empty declaration list is an identity no-op. Otherwise the host is
/// rebuilt copy-on-write with the declarations appended after its existing
/// statements. Expression bodies of arrows become a block of
/// `[return <expression>, ...declarations]` with the multi-line hint forced.
pub fn merge_lexical_environment(
    node: &Rc<Node>,
    declarations: &[Rc<Node>],
) -> Result<Rc<Node>, InvariantViolation> {
    if declarations.is_empty() {
        return Ok(node.clone());
    }
    trace!(kind = ?node.kind, count = declarations.len(), "merging hoisted declarations");
    match &node.data {
        NodeData::SourceFile(file) => Ok(factory::update_source_file(
            node,
            append_statements(&file.statements, declarations),
        )),
        NodeData::ModuleDeclaration(module) => {
            let body = module
                .body
                .as_ref()
                .ok_or(InvariantViolation::MissingEnvironmentBody { kind: node.kind })?;
            if body.kind != SyntaxKind::ModuleBlock {
                return Err(InvariantViolation::InvalidEnvironmentHost { kind: body.kind });
            }
            let merged = merge_lexical_environment(body, declarations)?;
            Ok(factory::update_module_declaration(node, Some(merged)))
        }
        NodeData::ModuleBlock(block) => Ok(factory::update_module_block(
            node,
            append_statements(&block.statements, declarations),
        )),
        NodeData::Block(block) => Ok(factory::update_block(
            node,
            append_statements(&block.statements, declarations),
        )),
        _ if node.kind.is_function_like_kind() => {
            let body = node
                .data
                .function_body()
                .ok_or(InvariantViolation::MissingEnvironmentBody { kind: node.kind })?;
            let merged = merge_concise_body(body, declarations)?;
            Ok(replace_function_body(node, merged))
        }
        _ => Err(InvariantViolation::InvalidEnvironmentHost { kind: node.kind }),
    }
}

/// Merge into a function body that may be a bare expression (arrow concise
/// body). Blocks merge in place; an expression becomes the return statement
/// of a fresh multi-line block, followed by the declarations.
pub fn merge_concise_body(
    body: &Rc<Node>,
    declarations: &[Rc<Node>],
) -> Result<Rc<Node>, InvariantViolation> {
    if declarations.is_empty() {
        return Ok(body.clone());
    }
    if body.kind == SyntaxKind::Block {
        return merge_lexical_environment(body, declarations);
    }
    let mut statements = Vec::with_capacity(declarations.len() + 1);
    statements.push(factory::create_return(Some(body.clone())));
    statements.extend_from_slice(declarations);
    Ok(factory::create_block(
        factory::create_node_array(statements, false, None),
        true,
    ))
}

fn replace_function_body(node: &Rc<Node>, body: Rc<Node>) -> Rc<Node> {
    let mut clone = factory::clone_node(node);
    match &mut clone.data {
        NodeData::FunctionExpression(f) => f.body = body,
        NodeData::ArrowFunction(f) => f.body = body,
        NodeData::FunctionDeclaration(f) => f.body = Some(body),
        NodeData::MethodDeclaration(f) | NodeData::GetAccessor(f) | NodeData::SetAccessor(f) => {
            f.body = Some(body)
        }
        NodeData::Constructor(f) => f.body = Some(body),
        _ => {}
    }
    Rc::new(clone)
}
