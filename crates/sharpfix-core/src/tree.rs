//! Immutable syntax tree model
//!
//! Every grammar production is one variant of [`SyntaxNode`]. Children are
//! held behind [`Node`] (`Arc<SyntaxNode>`), so a tree is a persistent
//! structure: rebuilding one node shares every untouched subtree with the
//! tree it was derived from.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::span::Span;

/// Shared handle to a syntax node
pub type Node = Arc<SyntaxNode>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntaxNode {
    CompilationUnit(CompilationUnit),
    Namespace(NamespaceDeclaration),
    Class(ClassDeclaration),
    Method(MethodDeclaration),
    Parameter(Parameter),
    Type(TypeSyntax),
    Block(Block),
    If(IfStatement),
    Return(ReturnStatement),
    ExpressionStatement(ExpressionStatement),
    LocalDeclaration(LocalDeclaration),
    Try(TryStatement),
    Catch(CatchClause),
    Binary(BinaryExpression),
    IsPattern(IsPatternExpression),
    ConstantPattern(ConstantPattern),
    NotPattern(NotPattern),
    Assignment(AssignmentExpression),
    ObjectCreation(ObjectCreationExpression),
    Invocation(InvocationExpression),
    MemberAccess(MemberAccessExpression),
    Identifier(Identifier),
    Literal(Literal),
}

/// Fieldless tag for each [`SyntaxNode`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    CompilationUnit,
    Namespace,
    Class,
    Method,
    Parameter,
    Type,
    Block,
    If,
    Return,
    ExpressionStatement,
    LocalDeclaration,
    Try,
    Catch,
    Binary,
    IsPattern,
    ConstantPattern,
    NotPattern,
    Assignment,
    ObjectCreation,
    Invocation,
    MemberAccess,
    Identifier,
    Literal,
}

/// The kind of slot a node may occupy in its parent.
///
/// A replacement must have the same category as the node it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    Unit,
    Member,
    Parameter,
    Type,
    Statement,
    Clause,
    Expression,
    Pattern,
}

impl NodeKind {
    pub fn category(self) -> NodeCategory {
        match self {
            NodeKind::CompilationUnit => NodeCategory::Unit,
            NodeKind::Namespace | NodeKind::Class | NodeKind::Method => NodeCategory::Member,
            NodeKind::Parameter => NodeCategory::Parameter,
            NodeKind::Type => NodeCategory::Type,
            NodeKind::Block
            | NodeKind::If
            | NodeKind::Return
            | NodeKind::ExpressionStatement
            | NodeKind::LocalDeclaration
            | NodeKind::Try => NodeCategory::Statement,
            NodeKind::Catch => NodeCategory::Clause,
            NodeKind::Binary
            | NodeKind::IsPattern
            | NodeKind::Assignment
            | NodeKind::ObjectCreation
            | NodeKind::Invocation
            | NodeKind::MemberAccess
            | NodeKind::Identifier
            | NodeKind::Literal => NodeCategory::Expression,
            NodeKind::ConstantPattern | NodeKind::NotPattern => NodeCategory::Pattern,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub span: Span,
    pub members: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDeclaration {
    pub span: Span,
    pub name: String,
    pub members: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub span: Span,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub members: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub span: Span,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    pub return_type: Node,
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Node>,
    pub body: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Async,
    Virtual,
    Override,
    Abstract,
    Sealed,
    Readonly,
}

impl Modifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Private => "private",
            Modifier::Protected => "protected",
            Modifier::Internal => "internal",
            Modifier::Static => "static",
            Modifier::Async => "async",
            Modifier::Virtual => "virtual",
            Modifier::Override => "override",
            Modifier::Abstract => "abstract",
            Modifier::Sealed => "sealed",
            Modifier::Readonly => "readonly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub span: Span,
    #[serde(default)]
    pub modifier: Option<ParameterModifier>,
    pub ty: Node,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterModifier {
    Out,
    Ref,
    In,
    Params,
}

impl ParameterModifier {
    pub fn keyword(self) -> &'static str {
        match self {
            ParameterModifier::Out => "out",
            ParameterModifier::Ref => "ref",
            ParameterModifier::In => "in",
            ParameterModifier::Params => "params",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSyntax {
    pub span: Span,
    pub name: TypeName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeName {
    Predefined(PredefinedType),
    Named(String),
    Nullable(Box<TypeName>),
}

/// Types spelled with a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredefinedType {
    Bool,
    Byte,
    Char,
    Decimal,
    Double,
    Float,
    Int,
    Long,
    Object,
    Short,
    String,
    Void,
}

impl PredefinedType {
    pub fn keyword(self) -> &'static str {
        match self {
            PredefinedType::Bool => "bool",
            PredefinedType::Byte => "byte",
            PredefinedType::Char => "char",
            PredefinedType::Decimal => "decimal",
            PredefinedType::Double => "double",
            PredefinedType::Float => "float",
            PredefinedType::Int => "int",
            PredefinedType::Long => "long",
            PredefinedType::Object => "object",
            PredefinedType::Short => "short",
            PredefinedType::String => "string",
            PredefinedType::Void => "void",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub span: Span,
    #[serde(default)]
    pub statements: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfStatement {
    pub span: Span,
    pub condition: Node,
    pub then_branch: Node,
    #[serde(default)]
    pub else_branch: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub span: Span,
    #[serde(default)]
    pub value: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub span: Span,
    pub expression: Node,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDeclaration {
    pub span: Span,
    pub ty: Node,
    pub name: String,
    #[serde(default)]
    pub initializer: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryStatement {
    pub span: Span,
    pub block: Node,
    #[serde(default)]
    pub catches: Vec<Node>,
    #[serde(default)]
    pub finally: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchClause {
    pub span: Span,
    #[serde(default)]
    pub exception_type: Option<Node>,
    #[serde(default)]
    pub identifier: Option<String>,
    pub block: Node,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub span: Span,
    pub operator: BinaryOperator,
    pub left: Node,
    pub right: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOperator {
    pub fn token(self) -> &'static str {
        match self {
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
        }
    }
}

/// `expression is pattern`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsPatternExpression {
    pub span: Span,
    pub expression: Node,
    pub pattern: Node,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantPattern {
    pub span: Span,
    pub value: Node,
}

/// `not pattern`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotPattern {
    pub span: Span,
    pub pattern: Node,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentExpression {
    pub span: Span,
    pub target: Node,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCreationExpression {
    pub span: Span,
    pub ty: Node,
    #[serde(default)]
    pub arguments: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationExpression {
    pub span: Span,
    pub callee: Node,
    #[serde(default)]
    pub arguments: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAccessExpression {
    pub span: Span,
    pub target: Node,
    pub member: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub span: Span,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub span: Span,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralValue {
    Null,
    Default,
    Bool(bool),
    Int(i64),
    String(String),
}

/// Expands to a match over every variant, binding the payload to `$inner`.
macro_rules! each_variant {
    ($node:expr, $inner:ident => $body:expr) => {
        match $node {
            SyntaxNode::CompilationUnit($inner) => $body,
            SyntaxNode::Namespace($inner) => $body,
            SyntaxNode::Class($inner) => $body,
            SyntaxNode::Method($inner) => $body,
            SyntaxNode::Parameter($inner) => $body,
            SyntaxNode::Type($inner) => $body,
            SyntaxNode::Block($inner) => $body,
            SyntaxNode::If($inner) => $body,
            SyntaxNode::Return($inner) => $body,
            SyntaxNode::ExpressionStatement($inner) => $body,
            SyntaxNode::LocalDeclaration($inner) => $body,
            SyntaxNode::Try($inner) => $body,
            SyntaxNode::Catch($inner) => $body,
            SyntaxNode::Binary($inner) => $body,
            SyntaxNode::IsPattern($inner) => $body,
            SyntaxNode::ConstantPattern($inner) => $body,
            SyntaxNode::NotPattern($inner) => $body,
            SyntaxNode::Assignment($inner) => $body,
            SyntaxNode::ObjectCreation($inner) => $body,
            SyntaxNode::Invocation($inner) => $body,
            SyntaxNode::MemberAccess($inner) => $body,
            SyntaxNode::Identifier($inner) => $body,
            SyntaxNode::Literal($inner) => $body,
        }
    };
}

impl SyntaxNode {
    pub fn span(&self) -> Span {
        each_variant!(self, inner => inner.span)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            SyntaxNode::CompilationUnit(_) => NodeKind::CompilationUnit,
            SyntaxNode::Namespace(_) => NodeKind::Namespace,
            SyntaxNode::Class(_) => NodeKind::Class,
            SyntaxNode::Method(_) => NodeKind::Method,
            SyntaxNode::Parameter(_) => NodeKind::Parameter,
            SyntaxNode::Type(_) => NodeKind::Type,
            SyntaxNode::Block(_) => NodeKind::Block,
            SyntaxNode::If(_) => NodeKind::If,
            SyntaxNode::Return(_) => NodeKind::Return,
            SyntaxNode::ExpressionStatement(_) => NodeKind::ExpressionStatement,
            SyntaxNode::LocalDeclaration(_) => NodeKind::LocalDeclaration,
            SyntaxNode::Try(_) => NodeKind::Try,
            SyntaxNode::Catch(_) => NodeKind::Catch,
            SyntaxNode::Binary(_) => NodeKind::Binary,
            SyntaxNode::IsPattern(_) => NodeKind::IsPattern,
            SyntaxNode::ConstantPattern(_) => NodeKind::ConstantPattern,
            SyntaxNode::NotPattern(_) => NodeKind::NotPattern,
            SyntaxNode::Assignment(_) => NodeKind::Assignment,
            SyntaxNode::ObjectCreation(_) => NodeKind::ObjectCreation,
            SyntaxNode::Invocation(_) => NodeKind::Invocation,
            SyntaxNode::MemberAccess(_) => NodeKind::MemberAccess,
            SyntaxNode::Identifier(_) => NodeKind::Identifier,
            SyntaxNode::Literal(_) => NodeKind::Literal,
        }
    }

    pub fn category(&self) -> NodeCategory {
        self.kind().category()
    }

    /// Child nodes in source order
    pub fn children(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        match self {
            SyntaxNode::CompilationUnit(n) => out.extend(&n.members),
            SyntaxNode::Namespace(n) => out.extend(&n.members),
            SyntaxNode::Class(n) => out.extend(&n.members),
            SyntaxNode::Method(n) => {
                out.push(&n.return_type);
                out.extend(&n.parameters);
                out.push(&n.body);
            }
            SyntaxNode::Parameter(n) => out.push(&n.ty),
            SyntaxNode::Type(_) | SyntaxNode::Identifier(_) | SyntaxNode::Literal(_) => {}
            SyntaxNode::Block(n) => out.extend(&n.statements),
            SyntaxNode::If(n) => {
                out.push(&n.condition);
                out.push(&n.then_branch);
                out.extend(&n.else_branch);
            }
            SyntaxNode::Return(n) => out.extend(&n.value),
            SyntaxNode::ExpressionStatement(n) => out.push(&n.expression),
            SyntaxNode::LocalDeclaration(n) => {
                out.push(&n.ty);
                out.extend(&n.initializer);
            }
            SyntaxNode::Try(n) => {
                out.push(&n.block);
                out.extend(&n.catches);
                out.extend(&n.finally);
            }
            SyntaxNode::Catch(n) => {
                out.extend(&n.exception_type);
                out.push(&n.block);
            }
            SyntaxNode::Binary(n) => {
                out.push(&n.left);
                out.push(&n.right);
            }
            SyntaxNode::IsPattern(n) => {
                out.push(&n.expression);
                out.push(&n.pattern);
            }
            SyntaxNode::ConstantPattern(n) => out.push(&n.value),
            SyntaxNode::NotPattern(n) => out.push(&n.pattern),
            SyntaxNode::Assignment(n) => {
                out.push(&n.target);
                out.push(&n.value);
            }
            SyntaxNode::ObjectCreation(n) => {
                out.push(&n.ty);
                out.extend(&n.arguments);
            }
            SyntaxNode::Invocation(n) => {
                out.push(&n.callee);
                out.extend(&n.arguments);
            }
            SyntaxNode::MemberAccess(n) => out.push(&n.target),
        }
        out
    }

    /// Mutable child slots, in the same order as [`SyntaxNode::children`]
    fn child_slots_mut(&mut self) -> Vec<&mut Node> {
        let mut out = Vec::new();
        match self {
            SyntaxNode::CompilationUnit(n) => out.extend(&mut n.members),
            SyntaxNode::Namespace(n) => out.extend(&mut n.members),
            SyntaxNode::Class(n) => out.extend(&mut n.members),
            SyntaxNode::Method(n) => {
                out.push(&mut n.return_type);
                out.extend(&mut n.parameters);
                out.push(&mut n.body);
            }
            SyntaxNode::Parameter(n) => out.push(&mut n.ty),
            SyntaxNode::Type(_) | SyntaxNode::Identifier(_) | SyntaxNode::Literal(_) => {}
            SyntaxNode::Block(n) => out.extend(&mut n.statements),
            SyntaxNode::If(n) => {
                out.push(&mut n.condition);
                out.push(&mut n.then_branch);
                out.extend(&mut n.else_branch);
            }
            SyntaxNode::Return(n) => out.extend(&mut n.value),
            SyntaxNode::ExpressionStatement(n) => out.push(&mut n.expression),
            SyntaxNode::LocalDeclaration(n) => {
                out.push(&mut n.ty);
                out.extend(&mut n.initializer);
            }
            SyntaxNode::Try(n) => {
                out.push(&mut n.block);
                out.extend(&mut n.catches);
                out.extend(&mut n.finally);
            }
            SyntaxNode::Catch(n) => {
                out.extend(&mut n.exception_type);
                out.push(&mut n.block);
            }
            SyntaxNode::Binary(n) => {
                out.push(&mut n.left);
                out.push(&mut n.right);
            }
            SyntaxNode::IsPattern(n) => {
                out.push(&mut n.expression);
                out.push(&mut n.pattern);
            }
            SyntaxNode::ConstantPattern(n) => out.push(&mut n.value),
            SyntaxNode::NotPattern(n) => out.push(&mut n.pattern),
            SyntaxNode::Assignment(n) => {
                out.push(&mut n.target);
                out.push(&mut n.value);
            }
            SyntaxNode::ObjectCreation(n) => {
                out.push(&mut n.ty);
                out.extend(&mut n.arguments);
            }
            SyntaxNode::Invocation(n) => {
                out.push(&mut n.callee);
                out.extend(&mut n.arguments);
            }
            SyntaxNode::MemberAccess(n) => out.push(&mut n.target),
        }
        out
    }

    /// Shallow copy of this node with the child at `index` swapped for
    /// `child`. Every other child is shared with `self`.
    ///
    /// Returns `None` when `index` is out of range.
    pub fn with_child(&self, index: usize, child: Node) -> Option<SyntaxNode> {
        let mut copy = self.clone();
        let mut slots = copy.child_slots_mut();
        let slot = slots.get_mut(index)?;
        **slot = child;
        drop(slots);
        Some(copy)
    }

    /// Convenience for `Arc::new(self)`
    pub fn into_node(self) -> Node {
        Arc::new(self)
    }
}

/// A node whose span breaks the containment or sibling rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanViolation {
    #[error("{kind:?} has an inverted span {start}..{end}")]
    Inverted { kind: NodeKind, start: u32, end: u32 },

    #[error("{child:?} at {child_span} escapes its parent {parent:?} at {parent_span}")]
    Escapes {
        parent: NodeKind,
        parent_span: Span,
        child: NodeKind,
        child_span: Span,
    },

    #[error("{first:?} at {first_span} overlaps its sibling {second:?} at {second_span}")]
    Overlap {
        first: NodeKind,
        first_span: Span,
        second: NodeKind,
        second_span: Span,
    },
}

/// Check that no span ends before it starts, that every child span is
/// within its parent's span and that sibling spans do not overlap,
/// reporting the first violation found.
///
/// Spans read from JSON bypass [`Span::new`], so this is the only place an
/// inverted span is caught.
pub fn validate_spans(root: &Node) -> Result<(), SpanViolation> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let parent_span = node.span();
        if parent_span.start > parent_span.end {
            return Err(SpanViolation::Inverted {
                kind: node.kind(),
                start: parent_span.start,
                end: parent_span.end,
            });
        }
        let children = node.children();
        for (i, child) in children.iter().enumerate() {
            if !parent_span.contains(child.span()) {
                return Err(SpanViolation::Escapes {
                    parent: node.kind(),
                    parent_span,
                    child: child.kind(),
                    child_span: child.span(),
                });
            }
            if let Some(next) = children.get(i + 1) {
                if child.span().overlaps(next.span()) {
                    return Err(SpanViolation::Overlap {
                        first: child.kind(),
                        first_span: child.span(),
                        second: next.kind(),
                        second_span: next.span(),
                    });
                }
            }
        }
        stack.extend(children.into_iter().rev());
    }
    Ok(())
}
