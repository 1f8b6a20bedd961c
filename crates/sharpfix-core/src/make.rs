//! Node factory
//!
//! Small constructors used by rewrite rules to synthesize replacement
//! subtrees, and by tests to build input trees.

use crate::span::Span;
use crate::tree::*;

pub fn compilation_unit(span: Span, members: Vec<Node>) -> Node {
    SyntaxNode::CompilationUnit(CompilationUnit { span, members }).into_node()
}

pub fn namespace(span: Span, name: impl Into<String>, members: Vec<Node>) -> Node {
    SyntaxNode::Namespace(NamespaceDeclaration {
        span,
        name: name.into(),
        members,
    })
    .into_node()
}

pub fn class(span: Span, modifiers: Vec<Modifier>, name: impl Into<String>, members: Vec<Node>) -> Node {
    SyntaxNode::Class(ClassDeclaration {
        span,
        modifiers,
        name: name.into(),
        members,
    })
    .into_node()
}

pub fn method(
    span: Span,
    modifiers: Vec<Modifier>,
    return_type: Node,
    name: impl Into<String>,
    parameters: Vec<Node>,
    body: Node,
) -> Node {
    SyntaxNode::Method(MethodDeclaration {
        span,
        modifiers,
        return_type,
        name: name.into(),
        parameters,
        body,
    })
    .into_node()
}

pub fn parameter(
    span: Span,
    modifier: Option<ParameterModifier>,
    ty: Node,
    name: impl Into<String>,
) -> Node {
    SyntaxNode::Parameter(Parameter {
        span,
        modifier,
        ty,
        name: name.into(),
    })
    .into_node()
}

pub fn type_syntax(span: Span, name: TypeName) -> Node {
    SyntaxNode::Type(TypeSyntax { span, name }).into_node()
}

pub fn predefined_type(span: Span, ty: PredefinedType) -> Node {
    type_syntax(span, TypeName::Predefined(ty))
}

pub fn named_type(span: Span, name: impl Into<String>) -> Node {
    type_syntax(span, TypeName::Named(name.into()))
}

pub fn block(span: Span, statements: Vec<Node>) -> Node {
    SyntaxNode::Block(Block { span, statements }).into_node()
}

pub fn if_statement(span: Span, condition: Node, then_branch: Node, else_branch: Option<Node>) -> Node {
    SyntaxNode::If(IfStatement {
        span,
        condition,
        then_branch,
        else_branch,
    })
    .into_node()
}

pub fn return_statement(span: Span, value: Option<Node>) -> Node {
    SyntaxNode::Return(ReturnStatement { span, value }).into_node()
}

pub fn expression_statement(span: Span, expression: Node) -> Node {
    SyntaxNode::ExpressionStatement(ExpressionStatement { span, expression }).into_node()
}

pub fn local_declaration(span: Span, ty: Node, name: impl Into<String>, initializer: Option<Node>) -> Node {
    SyntaxNode::LocalDeclaration(LocalDeclaration {
        span,
        ty,
        name: name.into(),
        initializer,
    })
    .into_node()
}

pub fn try_statement(span: Span, block: Node, catches: Vec<Node>) -> Node {
    SyntaxNode::Try(TryStatement {
        span,
        block,
        catches,
        finally: None,
    })
    .into_node()
}

pub fn catch_clause(
    span: Span,
    exception_type: Option<Node>,
    identifier: Option<&str>,
    block: Node,
) -> Node {
    SyntaxNode::Catch(CatchClause {
        span,
        exception_type,
        identifier: identifier.map(str::to_string),
        block,
    })
    .into_node()
}

pub fn binary(span: Span, operator: BinaryOperator, left: Node, right: Node) -> Node {
    SyntaxNode::Binary(BinaryExpression {
        span,
        operator,
        left,
        right,
    })
    .into_node()
}

pub fn is_pattern(span: Span, expression: Node, pattern: Node) -> Node {
    SyntaxNode::IsPattern(IsPatternExpression {
        span,
        expression,
        pattern,
    })
    .into_node()
}

pub fn constant_pattern(span: Span, value: Node) -> Node {
    SyntaxNode::ConstantPattern(ConstantPattern { span, value }).into_node()
}

pub fn not_pattern(span: Span, pattern: Node) -> Node {
    SyntaxNode::NotPattern(NotPattern { span, pattern }).into_node()
}

pub fn assignment(span: Span, target: Node, value: Node) -> Node {
    SyntaxNode::Assignment(AssignmentExpression { span, target, value }).into_node()
}

pub fn object_creation(span: Span, ty: Node, arguments: Vec<Node>) -> Node {
    SyntaxNode::ObjectCreation(ObjectCreationExpression { span, ty, arguments }).into_node()
}

pub fn invocation(span: Span, callee: Node, arguments: Vec<Node>) -> Node {
    SyntaxNode::Invocation(InvocationExpression {
        span,
        callee,
        arguments,
    })
    .into_node()
}

pub fn member_access(span: Span, target: Node, member: impl Into<String>) -> Node {
    SyntaxNode::MemberAccess(MemberAccessExpression {
        span,
        target,
        member: member.into(),
    })
    .into_node()
}

pub fn identifier(span: Span, name: impl Into<String>) -> Node {
    SyntaxNode::Identifier(Identifier {
        span,
        name: name.into(),
    })
    .into_node()
}

pub fn literal(span: Span, value: LiteralValue) -> Node {
    SyntaxNode::Literal(Literal { span, value }).into_node()
}

pub fn null_literal(span: Span) -> Node {
    literal(span, LiteralValue::Null)
}

pub fn default_literal(span: Span) -> Node {
    literal(span, LiteralValue::Default)
}

pub fn bool_literal(span: Span, value: bool) -> Node {
    literal(span, LiteralValue::Bool(value))
}

pub fn int_literal(span: Span, value: i64) -> Node {
    literal(span, LiteralValue::Int(value))
}
