//! Rule: `Try*` methods return `bool` and hand their result out through an
//! `out` parameter
//!
//! Example:
//! ```csharp
//! // Before
//! public static Student TryGetValue()
//! {
//!     if (num == 1) { return new Student(); }
//!     return new Student();
//! }
//!
//! // After
//! public static bool TryGetValue(out Student value)
//! {
//!     value = default;
//!     try
//!     {
//!         if (num == 1) { value = new Student(); }
//!         value = new Student();
//!         return true;
//!     }
//!     catch (Exception e)
//!     {
//!         return false;
//!     }
//! }
//! ```
//!
//! Any method whose name starts with `Try` (including `Try` itself) and whose
//! declared return type is not the `bool` keyword is reported.
//!
//! Known limitation: when an if-block holds several returns, only the last
//! one is turned into an assignment.

use sharpfix_core::tree::{
    Block, IfStatement, MethodDeclaration, ParameterModifier, PredefinedType, ReturnStatement,
    TypeName,
};
use sharpfix_core::{make, substitute, Node, NodeKind, Span, SyntaxNode, TypeOracle};
use tracing::debug;

use crate::error::RuleError;
use crate::registry::{Category, Rule};

pub const RULE_ID: &str = "TryReturnTypeAnalyzer";

/// Name of the synthesized out-parameter
pub const OUT_PARAMETER: &str = "value";

const CAUGHT_EXCEPTION_TYPE: &str = "Exception";
const CAUGHT_EXCEPTION_NAME: &str = "e";

pub struct TryMethodRule;

impl Rule for TryMethodRule {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn title(&self) -> &'static str {
        "Try method does not return bool"
    }

    fn message(&self) -> &'static str {
        "Methods named Try* should report success as bool"
    }

    fn description(&self) -> &'static str {
        "Return bool and pass the result through an out parameter"
    }

    fn category(&self) -> Category {
        Category::Design
    }

    fn target_kind(&self) -> NodeKind {
        NodeKind::Method
    }

    fn check(&self, node: &SyntaxNode, _oracle: &dyn TypeOracle) -> Option<Span> {
        let SyntaxNode::Method(method) = node else {
            return None;
        };
        if !method.name.starts_with("Try") || returns_bool(method) {
            return None;
        }
        Some(method.span)
    }

    fn synthesize(&self, node: &Node) -> Result<Node, RuleError> {
        match node.as_ref() {
            SyntaxNode::Method(method) => rewrite_method(method),
            other => Err(RuleError::UnexpectedNode {
                rule: RULE_ID,
                expected: NodeKind::Method,
                found: other.kind(),
            }),
        }
    }
}

fn returns_bool(method: &MethodDeclaration) -> bool {
    matches!(
        method.return_type.as_ref(),
        SyntaxNode::Type(ty) if ty.name == TypeName::Predefined(PredefinedType::Bool)
    )
}

fn unsupported(span: Span, reason: &'static str) -> RuleError {
    RuleError::UnsupportedShape {
        rule: RULE_ID,
        span,
        reason,
    }
}

fn rewrite_method(method: &MethodDeclaration) -> Result<Node, RuleError> {
    let SyntaxNode::Block(body) = method.body.as_ref() else {
        return Err(unsupported(method.span, "method body is not a block"));
    };
    let SyntaxNode::Type(original_type) = method.return_type.as_ref() else {
        return Err(unsupported(method.span, "return type is not a type"));
    };

    // The out-parameter goes after the last parameter and owns no text yet.
    let out_at = Span::point(
        method
            .parameters
            .last()
            .map_or(method.return_type.span().end, |p| p.span().end),
    );
    let mut parameters = method.parameters.clone();
    parameters.push(make::parameter(
        out_at,
        Some(ParameterModifier::Out),
        make::type_syntax(out_at, original_type.name.clone()),
        OUT_PARAMETER,
    ));

    let rewritten = make::method(
        method.span,
        method.modifiers.clone(),
        make::predefined_type(method.return_type.span(), PredefinedType::Bool),
        method.name.clone(),
        parameters,
        rewrite_body(body)?,
    );
    debug!(method = %method.name, span = %method.span, "rewrote Try method signature");
    Ok(rewritten)
}

/// `{ value = default; try { <body>; return true; } catch (Exception e) { return false; } }`
fn rewrite_body(body: &Block) -> Result<Node, RuleError> {
    let start = Span::point(body.span.start);
    let end = Span::point(body.span.end);

    let mut statements = body
        .statements
        .iter()
        .map(rewrite_statement)
        .collect::<Result<Vec<_>, _>>()?;
    statements.push(make::return_statement(end, Some(make::bool_literal(end, true))));

    let initialize = make::expression_statement(
        start,
        make::assignment(
            start,
            make::identifier(start, OUT_PARAMETER),
            make::default_literal(start),
        ),
    );
    let catch = make::catch_clause(
        end,
        Some(make::named_type(end, CAUGHT_EXCEPTION_TYPE)),
        Some(CAUGHT_EXCEPTION_NAME),
        make::block(
            end,
            vec![make::return_statement(end, Some(make::bool_literal(end, false)))],
        ),
    );
    let guarded = make::try_statement(body.span, make::block(body.span, statements), vec![catch]);

    Ok(make::block(body.span, vec![initialize, guarded]))
}

fn rewrite_statement(statement: &Node) -> Result<Node, RuleError> {
    match statement.as_ref() {
        SyntaxNode::Return(ret) => assign_returned(ret),
        SyntaxNode::If(if_stmt) => rewrite_if(statement, if_stmt),
        _ => Ok(statement.clone()),
    }
}

/// `return <expr>;` becomes `value = <expr>;`
fn assign_returned(ret: &ReturnStatement) -> Result<Node, RuleError> {
    let value = ret
        .value
        .clone()
        .ok_or_else(|| unsupported(ret.span, "return without a value"))?;
    Ok(make::expression_statement(
        ret.span,
        make::assignment(
            ret.span,
            make::identifier(Span::point(ret.span.start), OUT_PARAMETER),
            value,
        ),
    ))
}

/// Rewrite the last return of the if's then-block; everything else in the
/// statement is shared with the original.
fn rewrite_if(statement: &Node, if_stmt: &IfStatement) -> Result<Node, RuleError> {
    let returned = match if_stmt.then_branch.as_ref() {
        SyntaxNode::Block(block) => block.statements.iter().rev().find_map(|s| match s.as_ref() {
            SyntaxNode::Return(ret) => Some((s, ret)),
            _ => None,
        }),
        SyntaxNode::Return(ret) => Some((&if_stmt.then_branch, ret)),
        _ => None,
    };
    let Some((return_node, ret)) = returned else {
        return Ok(statement.clone());
    };

    let assignment = assign_returned(ret)?;
    Ok(substitute(statement, return_node, assignment)?)
}
