//! Compact single-line rendering of syntax trees
//!
//! Used for log messages, CLI previews and test assertions. The layout is
//! fixed (one space between tokens, no line breaks); turning a tree back
//! into formatted source is left to a real printer.

use std::fmt::{self, Display, Formatter};

use crate::tree::*;

fn join(f: &mut Formatter<'_>, nodes: &[Node], sep: &str) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

fn braced(f: &mut Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    if nodes.is_empty() {
        return f.write_str("{ }");
    }
    f.write_str("{ ")?;
    join(f, nodes, " ")?;
    f.write_str(" }")
}

/// Operands that are themselves comparisons or patterns are parenthesized,
/// so `(a == b) != c` does not read as `a == b != c`.
fn operand(f: &mut Formatter<'_>, node: &Node) -> fmt::Result {
    match node.as_ref() {
        SyntaxNode::Binary(_) | SyntaxNode::IsPattern(_) => write!(f, "({})", node),
        _ => write!(f, "{}", node),
    }
}

fn modifiers(f: &mut Formatter<'_>, modifiers: &[Modifier]) -> fmt::Result {
    for modifier in modifiers {
        write!(f, "{} ", modifier.keyword())?;
    }
    Ok(())
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Predefined(ty) => f.write_str(ty.keyword()),
            TypeName::Named(name) => f.write_str(name),
            TypeName::Nullable(inner) => write!(f, "{}?", inner),
        }
    }
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Null => f.write_str("null"),
            LiteralValue::Default => f.write_str("default"),
            LiteralValue::Bool(value) => write!(f, "{}", value),
            LiteralValue::Int(value) => write!(f, "{}", value),
            LiteralValue::String(value) => write!(f, "{:?}", value),
        }
    }
}

impl Display for SyntaxNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxNode::CompilationUnit(n) => join(f, &n.members, " "),
            SyntaxNode::Namespace(n) => {
                write!(f, "namespace {} ", n.name)?;
                braced(f, &n.members)
            }
            SyntaxNode::Class(n) => {
                modifiers(f, &n.modifiers)?;
                write!(f, "class {} ", n.name)?;
                braced(f, &n.members)
            }
            SyntaxNode::Method(n) => {
                modifiers(f, &n.modifiers)?;
                write!(f, "{} {}(", n.return_type, n.name)?;
                join(f, &n.parameters, ", ")?;
                write!(f, ") {}", n.body)
            }
            SyntaxNode::Parameter(n) => {
                if let Some(modifier) = n.modifier {
                    write!(f, "{} ", modifier.keyword())?;
                }
                write!(f, "{} {}", n.ty, n.name)
            }
            SyntaxNode::Type(n) => write!(f, "{}", n.name),
            SyntaxNode::Block(n) => braced(f, &n.statements),
            SyntaxNode::If(n) => {
                write!(f, "if ({}) {}", n.condition, n.then_branch)?;
                if let Some(else_branch) = &n.else_branch {
                    write!(f, " else {}", else_branch)?;
                }
                Ok(())
            }
            SyntaxNode::Return(n) => match &n.value {
                Some(value) => write!(f, "return {};", value),
                None => f.write_str("return;"),
            },
            SyntaxNode::ExpressionStatement(n) => write!(f, "{};", n.expression),
            SyntaxNode::LocalDeclaration(n) => {
                write!(f, "{} {}", n.ty, n.name)?;
                if let Some(init) = &n.initializer {
                    write!(f, " = {}", init)?;
                }
                f.write_str(";")
            }
            SyntaxNode::Try(n) => {
                write!(f, "try {}", n.block)?;
                for catch in &n.catches {
                    write!(f, " {}", catch)?;
                }
                if let Some(finally) = &n.finally {
                    write!(f, " finally {}", finally)?;
                }
                Ok(())
            }
            SyntaxNode::Catch(n) => {
                f.write_str("catch ")?;
                match (&n.exception_type, &n.identifier) {
                    (Some(ty), Some(ident)) => write!(f, "({} {}) ", ty, ident)?,
                    (Some(ty), None) => write!(f, "({}) ", ty)?,
                    _ => {}
                }
                write!(f, "{}", n.block)
            }
            SyntaxNode::Binary(n) => {
                operand(f, &n.left)?;
                write!(f, " {} ", n.operator.token())?;
                operand(f, &n.right)
            }
            SyntaxNode::IsPattern(n) => {
                operand(f, &n.expression)?;
                write!(f, " is {}", n.pattern)
            }
            SyntaxNode::ConstantPattern(n) => operand(f, &n.value),
            SyntaxNode::NotPattern(n) => write!(f, "not {}", n.pattern),
            SyntaxNode::Assignment(n) => write!(f, "{} = {}", n.target, n.value),
            SyntaxNode::ObjectCreation(n) => {
                write!(f, "new {}(", n.ty)?;
                join(f, &n.arguments, ", ")?;
                f.write_str(")")
            }
            SyntaxNode::Invocation(n) => {
                write!(f, "{}(", n.callee)?;
                join(f, &n.arguments, ", ")?;
                f.write_str(")")
            }
            SyntaxNode::MemberAccess(n) => write!(f, "{}.{}", n.target, n.member),
            SyntaxNode::Identifier(n) => f.write_str(&n.name),
            SyntaxNode::Literal(n) => write!(f, "{}", n.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::make;
    use crate::span::Span;
    use crate::tree::*;

    fn sp() -> Span {
        Span::point(0)
    }

    #[test]
    fn test_render_if_with_comparison() {
        let stmt = make::if_statement(
            sp(),
            make::binary(
                sp(),
                BinaryOperator::NotEquals,
                make::identifier(sp(), "val"),
                make::null_literal(sp()),
            ),
            make::block(sp(), vec![]),
            None,
        );
        assert_eq!(stmt.to_string(), "if (val != null) { }");
    }

    #[test]
    fn test_render_negated_pattern() {
        let expr = make::is_pattern(
            sp(),
            make::identifier(sp(), "val"),
            make::not_pattern(sp(), make::constant_pattern(sp(), make::null_literal(sp()))),
        );
        assert_eq!(expr.to_string(), "val is not null");
    }

    #[test]
    fn test_render_method() {
        let method = make::method(
            sp(),
            vec![Modifier::Public, Modifier::Static],
            make::named_type(sp(), "Student"),
            "TryGetValue",
            vec![make::parameter(
                sp(),
                Some(ParameterModifier::Out),
                make::type_syntax(sp(), TypeName::Nullable(Box::new(TypeName::Predefined(PredefinedType::Int)))),
                "value",
            )],
            make::block(
                sp(),
                vec![make::return_statement(
                    sp(),
                    Some(make::object_creation(sp(), make::named_type(sp(), "Student"), vec![])),
                )],
            ),
        );
        assert_eq!(
            method.to_string(),
            "public static Student TryGetValue(out int? value) { return new Student(); }"
        );
    }

    #[test]
    fn test_render_try_catch() {
        let stmt = make::try_statement(
            sp(),
            make::block(sp(), vec![make::return_statement(sp(), Some(make::bool_literal(sp(), true)))]),
            vec![make::catch_clause(
                sp(),
                Some(make::named_type(sp(), "Exception")),
                Some("e"),
                make::block(sp(), vec![make::return_statement(sp(), Some(make::bool_literal(sp(), false)))]),
            )],
        );
        assert_eq!(
            stmt.to_string(),
            "try { return true; } catch (Exception e) { return false; }"
        );
    }

    #[test]
    fn test_render_nested_comparison_is_parenthesized() {
        // (a == b) != c
        let expr = make::binary(
            sp(),
            BinaryOperator::NotEquals,
            make::binary(
                sp(),
                BinaryOperator::Equals,
                make::identifier(sp(), "a"),
                make::identifier(sp(), "b"),
            ),
            make::identifier(sp(), "c"),
        );
        assert_eq!(expr.to_string(), "(a == b) != c");

        let fixed = make::is_pattern(
            sp(),
            make::binary(
                sp(),
                BinaryOperator::Equals,
                make::identifier(sp(), "a"),
                make::identifier(sp(), "b"),
            ),
            make::not_pattern(sp(), make::constant_pattern(sp(), make::identifier(sp(), "c"))),
        );
        assert_eq!(fixed.to_string(), "(a == b) is not c");
    }

    #[test]
    fn test_render_pattern_operand_is_parenthesized() {
        let expr = make::binary(
            sp(),
            BinaryOperator::LogicalAnd,
            make::identifier(sp(), "ok"),
            make::is_pattern(
                sp(),
                make::identifier(sp(), "val"),
                make::constant_pattern(sp(), make::null_literal(sp())),
            ),
        );
        assert_eq!(expr.to_string(), "ok && (val is null)");
    }

    #[test]
    fn test_render_declarations() {
        let unit = make::namespace(
            sp(),
            "School",
            vec![make::class(
                sp(),
                vec![Modifier::Public],
                "Registry",
                vec![make::method(
                    sp(),
                    vec![],
                    make::predefined_type(sp(), PredefinedType::Void),
                    "Load",
                    vec![],
                    make::block(
                        sp(),
                        vec![make::local_declaration(
                            sp(),
                            make::predefined_type(sp(), PredefinedType::Int),
                            "count",
                            Some(make::member_access(sp(), make::identifier(sp(), "items"), "Count")),
                        )],
                    ),
                )],
            )],
        );
        assert_eq!(
            unit.to_string(),
            "namespace School { public class Registry { void Load() { int count = items.Count; } } }"
        );
    }
}
