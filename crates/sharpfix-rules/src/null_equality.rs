//! Rule: Convert value-type equality comparisons to pattern syntax
//!
//! Example:
//! ```csharp
//! // Before
//! if (val == null) { }
//! if (val != null) { }
//!
//! // After
//! if (val is null) { }
//! if (val is not null) { }
//! ```
//!
//! Only comparisons whose operands both resolve to value types are reported.
//! If either operand's type is unknown the comparison is skipped.

use sharpfix_core::tree::{BinaryExpression, BinaryOperator};
use sharpfix_core::{make, Node, NodeKind, Span, SyntaxNode, TypeOracle};
use tracing::debug;

use crate::error::RuleError;
use crate::registry::Rule;

pub const RULE_ID: &str = "NullEqualityAnalyzer";

pub struct NullEqualityRule;

impl Rule for NullEqualityRule {
    fn id(&self) -> &'static str {
        RULE_ID
    }

    fn title(&self) -> &'static str {
        "Equality comparison on a value type"
    }

    fn message(&self) -> &'static str {
        "Comparing with == or != where a pattern would do"
    }

    fn description(&self) -> &'static str {
        "Use `is` / `is not` patterns instead of == / != on value types"
    }

    fn target_kind(&self) -> NodeKind {
        NodeKind::Binary
    }

    fn check(&self, node: &SyntaxNode, oracle: &dyn TypeOracle) -> Option<Span> {
        let SyntaxNode::Binary(binary) = node else {
            return None;
        };
        if !matches!(
            binary.operator,
            BinaryOperator::Equals | BinaryOperator::NotEquals
        ) {
            return None;
        }

        let left = oracle.type_of(&binary.left);
        let right = oracle.type_of(&binary.right);
        if !left.is_known() || !right.is_known() {
            debug!(span = %binary.span, "skipping comparison with unresolved operand type");
            return None;
        }
        if !left.is_value_type() || !right.is_value_type() {
            return None;
        }

        Some(binary.span)
    }

    fn synthesize(&self, node: &Node) -> Result<Node, RuleError> {
        match node.as_ref() {
            SyntaxNode::Binary(binary) => pattern_for(binary),
            other => Err(RuleError::UnexpectedNode {
                rule: RULE_ID,
                expected: NodeKind::Binary,
                found: other.kind(),
            }),
        }
    }
}

/// `a == b` becomes `a is b`, `a != b` becomes `a is not b`
fn pattern_for(binary: &BinaryExpression) -> Result<Node, RuleError> {
    let right_span = binary.right.span();
    let constant = make::constant_pattern(right_span, binary.right.clone());
    let pattern = match binary.operator {
        BinaryOperator::Equals => constant,
        BinaryOperator::NotEquals => make::not_pattern(right_span, constant),
        _ => {
            return Err(RuleError::UnsupportedShape {
                rule: RULE_ID,
                span: binary.span,
                reason: "only == and != comparisons can become patterns",
            })
        }
    };
    Ok(make::is_pattern(binary.span, binary.left.clone(), pattern))
}
