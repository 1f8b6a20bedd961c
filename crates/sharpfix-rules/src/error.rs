//! Errors raised while building or applying fixes

use sharpfix_core::{NodeKind, Span, SubstituteError};
use thiserror::Error;

/// Errors a rule's rewrite can raise
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The matched node has a shape the rewrite does not know how to fix
    #[error("{rule}: cannot fix node at {span}: {reason}")]
    UnsupportedShape {
        rule: &'static str,
        span: Span,
        reason: &'static str,
    },

    /// The rewrite was handed a node its matcher never reports
    #[error("{rule}: expected a {expected:?} node, got {found:?}")]
    UnexpectedNode {
        rule: &'static str,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error(transparent)]
    Substitute(#[from] SubstituteError),
}

/// Errors returned by the rule pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Substitute(#[from] SubstituteError),
}
