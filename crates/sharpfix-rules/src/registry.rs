//! Rule trait and registry for sharpfix lint rules

use serde::{Deserialize, Serialize};
use sharpfix_core::{Node, NodeKind, PreOrder, Span, SyntaxNode, TypeOracle};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use crate::error::RuleError;

/// Rule category for grouping and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Idiomatic use of language constructs
    Usage,
    /// Naming and API-shape conventions
    Design,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Usage => write!(f, "usage"),
            Category::Design => write!(f, "design"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A reported rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub span: Span,
    pub message: String,
    pub severity: Severity,
}

/// A lint rule: a matcher predicate plus the rewrite that fixes a match
pub trait Rule: Send + Sync {
    /// The unique identifier for this rule (e.g., "NullEqualityAnalyzer")
    fn id(&self) -> &'static str;

    /// Short human-readable title
    fn title(&self) -> &'static str;

    /// Message attached to every finding
    fn message(&self) -> &'static str;

    /// A short description of how to fix the violation
    fn description(&self) -> &'static str;

    fn category(&self) -> Category {
        Category::Usage
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// The kind of node this rule matches and rewrites
    fn target_kind(&self) -> NodeKind;

    /// Decide whether `node` violates the rule, returning the span to report
    fn check(&self, node: &SyntaxNode, oracle: &dyn TypeOracle) -> Option<Span>;

    /// Build the replacement for a node this rule matched
    fn synthesize(&self, node: &Node) -> Result<Node, RuleError>;
}

/// Lazily scan `root` with one rule, yielding findings in pre-order.
///
/// The returned iterator holds its own handle to the tree; calling `scan`
/// again on the same tree yields the same findings.
pub fn scan<'a>(
    rule: &'a dyn Rule,
    root: &Node,
    oracle: &'a dyn TypeOracle,
) -> impl Iterator<Item = Finding> + 'a {
    let kind = rule.target_kind();
    PreOrder::new(root)
        .filter(move |node| node.kind() == kind)
        .filter_map(move |node| {
            let span = rule.check(&node, oracle)?;
            debug!(rule = rule.id(), %span, "rule matched");
            Some(Finding {
                rule_id: rule.id().to_string(),
                span,
                message: rule.message().to_string(),
                severity: rule.severity(),
            })
        })
}

/// Ordered registry of rules. Registration order is report order.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(Box::new(crate::null_equality::NullEqualityRule));
        registry.register(Box::new(crate::try_method::TryMethodRule));

        registry
    }

    /// Create a registry with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a registry with the built-in rules whose ids are in `enabled`
    pub fn with_enabled(enabled: &HashSet<String>) -> Self {
        let mut registry = Self::new();
        registry.rules.retain(|r| enabled.contains(r.id()));
        registry
    }

    /// Register a new rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Get all rule ids
    pub fn all_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.rules.iter().find(|r| r.id() == id).map(|r| r.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Get all rules with their titles and descriptions (for --list-rules)
    pub fn list_rules(&self) -> Vec<(&'static str, &'static str, &'static str)> {
        self.rules
            .iter()
            .map(|r| (r.id(), r.title(), r.description()))
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
