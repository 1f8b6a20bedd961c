//! Type information supplied by the external binder
//!
//! Rules never resolve types themselves; they ask a [`TypeOracle`] for the
//! static type classification of an expression node. The oracle answers
//! with the *converted* type of the expression, so a `null` literal compared
//! against an `int?` is reported as a value type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::span::Span;
use crate::tree::SyntaxNode;

/// Static type classification of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFact {
    Known { is_value_type: bool },
    Unknown,
}

impl TypeFact {
    pub const VALUE: TypeFact = TypeFact::Known { is_value_type: true };
    pub const REFERENCE: TypeFact = TypeFact::Known { is_value_type: false };

    pub fn is_value_type(self) -> bool {
        matches!(self, TypeFact::Known { is_value_type: true })
    }

    pub fn is_known(self) -> bool {
        !matches!(self, TypeFact::Unknown)
    }
}

/// Resolves the static type of expression nodes
pub trait TypeOracle: Send + Sync {
    fn type_of(&self, node: &SyntaxNode) -> TypeFact;
}

impl<F> TypeOracle for F
where
    F: Fn(&SyntaxNode) -> TypeFact + Send + Sync,
{
    fn type_of(&self, node: &SyntaxNode) -> TypeFact {
        self(node)
    }
}

/// Oracle for trees that come without any binding information
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypeInfo;

impl TypeOracle for NoTypeInfo {
    fn type_of(&self, _node: &SyntaxNode) -> TypeFact {
        TypeFact::Unknown
    }
}

/// One binder record: the type fact for the expression at `span`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub span: Span,
    pub fact: TypeFact,
}

/// Type facts keyed by expression span.
///
/// Spans survive substitution for every node a rewrite carries over, so a
/// table built for the original tree keeps answering for the fixed one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TypeEntry>", into = "Vec<TypeEntry>")]
pub struct TypeTable {
    facts: HashMap<Span, TypeFact>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, span: Span, fact: TypeFact) {
        self.facts.insert(span, fact);
    }

    pub fn with(mut self, span: Span, fact: TypeFact) -> Self {
        self.insert(span, fact);
        self
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl From<Vec<TypeEntry>> for TypeTable {
    fn from(entries: Vec<TypeEntry>) -> Self {
        Self {
            facts: entries.into_iter().map(|e| (e.span, e.fact)).collect(),
        }
    }
}

impl From<TypeTable> for Vec<TypeEntry> {
    fn from(table: TypeTable) -> Self {
        let mut entries: Vec<TypeEntry> = table
            .facts
            .into_iter()
            .map(|(span, fact)| TypeEntry { span, fact })
            .collect();
        entries.sort_by_key(|e| e.span);
        entries
    }
}

impl TypeOracle for TypeTable {
    fn type_of(&self, node: &SyntaxNode) -> TypeFact {
        self.facts
            .get(&node.span())
            .copied()
            .unwrap_or(TypeFact::Unknown)
    }
}
