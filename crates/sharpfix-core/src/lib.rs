//! sharpfix-core: Core abstractions for C# lint rewriting
//!
//! This crate provides:
//! - `SyntaxNode` / `Node`: An immutable, structurally shared syntax tree
//! - `TypeOracle`: Type facts supplied by an external binder
//! - `PreOrder`: Lazy pre-order traversal used by rule matchers
//! - `substitute()`: Replace one subtree, rebuilding only its ancestors
//! - `apply_replacements()`: Fold a batch of non-overlapping replacements
//! - `make`: Node factory for rewrite rules

pub mod make;
pub mod oracle;
mod render;
mod span;
mod substitute;
pub mod tree;
pub mod walk;

pub use oracle::{NoTypeInfo, TypeEntry, TypeFact, TypeOracle, TypeTable};
pub use span::Span;
pub use substitute::{apply_replacements, substitute, Replacement, SubstituteError};
pub use tree::{validate_spans, Node, NodeCategory, NodeKind, SpanViolation, SyntaxNode};
pub use walk::{find_by_span, PreOrder};
