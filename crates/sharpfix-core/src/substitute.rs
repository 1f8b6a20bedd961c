//! Persistent subtree substitution
//!
//! Replacing a node rebuilds each ancestor on the path from the root down to
//! it (a shallow copy with one child swapped); every other subtree is shared
//! with the input tree. The input tree is never modified.

use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

use crate::span::Span;
use crate::tree::{Node, NodeCategory, NodeKind};
use crate::walk::find_by_span;

/// Errors that can occur while substituting into a tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubstituteError {
    /// The target is not part of the tree, usually because the tree was
    /// replaced or reparsed after the target was found.
    #[error("{kind:?} at {span} not found in tree")]
    NotFound { kind: NodeKind, span: Span },

    /// A rewrite produced a node that cannot occupy the target's slot.
    /// This is a bug in the rewrite, not a user error.
    #[error("malformed replacement: {found:?} node cannot replace a {expected:?} node")]
    MalformedReplacement {
        expected: NodeCategory,
        found: NodeCategory,
    },

    #[error("overlapping replacements detected at offset {0}")]
    Overlapping(u32),
}

/// A replacement subtree for the node of `kind` at `span`
#[derive(Debug, Clone)]
pub struct Replacement {
    pub span: Span,
    pub kind: NodeKind,
    pub node: Node,
}

impl Replacement {
    pub fn new(span: Span, kind: NodeKind, node: Node) -> Self {
        Self { span, kind, node }
    }
}

/// Same node by handle, or by span and structure
fn is_target(candidate: &Node, target: &Node) -> bool {
    Arc::ptr_eq(candidate, target)
        || (candidate.span() == target.span()
            && candidate.kind() == target.kind()
            && **candidate == **target)
}

/// Replace `target` within `root` by `replacement`.
///
/// # Returns
/// * `Ok(Node)` - The new root. Subtrees off the path to `target` are
///   shared with `root`.
/// * `Err(SubstituteError)` - If `target` is not in `root` or `replacement`
///   does not fit the target's slot
pub fn substitute(root: &Node, target: &Node, replacement: Node) -> Result<Node, SubstituteError> {
    if target.category() != replacement.category() {
        return Err(SubstituteError::MalformedReplacement {
            expected: target.category(),
            found: replacement.category(),
        });
    }

    if is_target(root, target) {
        return Ok(replacement);
    }

    rebuild(root, target, &replacement).ok_or(SubstituteError::NotFound {
        kind: target.kind(),
        span: target.span(),
    })
}

fn rebuild(node: &Node, target: &Node, replacement: &Node) -> Option<Node> {
    let target_span = target.span();
    for (index, child) in node.children().into_iter().enumerate() {
        if !child.span().contains(target_span) {
            continue;
        }
        let new_child = if is_target(child, target) {
            trace!(kind = ?target.kind(), span = %target_span, "substituting node");
            replacement.clone()
        } else {
            match rebuild(child, target, replacement) {
                Some(rebuilt) => rebuilt,
                None => continue,
            }
        };
        return node.with_child(index, new_child).map(Arc::new);
    }
    None
}

/// Fold a batch of replacements into `root`, left to right.
///
/// Replacements are sorted by span start and must not overlap. Each target
/// is located by span in the tree produced by the previous step rather than
/// through a handle into the original tree.
pub fn apply_replacements(
    root: &Node,
    replacements: &[Replacement],
) -> Result<Node, SubstituteError> {
    let mut sorted: Vec<&Replacement> = replacements.iter().collect();
    sorted.sort_by_key(|r| (r.span.start, r.span.end));

    let mut prev_end: Option<u32> = None;
    for replacement in &sorted {
        if let Some(end) = prev_end {
            if replacement.span.start < end {
                return Err(SubstituteError::Overlapping(replacement.span.start));
            }
        }
        prev_end = Some(replacement.span.end);
    }

    let mut tree = root.clone();
    for replacement in sorted {
        let target = find_by_span(&tree, replacement.span, replacement.kind).ok_or(
            SubstituteError::NotFound {
                kind: replacement.kind,
                span: replacement.span,
            },
        )?;
        tree = substitute(&tree, &target, replacement.node.clone())?;
    }
    Ok(tree)
}
