//! Tree traversal
//!
//! [`PreOrder`] is the single traversal every matcher is built on: lazy,
//! left-to-right, parents before children. Dropping the iterator between
//! steps is how a caller abandons a scan.

use crate::span::Span;
use crate::tree::{Node, NodeKind};

/// Lazy pre-order iterator over a tree.
///
/// Holds its own handles to the nodes it has yet to visit, so it does not
/// borrow the tree it was created from.
#[derive(Debug, Clone)]
pub struct PreOrder {
    stack: Vec<Node>,
}

impl PreOrder {
    pub fn new(root: &Node) -> Self {
        Self {
            stack: vec![root.clone()],
        }
    }
}

impl Iterator for PreOrder {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children().into_iter().rev().cloned());
        Some(node)
    }
}

/// Find the outermost node of `kind` whose span is exactly `span`.
///
/// Only subtrees whose span contains `span` are descended into.
pub fn find_by_span(root: &Node, span: Span, kind: NodeKind) -> Option<Node> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.span() == span && node.kind() == kind {
            return Some(node.clone());
        }
        stack.extend(
            node.children()
                .into_iter()
                .rev()
                .filter(|child| child.span().contains(span)),
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make;
    use crate::tree::BinaryOperator;
    use std::sync::Arc;

    // if (a == b) { c; }
    fn sample() -> Node {
        make::if_statement(
            Span::new(0, 19),
            make::binary(
                Span::new(4, 10),
                BinaryOperator::Equals,
                make::identifier(Span::new(4, 5), "a"),
                make::identifier(Span::new(9, 10), "b"),
            ),
            make::block(
                Span::new(12, 19),
                vec![make::expression_statement(
                    Span::new(14, 16),
                    make::identifier(Span::new(14, 15), "c"),
                )],
            ),
            None,
        )
    }

    #[test]
    fn test_pre_order_is_left_to_right() {
        let kinds: Vec<_> = PreOrder::new(&sample()).map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::If,
                NodeKind::Binary,
                NodeKind::Identifier,
                NodeKind::Identifier,
                NodeKind::Block,
                NodeKind::ExpressionStatement,
                NodeKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_pre_order_is_restartable() {
        let tree = sample();
        let first: Vec<_> = PreOrder::new(&tree).map(|n| n.span()).collect();
        let second: Vec<_> = PreOrder::new(&tree).map(|n| n.span()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pre_order_yields_shared_nodes() {
        let tree = sample();
        let first = PreOrder::new(&tree).next().unwrap();
        assert!(Arc::ptr_eq(&first, &tree));
    }

    #[test]
    fn test_find_by_span() {
        let tree = sample();
        let found = find_by_span(&tree, Span::new(4, 10), NodeKind::Binary).unwrap();
        assert_eq!(found.kind(), NodeKind::Binary);

        let ident = find_by_span(&tree, Span::new(14, 15), NodeKind::Identifier).unwrap();
        assert_eq!(ident.to_string(), "c");
    }

    #[test]
    fn test_find_by_span_requires_kind() {
        let tree = sample();
        assert!(find_by_span(&tree, Span::new(4, 10), NodeKind::Assignment).is_none());
        assert!(find_by_span(&tree, Span::new(4, 9), NodeKind::Binary).is_none());
    }
}
