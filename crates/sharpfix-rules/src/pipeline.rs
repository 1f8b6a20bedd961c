//! Rule pipeline: scan a tree with every registered rule, and turn
//! findings back into a fixed tree

use sharpfix_core::{
    apply_replacements, find_by_span, substitute, Node, Replacement, SubstituteError, TypeOracle,
};
use std::cmp::Reverse;
use tracing::{debug, warn};

use crate::error::{PipelineError, RuleError};
use crate::registry::{scan, Finding, Rule, RuleRegistry};

/// Upper bound on scan/fix rounds in [`Pipeline::fix_all`]
const MAX_PASSES: usize = 16;

/// Result of fixing several findings in one tree
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// The fixed tree
    pub tree: Node,
    /// Findings whose fix is part of `tree`
    pub applied: Vec<Finding>,
    /// Findings nested inside another applied fix; scan `tree` again to
    /// pick them up
    pub deferred: Vec<Finding>,
    /// Findings whose fix could not be built
    pub failed: Vec<(Finding, RuleError)>,
}

pub struct Pipeline {
    registry: RuleRegistry,
}

impl Pipeline {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Lazily yield findings: rules in registration order, then pre-order
    /// position within each rule.
    pub fn findings<'a>(
        &'a self,
        tree: &Node,
        oracle: &'a dyn TypeOracle,
    ) -> impl Iterator<Item = Finding> + 'a {
        let tree = tree.clone();
        self.registry
            .iter()
            .flat_map(move |rule| scan(rule, &tree, oracle))
    }

    /// Run every registered rule over `tree`
    pub fn report(&self, tree: &Node, oracle: &dyn TypeOracle) -> Vec<Finding> {
        self.findings(tree, oracle).collect()
    }

    /// Fix a single finding.
    ///
    /// The finding's node is located again by span in `tree`, so the
    /// finding may come from an earlier scan of an equivalent tree.
    pub fn apply_fix(&self, tree: &Node, finding: &Finding) -> Result<Node, PipelineError> {
        let rule = self.rule_for(finding)?;
        let target = locate(tree, rule, finding)?;
        let replacement = rule.synthesize(&target)?;
        Ok(substitute(tree, &target, replacement)?)
    }

    /// Fix several findings of the same tree at once.
    ///
    /// Every replacement is built against `tree` itself. A finding nested
    /// inside another finding that is fixed in this batch is deferred rather
    /// than applied; findings whose fix cannot be built are collected in
    /// `failed`. A stale finding (its node is gone) aborts the batch.
    pub fn apply_all(&self, tree: &Node, findings: &[Finding]) -> Result<BatchOutcome, PipelineError> {
        let mut sorted: Vec<&Finding> = findings.iter().collect();
        sorted.sort_by_key(|f| (f.span.start, Reverse(f.span.end)));

        let mut replacements = Vec::new();
        let mut applied = Vec::new();
        let mut deferred = Vec::new();
        let mut failed = Vec::new();
        let mut claimed_end: Option<u32> = None;

        for finding in sorted {
            if claimed_end.is_some_and(|end| finding.span.start < end) {
                debug!(rule = %finding.rule_id, span = %finding.span, "deferring nested finding");
                deferred.push(finding.clone());
                continue;
            }

            let rule = self.rule_for(finding)?;
            let target = locate(tree, rule, finding)?;
            match rule.synthesize(&target) {
                Ok(node) => {
                    claimed_end = Some(finding.span.end);
                    replacements.push(Replacement::new(finding.span, rule.target_kind(), node));
                    applied.push(finding.clone());
                }
                Err(err) => {
                    warn!(rule = %finding.rule_id, span = %finding.span, error = %err, "fix not applied");
                    failed.push((finding.clone(), err));
                }
            }
        }

        let tree = apply_replacements(tree, &replacements)?;
        Ok(BatchOutcome {
            tree,
            applied,
            deferred,
            failed,
        })
    }

    /// Scan and fix repeatedly until no fixable finding remains.
    pub fn fix_all(&self, tree: &Node, oracle: &dyn TypeOracle) -> Result<BatchOutcome, PipelineError> {
        let mut tree = tree.clone();
        let mut applied = Vec::new();
        let mut failed: Vec<(Finding, RuleError)> = Vec::new();

        for pass in 0..MAX_PASSES {
            let pending: Vec<Finding> = self
                .findings(&tree, oracle)
                .filter(|f| !failed.iter().any(|(seen, _)| seen == f))
                .collect();
            if pending.is_empty() {
                return Ok(BatchOutcome {
                    tree,
                    applied,
                    deferred: Vec::new(),
                    failed,
                });
            }

            let outcome = self.apply_all(&tree, &pending)?;
            debug!(
                pass,
                applied = outcome.applied.len(),
                deferred = outcome.deferred.len(),
                failed = outcome.failed.len(),
                "fix pass finished"
            );
            tree = outcome.tree;
            applied.extend(outcome.applied);
            failed.extend(outcome.failed);
        }

        let deferred: Vec<Finding> = self
            .findings(&tree, oracle)
            .filter(|f| !failed.iter().any(|(seen, _)| seen == f))
            .collect();
        warn!(remaining = deferred.len(), "giving up after {} fix passes", MAX_PASSES);
        Ok(BatchOutcome {
            tree,
            applied,
            deferred,
            failed,
        })
    }

    fn rule_for(&self, finding: &Finding) -> Result<&dyn Rule, PipelineError> {
        self.registry
            .get(&finding.rule_id)
            .ok_or_else(|| PipelineError::UnknownRule(finding.rule_id.clone()))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(RuleRegistry::new())
    }
}

fn locate(tree: &Node, rule: &dyn Rule, finding: &Finding) -> Result<Node, SubstituteError> {
    find_by_span(tree, finding.span, rule.target_kind()).ok_or_else(|| {
        warn!(rule = %finding.rule_id, span = %finding.span, "finding does not match the tree");
        SubstituteError::NotFound {
            kind: rule.target_kind(),
            span: finding.span,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Severity;
    use sharpfix_core::tree::BinaryOperator;
    use sharpfix_core::{make, NodeKind, Span, TypeFact};

    // { a == b; c != d; }
    fn sample() -> Node {
        make::block(
            Span::new(0, 20),
            vec![
                make::expression_statement(
                    Span::new(2, 9),
                    make::binary(
                        Span::new(2, 8),
                        BinaryOperator::Equals,
                        make::identifier(Span::new(2, 3), "a"),
                        make::identifier(Span::new(7, 8), "b"),
                    ),
                ),
                make::expression_statement(
                    Span::new(10, 17),
                    make::binary(
                        Span::new(10, 16),
                        BinaryOperator::NotEquals,
                        make::identifier(Span::new(10, 11), "c"),
                        make::identifier(Span::new(15, 16), "d"),
                    ),
                ),
            ],
        )
    }

    fn all_value_types(_: &sharpfix_core::SyntaxNode) -> TypeFact {
        TypeFact::VALUE
    }

    #[test]
    fn test_report_is_deterministic() {
        let pipeline = Pipeline::default();
        let tree = sample();
        let first = pipeline.report(&tree, &all_value_types);
        let second = pipeline.report(&tree, &all_value_types);
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|f| f.span).collect::<Vec<_>>(),
            vec![Span::new(2, 8), Span::new(10, 16)]
        );
        assert!(first.iter().all(|f| f.severity == Severity::Warning));
    }

    #[test]
    fn test_apply_fix_single() {
        let pipeline = Pipeline::default();
        let tree = sample();
        let findings = pipeline.report(&tree, &all_value_types);
        let fixed = pipeline.apply_fix(&tree, &findings[1]).unwrap();
        assert_eq!(fixed.to_string(), "{ a == b; c is not d; }");
    }

    #[test]
    fn test_apply_all_folds_left_to_right() {
        let pipeline = Pipeline::default();
        let tree = sample();
        let findings = pipeline.report(&tree, &all_value_types);
        let outcome = pipeline.apply_all(&tree, &findings).unwrap();
        assert_eq!(outcome.tree.to_string(), "{ a is b; c is not d; }");
        assert_eq!(outcome.applied.len(), 2);
        assert!(outcome.deferred.is_empty());
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn test_unknown_rule() {
        let pipeline = Pipeline::default();
        let finding = Finding {
            rule_id: "NoSuchRule".to_string(),
            span: Span::new(2, 8),
            message: String::new(),
            severity: Severity::Warning,
        };
        assert_eq!(
            pipeline.apply_fix(&sample(), &finding),
            Err(PipelineError::UnknownRule("NoSuchRule".to_string()))
        );
    }

    #[test]
    fn test_stale_finding() {
        let pipeline = Pipeline::default();
        let tree = sample();
        let findings = pipeline.report(&tree, &all_value_types);
        let fixed = pipeline.apply_fix(&tree, &findings[0]).unwrap();

        // the comparison at 2..8 is already gone from the fixed tree
        assert_eq!(
            pipeline.apply_fix(&fixed, &findings[0]),
            Err(PipelineError::Substitute(SubstituteError::NotFound {
                kind: NodeKind::Binary,
                span: Span::new(2, 8),
            }))
        );
    }

    #[test]
    fn test_fix_all_reaches_fixed_point() {
        let pipeline = Pipeline::default();
        let outcome = pipeline.fix_all(&sample(), &all_value_types).unwrap();
        assert_eq!(outcome.tree.to_string(), "{ a is b; c is not d; }");
        assert!(pipeline.report(&outcome.tree, &all_value_types).is_empty());
    }

    #[test]
    fn test_empty_registry_reports_nothing() {
        let pipeline = Pipeline::new(RuleRegistry::empty());
        assert!(pipeline.report(&sample(), &all_value_types).is_empty());
    }
}
