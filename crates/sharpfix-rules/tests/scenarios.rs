//! End-to-end scenarios: scan, fix, and re-scan whole trees

use sharpfix_core::tree::{BinaryOperator, Modifier, SyntaxNode};
use sharpfix_core::{
    find_by_span, make, substitute, validate_spans, NoTypeInfo, Node, NodeKind, Span, TypeFact,
    TypeTable,
};
use sharpfix_rules::{Pipeline, RuleRegistry, TryMethodRule};
use std::sync::Arc;

// ==================== Fixtures ====================

// if (val == null) { }
fn null_check(operator: BinaryOperator) -> Node {
    make::if_statement(
        Span::new(0, 20),
        make::binary(
            Span::new(4, 15),
            operator,
            make::identifier(Span::new(4, 7), "val"),
            make::null_literal(Span::new(11, 15)),
        ),
        make::block(Span::new(17, 20), vec![]),
        None,
    )
}

/// `val` is an `int?`; the binder reports the converted type of `null`.
fn nullable_int_types() -> TypeTable {
    TypeTable::new()
        .with(Span::new(4, 7), TypeFact::VALUE)
        .with(Span::new(11, 15), TypeFact::VALUE)
}

/// `new Student()` starting at `start`
fn new_student(start: u32) -> Node {
    make::object_creation(
        Span::new(start, start + 13),
        make::named_type(Span::new(start + 4, start + 11), "Student"),
        vec![],
    )
}

/// `return new Student();` starting at `start`
fn return_student(start: u32) -> Node {
    make::return_statement(Span::new(start, start + 21), Some(new_student(start + 7)))
}

/// `if (num == n) { return new Student(); }` starting at `start`
fn if_num(start: u32, n: i64) -> Node {
    make::if_statement(
        Span::new(start, start + 39),
        make::binary(
            Span::new(start + 4, start + 12),
            BinaryOperator::Equals,
            make::identifier(Span::new(start + 4, start + 7), "num"),
            make::int_literal(Span::new(start + 11, start + 12), n),
        ),
        make::block(Span::new(start + 14, start + 39), vec![return_student(start + 16)]),
        None,
    )
}

// public static Student TryGetValue() { if (num == 1) { return new Student(); } if (num == 2) { return new Student(); } return new Student(); }
fn try_get_value() -> Node {
    make::compilation_unit(
        Span::new(0, 141),
        vec![make::method(
            Span::new(0, 141),
            vec![Modifier::Public, Modifier::Static],
            make::named_type(Span::new(14, 21), "Student"),
            "TryGetValue",
            vec![],
            make::block(
                Span::new(36, 141),
                vec![if_num(38, 1), if_num(78, 2), return_student(118)],
            ),
        )],
    )
}

fn all_value_types(_: &SyntaxNode) -> TypeFact {
    TypeFact::VALUE
}

// ==================== Null equality ====================

#[test]
fn test_scenario_equals_null() {
    let pipeline = Pipeline::default();
    let tree = null_check(BinaryOperator::Equals);
    let types = nullable_int_types();

    let findings = pipeline.report(&tree, &types);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "NullEqualityAnalyzer");
    assert_eq!(findings[0].span, Span::new(4, 15));

    let fixed = pipeline.apply_fix(&tree, &findings[0]).unwrap();
    assert_eq!(fixed.to_string(), "if (val is null) { }");
    assert!(pipeline.report(&fixed, &types).is_empty());
}

#[test]
fn test_scenario_not_equals_null() {
    let pipeline = Pipeline::default();
    let tree = null_check(BinaryOperator::NotEquals);
    let types = nullable_int_types();

    let findings = pipeline.report(&tree, &types);
    assert_eq!(findings.len(), 1);

    let fixed = pipeline.apply_fix(&tree, &findings[0]).unwrap();
    assert_eq!(fixed.to_string(), "if (val is not null) { }");
    assert!(pipeline.report(&fixed, &types).is_empty());
}

#[test]
fn test_reference_comparison_not_reported() {
    let pipeline = Pipeline::default();
    let tree = null_check(BinaryOperator::Equals);
    let types = TypeTable::new()
        .with(Span::new(4, 7), TypeFact::REFERENCE)
        .with(Span::new(11, 15), TypeFact::REFERENCE);
    assert!(pipeline.report(&tree, &types).is_empty());
}

#[test]
fn test_pattern_already_used_not_reported() {
    let pipeline = Pipeline::default();
    let tree = make::is_pattern(
        Span::new(4, 15),
        make::identifier(Span::new(4, 7), "val"),
        make::constant_pattern(Span::new(11, 15), make::null_literal(Span::new(11, 15))),
    );
    assert!(pipeline.report(&tree, &nullable_int_types()).is_empty());
}

// ==================== Try methods ====================

#[test]
fn test_scenario_try_get_value() {
    let mut registry = RuleRegistry::empty();
    registry.register(Box::new(TryMethodRule));
    let pipeline = Pipeline::new(registry);
    let tree = try_get_value();

    let findings = pipeline.report(&tree, &NoTypeInfo);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "TryReturnTypeAnalyzer");
    assert_eq!(findings[0].span, Span::new(0, 141));

    let fixed = pipeline.apply_fix(&tree, &findings[0]).unwrap();
    assert_eq!(
        fixed.to_string(),
        "public static bool TryGetValue(out Student value) { value = default; try { \
         if (num == 1) { value = new Student(); } \
         if (num == 2) { value = new Student(); } \
         value = new Student(); return true; } \
         catch (Exception e) { return false; } }"
    );
    assert_eq!(validate_spans(&fixed), Ok(()));
    assert!(pipeline.report(&fixed, &NoTypeInfo).is_empty());
}

#[test]
fn test_try_fix_signature_shape() {
    let pipeline = Pipeline::default();
    let tree = try_get_value();
    let findings = pipeline.report(&tree, &NoTypeInfo);
    let fixed = pipeline.apply_fix(&tree, &findings[0]).unwrap();

    let method = find_by_span(&fixed, Span::new(0, 141), NodeKind::Method).unwrap();
    let SyntaxNode::Method(method) = method.as_ref() else {
        panic!("expected a method");
    };
    assert_eq!(method.return_type.to_string(), "bool");
    assert_eq!(method.parameters.len(), 1);
    assert_eq!(method.parameters[0].to_string(), "out Student value");
}

#[test]
fn test_fix_all_handles_nested_findings() {
    let pipeline = Pipeline::default();
    let tree = try_get_value();

    // the method and both `num == n` comparisons are reported
    let findings = pipeline.report(&tree, &all_value_types);
    assert_eq!(findings.len(), 3);

    let first = pipeline.apply_all(&tree, &findings).unwrap();
    assert_eq!(first.applied.len(), 1);
    assert_eq!(first.deferred.len(), 2);

    let outcome = pipeline.fix_all(&tree, &all_value_types).unwrap();
    assert_eq!(outcome.applied.len(), 3);
    assert!(outcome.failed.is_empty());
    assert!(outcome.deferred.is_empty());
    assert!(outcome.tree.to_string().contains("if (num is 1) { value = new Student(); }"));
    assert!(outcome.tree.to_string().contains("if (num is 2) { value = new Student(); }"));
    assert!(pipeline.report(&outcome.tree, &all_value_types).is_empty());
}

#[test]
fn test_unsupported_fix_is_reported_not_dropped() {
    let pipeline = Pipeline::default();
    let tree = make::method(
        Span::new(0, 40),
        vec![],
        make::named_type(Span::new(0, 7), "Student"),
        "TryNothing",
        vec![],
        make::block(Span::new(20, 40), vec![make::return_statement(Span::new(22, 29), None)]),
    );

    let outcome = pipeline.fix_all(&tree, &NoTypeInfo).unwrap();
    assert!(outcome.applied.is_empty());
    assert_eq!(outcome.failed.len(), 1);
    assert!(Arc::ptr_eq(&outcome.tree, &tree));
}

// ==================== Substitution ====================

#[test]
fn test_substitution_round_trip() {
    let tree = try_get_value();
    let target = find_by_span(&tree, Span::new(125, 138), NodeKind::ObjectCreation).unwrap();
    let replacement = make::identifier(Span::new(125, 138), "cached");

    let new_tree = substitute(&tree, &target, replacement.clone()).unwrap();

    let found = find_by_span(&new_tree, Span::new(125, 138), NodeKind::Identifier).unwrap();
    assert_eq!(*found, *replacement);

    // both if statements sit off the rebuilt path and are shared
    let old_if = find_by_span(&tree, Span::new(38, 77), NodeKind::If).unwrap();
    let new_if = find_by_span(&new_tree, Span::new(38, 77), NodeKind::If).unwrap();
    assert!(Arc::ptr_eq(&old_if, &new_if));
    let old_if = find_by_span(&tree, Span::new(78, 117), NodeKind::If).unwrap();
    let new_if = find_by_span(&new_tree, Span::new(78, 117), NodeKind::If).unwrap();
    assert!(Arc::ptr_eq(&old_if, &new_if));

    // the original tree is unchanged
    assert!(find_by_span(&tree, Span::new(125, 138), NodeKind::Identifier).is_none());
}

#[test]
fn test_fixture_spans_are_valid() {
    assert_eq!(validate_spans(&try_get_value()), Ok(()));
    assert_eq!(validate_spans(&null_check(BinaryOperator::Equals)), Ok(()));
}

// ==================== JSON input ====================

#[test]
fn test_tree_from_json() {
    let json = r#"{
        "kind": "if",
        "span": {"start": 0, "end": 20},
        "condition": {
            "kind": "binary",
            "span": {"start": 4, "end": 15},
            "operator": "not_equals",
            "left": {"kind": "identifier", "span": {"start": 4, "end": 7}, "name": "val"},
            "right": {"kind": "literal", "span": {"start": 11, "end": 15}, "value": "null"}
        },
        "then_branch": {"kind": "block", "span": {"start": 17, "end": 20}}
    }"#;
    let tree: Node = serde_json::from_str(json).unwrap();
    assert_eq!(*tree, *null_check(BinaryOperator::NotEquals));

    let outcome = Pipeline::default()
        .fix_all(&tree, &nullable_int_types())
        .unwrap();
    assert_eq!(outcome.tree.to_string(), "if (val is not null) { }");
}
