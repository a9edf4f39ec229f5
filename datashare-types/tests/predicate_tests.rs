use datashare_types::{PredicateOperator, Predicates, Value};

#[test]
fn empty_predicates() {
    let p = Predicates::new();
    assert!(p.is_empty());
    assert!(!p.has_filters());
}

#[test]
fn equal_to_records_operation() {
    let p = Predicates::new().equal_to("name0", "name00");
    let ops = p.operations();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].operator, PredicateOperator::EqualTo);
    assert_eq!(ops[0].field.as_deref(), Some("name0"));
    assert_eq!(ops[0].values, vec![Value::Text("name00".into())]);
    assert!(p.has_filters());
}

#[test]
fn chain_preserves_build_order() {
    let p = Predicates::new()
        .equal_to("a", 1i64)
        .and()
        .greater_than("b", 2i64)
        .or()
        .less_than("c", 3i64)
        .order_by_desc("b")
        .limit(10, 0);

    let operators: Vec<PredicateOperator> =
        p.operations().iter().map(|op| op.operator).collect();
    assert_eq!(
        operators,
        vec![
            PredicateOperator::EqualTo,
            PredicateOperator::And,
            PredicateOperator::GreaterThan,
            PredicateOperator::Or,
            PredicateOperator::LessThan,
            PredicateOperator::OrderByDesc,
            PredicateOperator::Limit,
        ]
    );
}

#[test]
fn connectors_are_not_filters() {
    let p = Predicates::new().and().or().order_by_asc("x").limit(1, 0);
    assert!(!p.has_filters());
    assert!(!p.is_empty());
}

#[test]
fn limit_carries_count_and_offset() {
    let p = Predicates::new().limit(25, 50);
    let op = &p.operations()[0];
    assert_eq!(op.field, None);
    assert_eq!(op.values, vec![Value::Integer(25), Value::Integer(50)]);
}

#[test]
fn in_values_carries_all_operands() {
    let p = Predicates::new().in_values("id", vec![Value::Integer(1), Value::Integer(2)]);
    assert_eq!(p.operations()[0].values.len(), 2);
}

#[test]
fn is_null_has_no_operands() {
    let p = Predicates::new().is_null("deleted_at");
    assert!(p.operations()[0].values.is_empty());
}

#[test]
fn serde_roundtrip() {
    let p = Predicates::new()
        .equal_to("name", "x")
        .and()
        .begins_with("title", "draft")
        .limit(5, 0);
    let json = serde_json::to_string(&p).unwrap();
    let parsed: Predicates = serde_json::from_str(&json).unwrap();
    assert_eq!(p, parsed);
}
