//! Predicate evaluation over in-memory rows.
//!
//! Filters fold left over the operation chain: consecutive filters combine
//! with an implicit AND, an explicit `Or` connector switches the next
//! combination to OR. Ordering operations apply after filtering (first
//! listed key is the primary sort), then the last `Limit` wins.

use crate::table::Row;
use datashare_types::{OperationItem, PredicateOperator, Predicates, Value};
use std::cmp::Ordering;

/// Returns indices of matching rows, ordered and limited per the chain.
pub fn select(predicates: &Predicates, rows: &[(i64, Row)]) -> Vec<usize> {
    let mut matched: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, (_, row))| matches_row(predicates, row))
        .map(|(index, _)| index)
        .collect();

    apply_ordering(predicates, rows, &mut matched);
    apply_limit(predicates, &mut matched);
    matched
}

fn matches_row(predicates: &Predicates, row: &Row) -> bool {
    let mut acc = true;
    let mut connector = PredicateOperator::And;

    for op in predicates.operations() {
        match op.operator {
            PredicateOperator::And | PredicateOperator::Or => connector = op.operator,
            PredicateOperator::OrderByAsc
            | PredicateOperator::OrderByDesc
            | PredicateOperator::Limit => {}
            _ => {
                let hit = matches_filter(op, row);
                acc = match connector {
                    PredicateOperator::Or => acc || hit,
                    _ => acc && hit,
                };
                connector = PredicateOperator::And;
            }
        }
    }
    acc
}

fn matches_filter(op: &OperationItem, row: &Row) -> bool {
    let Some(field) = op.field.as_deref() else {
        return false;
    };
    let cell = row.get(field);

    match op.operator {
        PredicateOperator::IsNull => cell.is_none_or(Value::is_null),
        PredicateOperator::In => cell.is_some_and(|value| {
            op.values
                .iter()
                .any(|candidate| value.compare(candidate) == Some(Ordering::Equal))
        }),
        PredicateOperator::Contains => matches_text(cell, op, |hay, needle| hay.contains(needle)),
        PredicateOperator::BeginsWith => {
            matches_text(cell, op, |hay, needle| hay.starts_with(needle))
        }
        _ => {
            let (Some(value), Some(operand)) = (cell, op.values.first()) else {
                return false;
            };
            let Some(ordering) = value.compare(operand) else {
                return false;
            };
            match op.operator {
                PredicateOperator::EqualTo => ordering == Ordering::Equal,
                PredicateOperator::NotEqualTo => ordering != Ordering::Equal,
                PredicateOperator::GreaterThan => ordering == Ordering::Greater,
                PredicateOperator::LessThan => ordering == Ordering::Less,
                PredicateOperator::GreaterThanOrEqualTo => ordering != Ordering::Less,
                PredicateOperator::LessThanOrEqualTo => ordering != Ordering::Greater,
                _ => false,
            }
        }
    }
}

fn matches_text(cell: Option<&Value>, op: &OperationItem, test: fn(&str, &str) -> bool) -> bool {
    let (Some(Value::Text(hay)), Some(Value::Text(needle))) = (cell, op.values.first()) else {
        return false;
    };
    test(hay, needle)
}

fn apply_ordering(predicates: &Predicates, rows: &[(i64, Row)], matched: &mut [usize]) {
    // Stable-sort by each key in reverse listed order so the first listed
    // key ends up primary.
    let keys: Vec<&OperationItem> = predicates
        .operations()
        .iter()
        .filter(|op| {
            matches!(
                op.operator,
                PredicateOperator::OrderByAsc | PredicateOperator::OrderByDesc
            )
        })
        .collect();

    for op in keys.into_iter().rev() {
        let Some(field) = op.field.as_deref() else {
            continue;
        };
        matched.sort_by(|&a, &b| {
            let left = rows[a].1.get(field);
            let right = rows[b].1.get(field);
            let ordering = match (left, right) {
                (Some(l), Some(r)) => l.compare(r).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            if op.operator == PredicateOperator::OrderByDesc {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}

fn apply_limit(predicates: &Predicates, matched: &mut Vec<usize>) {
    let limit = predicates
        .operations()
        .iter()
        .rev()
        .find(|op| op.operator == PredicateOperator::Limit);
    let Some(op) = limit else {
        return;
    };

    let count = match op.values.first() {
        Some(Value::Integer(n)) if *n >= 0 => *n as usize,
        _ => return,
    };
    let offset = match op.values.get(1) {
        Some(Value::Integer(n)) if *n > 0 => *n as usize,
        _ => 0,
    };

    let kept: Vec<usize> = matched.iter().copied().skip(offset).take(count).collect();
    *matched = kept;
}
