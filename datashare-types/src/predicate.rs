//! Composable row-selection predicates.
//!
//! Predicates are built fluently and carried as an ordered operation list.
//! The broker validates them only structurally; evaluation semantics belong
//! to the provider (see `datashare-storage` for the reference evaluator).
//!
//! Consecutive filter operations combine with an implicit AND unless an
//! explicit [`Predicates::or`] connector separates them.

use crate::Value;
use serde::{Deserialize, Serialize};

/// Operator carried by one predicate operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateOperator {
    EqualTo,
    NotEqualTo,
    GreaterThan,
    LessThan,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
    Contains,
    BeginsWith,
    IsNull,
    In,
    And,
    Or,
    OrderByAsc,
    OrderByDesc,
    Limit,
}

impl PredicateOperator {
    /// Returns true for operators that filter rows (as opposed to
    /// connectors and result shaping).
    #[must_use]
    pub fn is_filter(&self) -> bool {
        !matches!(
            self,
            Self::And | Self::Or | Self::OrderByAsc | Self::OrderByDesc | Self::Limit
        )
    }
}

/// One operation in a predicate chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationItem {
    pub operator: PredicateOperator,
    /// Column the operation targets; connectors and `Limit` carry none.
    pub field: Option<String>,
    /// Operand values; `Limit` carries `[count, offset]`.
    pub values: Vec<Value>,
}

/// An ordered chain of predicate operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predicates {
    operations: Vec<OperationItem>,
}

impl Predicates {
    /// Creates an empty predicate chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, operator: PredicateOperator, field: Option<&str>, values: Vec<Value>) -> Self {
        self.operations.push(OperationItem {
            operator,
            field: field.map(str::to_string),
            values,
        });
        self
    }

    /// Matches rows where `field == value`.
    #[must_use]
    pub fn equal_to(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(PredicateOperator::EqualTo, Some(field), vec![value.into()])
    }

    /// Matches rows where `field != value`.
    #[must_use]
    pub fn not_equal_to(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(PredicateOperator::NotEqualTo, Some(field), vec![value.into()])
    }

    /// Matches rows where `field > value`.
    #[must_use]
    pub fn greater_than(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(PredicateOperator::GreaterThan, Some(field), vec![value.into()])
    }

    /// Matches rows where `field < value`.
    #[must_use]
    pub fn less_than(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(PredicateOperator::LessThan, Some(field), vec![value.into()])
    }

    /// Matches rows where `field >= value`.
    #[must_use]
    pub fn greater_than_or_equal_to(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(
            PredicateOperator::GreaterThanOrEqualTo,
            Some(field),
            vec![value.into()],
        )
    }

    /// Matches rows where `field <= value`.
    #[must_use]
    pub fn less_than_or_equal_to(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(
            PredicateOperator::LessThanOrEqualTo,
            Some(field),
            vec![value.into()],
        )
    }

    /// Matches text rows containing `value` as a substring.
    #[must_use]
    pub fn contains(self, field: &str, value: impl Into<String>) -> Self {
        self.push(
            PredicateOperator::Contains,
            Some(field),
            vec![Value::Text(value.into())],
        )
    }

    /// Matches text rows starting with `value`.
    #[must_use]
    pub fn begins_with(self, field: &str, value: impl Into<String>) -> Self {
        self.push(
            PredicateOperator::BeginsWith,
            Some(field),
            vec![Value::Text(value.into())],
        )
    }

    /// Matches rows where `field` is null or absent.
    #[must_use]
    pub fn is_null(self, field: &str) -> Self {
        self.push(PredicateOperator::IsNull, Some(field), Vec::new())
    }

    /// Matches rows where `field` equals any of `values`.
    #[must_use]
    pub fn in_values(self, field: &str, values: Vec<Value>) -> Self {
        self.push(PredicateOperator::In, Some(field), values)
    }

    /// Combines the previous and next filter with AND (the default).
    #[must_use]
    pub fn and(self) -> Self {
        self.push(PredicateOperator::And, None, Vec::new())
    }

    /// Combines the previous and next filter with OR.
    #[must_use]
    pub fn or(self) -> Self {
        self.push(PredicateOperator::Or, None, Vec::new())
    }

    /// Sorts matched rows by `field`, ascending.
    #[must_use]
    pub fn order_by_asc(self, field: &str) -> Self {
        self.push(PredicateOperator::OrderByAsc, Some(field), Vec::new())
    }

    /// Sorts matched rows by `field`, descending.
    #[must_use]
    pub fn order_by_desc(self, field: &str) -> Self {
        self.push(PredicateOperator::OrderByDesc, Some(field), Vec::new())
    }

    /// Limits the matched rows to `count`, skipping `offset`.
    #[must_use]
    pub fn limit(self, count: i64, offset: i64) -> Self {
        self.push(
            PredicateOperator::Limit,
            None,
            vec![Value::Integer(count), Value::Integer(offset)],
        )
    }

    /// Returns the operation chain in build order.
    #[must_use]
    pub fn operations(&self) -> &[OperationItem] {
        &self.operations
    }

    /// Returns true when no operations were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Returns true when at least one row-filtering operation is present.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        self.operations.iter().any(|op| op.operator.is_filter())
    }
}
