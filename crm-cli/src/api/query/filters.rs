//! Filter conditions for record queries
//!
//! The store accepts two spellings of the same condition: top-level `where`
//! entries use PascalCase keys (`FieldName`, `Operator`, `Values`) while
//! conditions nested inside `whereGroups` use camelCase keys. `Filter` and
//! `Condition` model the two spellings and share one evaluator, which the
//! in-memory store uses to execute descriptors.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Comparison operators understood by the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    HasValue,
    DoesNotHaveValue,
    Contains,
}

/// Boolean connective for grouped conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

/// A simple top-level filter (`where` entry)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Filter {
    pub field_name: String,
    pub operator: Operator,
    #[serde(default)]
    pub values: Vec<Value>,
}

/// A condition nested inside a `whereGroups` sub-group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field_name: String,
    pub operator: Operator,
    #[serde(default)]
    pub values: Vec<Value>,
}

/// A list of conditions joined by one connective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubGroup {
    pub conditions: Vec<Condition>,
    pub operator: LogicalOperator,
}

/// A compound filter: sub-groups joined by one connective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereGroup {
    pub operator: LogicalOperator,
    pub sub_groups: Vec<SubGroup>,
}

impl Filter {
    /// Create a filter with an arbitrary operator and value list
    pub fn new(field: impl Into<String>, operator: Operator, values: Vec<Value>) -> Self {
        Self {
            field_name: field.into(),
            operator,
            values,
        }
    }

    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::EqualTo, vec![value.into()])
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::NotEqualTo, vec![value.into()])
    }

    /// `field < value`
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThan, vec![value.into()])
    }

    /// `field > value`
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThan, vec![value.into()])
    }

    /// `field` is not null and not empty
    pub fn has_value(field: impl Into<String>) -> Self {
        Self::new(field, Operator::HasValue, Vec::new())
    }

    /// Check whether a raw record satisfies this filter
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        evaluate(&self.field_name, self.operator, &self.values, row)
    }
}

impl From<Filter> for Condition {
    fn from(filter: Filter) -> Self {
        Self {
            field_name: filter.field_name,
            operator: filter.operator,
            values: filter.values,
        }
    }
}

impl Condition {
    /// Check whether a raw record satisfies this condition
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        evaluate(&self.field_name, self.operator, &self.values, row)
    }
}

impl SubGroup {
    /// Conjunction of conditions
    pub fn all(conditions: impl IntoIterator<Item = Filter>) -> Self {
        Self {
            conditions: conditions.into_iter().map(Condition::from).collect(),
            operator: LogicalOperator::And,
        }
    }

    /// Disjunction of conditions
    pub fn any(conditions: impl IntoIterator<Item = Filter>) -> Self {
        Self {
            conditions: conditions.into_iter().map(Condition::from).collect(),
            operator: LogicalOperator::Or,
        }
    }

    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        combine(self.operator, self.conditions.iter().map(|c| c.matches(row)))
    }
}

impl WhereGroup {
    /// Group whose sub-groups must all hold
    pub fn and(sub_groups: Vec<SubGroup>) -> Self {
        Self {
            operator: LogicalOperator::And,
            sub_groups,
        }
    }

    /// Group where any sub-group may hold
    pub fn or(sub_groups: Vec<SubGroup>) -> Self {
        Self {
            operator: LogicalOperator::Or,
            sub_groups,
        }
    }

    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        combine(self.operator, self.sub_groups.iter().map(|g| g.matches(row)))
    }
}

/// Empty groups are vacuously true regardless of the connective
fn combine(operator: LogicalOperator, mut results: impl Iterator<Item = bool>) -> bool {
    match operator {
        LogicalOperator::And => results.all(|r| r),
        LogicalOperator::Or => {
            let mut seen_any = false;
            for r in results {
                if r {
                    return true;
                }
                seen_any = true;
            }
            !seen_any
        }
    }
}

/// Evaluate one condition against a raw record.
///
/// Ordering comparisons are naive: an absent or null field
/// compares as the empty string, so it sorts before every date. Callers that
/// must exclude empty fields combine the comparison with `HasValue`.
fn evaluate(field: &str, operator: Operator, values: &[Value], row: &Map<String, Value>) -> bool {
    let actual = row.get(field).map(scalar_of).unwrap_or(&Value::Null);
    let first = values.first().unwrap_or(&Value::Null);

    match operator {
        Operator::EqualTo => values.iter().any(|v| values_equal(actual, v)),
        Operator::NotEqualTo => !values.iter().any(|v| values_equal(actual, v)),
        Operator::LessThan => compare(actual, first) == Ordering::Less,
        Operator::LessThanOrEqualTo => compare(actual, first) != Ordering::Greater,
        Operator::GreaterThan => compare(actual, first) == Ordering::Greater,
        Operator::GreaterThanOrEqualTo => compare(actual, first) != Ordering::Less,
        Operator::HasValue => has_value(actual),
        Operator::DoesNotHaveValue => !has_value(actual),
        Operator::Contains => match (actual.as_str(), first.as_str()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
    }
}

/// Lookup columns may hold `{Id, Name}`; filters compare against the id
fn scalar_of(value: &Value) -> &Value {
    match value {
        Value::Object(obj) => obj.get("Id").unwrap_or(value),
        _ => value,
    }
}

fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

pub(crate) fn compare(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    lexical(a).cmp(&lexical(b))
}

fn lexical(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
