//! Named query templates
//!
//! Each access pattern used by the entity repositories is a pure function
//! from parameters to a descriptor. Column names are passed in by the caller;
//! the templates only fix the filter shape and ordering.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::builder::QueryBuilder;
use super::filters::{Filter, SubGroup, WhereGroup};
use super::orderby::OrderBy;
use super::query::{FetchParams, GetParams};
use super::CREATED_ON;

/// Every record, newest first
pub fn all(columns: &[&str]) -> FetchParams {
    QueryBuilder::new()
        .select(columns.iter().copied())
        .order_by(OrderBy::desc(CREATED_ON))
        .build()
}

/// Single record by primary key
pub fn by_id(columns: &[&str]) -> GetParams {
    GetParams::new(columns.iter().copied())
}

/// Records referencing `id` through the lookup `column`, newest first
pub fn by_foreign_key(columns: &[&str], column: &str, id: i64) -> FetchParams {
    QueryBuilder::new()
        .select(columns.iter().copied())
        .filter(Filter::eq(column, id))
        .order_by(OrderBy::desc(CREATED_ON))
        .build()
}

/// Records whose enumerated `column` equals `value`
pub fn by_enum_value(columns: &[&str], column: &str, value: &str, order: OrderBy) -> FetchParams {
    QueryBuilder::new()
        .select(columns.iter().copied())
        .filter(Filter::eq(column, value))
        .order_by(order)
        .build()
}

/// Records whose enumerated `column` differs from `value`
pub fn excluding_enum_value(
    columns: &[&str],
    column: &str,
    value: &str,
    order: OrderBy,
) -> FetchParams {
    QueryBuilder::new()
        .select(columns.iter().copied())
        .filter(Filter::ne(column, value))
        .order_by(order)
        .build()
}

/// Records not in `done_value` whose due date is set and earlier than `now`,
/// earliest due first.
///
/// The `HasValue` guard is part of the conjunction: a store comparing a null
/// due date lexically would otherwise report it as overdue.
pub fn compound_overdue(
    columns: &[&str],
    status_column: &str,
    done_value: &str,
    due_column: &str,
    now: DateTime<Utc>,
) -> FetchParams {
    let now = Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true));
    QueryBuilder::new()
        .select(columns.iter().copied())
        .where_group(WhereGroup::and(vec![SubGroup::all([
            Filter::ne(status_column, done_value),
            Filter::lt(due_column, now),
            Filter::has_value(due_column),
        ])]))
        .order_by(OrderBy::asc(due_column))
        .build()
}

/// Grouped projection used for aggregate statistics
pub fn grouped(columns: &[&str], group_column: &str) -> FetchParams {
    QueryBuilder::new()
        .select(columns.iter().copied())
        .group_by(group_column)
        .build()
}
