//! Fluent builder for fetch descriptors

use super::filters::{Filter, WhereGroup};
use super::orderby::OrderBy;
use super::query::{FetchParams, FieldRef};

/// Fluent builder producing a `FetchParams` descriptor.
///
/// The builder performs no I/O; building the same chain twice yields equal
/// descriptors.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: FetchParams,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add columns to the projection
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params
            .fields
            .extend(columns.into_iter().map(FieldRef::new));
        self
    }

    /// Add a top-level filter (all top-level filters are conjunctive)
    pub fn filter(mut self, filter: Filter) -> Self {
        self.params.filters.push(filter);
        self
    }

    /// Add a compound filter group
    pub fn where_group(mut self, group: WhereGroup) -> Self {
        self.params.where_groups.push(group);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.params.order_by.push(order);
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.params.group_by.push(column.into());
        self
    }

    pub fn build(self) -> FetchParams {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_clauses() {
        let params = QueryBuilder::new()
            .select(["Id", "title_c"])
            .filter(Filter::eq("status_c", "pending"))
            .order_by(OrderBy::asc("due_date_c"))
            .build();

        assert_eq!(params.columns(), vec!["Id", "title_c"]);
        assert_eq!(params.filters.len(), 1);
        assert_eq!(params.order_by, vec![OrderBy::asc("due_date_c")]);
        assert!(params.where_groups.is_empty());
        assert!(params.group_by.is_empty());
    }

    #[test]
    fn test_builder_is_deterministic() {
        let build = || {
            QueryBuilder::new()
                .select(["Id"])
                .filter(Filter::eq("deal_id_c", 3))
                .build()
        };
        assert_eq!(build(), build());
    }
}
