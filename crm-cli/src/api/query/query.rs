//! Request descriptors for the store's fetch and get-by-id operations

use serde::{Deserialize, Serialize};

use super::filters::{Filter, WhereGroup};
use super::orderby::OrderBy;

/// Column selector, serialized as `{"field": {"Name": "<column>"}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub field: FieldName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

impl FieldRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            field: FieldName {
                name: column.into(),
            },
        }
    }

    pub fn column(&self) -> &str {
        &self.field.name
    }
}

/// Parameters for `fetchRecords`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchParams {
    pub fields: Vec<FieldRef>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub where_groups: Vec<WhereGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
}

/// Parameters for `getRecordById`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetParams {
    pub fields: Vec<FieldRef>,
}

impl FetchParams {
    /// Column names requested by this descriptor
    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(FieldRef::column).collect()
    }
}

impl GetParams {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: columns.into_iter().map(FieldRef::new).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_clauses_are_omitted() {
        let params = FetchParams {
            fields: vec![FieldRef::new("Id")],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"fields": [{"field": {"Name": "Id"}}]})
        );
    }

    #[test]
    fn test_wire_keys() {
        let params = FetchParams {
            fields: vec![FieldRef::new("stage_c")],
            filters: vec![Filter::eq("stage_c", "Lead")],
            order_by: vec![OrderBy::desc("CreatedOn")],
            group_by: vec!["stage_c".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert!(json.get("where").is_some());
        assert_eq!(json["orderBy"], json!([{"fieldName": "CreatedOn", "sorttype": "DESC"}]));
        assert_eq!(json["groupBy"], json!(["stage_c"]));
    }
}
