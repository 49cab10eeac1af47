//! Sort specifications for record queries

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortType {
    Asc,
    Desc,
}

/// Sort key as the store expects it: `{"fieldName": ..., "sorttype": "ASC"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    pub sorttype: SortType,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            sorttype: SortType::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            sorttype: SortType::Desc,
        }
    }
}
