//! Core Operation type for record store mutations

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::client::RecordStore;
use crate::api::models::{DeleteRequest, MutationRequest, MutationResponse};
use crate::api::query::ID_COLUMN;

/// A single mutation executed against one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a new record
    Create {
        /// Table name (e.g., "deal_c")
        table: String,
        /// Column-keyed record body
        data: Value,
    },
    /// Partially update an existing record
    Update {
        table: String,
        /// Record ID
        id: i64,
        /// Column-keyed body holding only the columns to change
        data: Value,
    },
    /// Delete a record
    Delete { table: String, id: i64 },
}

impl Operation {
    /// Create a new Create operation
    pub fn create(table: impl Into<String>, data: Value) -> Self {
        Self::Create {
            table: table.into(),
            data,
        }
    }

    /// Create a new Update operation
    pub fn update(table: impl Into<String>, id: i64, data: Value) -> Self {
        Self::Update {
            table: table.into(),
            id,
            data,
        }
    }

    /// Create a new Delete operation
    pub fn delete(table: impl Into<String>, id: i64) -> Self {
        Self::Delete {
            table: table.into(),
            id,
        }
    }

    /// Get the table name for this operation
    pub fn table(&self) -> &str {
        match self {
            Self::Create { table, .. } => table,
            Self::Update { table, .. } => table,
            Self::Delete { table, .. } => table,
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    /// Singleton batch body sent for create/update; the update body carries
    /// the record id under `Id`
    pub fn batch_body(&self) -> Option<MutationRequest> {
        match self {
            Self::Create { data, .. } => Some(MutationRequest {
                records: vec![data.clone()],
            }),
            Self::Update { id, data, .. } => {
                let mut record = match data {
                    Value::Object(fields) => fields.clone(),
                    _ => serde_json::Map::new(),
                };
                record.insert(ID_COLUMN.to_string(), Value::from(*id));
                Some(MutationRequest {
                    records: vec![Value::Object(record)],
                })
            }
            Self::Delete { .. } => None,
        }
    }

    /// Execute this operation as a singleton batch against a store
    pub async fn execute(&self, store: &dyn RecordStore) -> anyhow::Result<MutationResponse> {
        match self {
            Self::Create { table, .. } => {
                let body = self.batch_body().unwrap_or_default();
                store.create_records(table, &body).await
            }
            Self::Update { table, .. } => {
                let body = self.batch_body().unwrap_or_default();
                store.update_records(table, &body).await
            }
            Self::Delete { table, id } => {
                let body = DeleteRequest {
                    record_ids: vec![*id],
                };
                store.delete_records(table, &body).await
            }
        }
    }
}
