//! In-process record store
//!
//! Executes fetch descriptors against rows held in memory: top-level filters
//! and filter groups are conjunctive, sort keys apply in order, and the
//! projection keeps only requested columns. Creates assign ids and the
//! `CreatedOn`/`ModifiedOn` system columns the way the remote store does.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::RecordStore;
use super::models::{
    DeleteRequest, FetchResponse, GetResponse, MutationRequest, MutationResponse, RecordResult,
};
use super::query::filters::compare;
use super::query::{CREATED_ON, FetchParams, FieldRef, GetParams, ID_COLUMN, MODIFIED_ON, SortType};

type Row = Map<String, Value>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Row>,
}

impl Table {
    fn insert(&mut self, mut row: Row) -> Row {
        let id = match row.get(ID_COLUMN).and_then(Value::as_i64) {
            Some(id) if id > 0 => id,
            _ => self.next_id + 1,
        };
        self.next_id = self.next_id.max(id);
        row.insert(ID_COLUMN.to_string(), Value::from(id));
        self.rows.insert(id, row.clone());
        row
    }
}

/// Record store backed by in-memory tables
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Table>>,
    rejection: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows as-is (no timestamps); rows without a positive `Id` get
    /// the next free one
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.lock_tables();
        let table = tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Value::Object(row) = row {
                table.insert(row);
            }
        }
    }

    /// Answer every following call with `success: false` and `message`
    pub fn reject_with(&self, message: impl Into<String>) {
        *self.lock_rejection() = Some(message.into());
    }

    pub fn clear_rejection(&self) {
        *self.lock_rejection() = None;
    }

    /// Snapshot of a table's rows in id order
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock_tables()
            .get(table)
            .map(|t| t.rows.values().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Serialize every table, including id counters
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&*self.lock_tables()).context("Failed to serialize store")
    }

    /// Rebuild a store from [`MemoryStore::to_json`] output
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: HashMap<String, Table> =
            serde_json::from_str(json).context("Failed to parse store snapshot")?;
        Ok(Self {
            tables: Mutex::new(tables),
            rejection: Mutex::new(None),
        })
    }

    fn lock_tables(&self) -> std::sync::MutexGuard<'_, HashMap<String, Table>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_rejection(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.rejection.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn rejection(&self) -> Option<String> {
        self.lock_rejection().clone()
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn project(row: &Row, fields: &[FieldRef]) -> Value {
    if fields.is_empty() {
        return Value::Object(row.clone());
    }
    let projected = fields
        .iter()
        .filter_map(|f| {
            row.get(f.column())
                .map(|v| (f.column().to_string(), v.clone()))
        })
        .collect();
    Value::Object(projected)
}

fn order_rows(rows: &mut [&Row], params: &FetchParams) {
    rows.sort_by(|a, b| {
        for order in &params.order_by {
            let left = a.get(&order.field_name).unwrap_or(&Value::Null);
            let right = b.get(&order.field_name).unwrap_or(&Value::Null);
            let ordering = match order.sorttype {
                SortType::Asc => compare(left, right),
                SortType::Desc => compare(right, left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse> {
        if let Some(message) = self.rejection() {
            return Ok(FetchResponse::rejected(message));
        }

        let tables = self.lock_tables();
        let Some(table) = tables.get(table) else {
            return Ok(FetchResponse::ok(Vec::new()));
        };

        let mut rows: Vec<&Row> = table
            .rows
            .values()
            .filter(|row| params.filters.iter().all(|f| f.matches(row)))
            .filter(|row| params.where_groups.iter().all(|g| g.matches(row)))
            .collect();
        order_rows(&mut rows, params);

        Ok(FetchResponse::ok(
            rows.into_iter().map(|row| project(row, &params.fields)).collect(),
        ))
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        params: &GetParams,
    ) -> Result<GetResponse> {
        if let Some(message) = self.rejection() {
            return Ok(GetResponse {
                success: false,
                message: Some(message),
                data: None,
            });
        }

        let data = self
            .lock_tables()
            .get(table)
            .and_then(|t| t.rows.get(&id))
            .map(|row| project(row, &params.fields));

        Ok(GetResponse {
            success: true,
            message: None,
            data,
        })
    }

    async fn create_records(
        &self,
        table: &str,
        request: &MutationRequest,
    ) -> Result<MutationResponse> {
        if let Some(message) = self.rejection() {
            return Ok(MutationResponse::rejected(message));
        }

        let mut tables = self.lock_tables();
        let table = tables.entry(table.to_string()).or_default();

        let results = request
            .records
            .iter()
            .map(|record| match record {
                Value::Object(fields) => {
                    let mut row = fields.clone();
                    row.remove(ID_COLUMN);
                    let stamp = now();
                    row.insert(CREATED_ON.to_string(), stamp.clone());
                    row.insert(MODIFIED_ON.to_string(), stamp);
                    RecordResult::succeeded(Some(Value::Object(table.insert(row))))
                }
                _ => RecordResult::failed("Record must be an object"),
            })
            .collect();

        Ok(MutationResponse::ok(results))
    }

    async fn update_records(
        &self,
        table: &str,
        request: &MutationRequest,
    ) -> Result<MutationResponse> {
        if let Some(message) = self.rejection() {
            return Ok(MutationResponse::rejected(message));
        }

        let mut tables = self.lock_tables();
        let table = tables.entry(table.to_string()).or_default();

        let results = request
            .records
            .iter()
            .map(|record| {
                let Some(id) = record.get(ID_COLUMN).and_then(Value::as_i64) else {
                    return RecordResult::failed("Record is missing Id");
                };
                let Some(row) = table.rows.get_mut(&id) else {
                    return RecordResult::failed(format!("Record {} not found", id));
                };
                if let Value::Object(fields) = record {
                    for (key, value) in fields {
                        if key != ID_COLUMN {
                            row.insert(key.clone(), value.clone());
                        }
                    }
                }
                row.insert(MODIFIED_ON.to_string(), now());
                RecordResult::succeeded(Some(Value::Object(row.clone())))
            })
            .collect();

        Ok(MutationResponse::ok(results))
    }

    async fn delete_records(
        &self,
        table: &str,
        request: &DeleteRequest,
    ) -> Result<MutationResponse> {
        if let Some(message) = self.rejection() {
            return Ok(MutationResponse::rejected(message));
        }

        let mut tables = self.lock_tables();
        let table = tables.entry(table.to_string()).or_default();

        let results = request
            .record_ids
            .iter()
            .map(|id| match table.rows.remove(id) {
                Some(_) => RecordResult::succeeded(None),
                None => RecordResult::failed(format!("Record {} not found", id)),
            })
            .collect();

        Ok(MutationResponse::ok(results))
    }
}
