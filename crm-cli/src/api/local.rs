//! File-backed record store
//!
//! `LocalStore` keeps every table in a JSON file. The file is read once
//! when the store is opened and rewritten after every successful write,
//! so separate CLI invocations see each other's changes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use super::client::RecordStore;
use super::memory::MemoryStore;
use super::models::{
    DeleteRequest, FetchResponse, GetResponse, MutationRequest, MutationResponse,
};
use super::query::{FetchParams, GetParams};

/// Record store persisted to a single JSON file
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    tables: MemoryStore,
}

impl LocalStore {
    /// `<data_dir>/crm-cli/store.json`
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crm-cli")
            .join("store.json")
    }

    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store file: {}", path.display()))?;
            MemoryStore::from_json(&content)
                .with_context(|| format!("Invalid store file: {}", path.display()))?
        } else {
            debug!("No store file at {}, starting empty", path.display());
            MemoryStore::new()
        };

        Ok(Self { path, tables })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&self.path, self.tables.to_json()?)
            .with_context(|| format!("Failed to write store file: {}", self.path.display()))
    }

    fn persist_if_applied(&self, response: MutationResponse) -> Result<MutationResponse> {
        if response.success {
            self.persist()?;
        }
        Ok(response)
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse> {
        self.tables.fetch_records(table, params).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        params: &GetParams,
    ) -> Result<GetResponse> {
        self.tables.get_record_by_id(table, id, params).await
    }

    async fn create_records(
        &self,
        table: &str,
        request: &MutationRequest,
    ) -> Result<MutationResponse> {
        let response = self.tables.create_records(table, request).await?;
        self.persist_if_applied(response)
    }

    async fn update_records(
        &self,
        table: &str,
        request: &MutationRequest,
    ) -> Result<MutationResponse> {
        let response = self.tables.update_records(table, request).await?;
        self.persist_if_applied(response)
    }

    async fn delete_records(
        &self,
        table: &str,
        request: &DeleteRequest,
    ) -> Result<MutationResponse> {
        let response = self.tables.delete_records(table, request).await?;
        self.persist_if_applied(response)
    }
}
