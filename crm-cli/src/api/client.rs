//! Record store client
//!
//! `RecordStore` is the seam between the repositories and the remote
//! record-storage service. `HttpRecordStore` talks to the service over
//! JSON/HTTP; `MemoryStore` (see `api::memory`) serves tests and offline use.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::models::{
    DeleteRequest, FetchResponse, GetResponse, MutationRequest, MutationResponse,
};
use super::query::{FetchParams, GetParams};

/// Generic record-storage operations.
///
/// Transport failures are reported as `Err`; store-level rejections arrive
/// as responses with `success == false`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse>;

    async fn get_record_by_id(&self, table: &str, id: i64, params: &GetParams)
    -> Result<GetResponse>;

    async fn create_records(&self, table: &str, request: &MutationRequest)
    -> Result<MutationResponse>;

    async fn update_records(&self, table: &str, request: &MutationRequest)
    -> Result<MutationResponse>;

    async fn delete_records(&self, table: &str, request: &DeleteRequest)
    -> Result<MutationResponse>;
}

/// Credentials identifying the project on the record store
#[derive(Debug, Clone)]
pub struct StoreCredentials {
    pub project_id: String,
    pub public_key: String,
}

/// JSON/HTTP record store client.
///
/// One instance is built by the composition root and shared (via `Arc`) by
/// every repository; it is never recreated.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    http: reqwest::Client,
    base_url: String,
    credentials: StoreCredentials,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>, credentials: StoreCredentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("crm-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn records_url(&self, table: &str) -> String {
        format!("{}/tables/{}/records", self.base_url, urlencoding::encode(table))
    }

    async fn send<B, T>(&self, method: Method, url: String, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("{} {}", method, url);

        let response = self
            .http
            .request(method.clone(), &url)
            .header("X-Project-Id", &self.credentials.project_id)
            .header("X-Public-Key", &self.credentials.public_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        // Rejections carry a JSON body even on non-2xx statuses
        serde_json::from_str(&text).with_context(|| {
            format!(
                "Unexpected response from {} {} (HTTP {}): {}",
                method, url, status, text
            )
        })
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse> {
        let url = format!("{}/query", self.records_url(table));
        self.send(Method::POST, url, params).await
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        params: &GetParams,
    ) -> Result<GetResponse> {
        let url = format!("{}/{}/query", self.records_url(table), id);
        self.send(Method::POST, url, params).await
    }

    async fn create_records(
        &self,
        table: &str,
        request: &MutationRequest,
    ) -> Result<MutationResponse> {
        self.send(Method::POST, self.records_url(table), request).await
    }

    async fn update_records(
        &self,
        table: &str,
        request: &MutationRequest,
    ) -> Result<MutationResponse> {
        self.send(Method::PUT, self.records_url(table), request).await
    }

    async fn delete_records(
        &self,
        table: &str,
        request: &DeleteRequest,
    ) -> Result<MutationResponse> {
        self.send(Method::DELETE, self.records_url(table), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_url_trims_trailing_slash() {
        let store = HttpRecordStore::new(
            "https://store.example.com/api/",
            StoreCredentials {
                project_id: "p".to_string(),
                public_key: "k".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            store.records_url("deal_c"),
            "https://store.example.com/api/tables/deal_c/records"
        );
    }
}
