//! Schema-driven repository over a record store

use std::sync::Arc;

use log::{debug, error, warn};
use serde_json::Value;

use super::error::RepositoryError;
use super::id::IntoRecordId;
use super::notify::Notifier;
use crate::api::client::RecordStore;
use crate::api::operations::{BatchOutcome, Operation};
use crate::api::query::{FetchParams, patterns};
use crate::schema::{Record, Schema, WriteMode, read_record, read_records, write_record};

/// Generic repository for one table.
///
/// The store and notifier are injected by the composition root; the
/// repository holds no other state, so every read goes to the store.
#[derive(Clone)]
pub struct Repository {
    schema: &'static Schema,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
}

impl Repository {
    pub fn new(
        schema: &'static Schema,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            schema,
            store,
            notifier,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Execute a fetch descriptor and return the raw rows
    pub async fn fetch_rows(&self, params: &FetchParams) -> Result<Vec<Value>, RepositoryError> {
        let table = self.schema.table;
        debug!("Fetching {} with {} filter(s)", table, params.filters.len());

        let response = match self.store.fetch_records(table, params).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error fetching {}: {:#}", self.schema.collection, e);
                self.notifier
                    .error(&format!("Failed to load {}", self.schema.collection));
                return Err(RepositoryError::Transport(e));
            }
        };

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| format!("Failed to load {}", self.schema.collection));
            error!("{}", message);
            self.notifier.error(&message);
            return Err(RepositoryError::Store { message });
        }

        Ok(response.data.unwrap_or_default())
    }

    /// Execute a fetch descriptor and map every row to a UI record
    pub async fn fetch(&self, params: &FetchParams) -> Result<Vec<Record>, RepositoryError> {
        let rows = self.fetch_rows(params).await?;
        Ok(read_records(self.schema, &rows))
    }

    /// Every record, newest first
    pub async fn get_all(&self) -> Result<Vec<Record>, RepositoryError> {
        self.fetch(&patterns::all(&self.schema.columns())).await
    }

    /// Fetch one record; `Ok(None)` when the store has no such record
    pub async fn get_by_id(&self, id: impl IntoRecordId) -> Result<Option<Record>, RepositoryError> {
        let id = id.into_record_id()?;
        let params = patterns::by_id(&self.schema.columns());

        let response = match self.store.get_record_by_id(self.schema.table, id, &params).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error fetching {} {}: {:#}", self.entity_name(), id, e);
                self.notifier
                    .error(&format!("Failed to load {} {}", self.entity_name(), id));
                return Err(RepositoryError::Transport(e));
            }
        };

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| format!("Failed to load {} {}", self.entity_name(), id));
            error!("{}", message);
            self.notifier.error(&message);
            return Err(RepositoryError::Store { message });
        }

        Ok(response
            .data
            .filter(|data| !data.is_null())
            .map(|data| read_record(self.schema, &data)))
    }

    /// Create a record from a full UI record
    pub async fn create(&self, input: &Record) -> Result<Record, RepositoryError> {
        let operation = self.plan_create(input)?;
        let outcome = self.execute(&operation).await?;
        self.first_record(outcome, "create", "created")
    }

    /// Apply a partial update; only the supplied fields are sent
    pub async fn update(
        &self,
        id: impl IntoRecordId,
        input: &Record,
    ) -> Result<Record, RepositoryError> {
        self.update_with(id, input, WriteMode::Update, "update", "updated")
            .await
    }

    /// Partial update issued by a dedicated operation (e.g., completing an
    /// activity); managed fields are accepted
    pub(crate) async fn update_with(
        &self,
        id: impl IntoRecordId,
        input: &Record,
        mode: WriteMode,
        action: &str,
        done: &str,
    ) -> Result<Record, RepositoryError> {
        let operation = self.plan_update(id, input, mode)?;
        let outcome = self.execute(&operation).await?;
        self.first_record(outcome, action, done)
    }

    /// Delete a record; `Ok(true)` iff the store reports a deleted entry
    pub async fn delete(&self, id: impl IntoRecordId) -> Result<bool, RepositoryError> {
        let operation = self.plan_delete(id)?;
        let outcome = self.execute(&operation).await?;

        if outcome.any_succeeded() {
            self.notifier
                .success(&format!("{} deleted successfully", self.schema.entity));
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Validate `input` and build the create operation without sending it
    pub fn plan_create(&self, input: &Record) -> Result<Operation, RepositoryError> {
        let body = self.body(input, WriteMode::Create)?;
        Ok(Operation::create(self.schema.table, Value::Object(body)))
    }

    /// Validate `id` and `input` and build the update operation without
    /// sending it
    pub fn plan_update(
        &self,
        id: impl IntoRecordId,
        input: &Record,
        mode: WriteMode,
    ) -> Result<Operation, RepositoryError> {
        let id = id.into_record_id()?;
        let body = self.body(input, mode)?;
        Ok(Operation::update(self.schema.table, id, Value::Object(body)))
    }

    pub fn plan_delete(&self, id: impl IntoRecordId) -> Result<Operation, RepositoryError> {
        Ok(Operation::delete(self.schema.table, id.into_record_id()?))
    }

    fn entity_name(&self) -> String {
        self.schema.entity.to_lowercase()
    }

    fn body(
        &self,
        input: &Record,
        mode: WriteMode,
    ) -> Result<serde_json::Map<String, Value>, RepositoryError> {
        write_record(self.schema, input, mode).map_err(|e| {
            warn!("Rejected {} input: {}", self.entity_name(), e);
            RepositoryError::from(e)
        })
    }

    /// Run a singleton batch and report failed entries
    async fn execute(&self, operation: &Operation) -> Result<BatchOutcome, RepositoryError> {
        let action = operation.operation_type();
        let response = match operation.execute(self.store.as_ref()).await {
            Ok(response) => response,
            Err(e) => {
                error!("Error during {} {}: {:#}", action, self.entity_name(), e);
                self.notifier
                    .error(&format!("Failed to {} {}", action, self.entity_name()));
                return Err(RepositoryError::Transport(e));
            }
        };

        let outcome = BatchOutcome::from_response(response).map_err(|message| {
            error!("{}", message);
            self.notifier.error(&message);
            RepositoryError::Store { message }
        })?;

        if !outcome.failed.is_empty() {
            error!(
                "Failed to {} {} {}: {:?}",
                action,
                outcome.failed.len(),
                self.schema.collection,
                outcome.failed
            );
            for message in outcome.failure_messages() {
                self.notifier.error(&message);
            }
        }

        Ok(outcome)
    }

    fn first_record(
        &self,
        outcome: BatchOutcome,
        action: &str,
        done: &str,
    ) -> Result<Record, RepositoryError> {
        let operation = format!("{} {}", action, self.entity_name());

        if !outcome.any_succeeded() {
            return Err(RepositoryError::BatchFailed {
                operation,
                failures: outcome.failure_messages(),
            });
        }

        let Some(data) = outcome.first_record() else {
            return Err(RepositoryError::MissingData { operation });
        };

        self.notifier
            .success(&format!("{} {} successfully", self.schema.entity, done));
        Ok(read_record(self.schema, data))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{RecordingNotifier, ScriptedStore};
    use super::*;
    use crate::api::memory::MemoryStore;
    use crate::api::models::{FetchResponse, GetResponse, MutationResponse, RecordResult};
    use crate::schema::{DefaultValue, FieldSpec};
    use serde_json::json;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::new("id", "Id").read_only(),
        FieldSpec::new("title", "title_c").trimmed().required(),
        FieldSpec::new("stage", "stage_c").default_to(DefaultValue::Str("Lead")),
    ];

    static SCHEMA: Schema = Schema {
        table: "thing_c",
        entity: "Thing",
        collection: "things",
        fields: FIELDS,
    };

    fn repo(store: Arc<dyn RecordStore>) -> (Repository, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (Repository::new(&SCHEMA, store, notifier.clone()), notifier)
    }

    fn input(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_mapped_success() {
        let store = Arc::new(ScriptedStore::with_mutation(MutationResponse::ok(vec![
            RecordResult::succeeded(Some(json!({"Id": 11, "title_c": "Demo"}))),
        ])));
        let (repo, notifier) = repo(store.clone());

        let created = repo.create(&input(json!({"title": "Demo"}))).await.unwrap();

        assert_eq!(created["id"], json!(11));
        assert_eq!(created["stage"], json!("Lead"));
        assert_eq!(notifier.successes(), vec!["Thing created successfully"]);
        assert_eq!(
            store.requests(),
            vec![json!({"records": [{"title_c": "Demo", "stage_c": "Lead"}]})]
        );
    }

    #[tokio::test]
    async fn test_create_with_only_failures_is_batch_failed() {
        let store = Arc::new(ScriptedStore::with_mutation(MutationResponse::ok(vec![
            RecordResult::failed("Duplicate title"),
        ])));
        let (repo, notifier) = repo(store);

        let result = repo.create(&input(json!({"title": "Demo"}))).await;

        assert!(matches!(
            result,
            Err(RepositoryError::BatchFailed { ref failures, .. }) if failures == &vec!["Duplicate title".to_string()]
        ));
        assert_eq!(notifier.errors(), vec!["Duplicate title"]);
        assert!(notifier.successes().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_still_succeeds() {
        let store = Arc::new(ScriptedStore::with_mutation(MutationResponse::ok(vec![
            RecordResult::failed("second row rejected"),
            RecordResult::succeeded(Some(json!({"Id": 3, "title_c": "Kept"}))),
        ])));
        let (repo, notifier) = repo(store);

        let updated = repo.update(3, &input(json!({"title": "Kept"}))).await.unwrap();

        assert_eq!(updated["title"], json!("Kept"));
        assert_eq!(notifier.errors(), vec!["second row rejected"]);
        assert_eq!(notifier.successes(), vec!["Thing updated successfully"]);
    }

    #[tokio::test]
    async fn test_store_rejection_is_reported() {
        let store = Arc::new(ScriptedStore::with_mutation(MutationResponse::rejected(
            "Invalid API key",
        )));
        let (repo, notifier) = repo(store);

        let result = repo.delete("4").await;

        assert!(matches!(result, Err(RepositoryError::Store { ref message }) if message == "Invalid API key"));
        assert_eq!(notifier.errors(), vec!["Invalid API key"]);
    }

    #[tokio::test]
    async fn test_success_without_data_is_missing_data() {
        let store = Arc::new(ScriptedStore::with_mutation(MutationResponse::ok(vec![
            RecordResult::succeeded(None),
        ])));
        let (repo, _) = repo(store);

        let result = repo.update(1, &input(json!({"stage": "Won"}))).await;
        assert!(matches!(result, Err(RepositoryError::MissingData { .. })));
    }

    #[tokio::test]
    async fn test_invalid_id_never_reaches_store() {
        let store = Arc::new(ScriptedStore::default());
        let (repo, _) = repo(store.clone());

        assert!(matches!(
            repo.get_by_id("abc").await,
            Err(RepositoryError::InvalidId(_))
        ));
        assert!(matches!(
            repo.update("0", &Record::new()).await,
            Err(RepositoryError::InvalidId(_))
        ));
        assert!(matches!(
            repo.create(&input(json!({"colour": "blue"}))).await,
            Err(RepositoryError::InvalidInput(_))
        ));
        assert!(store.requests().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_absent_is_none() {
        let store = Arc::new(ScriptedStore::with_get(GetResponse {
            success: true,
            message: None,
            data: None,
        }));
        let (repo, notifier) = repo(store);

        assert_eq!(repo.get_by_id(99).await.unwrap(), None);
        assert!(notifier.errors().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejection_is_store_error() {
        let store = Arc::new(ScriptedStore::with_fetch(FetchResponse::rejected(
            "Table not found",
        )));
        let (repo, notifier) = repo(store);

        assert!(matches!(
            repo.get_all().await,
            Err(RepositoryError::Store { .. })
        ));
        assert_eq!(notifier.errors(), vec!["Table not found"]);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let store = Arc::new(ScriptedStore::unreachable());
        let (repo, notifier) = repo(store);

        assert!(matches!(
            repo.get_all().await,
            Err(RepositoryError::Transport(_))
        ));
        assert_eq!(notifier.errors(), vec!["Failed to load things"]);
    }

    #[tokio::test]
    async fn test_get_by_id_transport_failure_notifies() {
        let store = Arc::new(ScriptedStore::unreachable());
        let (repo, notifier) = repo(store);

        assert!(matches!(
            repo.get_by_id(1).await,
            Err(RepositoryError::Transport(_))
        ));
        assert_eq!(notifier.errors(), vec!["Failed to load thing 1"]);
    }

    #[tokio::test]
    async fn test_delete_round_trip_against_memory_store() {
        let store = Arc::new(MemoryStore::new());
        let (repo, notifier) = repo(store.clone());

        let created = repo.create(&input(json!({"title": "Temp"}))).await.unwrap();
        let id = created["id"].as_i64().unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert_eq!(repo.get_by_id(id).await.unwrap(), None);
        assert_eq!(notifier.errors(), vec![format!("Record {} not found", id)]);
    }
}
