//! Activities: tasks, calls and meetings attached to contacts and deals

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::api::client::RecordStore;
use crate::api::operations::Operation;
use crate::api::query::{
    CREATED_ON, FetchParams, ID_COLUMN, MODIFIED_ON, NAME_COLUMN, OrderBy, patterns,
};
use crate::repository::{IntoRecordId, Notifier, Repository, RepositoryError};
use crate::schema::{DefaultValue, FieldSpec, Record, Schema, WriteMode};

/// Outcome recorded when an activity is completed without one
pub const DEFAULT_OUTCOME: &str = "Task completed successfully";

const STATUS: &str = "status_c";
const DUE_DATE: &str = "due_date_c";
const COMPLETED_AT: &str = "completed_at_c";
const CONTACT_ID: &str = "contact_id_c";
const DEAL_ID: &str = "deal_id_c";

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", ID_COLUMN).read_only(),
    FieldSpec::new("type", "type_c"),
    FieldSpec::new("title", "title_c")
        .trimmed()
        .required()
        .mirrored_to(NAME_COLUMN),
    FieldSpec::new("description", "description_c")
        .trimmed()
        .create_default(DefaultValue::Str("")),
    FieldSpec::new("status", STATUS)
        .managed()
        .default_to(DefaultValue::Str("pending")),
    FieldSpec::new("priority", "priority_c").create_default(DefaultValue::Str("normal")),
    FieldSpec::new("dueDate", DUE_DATE),
    FieldSpec::new("completedAt", COMPLETED_AT).managed(),
    FieldSpec::new("contactId", CONTACT_ID).lookup("contactName", "contact_name_c", None),
    FieldSpec::new("dealId", DEAL_ID).lookup("dealTitle", "deal_title_c", None),
    FieldSpec::new("assignedTo", "assigned_to_c")
        .create_default(DefaultValue::Str("Current User")),
    FieldSpec::new("outcome", "outcome_c")
        .managed()
        .create_default(DefaultValue::Null),
    FieldSpec::new("createdAt", CREATED_ON).read_only(),
    FieldSpec::new("updatedAt", MODIFIED_ON).read_only(),
];

/// Schema of the `activity_c` table
pub static SCHEMA: Schema = Schema {
    table: "activity_c",
    entity: "Activity",
    collection: "activities",
    fields: FIELDS,
};

/// Lifecycle of an activity; completion is one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    Pending,
    Completed,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Pending => "pending",
            ActivityStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetch descriptors for the activity access patterns
pub mod queries {
    use super::*;

    pub fn all() -> FetchParams {
        patterns::all(&SCHEMA.columns())
    }

    /// Open activities, earliest due first
    pub fn tasks() -> FetchParams {
        patterns::excluding_enum_value(
            &SCHEMA.columns(),
            STATUS,
            ActivityStatus::Completed.as_str(),
            OrderBy::asc(DUE_DATE),
        )
    }

    /// Completed activities, most recently completed first
    pub fn history() -> FetchParams {
        patterns::by_enum_value(
            &SCHEMA.columns(),
            STATUS,
            ActivityStatus::Completed.as_str(),
            OrderBy::desc(COMPLETED_AT),
        )
    }

    pub fn by_contact(contact_id: i64) -> FetchParams {
        patterns::by_foreign_key(&SCHEMA.columns(), CONTACT_ID, contact_id)
    }

    pub fn by_deal(deal_id: i64) -> FetchParams {
        patterns::by_foreign_key(&SCHEMA.columns(), DEAL_ID, deal_id)
    }

    /// Open activities with a due date before `now`
    pub fn overdue(now: DateTime<Utc>) -> FetchParams {
        patterns::compound_overdue(
            &SCHEMA.columns(),
            STATUS,
            ActivityStatus::Completed.as_str(),
            DUE_DATE,
            now,
        )
    }
}

/// Repository for activities
#[derive(Clone)]
pub struct Activities {
    repo: Repository,
}

impl Activities {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo: Repository::new(&SCHEMA, store, notifier),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub async fn get_all(&self) -> Result<Vec<Record>, RepositoryError> {
        self.repo.fetch(&queries::all()).await
    }

    pub async fn get_by_id(&self, id: impl IntoRecordId) -> Result<Option<Record>, RepositoryError> {
        self.repo.get_by_id(id).await
    }

    /// Create an activity; it starts out pending with no outcome unless the
    /// caller says otherwise
    pub async fn create(&self, data: &Record) -> Result<Record, RepositoryError> {
        self.repo.create(data).await
    }

    /// Partial update; `status`, `completedAt` and `outcome` are only
    /// changed through [`Activities::complete`]
    pub async fn update(&self, id: impl IntoRecordId, data: &Record) -> Result<Record, RepositoryError> {
        self.repo.update(id, data).await
    }

    /// Mark an activity completed now; a blank outcome records
    /// [`DEFAULT_OUTCOME`]
    pub async fn complete(&self, id: impl IntoRecordId, outcome: &str) -> Result<Record, RepositoryError> {
        self.complete_at(id, outcome, Utc::now()).await
    }

    pub async fn complete_at(
        &self,
        id: impl IntoRecordId,
        outcome: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<Record, RepositoryError> {
        let data = completion(outcome, completed_at);
        self.repo
            .update_with(id, &data, WriteMode::Managed, "complete", "completed")
            .await
    }

    /// The update `complete_at` would send
    pub fn plan_complete(
        &self,
        id: impl IntoRecordId,
        outcome: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<Operation, RepositoryError> {
        self.repo
            .plan_update(id, &completion(outcome, completed_at), WriteMode::Managed)
    }

    pub async fn delete(&self, id: impl IntoRecordId) -> Result<bool, RepositoryError> {
        self.repo.delete(id).await
    }

    pub async fn get_tasks(&self) -> Result<Vec<Record>, RepositoryError> {
        self.repo.fetch(&queries::tasks()).await
    }

    pub async fn get_history(&self) -> Result<Vec<Record>, RepositoryError> {
        self.repo.fetch(&queries::history()).await
    }

    pub async fn get_by_contact(&self, contact_id: impl IntoRecordId) -> Result<Vec<Record>, RepositoryError> {
        let contact_id = contact_id.into_record_id()?;
        self.repo.fetch(&queries::by_contact(contact_id)).await
    }

    pub async fn get_by_deal(&self, deal_id: impl IntoRecordId) -> Result<Vec<Record>, RepositoryError> {
        let deal_id = deal_id.into_record_id()?;
        self.repo.fetch(&queries::by_deal(deal_id)).await
    }

    pub async fn get_overdue(&self) -> Result<Vec<Record>, RepositoryError> {
        self.get_overdue_at(Utc::now()).await
    }

    pub async fn get_overdue_at(&self, now: DateTime<Utc>) -> Result<Vec<Record>, RepositoryError> {
        self.repo.fetch(&queries::overdue(now)).await
    }
}

fn completion(outcome: &str, completed_at: DateTime<Utc>) -> Record {
    let outcome = match outcome.trim() {
        "" => DEFAULT_OUTCOME,
        text => text,
    };

    let mut data = Record::new();
    data.insert(
        "status".to_string(),
        Value::from(ActivityStatus::Completed.as_str()),
    );
    data.insert(
        "completedAt".to_string(),
        Value::from(completed_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    data.insert("outcome".to_string(), Value::from(outcome));
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::MemoryStore;
    use crate::api::models::{MutationResponse, RecordResult};
    use crate::repository::test_support::{RecordingNotifier, ScriptedStore};
    use chrono::TimeZone;
    use serde_json::json;

    fn activities(store: Arc<dyn RecordStore>) -> (Activities, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (Activities::new(store, notifier.clone()), notifier)
    }

    fn data(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn seeded() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.seed(
            "activity_c",
            vec![
                json!({"Id": 1, "title_c": "Call back", "status_c": "pending", "due_date_c": "2024-01-10T09:00:00.000Z", "CreatedOn": "2024-01-01T00:00:00.000Z", "contact_id_c": {"Id": 7, "Name": "Ada Lovelace"}}),
                json!({"Id": 2, "title_c": "Send proposal", "status_c": "pending", "due_date_c": null, "CreatedOn": "2024-01-02T00:00:00.000Z", "deal_id_c": 4, "deal_title_c": "Renewal"}),
                json!({"Id": 3, "title_c": "Demo", "status_c": "completed", "due_date_c": "2024-01-05T09:00:00.000Z", "completed_at_c": "2024-01-06T10:00:00.000Z", "CreatedOn": "2024-01-03T00:00:00.000Z", "contact_id_c": 7}),
                json!({"Id": 4, "title_c": "Follow up", "status_c": "pending", "due_date_c": "2024-03-01T09:00:00.000Z", "CreatedOn": "2024-01-04T00:00:00.000Z"}),
                json!({"Id": 5, "title_c": "Kickoff", "status_c": "completed", "completed_at_c": "2024-01-08T10:00:00.000Z", "CreatedOn": "2024-01-05T00:00:00.000Z", "deal_id_c": 4}),
            ],
        );
        store
    }

    fn ids(records: &[Record]) -> Vec<i64> {
        records.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[test]
    fn test_overdue_query_shape() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let params = serde_json::to_value(queries::overdue(now)).unwrap();

        assert_eq!(
            params["whereGroups"][0]["subGroups"][0]["conditions"],
            json!([
                {"fieldName": "status_c", "operator": "NotEqualTo", "values": ["completed"]},
                {"fieldName": "due_date_c", "operator": "LessThan", "values": ["2024-02-01T00:00:00.000Z"]},
                {"fieldName": "due_date_c", "operator": "HasValue", "values": []}
            ])
        );
        assert_eq!(
            params["orderBy"],
            json!([{"fieldName": "due_date_c", "sorttype": "ASC"}])
        );
    }

    #[tokio::test]
    async fn test_overdue_excludes_null_due_date() {
        let (activities, _) = activities(seeded());
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let overdue = activities.get_overdue_at(now).await.unwrap();

        assert_eq!(ids(&overdue), vec![1]);
    }

    #[tokio::test]
    async fn test_tasks_and_history() {
        let (activities, _) = activities(seeded());

        let tasks = activities.get_tasks().await.unwrap();
        assert!(tasks.iter().all(|t| t["status"] == json!("pending")));
        assert_eq!(tasks.len(), 3);

        let history = activities.get_history().await.unwrap();
        assert_eq!(ids(&history), vec![5, 3]);
    }

    #[tokio::test]
    async fn test_lookups_are_normalized() {
        let (activities, _) = activities(seeded());

        let by_contact = activities.get_by_contact("7").await.unwrap();
        assert_eq!(ids(&by_contact), vec![3, 1]);

        let call = activities.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(call["contactId"], json!(7));
        assert_eq!(call["contactName"], json!("Ada Lovelace"));
        assert!(!call.contains_key("contact_id_c"));

        let demo = activities.get_by_id(3).await.unwrap().unwrap();
        assert_eq!(demo["contactId"], json!(7));
        assert_eq!(demo["contactName"], Value::Null);

        let by_deal = activities.get_by_deal(4).await.unwrap();
        assert_eq!(ids(&by_deal), vec![5, 2]);
        assert_eq!(by_deal[1]["dealTitle"], json!("Renewal"));
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let store = Arc::new(MemoryStore::new());
        let (activities, notifier) = activities(store.clone());

        let created = activities
            .create(&data(json!({"type": "call", "title": "  Intro call  ", "contactId": "12"})))
            .await
            .unwrap();

        assert_eq!(created["title"], json!("Intro call"));
        assert_eq!(created["status"], json!("pending"));
        assert_eq!(created["contactId"], json!(12));
        assert_eq!(created["outcome"], Value::Null);

        let row = &store.rows("activity_c")[0];
        assert_eq!(row["Name"], json!("Intro call"));
        assert_eq!(row["priority_c"], json!("normal"));
        assert_eq!(row["assigned_to_c"], json!("Current User"));
        assert_eq!(row["description_c"], json!(""));
        assert_eq!(row["deal_id_c"], Value::Null);
        assert_eq!(notifier.successes(), vec!["Activity created successfully"]);
    }

    #[tokio::test]
    async fn test_update_sends_only_supplied_fields() {
        let store = Arc::new(ScriptedStore::with_mutation(MutationResponse::ok(vec![
            RecordResult::succeeded(Some(json!({"Id": 9, "title_c": "Renamed"}))),
        ])));
        let (activities, _) = activities(store.clone());

        activities
            .update("9", &data(json!({"title": "Renamed", "dealId": null})))
            .await
            .unwrap();

        assert_eq!(
            store.requests(),
            vec![json!({"records": [{"Id": 9, "Name": "Renamed", "title_c": "Renamed", "deal_id_c": null}]})]
        );
    }

    #[tokio::test]
    async fn test_update_cannot_complete() {
        let store = Arc::new(ScriptedStore::default());
        let (activities, _) = activities(store.clone());

        let result = activities
            .update(1, &data(json!({"status": "completed"})))
            .await;

        assert!(matches!(result, Err(RepositoryError::InvalidInput(_))));
        assert!(store.requests().is_empty());
    }

    #[tokio::test]
    async fn test_complete_with_blank_outcome() {
        let store = seeded();
        let (activities, notifier) = activities(store);
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 12, 30, 0).unwrap();

        let done = activities.complete_at(4, "   ", at).await.unwrap();

        assert_eq!(done["status"], json!("completed"));
        assert_eq!(done["outcome"], json!(DEFAULT_OUTCOME));
        assert_eq!(done["completedAt"], json!("2024-02-01T12:30:00.000Z"));
        assert_eq!(done["title"], json!("Follow up"));
        assert_eq!(notifier.successes(), vec!["Activity completed successfully"]);
    }

    #[test]
    fn test_plan_complete_body() {
        let (activities, _) = activities(Arc::new(ScriptedStore::default()));
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 12, 30, 0).unwrap();

        let operation = activities.plan_complete("15", "", at).unwrap();

        assert_eq!(
            operation,
            Operation::update(
                "activity_c",
                15,
                json!({
                    "status_c": "completed",
                    "completed_at_c": "2024-02-01T12:30:00.000Z",
                    "outcome_c": DEFAULT_OUTCOME
                })
            )
        );
    }

    #[tokio::test]
    async fn test_complete_keeps_given_outcome() {
        let (activities, _) = activities(seeded());

        let done = activities.complete(1, " Booked a demo ").await.unwrap();
        assert_eq!(done["outcome"], json!("Booked a demo"));
    }

    #[tokio::test]
    async fn test_complete_unknown_activity_fails() {
        let (activities, notifier) = activities(seeded());

        let result = activities.complete(42, "").await;

        assert!(matches!(result, Err(RepositoryError::BatchFailed { .. })));
        assert_eq!(notifier.errors(), vec!["Record 42 not found"]);
    }

    #[tokio::test]
    async fn test_non_numeric_contact_id_is_rejected() {
        let (activities, _) = activities(seeded());
        assert!(matches!(
            activities.get_by_contact("seven").await,
            Err(RepositoryError::InvalidId(_))
        ));
    }
}
