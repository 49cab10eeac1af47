//! Deals: sales opportunities moving through the pipeline

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

use crate::api::client::RecordStore;
use crate::api::operations::Operation;
use crate::api::query::{
    CREATED_ON, FetchParams, ID_COLUMN, MODIFIED_ON, NAME_COLUMN, OrderBy, patterns,
};
use crate::repository::{IntoRecordId, Notifier, Repository, RepositoryError};
use crate::schema::{DefaultValue, FieldSpec, Record, Schema, WriteMode};

const STAGE: &str = "stage_c";
const VALUE: &str = "value_c";

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", ID_COLUMN).read_only(),
    FieldSpec::new("title", "title_c")
        .trimmed()
        .required()
        .mirrored_to(NAME_COLUMN),
    FieldSpec::new("value", VALUE)
        .float()
        .read_default(DefaultValue::Float(0.0)),
    FieldSpec::new("probability", "probability_c")
        .integer()
        .default_to(DefaultValue::Int(50)),
    FieldSpec::new("expectedCloseDate", "expected_close_date_c"),
    FieldSpec::new("stage", STAGE).default_to(DefaultValue::Str("Lead")),
    FieldSpec::new("status", "status_c").default_to(DefaultValue::Str("active")),
    FieldSpec::new("priority", "priority_c"),
    FieldSpec::new("source", "source_c"),
    FieldSpec::new("description", "description_c").trimmed(),
    FieldSpec::new("notes", "notes_c").trimmed(),
    FieldSpec::new("assignedTo", "assigned_to_c"),
    FieldSpec::new("contactId", "contact_id_c").lookup(
        "contactName",
        "contact_name_c",
        Some(DefaultValue::Str("Unknown Contact")),
    ),
    FieldSpec::new("company", "company_c").read_default(DefaultValue::Str("No Company")),
    FieldSpec::new("createdAt", CREATED_ON).read_only(),
    FieldSpec::new("updatedAt", MODIFIED_ON).read_only(),
];

/// Schema of the `deal_c` table
pub static SCHEMA: Schema = Schema {
    table: "deal_c",
    entity: "Deal",
    collection: "deals",
    fields: FIELDS,
};

/// Pipeline stage, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Closed,
}

impl DealStage {
    pub fn all() -> [DealStage; 5] {
        [
            DealStage::Lead,
            DealStage::Qualified,
            DealStage::Proposal,
            DealStage::Negotiation,
            DealStage::Closed,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Lead => "Lead",
            DealStage::Qualified => "Qualified",
            DealStage::Proposal => "Proposal",
            DealStage::Negotiation => "Negotiation",
            DealStage::Closed => "Closed",
        }
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deal count and summed value for one stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageStats {
    pub stage: String,
    pub count: u64,
    pub value: f64,
}

/// Per-stage totals: the five pipeline stages first (zero-filled), then
/// any other stage names found in the data in order of appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PipelineStats {
    pub stages: Vec<StageStats>,
}

impl PipelineStats {
    /// Aggregate raw `deal_c` rows; a deal without a stage counts as Lead
    pub fn from_rows(rows: &[Value]) -> Self {
        let mut stages: Vec<StageStats> = DealStage::all()
            .iter()
            .map(|stage| StageStats {
                stage: stage.as_str().to_string(),
                count: 0,
                value: 0.0,
            })
            .collect();

        for row in rows {
            let stage = row
                .get(STAGE)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(DealStage::Lead.as_str());
            let value = row.get(VALUE).map(deal_value).unwrap_or(0.0);

            let index = match stages.iter().position(|s| s.stage == stage) {
                Some(index) => index,
                None => {
                    stages.push(StageStats {
                        stage: stage.to_string(),
                        count: 0,
                        value: 0.0,
                    });
                    stages.len() - 1
                }
            };
            stages[index].count += 1;
            stages[index].value += value;
        }

        Self { stages }
    }

    pub fn get(&self, stage: &str) -> Option<&StageStats> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn total_count(&self) -> u64 {
        self.stages.iter().map(|s| s.count).sum()
    }

    pub fn total_value(&self) -> f64 {
        self.stages.iter().map(|s| s.value).sum()
    }
}

fn status_change(status: &str, stage: DealStage) -> Record {
    let mut data = Record::new();
    data.insert("status".to_string(), Value::from(status));
    data.insert("stage".to_string(), Value::from(stage.as_str()));
    data
}

fn deal_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Fetch descriptors for the deal access patterns
pub mod queries {
    use super::*;

    pub fn all() -> FetchParams {
        patterns::all(&SCHEMA.columns())
    }

    pub fn by_stage(stage: DealStage) -> FetchParams {
        patterns::by_enum_value(
            &SCHEMA.columns(),
            STAGE,
            stage.as_str(),
            OrderBy::desc(CREATED_ON),
        )
    }

    /// Minimal projection for pipeline statistics
    pub fn pipeline() -> FetchParams {
        patterns::grouped(&[ID_COLUMN, STAGE, VALUE], STAGE)
    }
}

/// Repository for deals
#[derive(Clone)]
pub struct Deals {
    repo: Repository,
}

impl Deals {
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

    pub async fn create(&self, data: &Record) -> Result<Record, RepositoryError> {
        self.repo.create(data).await
    }

    /// Partial update; fields absent from `data` are left untouched
    pub async fn update(&self, id: impl IntoRecordId, data: &Record) -> Result<Record, RepositoryError> {
        self.repo.update(id, data).await
    }

    /// Move a deal to `stage` and set its status; any stage may follow any
    /// other
    pub async fn update_status(
        &self,
        id: impl IntoRecordId,
        status: &str,
        stage: DealStage,
    ) -> Result<Record, RepositoryError> {
        self.repo.update(id, &status_change(status, stage)).await
    }

    /// The update `update_status` would send
    pub fn plan_update_status(
        &self,
        id: impl IntoRecordId,
        status: &str,
        stage: DealStage,
    ) -> Result<Operation, RepositoryError> {
        self.repo
            .plan_update(id, &status_change(status, stage), WriteMode::Update)
    }

    pub async fn delete(&self, id: impl IntoRecordId) -> Result<bool, RepositoryError> {
        self.repo.delete(id).await
    }

    pub async fn get_by_stage(&self, stage: DealStage) -> Result<Vec<Record>, RepositoryError> {
        self.repo.fetch(&queries::by_stage(stage)).await
    }

    pub async fn get_pipeline_stats(&self) -> Result<PipelineStats, RepositoryError> {
        let rows = self.repo.fetch_rows(&queries::pipeline()).await?;
        Ok(PipelineStats::from_rows(&rows))
    }
}
