//! `deals` subcommands

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use super::{
    parse_data, print_dry, print_fetch, print_not_found, print_record, print_records, print_value,
};
use crate::api::MemoryStore;
use crate::api::query::patterns;
use crate::cli::CommandContext;
use crate::entities::deals::{SCHEMA, queries};
use crate::entities::{DealStage, Deals};
use crate::repository::IntoRecordId;
use crate::schema::WriteMode;

#[derive(Subcommand, Debug)]
pub enum DealCommands {
    /// List all deals, newest first
    List,
    /// Show one deal
    Get { id: String },
    /// Deals in one pipeline stage
    ByStage {
        #[arg(value_enum)]
        stage: DealStage,
    },
    /// Deal count and value per pipeline stage
    Stats,
    /// Create a deal
    Create {
        /// JSON object with UI field names, or @file
        #[arg(long)]
        data: String,
    },
    /// Update fields of a deal
    Update {
        id: String,
        /// JSON object with the fields to change, or @file
        #[arg(long)]
        data: String,
    },
    /// Set a deal's status and pipeline stage
    Status {
        id: String,
        #[arg(long)]
        status: String,
        #[arg(long, value_enum)]
        stage: DealStage,
    },
    /// Delete a deal
    Delete { id: String },
}

pub async fn handle_deal_command(command: DealCommands, ctx: &CommandContext) -> Result<()> {
    if ctx.dry {
        return preview(command, ctx);
    }

    let deals = Deals::new(ctx.store()?, ctx.notifier.clone());

    match command {
        DealCommands::List => print_records(ctx, deals.get_all().await?),
        DealCommands::Get { id } => match deals.get_by_id(&id).await? {
            Some(record) => print_record(ctx, record),
            None => {
                print_not_found(SCHEMA.entity, &id);
                Ok(())
            }
        },
        DealCommands::ByStage { stage } => print_records(ctx, deals.get_by_stage(stage).await?),
        DealCommands::Stats => {
            let stats = deals.get_pipeline_stats().await?;
            print_value(ctx, &serde_json::to_value(&stats)?)
        }
        DealCommands::Create { data } => {
            let created = deals.create(&parse_data(&data)?).await?;
            print_record(ctx, created)
        }
        DealCommands::Update { id, data } => {
            let updated = deals.update(&id, &parse_data(&data)?).await?;
            print_record(ctx, updated)
        }
        DealCommands::Status { id, status, stage } => {
            let updated = deals.update_status(&id, &status, stage).await?;
            print_record(ctx, updated)
        }
        DealCommands::Delete { id } => {
            let deleted = deals.delete(&id).await?;
            print_value(ctx, &json!({ "id": id, "deleted": deleted }))
        }
    }
}

/// Print the request each command would send
fn preview(command: DealCommands, ctx: &CommandContext) -> Result<()> {
    // Planning never reaches the store
    let deals = Deals::new(Arc::new(MemoryStore::new()), ctx.notifier.clone());
    let repo = deals.repository();

    match command {
        DealCommands::List => print_fetch(SCHEMA.table, &queries::all()),
        DealCommands::Get { id } => print_dry(&json!({
            "table": SCHEMA.table,
            "id": id.as_str().into_record_id()?,
            "get": patterns::by_id(&SCHEMA.columns()),
        })),
        DealCommands::ByStage { stage } => print_fetch(SCHEMA.table, &queries::by_stage(stage)),
        DealCommands::Stats => print_fetch(SCHEMA.table, &queries::pipeline()),
        DealCommands::Create { data } => print_dry(&repo.plan_create(&parse_data(&data)?)?),
        DealCommands::Update { id, data } => {
            print_dry(&repo.plan_update(&id, &parse_data(&data)?, WriteMode::Update)?)
        }
        DealCommands::Status { id, status, stage } => {
            print_dry(&deals.plan_update_status(&id, &status, stage)?)
        }
        DealCommands::Delete { id } => print_dry(&repo.plan_delete(&id)?),
    }
}
