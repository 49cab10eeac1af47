//! `activities` subcommands

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use super::{
    parse_data, print_dry, print_fetch, print_not_found, print_record, print_records, print_value,
};
use crate::api::MemoryStore;
use crate::api::query::patterns;
use crate::cli::CommandContext;
use crate::entities::Activities;
use crate::entities::activities::{SCHEMA, queries};
use crate::repository::IntoRecordId;
use crate::schema::WriteMode;

#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// List all activities, newest first
    List,
    /// Open activities, earliest due first
    Tasks,
    /// Completed activities, most recently completed first
    History,
    /// Open activities past their due date
    Overdue,
    /// Activities linked to a contact
    ByContact { contact_id: String },
    /// Activities linked to a deal
    ByDeal { deal_id: String },
    /// Show one activity
    Get { id: String },
    /// Create an activity
    Create {
        /// JSON object with UI field names, or @file
        #[arg(long)]
        data: String,
    },
    /// Update fields of an activity
    Update {
        id: String,
        /// JSON object with the fields to change, or @file
        #[arg(long)]
        data: String,
    },
    /// Mark an activity completed
    Complete {
        id: String,
        /// Outcome text; a default is recorded when blank
        #[arg(long, default_value = "")]
        outcome: String,
    },
    /// Delete an activity
    Delete { id: String },
}

pub async fn handle_activity_command(command: ActivityCommands, ctx: &CommandContext) -> Result<()> {
    if ctx.dry {
        return preview(command, ctx);
    }

    let activities = Activities::new(ctx.store()?, ctx.notifier.clone());

    match command {
        ActivityCommands::List => print_records(ctx, activities.get_all().await?),
        ActivityCommands::Tasks => print_records(ctx, activities.get_tasks().await?),
        ActivityCommands::History => print_records(ctx, activities.get_history().await?),
        ActivityCommands::Overdue => print_records(ctx, activities.get_overdue().await?),
        ActivityCommands::ByContact { contact_id } => {
            print_records(ctx, activities.get_by_contact(&contact_id).await?)
        }
        ActivityCommands::ByDeal { deal_id } => {
            print_records(ctx, activities.get_by_deal(&deal_id).await?)
        }
        ActivityCommands::Get { id } => match activities.get_by_id(&id).await? {
            Some(record) => print_record(ctx, record),
            None => {
                print_not_found(SCHEMA.entity, &id);
                Ok(())
            }
        },
        ActivityCommands::Create { data } => {
            let created = activities.create(&parse_data(&data)?).await?;
            print_record(ctx, created)
        }
        ActivityCommands::Update { id, data } => {
            let updated = activities.update(&id, &parse_data(&data)?).await?;
            print_record(ctx, updated)
        }
        ActivityCommands::Complete { id, outcome } => {
            let completed = activities.complete(&id, &outcome).await?;
            print_record(ctx, completed)
        }
        ActivityCommands::Delete { id } => {
            let deleted = activities.delete(&id).await?;
            print_value(ctx, &json!({ "id": id, "deleted": deleted }))
        }
    }
}

/// Print the request each command would send
fn preview(command: ActivityCommands, ctx: &CommandContext) -> Result<()> {
    // Planning never reaches the store
    let activities = Activities::new(Arc::new(MemoryStore::new()), ctx.notifier.clone());
    let repo = activities.repository();

    match command {
        ActivityCommands::List => print_fetch(SCHEMA.table, &queries::all()),
        ActivityCommands::Tasks => print_fetch(SCHEMA.table, &queries::tasks()),
        ActivityCommands::History => print_fetch(SCHEMA.table, &queries::history()),
        ActivityCommands::Overdue => print_fetch(SCHEMA.table, &queries::overdue(Utc::now())),
        ActivityCommands::ByContact { contact_id } => print_fetch(
            SCHEMA.table,
            &queries::by_contact(contact_id.as_str().into_record_id()?),
        ),
        ActivityCommands::ByDeal { deal_id } => print_fetch(
            SCHEMA.table,
            &queries::by_deal(deal_id.as_str().into_record_id()?),
        ),
        ActivityCommands::Get { id } => print_dry(&json!({
            "table": SCHEMA.table,
            "id": id.as_str().into_record_id()?,
            "get": patterns::by_id(&SCHEMA.columns()),
        })),
        ActivityCommands::Create { data } => print_dry(&repo.plan_create(&parse_data(&data)?)?),
        ActivityCommands::Update { id, data } => {
            print_dry(&repo.plan_update(&id, &parse_data(&data)?, WriteMode::Update)?)
        }
        ActivityCommands::Complete { id, outcome } => {
            print_dry(&activities.plan_complete(&id, &outcome, Utc::now())?)
        }
        ActivityCommands::Delete { id } => print_dry(&repo.plan_delete(&id)?),
    }
}
