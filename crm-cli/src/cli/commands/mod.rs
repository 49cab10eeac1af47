//! Command definitions and handlers

pub mod activities;
pub mod deals;

use std::fs;

use anyhow::{Context, Result, bail};
use colored::*;
use serde::Serialize;
use serde_json::{Value, json};

use super::CommandContext;
use super::output::format_output;
use crate::api::FetchParams;
use crate::schema::Record;

pub use activities::ActivityCommands;
pub use deals::DealCommands;

/// Parse a `--data` argument: inline JSON, or `@path` to read it from a file
pub fn parse_data(raw: &str) -> Result<Record> {
    let text = match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path))?,
        None => raw.to_string(),
    };

    let value: Value = serde_json::from_str(text.trim()).context("--data is not valid JSON")?;
    match value {
        Value::Object(record) => Ok(record),
        other => bail!("--data must be a JSON object, got: {}", other),
    }
}

/// Print a value in the selected output format
pub fn print_value(ctx: &CommandContext, value: &Value) -> Result<()> {
    println!("{}", format_output(value, ctx.format)?);
    Ok(())
}

pub fn print_records(ctx: &CommandContext, records: Vec<Record>) -> Result<()> {
    let count = records.len();
    print_value(ctx, &Value::Array(records.into_iter().map(Value::Object).collect()))?;
    log::info!("{} record(s)", count);
    Ok(())
}

pub fn print_record(ctx: &CommandContext, record: Record) -> Result<()> {
    print_value(ctx, &Value::Object(record))
}

pub fn print_not_found(entity: &str, id: &str) {
    eprintln!("{}", format!("{} {} not found", entity, id).yellow());
}

/// Print the fetch a query command would send
pub fn print_fetch(table: &str, params: &FetchParams) -> Result<()> {
    print_dry(&json!({ "table": table, "fetch": params }))
}

/// Print any request descriptor as pretty JSON
pub fn print_dry(request: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(request).context("Failed to format request")?;
    println!("{}", text);
    Ok(())
}
