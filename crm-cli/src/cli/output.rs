//! Result formatting for command output

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::OutputFormat;

/// Format command results according to the selected output format
pub fn format_output(data: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).context("Failed to format JSON output"),
        OutputFormat::JsonCompact => serde_json::to_string(data).context("Failed to format JSON output"),
        OutputFormat::Csv => json_to_csv(data),
    }
}

/// Convert JSON data to CSV.
///
/// Arrays of objects become one row per object with the union of their
/// keys as header; a single object becomes `key,value` rows.
pub fn json_to_csv(data: &Value) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    match data {
        Value::Array(rows) => {
            if rows.is_empty() {
                return Ok("No data\n".to_string());
            }

            let mut headers: Vec<&str> = Vec::new();
            for row in rows {
                if let Value::Object(obj) = row {
                    for key in obj.keys() {
                        if !headers.contains(&key.as_str()) {
                            headers.push(key.as_str());
                        }
                    }
                }
            }

            writer.write_record(&headers)?;
            for row in rows {
                let cells: Vec<String> = headers
                    .iter()
                    .map(|h| cell(row.get(*h).unwrap_or(&Value::Null)))
                    .collect();
                writer.write_record(&cells)?;
            }
        }
        Value::Object(obj) => {
            writer.write_record(["key", "value"])?;
            for (key, value) in obj {
                writer.write_record([key.as_str(), cell(value).as_str()])?;
            }
        }
        other => {
            writer.write_record(["value"])?;
            writer.write_record([cell(other)])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
