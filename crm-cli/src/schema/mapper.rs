//! Record mapping between store rows and UI records
//!
//! Reading is total: any row, however incomplete, maps to a record exposing
//! every UI field. Writing validates the caller's input and emits only the
//! columns for keys the caller actually supplied (plus create defaults).

use log::debug;
use serde_json::{Map, Value};
use thiserror::Error;

use super::Record;
use super::field::{Access, Coercion, DefaultValue, FieldSpec, FieldTarget, Schema};
use super::lookup::LookupRef;

/// Caller input that cannot be mapped to a store body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{0}' cannot be changed by an update")]
    ManagedField(String),
    #[error("field '{0}' is required")]
    MissingRequired(String),
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Which write path a body is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Full record; unsupplied fields receive create defaults
    Create,
    /// Partial caller update; managed fields are rejected
    Update,
    /// Partial update issued by a dedicated operation (e.g., completion)
    Managed,
}

/// Map a raw store row to a UI record
pub fn read_record(schema: &Schema, raw: &Value) -> Record {
    let empty = Map::new();
    let row = raw.as_object().unwrap_or(&empty);
    let mut record = Record::new();

    for spec in schema.fields {
        let Some(lookup) = &spec.lookup else {
            let value = match row.get(spec.column) {
                Some(value) if !is_falsy(value) => value.clone(),
                other => match spec.read_default {
                    Some(default) => default.to_json(),
                    None => other.cloned().unwrap_or(Value::Null),
                },
            };
            record.insert(spec.ui.to_string(), value);
            continue;
        };

        let reference = row.get(spec.column).and_then(LookupRef::from_value);
        let id = reference
            .as_ref()
            .map(|r| Value::from(r.id()))
            .unwrap_or(Value::Null);

        let denormalized = row
            .get(lookup.column)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());
        let name = reference
            .as_ref()
            .and_then(LookupRef::name)
            .or(denormalized)
            .map(|s| Value::String(s.to_string()))
            .or_else(|| lookup.default.map(DefaultValue::to_json))
            .unwrap_or(Value::Null);

        record.insert(spec.ui.to_string(), id);
        record.insert(lookup.ui.to_string(), name);
    }

    record
}

/// Map a list of raw rows
pub fn read_records(schema: &Schema, rows: &[Value]) -> Vec<Record> {
    rows.iter().map(|row| read_record(schema, row)).collect()
}

/// Build the column-keyed body for a write.
///
/// Only keys present in `input` are emitted (an explicit `null` counts as
/// present); in `Create` mode, absent fields with a create default are
/// filled in. Read-only fields in the input are ignored.
pub fn write_record(
    schema: &Schema,
    input: &Record,
    mode: WriteMode,
) -> Result<Map<String, Value>, MappingError> {
    for key in input.keys() {
        match schema.resolve(key) {
            None => return Err(MappingError::UnknownField(key.clone())),
            Some(FieldTarget::Field(spec)) | Some(FieldTarget::LookupName(spec, _)) => {
                if spec.access == Access::Managed && mode == WriteMode::Update {
                    return Err(MappingError::ManagedField(key.clone()));
                }
            }
        }
    }

    let mut body = Map::new();
    for spec in schema.fields {
        if spec.access == Access::ReadOnly {
            if input.contains_key(spec.ui) {
                debug!("Ignoring read-only field '{}' in {} input", spec.ui, schema.entity);
            }
            continue;
        }

        let value = match input.get(spec.ui) {
            Some(raw) => Some(coerce(spec, raw)?),
            None if mode == WriteMode::Create => {
                if spec.required {
                    return Err(MappingError::MissingRequired(spec.ui.to_string()));
                }
                spec.create_default.map(DefaultValue::to_json)
            }
            None => None,
        };

        if let Some(value) = value {
            if spec.required && is_blank(&value) {
                return Err(MappingError::MissingRequired(spec.ui.to_string()));
            }
            if let Some(mirror) = spec.mirror {
                body.insert(mirror.to_string(), value.clone());
            }
            body.insert(spec.column.to_string(), value);
        }

        if let Some(lookup) = &spec.lookup {
            match input.get(lookup.ui) {
                Some(raw) => {
                    body.insert(lookup.column.to_string(), coerce_text(lookup.ui, raw)?);
                }
                None if mode == WriteMode::Create => {
                    body.insert(lookup.column.to_string(), Value::Null);
                }
                None => {}
            }
        }
    }

    Ok(body)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> MappingError {
    MappingError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn coerce(spec: &FieldSpec, value: &Value) -> Result<Value, MappingError> {
    if spec.lookup.is_some() {
        return coerce_lookup(spec.ui, value);
    }
    match spec.coercion {
        Coercion::None => Ok(value.clone()),
        Coercion::Trim => coerce_text(spec.ui, value),
        Coercion::Integer => coerce_integer(spec.ui, value),
        Coercion::Float => coerce_float(spec.ui, value),
    }
}

fn coerce_text(field: &str, value: &Value) -> Result<Value, MappingError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::String(s) => Ok(Value::String(s.trim().to_string())),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        _ => Err(invalid(field, "expected text")),
    }
}

fn coerce_integer(field: &str, value: &Value) -> Result<Value, MappingError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::from(i)),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Value::from(f as i64)),
                _ => Err(invalid(field, format!("{} is not a whole number", n))),
            },
        },
        Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid(field, format!("'{}' is not a whole number", s))),
        _ => Err(invalid(field, "expected a whole number")),
    }
}

fn coerce_float(field: &str, value: &Value) -> Result<Value, MappingError> {
    let parsed = match value {
        Value::Null => return Ok(Value::Null),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(Value::Null),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(f) if f.is_finite() => Ok(Value::from(f)),
        _ => Err(invalid(field, format!("{} is not a number", value))),
    }
}

/// Falsy lookup input clears the reference; anything else must name a
/// positive id, either directly or through an `{Id, Name}` object
fn coerce_lookup(field: &str, value: &Value) -> Result<Value, MappingError> {
    if is_falsy(value) {
        return Ok(Value::Null);
    }
    LookupRef::from_value(value)
        .map(|lookup| Value::from(lookup.id()))
        .ok_or_else(|| invalid(field, format!("{} is not a valid record id", value)))
}
