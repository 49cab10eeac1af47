//! Lookup reference normalization
//!
//! A lookup column arrives from the store either as a bare id or as an
//! embedded `{Id, Name}` object carrying the referenced record's display
//! name. `LookupRef` is the single normalized form.

use serde_json::Value;

/// Normalized value of a lookup column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRef {
    /// Bare id; the name, if any, lives in a denormalized column
    Scalar(i64),
    /// Embedded reference with the referenced record's name
    Reference { id: i64, name: String },
}

impl LookupRef {
    /// Normalize a raw lookup value.
    ///
    /// Accepts integers, integer strings and objects exposing `Id` (with an
    /// optional non-empty `Name`). Anything else, including null and
    /// non-positive ids, yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(obj) => {
                let id = obj.get("Id").and_then(parse_id)?;
                match obj.get("Name").and_then(Value::as_str) {
                    Some(name) if !name.is_empty() => Some(LookupRef::Reference {
                        id,
                        name: name.to_string(),
                    }),
                    _ => Some(LookupRef::Scalar(id)),
                }
            }
            other => parse_id(other).map(LookupRef::Scalar),
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            LookupRef::Scalar(id) => *id,
            LookupRef::Reference { id, .. } => *id,
        }
    }

    /// Name carried by an embedded reference
    pub fn name(&self) -> Option<&str> {
        match self {
            LookupRef::Scalar(_) => None,
            LookupRef::Reference { name, .. } => Some(name),
        }
    }
}

fn parse_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (id > 0).then_some(id)
}
