//! Schema maps
//!
//! A schema declares, per table, how UI field names correspond to store
//! columns, which defaults apply on read and on create, and how values are
//! coerced on the way to the store. The mappers in this module are the only
//! place where column names and UI names meet.

mod field;
mod lookup;
mod mapper;

pub use field::{Access, Coercion, DefaultValue, FieldSpec, FieldTarget, LookupName, Schema};
pub use lookup::LookupRef;
pub use mapper::{MappingError, WriteMode, read_record, read_records, write_record};

/// A record keyed by UI field names
pub type Record = serde_json::Map<String, serde_json::Value>;
