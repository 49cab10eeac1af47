//! Record Query Builder Module
//!
//! Provides the request descriptors consumed by the record store's generic
//! fetch operation. Follows the same pattern as operations with descriptor
//! types (reusable, serializable) and QueryBuilder (fluent).

pub mod builder;
pub mod filters;
pub mod orderby;
pub mod patterns;
pub mod query;

pub use builder::QueryBuilder;
pub use filters::{Condition, Filter, LogicalOperator, Operator, SubGroup, WhereGroup};
pub use orderby::{OrderBy, SortType};
pub use query::{FetchParams, FieldRef, GetParams};

/// System column holding the primary key
pub const ID_COLUMN: &str = "Id";
/// System column holding the record's display name
pub const NAME_COLUMN: &str = "Name";
/// System column set by the store when a record is created
pub const CREATED_ON: &str = "CreatedOn";
/// System column set by the store whenever a record changes
pub const MODIFIED_ON: &str = "ModifiedOn";
