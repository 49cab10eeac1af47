//! Generic entity repository
//!
//! `Repository` binds a schema to a record store and a notifier. It builds
//! requests through the query patterns and schema mappers, executes them,
//! and reduces responses to `Result` values.

mod error;
mod id;
mod notify;
mod repository;

pub use error::RepositoryError;
pub use id::IntoRecordId;
pub use notify::{LogNotifier, Notifier};
pub use repository::Repository;

#[cfg(test)]
pub(crate) use repository::test_support;
