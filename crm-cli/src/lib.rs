//! Data access for CRM activities and deals
//!
//! Entity repositories map between UI-shaped records and the columns of a
//! remote record store, build the store's fetch descriptors, and reduce its
//! batch write results to a single `Result`.

pub mod api;
pub mod cli;
pub mod config;
pub mod entities;
pub mod repository;
pub mod schema;

pub use entities::{Activities, Deals};
pub use repository::{LogNotifier, Notifier, RepositoryError};
