//! Record store mutations
//!
//! The store's write operations always take a batch. This module wraps a
//! single create, update or delete into a singleton batch and reduces the
//! batch response to one logical outcome.

pub mod batch;
pub mod operation;

pub use batch::BatchOutcome;
pub use operation::Operation;
