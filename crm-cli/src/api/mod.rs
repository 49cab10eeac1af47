//! Record store API module
//!
//! This module provides the interface to the remote record-storage service:
//! the `RecordStore` seam, its HTTP, file-backed and in-memory
//! implementations, query descriptors and batch mutations.

pub mod client;
pub mod local;
pub mod memory;
pub mod models;
pub mod operations;
pub mod query;

pub use client::{HttpRecordStore, RecordStore, StoreCredentials};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use models::{
    DeleteRequest, FetchResponse, FieldError, GetResponse, MutationRequest, MutationResponse,
    RecordResult,
};
pub use operations::{BatchOutcome, Operation};
pub use query::{FetchParams, Filter, GetParams, OrderBy, QueryBuilder, WhereGroup};
