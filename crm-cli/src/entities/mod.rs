//! Entity repositories
//!
//! Each entity is a static schema plus a thin facade over the generic
//! `Repository` adding the entity's own access patterns.

pub mod activities;
pub mod deals;

pub use activities::{Activities, ActivityStatus};
pub use deals::{DealStage, Deals, PipelineStats, StageStats};
