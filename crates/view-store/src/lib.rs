//! Materialized usage views and projector checkpoints.
//!
//! This crate provides the storage side of the usage read model:
//! - [`UsageView`] is the queryable projection for one subscriber
//! - [`ViewStore`] gives get/upsert access to view records
//! - [`Checkpoint`] and [`CheckpointStore`] track per-partition progress
//! - In-memory and PostgreSQL implementations of both stores

pub mod checkpoint;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod view;

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use error::{Result, ViewStoreError};
pub use memory::{InMemoryCheckpointStore, InMemoryViewStore};
pub use postgres::{PostgresCheckpointStore, PostgresViewStore};
pub use store::ViewStore;
pub use view::UsageView;
