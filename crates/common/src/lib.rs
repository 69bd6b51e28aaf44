//! Shared identifier and event types for the usage read-model service.

pub mod event;
pub mod types;

pub use event::UsageUpdatedEvent;
pub use types::{PartitionId, SequenceNumber, UserId};
