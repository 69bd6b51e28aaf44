//! Usage event projection for the telecom query side.
//!
//! This crate turns the partitioned usage-event stream into the read model:
//! - [`EventProcessor`] subscribes to the stream and applies events with
//!   per-partition ordering and at-least-once semantics
//! - [`merge`] is the pure field-wise merge of an event into a view
//! - [`codec`] decodes wire payloads into [`common::UsageUpdatedEvent`]
//! - [`RetryPolicy`] wraps transient-failure-prone calls in bounded
//!   exponential backoff
//! - [`ProcessorCounters`] exposes processed/error totals to the API layer

pub mod codec;
pub mod counters;
pub mod error;
pub mod merge;
pub mod processor;
pub mod retry;

pub use counters::ProcessorCounters;
pub use error::{DecodeError, ProcessError, StartupError};
pub use merge::merge;
pub use processor::{EventProcessor, ProcessorConfig};
pub use retry::{RetryExhausted, RetryPolicy};
