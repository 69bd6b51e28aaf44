//! Partitioned event-stream boundary.
//!
//! This crate defines the contracts between a stream transport and the
//! component consuming it:
//! - [`StreamRecord`] is one opaque record at a partition position
//! - [`RecordHandler`] carries the callbacks the transport drives into the
//!   consumer
//! - [`StreamConsumer`] is the connection lifecycle the consumer drives
//! - [`LocalStreamHub`] is an in-process transport for local runs and tests

pub mod consumer;
pub mod error;
pub mod local;
pub mod record;

pub use consumer::{RecordHandler, StreamConsumer};
pub use error::StreamError;
pub use local::LocalStreamHub;
pub use record::StreamRecord;
