use async_trait::async_trait;
use common::PartitionId;

use crate::{StreamError, StreamRecord};

/// Callbacks the stream runtime invokes against the consuming component.
///
/// Implementations must never let a per-record failure escape these
/// methods: the runtime treats any propagated error as a reason to tear the
/// consumer down, so failures are handled (logged and counted) inside.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    /// Delivers one record. Called in sequence order within a partition;
    /// calls for different partitions may overlap.
    async fn on_record(&self, record: StreamRecord);

    /// Reports a partition-level transport failure. Non-fatal: the runtime
    /// keeps other partitions running.
    async fn on_partition_error(&self, partition_id: PartitionId, error: StreamError);
}

/// Connection lifecycle of a partitioned stream transport.
///
/// Implemented by the transport (the in-process [`LocalStreamHub`] here, a
/// managed streaming service in production) and driven by the consumer's
/// startup and shutdown paths.
///
/// [`LocalStreamHub`]: crate::LocalStreamHub
#[async_trait]
pub trait StreamConsumer: Send + Sync {
    /// Brings up the connection and begins delivering records to the
    /// registered handler.
    async fn connect(&self) -> Result<(), StreamError>;

    /// Releases the connection. Records published afterwards are not
    /// delivered.
    async fn disconnect(&self) -> Result<(), StreamError>;
}
