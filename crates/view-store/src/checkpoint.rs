use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{PartitionId, SequenceNumber};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Per-partition cursor marking the last successfully applied stream
/// position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub partition_id: PartitionId,
    pub sequence_number: SequenceNumber,
    pub updated_at: DateTime<Utc>,
}

/// Storage for per-partition progress cursors.
///
/// The cursor for a partition is advanced only after the corresponding
/// view write has durably succeeded; on restart the stream runtime reads
/// it to resume delivery. `advance` is monotonic: a call with a sequence
/// at or below the stored cursor leaves the cursor unchanged, so a
/// redelivered record can never move progress backwards.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Fetches the cursor for one partition, or `None` if no record from
    /// that partition has been applied yet.
    async fn get(&self, partition_id: &PartitionId) -> Result<Option<Checkpoint>>;

    /// Moves the cursor for `partition_id` forward to `sequence_number`.
    async fn advance(
        &self,
        partition_id: &PartitionId,
        sequence_number: SequenceNumber,
    ) -> Result<()>;
}
