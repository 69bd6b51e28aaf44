use common::{PartitionId, SequenceNumber};

/// One opaque record delivered from the event stream.
///
/// The payload is whatever bytes the upstream producer published; decoding
/// is the consumer's concern.
#[derive(Debug, Clone)]
pub struct StreamRecord {
    pub partition_id: PartitionId,
    pub sequence_number: SequenceNumber,
    pub payload: Vec<u8>,
}

impl StreamRecord {
    /// Creates a record for the given partition position.
    pub fn new(
        partition_id: PartitionId,
        sequence_number: SequenceNumber,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            partition_id,
            sequence_number,
            payload,
        }
    }
}
