use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use common::{PartitionId, SequenceNumber};
use tokio::sync::{Mutex, RwLock};

use crate::{RecordHandler, StreamConsumer, StreamError, StreamRecord};

/// In-process partitioned stream hub.
///
/// Stands in for a managed streaming service in local runs and tests: a
/// fixed set of partitions, key-hash routing so all events for one key land
/// on one partition, and per-partition sequence numbers assigned at publish
/// time. Delivery happens while the publishing task holds that partition's
/// lock, so records reach the handler strictly in sequence order with at
/// most one in flight per partition.
///
/// Delivery is live-only: records published before a handler connects are
/// not replayed. Resuming from a checkpoint is the concern of real
/// transports.
pub struct LocalStreamHub {
    partitions: Vec<PartitionSlot>,
    handler: RwLock<Option<Arc<dyn RecordHandler>>>,
    connected: AtomicBool,
}

struct PartitionSlot {
    id: PartitionId,
    last_sequence: Mutex<i64>,
}

impl LocalStreamHub {
    /// Creates a hub with the given number of partitions (at least one).
    pub fn new(partition_count: u32) -> Self {
        let partitions = (0..partition_count.max(1))
            .map(|index| PartitionSlot {
                id: PartitionId::new(index.to_string()),
                last_sequence: Mutex::new(0),
            })
            .collect();

        Self {
            partitions,
            handler: RwLock::new(None),
            connected: AtomicBool::new(false),
        }
    }

    /// Returns the number of partitions.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Registers the handler that future publishes are delivered to,
    /// replacing any previous one.
    pub async fn register(&self, handler: Arc<dyn RecordHandler>) {
        *self.handler.write().await = Some(handler);
    }

    /// Returns the partition a routing key maps to.
    pub fn partition_for(&self, key: &str) -> PartitionId {
        self.slot_for(key).id.clone()
    }

    /// Publishes one payload, routed by `key`.
    ///
    /// Assigns the partition's next sequence number and delivers the record
    /// to the registered handler before returning. Returns the partition
    /// and sequence the record landed on.
    pub async fn publish(
        &self,
        key: &str,
        payload: Vec<u8>,
    ) -> Result<(PartitionId, SequenceNumber), StreamError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(StreamError::NotConnected);
        }
        let handler = self
            .handler
            .read()
            .await
            .clone()
            .ok_or(StreamError::NoHandler)?;

        let slot = self.slot_for(key);
        // Holding the slot lock across delivery is what keeps a partition's
        // records in sequence order at the handler.
        let mut last_sequence = slot.last_sequence.lock().await;
        *last_sequence += 1;
        let sequence_number = SequenceNumber::new(*last_sequence);
        let record = StreamRecord::new(slot.id.clone(), sequence_number, payload);
        handler.on_record(record).await;

        Ok((slot.id.clone(), sequence_number))
    }

    fn slot_for(&self, key: &str) -> &PartitionSlot {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.partitions.len() as u64) as usize;
        &self.partitions[index]
    }
}

#[async_trait::async_trait]
impl StreamConsumer for LocalStreamHub {
    async fn connect(&self) -> Result<(), StreamError> {
        if self.handler.read().await.is_none() {
            return Err(StreamError::NoHandler);
        }
        self.connected.store(true, Ordering::SeqCst);
        tracing::debug!("local stream hub connected");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), StreamError> {
        self.connected.store(false, Ordering::SeqCst);
        tracing::debug!("local stream hub disconnected");
        Ok(())
    }
}
