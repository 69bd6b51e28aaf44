//! Event processor: drives stream records through decode, merge, persist
//! and checkpoint.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use common::PartitionId;
use futures_util::future::join_all;
use stream::{RecordHandler, StreamConsumer, StreamError, StreamRecord};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use view_store::{CheckpointStore, ViewStore};

use crate::codec;
use crate::counters::ProcessorCounters;
use crate::error::{ProcessError, StartupError};
use crate::merge::merge;
use crate::retry::RetryPolicy;

/// Tuning knobs for the processor.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorConfig {
    /// Retry policy around the view-store write.
    pub write_retry: RetryPolicy,
    /// Retry policy around stream connection bring-up.
    pub connect_retry: RetryPolicy,
    /// Records queued per partition before `on_record` applies
    /// backpressure to the transport.
    pub partition_queue_depth: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            write_retry: RetryPolicy::new(3, Duration::from_millis(100)),
            connect_retry: RetryPolicy::new(3, Duration::from_secs(1)),
            partition_queue_depth: 16,
        }
    }
}

/// Applies usage events from a partitioned stream to the view store.
///
/// One worker task runs per partition, so records within a partition are
/// applied strictly in delivery order while partitions proceed
/// concurrently. A record moves through decode, view read, pure merge,
/// retry-wrapped upsert, and finally checkpoint advance; the checkpoint
/// moves only after the write has durably succeeded. Failures at any stage
/// are counted and logged rather than propagated back to the stream
/// runtime, since under at-least-once delivery a failed record simply
/// arrives again.
pub struct EventProcessor<V, C> {
    inner: Arc<Inner<V, C>>,
}

impl<V, C> Clone for EventProcessor<V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<V, C> {
    store: V,
    checkpoints: C,
    consumer: Arc<dyn StreamConsumer>,
    config: ProcessorConfig,
    counters: Arc<ProcessorCounters>,
    accepting: AtomicBool,
    workers: Mutex<HashMap<PartitionId, PartitionWorker>>,
}

struct PartitionWorker {
    sender: mpsc::Sender<StreamRecord>,
    handle: JoinHandle<()>,
}

impl<V, C> EventProcessor<V, C>
where
    V: ViewStore + 'static,
    C: CheckpointStore + 'static,
{
    /// Creates a processor over the given stores and stream transport.
    pub fn new(
        store: V,
        checkpoints: C,
        consumer: Arc<dyn StreamConsumer>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                checkpoints,
                consumer,
                config,
                counters: Arc::new(ProcessorCounters::new()),
                accepting: AtomicBool::new(false),
                workers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Shared counters handle for observability surfaces.
    pub fn counters(&self) -> Arc<ProcessorCounters> {
        Arc::clone(&self.inner.counters)
    }

    /// Number of partitions with a live worker.
    pub async fn active_partitions(&self) -> usize {
        self.inner.workers.lock().await.len()
    }

    /// Connects the stream transport under the startup retry policy and
    /// begins accepting records.
    ///
    /// Idempotent: a processor that is already accepting returns
    /// immediately, and calling again after a failed or stopped run retries
    /// the bring-up from scratch.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self) -> Result<(), StartupError> {
        if self.inner.accepting.load(Ordering::SeqCst) {
            return Ok(());
        }

        let policy = self.inner.config.connect_retry;
        policy.execute(|| self.inner.consumer.connect()).await?;

        self.inner.accepting.store(true, Ordering::SeqCst);
        tracing::info!("event processor started");
        Ok(())
    }

    /// Best-effort graceful shutdown.
    ///
    /// Stops accepting new records, lets every partition worker drain its
    /// queue through the full record state machine, joins the workers, then
    /// releases the stream connection. Failures on the way down are logged
    /// and swallowed: shutdown must not fail the process.
    #[tracing::instrument(skip(self))]
    pub async fn stop(&self) {
        self.inner.accepting.store(false, Ordering::SeqCst);

        let drained: Vec<(PartitionId, PartitionWorker)> = {
            let mut workers = self.inner.workers.lock().await;
            workers.drain().collect()
        };

        let mut handles = Vec::with_capacity(drained.len());
        for (partition_id, worker) in drained {
            tracing::debug!(partition = %partition_id, "draining partition worker");
            drop(worker.sender);
            handles.push(worker.handle);
        }
        for result in join_all(handles).await {
            if let Err(error) = result {
                tracing::error!(error = %error, "partition worker failed to join");
            }
        }

        if let Err(error) = self.inner.consumer.disconnect().await {
            tracing::error!(error = %error, "stream disconnect failed");
        }
        tracing::info!("event processor stopped");
    }
}

#[async_trait]
impl<V, C> RecordHandler for EventProcessor<V, C>
where
    V: ViewStore + 'static,
    C: CheckpointStore + 'static,
{
    async fn on_record(&self, record: StreamRecord) {
        let sender = {
            let mut workers = self.inner.workers.lock().await;
            if !self.inner.accepting.load(Ordering::SeqCst) {
                tracing::debug!(
                    partition = %record.partition_id,
                    sequence = %record.sequence_number,
                    "record received while stopped, dropping"
                );
                return;
            }
            match workers.get(&record.partition_id) {
                Some(worker) => worker.sender.clone(),
                None => {
                    let worker = spawn_partition_worker(
                        Arc::clone(&self.inner),
                        record.partition_id.clone(),
                        self.inner.config.partition_queue_depth.max(1),
                    );
                    let sender = worker.sender.clone();
                    workers.insert(record.partition_id.clone(), worker);
                    sender
                }
            }
        };

        // Awaiting outside the map lock: a full queue must not stall other
        // partitions, only this one's delivery.
        if sender.send(record).await.is_err() {
            tracing::warn!("partition worker gone, record left to redelivery");
        }
    }

    async fn on_partition_error(&self, partition_id: PartitionId, error: StreamError) {
        self.inner.counters.record_error();
        metrics::counter!("usage_event_errors_total").increment(1);
        tracing::error!(
            partition = %partition_id,
            error = %error,
            "partition error reported by stream runtime"
        );
    }
}

fn spawn_partition_worker<V, C>(
    inner: Arc<Inner<V, C>>,
    partition_id: PartitionId,
    queue_depth: usize,
) -> PartitionWorker
where
    V: ViewStore + 'static,
    C: CheckpointStore + 'static,
{
    let (sender, mut receiver) = mpsc::channel(queue_depth);
    let handle = tokio::spawn(async move {
        tracing::debug!(partition = %partition_id, "partition worker started");
        while let Some(record) = receiver.recv().await {
            inner.process_record(record).await;
        }
        tracing::debug!(partition = %partition_id, "partition worker drained");
    });
    PartitionWorker { sender, handle }
}

impl<V, C> Inner<V, C>
where
    V: ViewStore,
    C: CheckpointStore,
{
    /// Runs one record through the state machine:
    /// received → decoded → merged → persisted → checkpointed,
    /// with every failure absorbed here.
    #[tracing::instrument(
        skip(self, record),
        fields(partition = %record.partition_id, sequence = %record.sequence_number)
    )]
    async fn process_record(&self, record: StreamRecord) {
        let started = Instant::now();
        match self.apply(&record).await {
            Ok(applied) => {
                if let Err(error) = self
                    .checkpoints
                    .advance(&record.partition_id, record.sequence_number)
                    .await
                {
                    self.counters.record_error();
                    metrics::counter!("usage_event_errors_total").increment(1);
                    tracing::error!(error = %error, "checkpoint advance failed");
                    return;
                }
                self.counters.record_success();
                metrics::counter!("usage_events_processed_total").increment(1);
                if !applied {
                    metrics::counter!("usage_events_skipped_total").increment(1);
                }
                metrics::histogram!("usage_event_apply_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                tracing::debug!(applied, "record checkpointed");
            }
            Err(error) => {
                self.counters.record_error();
                metrics::counter!("usage_event_errors_total").increment(1);
                tracing::error!(error = %error, "failed to process record");
            }
        }
    }

    /// Decode, read, merge and persist one record. Returns whether the
    /// merge produced a view to write (`false` is the benign skip for an
    /// unknown user).
    async fn apply(&self, record: &StreamRecord) -> Result<bool, ProcessError> {
        let event = codec::decode(&record.payload)?;

        let current =
            self.store
                .get(&event.user_id)
                .await
                .map_err(|source| ProcessError::StoreRead {
                    user_id: event.user_id.clone(),
                    source,
                })?;

        let Some(updated) = merge(current.as_ref(), &event) else {
            tracing::warn!(user_id = %event.user_id, "no usage view for user, skipping update");
            return Ok(false);
        };

        self.config
            .write_retry
            .execute(|| self.store.upsert(&updated))
            .await?;

        tracing::debug!(user_id = %event.user_id, "usage view updated");
        Ok(true)
    }
}
