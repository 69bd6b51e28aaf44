use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{PartitionId, SequenceNumber, UserId};
use tokio::sync::RwLock;

use crate::{
    Result, UsageView,
    checkpoint::{Checkpoint, CheckpointStore},
    store::ViewStore,
};

/// In-memory view store for tests and local runs.
///
/// Provides the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryViewStore {
    views: Arc<RwLock<HashMap<UserId, UsageView>>>,
}

impl InMemoryViewStore {
    /// Creates a new empty in-memory view store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of views stored.
    pub async fn view_count(&self) -> usize {
        self.views.read().await.len()
    }

    /// Removes all views.
    pub async fn clear(&self) {
        self.views.write().await.clear();
    }
}

#[async_trait]
impl ViewStore for InMemoryViewStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<UsageView>> {
        Ok(self.views.read().await.get(user_id).cloned())
    }

    async fn upsert(&self, view: &UsageView) -> Result<()> {
        self.views
            .write()
            .await
            .insert(view.user_id.clone(), view.clone());
        Ok(())
    }
}

/// In-memory checkpoint store for tests and local runs.
#[derive(Clone, Default)]
pub struct InMemoryCheckpointStore {
    checkpoints: Arc<RwLock<HashMap<PartitionId, Checkpoint>>>,
}

impl InMemoryCheckpointStore {
    /// Creates a new empty in-memory checkpoint store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all cursors.
    pub async fn clear(&self) {
        self.checkpoints.write().await.clear();
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn get(&self, partition_id: &PartitionId) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoints.read().await.get(partition_id).cloned())
    }

    async fn advance(
        &self,
        partition_id: &PartitionId,
        sequence_number: SequenceNumber,
    ) -> Result<()> {
        let mut checkpoints = self.checkpoints.write().await;
        if let Some(existing) = checkpoints.get(partition_id)
            && existing.sequence_number >= sequence_number
        {
            return Ok(());
        }
        checkpoints.insert(
            partition_id.clone(),
            Checkpoint {
                partition_id: partition_id.clone(),
                sequence_number,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}
