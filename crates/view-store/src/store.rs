use async_trait::async_trait;
use common::UserId;

use crate::{Result, UsageView};

/// Core trait for materialized view storage.
///
/// A view store is a durable key-value store of [`UsageView`] records keyed
/// by user id. All implementations must be thread-safe (Send + Sync) and
/// safe for concurrent upserts to different keys: partition workers share
/// one store.
#[async_trait]
pub trait ViewStore: Send + Sync {
    /// Fetches the view for one user.
    ///
    /// Returns `None` when no record has been established for the user.
    async fn get(&self, user_id: &UserId) -> Result<Option<UsageView>>;

    /// Inserts or fully replaces the view for the record's user.
    ///
    /// The write is a single idempotent upsert: replaying it with the same
    /// record leaves the store unchanged.
    async fn upsert(&self, view: &UsageView) -> Result<()>;
}
