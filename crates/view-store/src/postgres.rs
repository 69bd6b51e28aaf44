use async_trait::async_trait;
use common::{PartitionId, SequenceNumber, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Result, UsageView,
    checkpoint::{Checkpoint, CheckpointStore},
    store::ViewStore,
};

/// PostgreSQL-backed view store implementation.
#[derive(Clone)]
pub struct PostgresViewStore {
    pool: PgPool,
}

impl PostgresViewStore {
    /// Creates a new PostgreSQL view store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_view(row: PgRow) -> Result<UsageView> {
        Ok(UsageView {
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            plan_name: row.try_get("plan_name")?,
            data_allowance: row.try_get("data_allowance")?,
            call_minutes: row.try_get("call_minutes")?,
            message_count: row.try_get("message_count")?,
            monthly_fee: row.try_get("monthly_fee")?,
            data_usage: row.try_get("data_usage")?,
            call_usage: row.try_get("call_usage")?,
            message_usage: row.try_get("message_usage")?,
        })
    }
}

#[async_trait]
impl ViewStore for PostgresViewStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<UsageView>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT user_id, plan_name, data_allowance, call_minutes, message_count,
                   monthly_fee, data_usage, call_usage, message_usage
            FROM usage_views
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_view).transpose()
    }

    async fn upsert(&self, view: &UsageView) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO usage_views (user_id, plan_name, data_allowance, call_minutes,
                                     message_count, monthly_fee, data_usage, call_usage,
                                     message_usage, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                plan_name = EXCLUDED.plan_name,
                data_allowance = EXCLUDED.data_allowance,
                call_minutes = EXCLUDED.call_minutes,
                message_count = EXCLUDED.message_count,
                monthly_fee = EXCLUDED.monthly_fee,
                data_usage = EXCLUDED.data_usage,
                call_usage = EXCLUDED.call_usage,
                message_usage = EXCLUDED.message_usage,
                updated_at = NOW()
            "#,
        )
        .bind(view.user_id.as_str())
        .bind(&view.plan_name)
        .bind(view.data_allowance)
        .bind(view.call_minutes)
        .bind(view.message_count)
        .bind(view.monthly_fee)
        .bind(view.data_usage)
        .bind(view.call_usage)
        .bind(view.message_usage)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// PostgreSQL-backed checkpoint store implementation.
#[derive(Clone)]
pub struct PostgresCheckpointStore {
    pool: PgPool,
}

impl PostgresCheckpointStore {
    /// Creates a new PostgreSQL checkpoint store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CheckpointStore for PostgresCheckpointStore {
    async fn get(&self, partition_id: &PartitionId) -> Result<Option<Checkpoint>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT partition_id, sequence_number, updated_at
            FROM projector_checkpoints
            WHERE partition_id = $1
            "#,
        )
        .bind(partition_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Checkpoint {
                partition_id: PartitionId::new(row.try_get::<String, _>("partition_id")?),
                sequence_number: SequenceNumber::new(row.try_get("sequence_number")?),
                updated_at: row.try_get("updated_at")?,
            })),
            None => Ok(None),
        }
    }

    async fn advance(
        &self,
        partition_id: &PartitionId,
        sequence_number: SequenceNumber,
    ) -> Result<()> {
        // GREATEST keeps the cursor monotonic under redelivery.
        sqlx::query(
            r#"
            INSERT INTO projector_checkpoints (partition_id, sequence_number, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (partition_id) DO UPDATE SET
                sequence_number = GREATEST(projector_checkpoints.sequence_number, EXCLUDED.sequence_number),
                updated_at = NOW()
            "#,
        )
        .bind(partition_id.as_str())
        .bind(sequence_number.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
