//! Usage view query endpoint and shared application state.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::UserId;
use projector::ProcessorCounters;
use serde::Serialize;
use stream::LocalStreamHub;
use view_store::{UsageView, ViewStore};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<V: ViewStore> {
    pub view_store: V,
    pub counters: Arc<ProcessorCounters>,
    pub hub: Arc<LocalStreamHub>,
}

/// One subscriber's plan and usage, in the public wire shape.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub user_id: String,
    pub plan_name: String,
    pub data_allowance: i64,
    pub call_minutes: i64,
    pub message_count: i64,
    pub monthly_fee: i64,
    pub data_usage: f64,
    pub call_usage: i64,
    pub message_usage: i64,
}

impl From<UsageView> for UsageResponse {
    fn from(view: UsageView) -> Self {
        Self {
            user_id: view.user_id.into(),
            plan_name: view.plan_name,
            data_allowance: view.data_allowance,
            call_minutes: view.call_minutes,
            message_count: view.message_count,
            monthly_fee: view.monthly_fee,
            data_usage: view.data_usage,
            call_usage: view.call_usage,
            message_usage: view.message_usage,
        }
    }
}

/// GET /api/plans/query/{user_id}: current usage view for one subscriber.
#[tracing::instrument(skip(state))]
pub async fn get_usage<V: ViewStore + Clone + 'static>(
    State(state): State<Arc<AppState<V>>>,
    Path(user_id): Path<String>,
) -> Result<Json<UsageResponse>, ApiError> {
    let user_id = UserId::new(user_id);
    let view = state
        .view_store
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No usage view for user {user_id}")))?;

    Ok(Json(UsageResponse::from(view)))
}
