//! Local ingestion endpoints: publish events onto the stream and seed views.
//!
//! These routes exist for local runs and tests, standing in for the
//! upstream billing pipeline that produces usage events in deployment.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use common::UserId;
use serde::{Deserialize, Serialize};
use view_store::{UsageView, ViewStore};

use crate::error::ApiError;
use crate::routes::usage::{AppState, UsageResponse};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub partition_id: String,
    pub sequence_number: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedViewRequest {
    pub user_id: String,
    pub plan_name: String,
    pub data_allowance: i64,
    pub call_minutes: i64,
    pub message_count: i64,
    pub monthly_fee: i64,
    #[serde(default)]
    pub data_usage: f64,
    #[serde(default)]
    pub call_usage: i64,
    #[serde(default)]
    pub message_usage: i64,
}

/// POST /internal/events: publish one raw event payload onto the stream.
///
/// The body is forwarded as-is; only the routing key is read from it, so a
/// payload the projector cannot decode is still accepted here and surfaces
/// later as a processing error.
#[tracing::instrument(skip(state, payload))]
pub async fn publish_event<V: ViewStore + Clone + 'static>(
    State(state): State<Arc<AppState<V>>>,
    payload: Bytes,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    let key = serde_json::from_slice::<serde_json::Value>(&payload)
        .ok()
        .and_then(|value| {
            value
                .get("userId")
                .and_then(|id| id.as_str())
                .map(String::from)
        })
        .unwrap_or_default();

    let (partition_id, sequence_number) = state.hub.publish(&key, payload.to_vec()).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishResponse {
            partition_id: partition_id.to_string(),
            sequence_number: sequence_number.as_i64(),
        }),
    ))
}

/// POST /internal/usage-views: establish or replace the view for one
/// subscriber.
#[tracing::instrument(skip(state, req))]
pub async fn seed_view<V: ViewStore + Clone + 'static>(
    State(state): State<Arc<AppState<V>>>,
    Json(req): Json<SeedViewRequest>,
) -> Result<(StatusCode, Json<UsageResponse>), ApiError> {
    if req.user_id.is_empty() {
        return Err(ApiError::BadRequest("userId must not be empty".to_string()));
    }

    let view = UsageView {
        user_id: UserId::new(req.user_id),
        plan_name: req.plan_name,
        data_allowance: req.data_allowance,
        call_minutes: req.call_minutes,
        message_count: req.message_count,
        monthly_fee: req.monthly_fee,
        data_usage: req.data_usage,
        call_usage: req.call_usage,
        message_usage: req.message_usage,
    };
    state.view_store.upsert(&view).await?;

    Ok((StatusCode::CREATED, Json(UsageResponse::from(view))))
}
