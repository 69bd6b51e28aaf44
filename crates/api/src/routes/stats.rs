//! Projection progress counters endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use view_store::ViewStore;

use crate::routes::usage::AppState;

#[derive(Serialize)]
pub struct StatsResponse {
    pub processed: u64,
    pub errors: u64,
}

/// GET /stats: records handled and failed since startup.
pub async fn get<V: ViewStore + Clone + 'static>(
    State(state): State<Arc<AppState<V>>>,
) -> Json<StatsResponse> {
    Json(StatsResponse {
        processed: state.counters.processed(),
        errors: state.counters.errors(),
    })
}
