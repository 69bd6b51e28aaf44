//! HTTP query API with observability for the usage read model.
//!
//! Provides the subscriber usage query endpoint plus local ingestion
//! routes, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use projector::{EventProcessor, ProcessorConfig};
use stream::{LocalStreamHub, StreamConsumer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use view_store::{CheckpointStore, ViewStore};

use routes::usage::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<V: ViewStore + Clone + 'static>(
    state: Arc<AppState<V>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/stats", get(routes::stats::get::<V>))
        .route(
            "/api/plans/query/{user_id}",
            get(routes::usage::get_usage::<V>),
        )
        .route("/internal/events", post(routes::ingest::publish_event::<V>))
        .route("/internal/usage-views", post(routes::ingest::seed_view::<V>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the stream hub, processor, and shared state over the given stores.
///
/// The processor is registered as the hub's handler but not started; the
/// caller decides when delivery begins.
pub async fn create_state<V, C>(
    view_store: V,
    checkpoints: C,
    partitions: u32,
    config: ProcessorConfig,
) -> (Arc<AppState<V>>, EventProcessor<V, C>, Arc<LocalStreamHub>)
where
    V: ViewStore + Clone + 'static,
    C: CheckpointStore + 'static,
{
    let hub = Arc::new(LocalStreamHub::new(partitions));
    let processor = EventProcessor::new(
        view_store.clone(),
        checkpoints,
        Arc::clone(&hub) as Arc<dyn StreamConsumer>,
        config,
    );
    hub.register(Arc::new(processor.clone())).await;

    let state = Arc::new(AppState {
        view_store,
        counters: processor.counters(),
        hub: Arc::clone(&hub),
    });

    (state, processor, hub)
}
