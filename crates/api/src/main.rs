//! Usage query service entry point.

use api::config::Config;
use metrics_exporter_prometheus::PrometheusHandle;
use projector::ProcessorConfig;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use view_store::{
    CheckpointStore, InMemoryCheckpointStore, InMemoryViewStore, PostgresCheckpointStore,
    PostgresViewStore, ViewStore,
};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Brings up the processor and serves the API over the given stores.
async fn run<V, C>(config: Config, view_store: V, checkpoints: C, metrics_handle: PrometheusHandle)
where
    V: ViewStore + Clone + 'static,
    C: CheckpointStore + 'static,
{
    // 4. Wire stream hub, processor, and shared state
    let (state, processor, _hub) = api::create_state(
        view_store,
        checkpoints,
        config.partitions,
        ProcessorConfig::default(),
    )
    .await;

    // 5. Connect the stream and begin applying events
    processor.start().await.expect("stream startup failed");

    // 6. Build the application
    let app = api::create_app(state, metrics_handle);

    // 7. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting usage query service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // 8. Drain partition workers before exit
    processor.stop().await;
    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = Config::from_env();

    // 2. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 3. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    match config.database_url.clone() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&url)
                .await
                .expect("failed to connect to PostgreSQL");
            let view_store = PostgresViewStore::new(pool.clone());
            view_store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            let checkpoints = PostgresCheckpointStore::new(pool);
            run(config, view_store, checkpoints, metrics_handle).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory stores");
            run(
                config,
                InMemoryViewStore::new(),
                InMemoryCheckpointStore::new(),
                metrics_handle,
            )
            .await;
        }
    }
}
