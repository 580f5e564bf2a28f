//! API server entry point.

use std::sync::Arc;

use coordinator::{
    ChannelPublisher, DispatchStats, InMemoryOrderCache, LogSink, MessagePublisher, OrderCache,
};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use api::config::Config;
use api::routes::orders::AppState;

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

/// Serves the app until shutdown, then waits for the publisher queue to drain.
async fn serve<S, C, P>(
    config: &Config,
    state: Arc<AppState<S, C, P>>,
    metrics_handle: PrometheusHandle,
    dispatcher: JoinHandle<DispatchStats>,
) where
    S: OrderStore + 'static,
    C: OrderCache + 'static,
    P: MessagePublisher + 'static,
{
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // The router owned the last publisher handle; dropping it closes the queue.
    match dispatcher.await {
        Ok(stats) => tracing::info!(
            delivered = stats.delivered,
            dropped = stats.dropped,
            "publisher stopped"
        ),
        Err(e) => tracing::error!(error = %e, "publisher dispatcher panicked"),
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Start the publisher dispatcher
    let (publisher, dispatcher) = ChannelPublisher::spawn(LogSink, config.publisher.clone());
    let cache = InMemoryOrderCache::new();

    // 4. Pick the store and serve
    match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to database");
            let store = PostgresOrderStore::new(pool);
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL order store");

            let state = api::create_state(store, cache, publisher);
            serve(&config, state, metrics_handle, dispatcher).await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory order store");
            let state = api::create_state(InMemoryOrderStore::new(), cache, publisher);
            serve(&config, state, metrics_handle, dispatcher).await;
        }
    }

    tracing::info!("server shut down gracefully");
}
