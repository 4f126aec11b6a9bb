use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    logging::SensitiveApiKey,
    metrics,
    signals::setup_signal_handlers,
};

/// Start the change order server
///
/// This function:
/// 1. Initializes metrics
/// 2. Sets up signal handlers for graceful shutdown and config reload
/// 3. Creates the Axum application
/// 4. Binds to the configured address
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config, config_path: PathBuf) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);

    // Wrap config in ArcSwap for atomic reload support
    let config_swap = Arc::new(ArcSwap::from_pointee(config.clone()));

    // Setup signal handlers (SIGTERM, SIGINT for shutdown; SIGHUP for reload)
    let (shutdown_tx, signal_handle) = setup_signal_handlers(config_swap.clone(), config_path);
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(
        AppState::new(config_swap),
        metrics_handle,
        config.server.max_upload_bytes(),
    );

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting change order service on {}", addr);
    info!(
        model = %config.llm.model,
        api_key = %SensitiveApiKey::new(&config.llm.api_key),
        storage_backend = %config.storage.backend,
        max_upload_mb = config.server.max_upload_mb,
        "Configuration loaded"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    // Wait for signal handler task to complete
    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    app_state: AppState,
    metrics_handle: Arc<PrometheusHandle>,
    max_body_bytes: usize,
) -> Router {
    let generate_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/generate-from-pdf", post(handlers::generate::generate_from_pdf))
        .route("/generate-from-text", post(handlers::generate::generate_from_text))
        .with_state(app_state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/metrics", get(handlers::metrics_handler::metrics))
        .with_state(metrics_handle)
        .merge(generate_routes)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
