//! Flowline Server
//!
//! An async Rust server that executes declarative workflow definitions:
//! typed steps run in order against a shared run context, per-step
//! failures are isolated, and every run leaves one execution record.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowline_server::{
    collaborators::{build_completion, build_notifier},
    config::{AppConfig, DatabaseConfig},
    engine::WorkflowEngine,
    handlers,
    recorder::{ExecutionLogSink, ExecutionRecorder, TracingLogSink},
    state::AppState,
    store::{self, FileWorkflowStore, PgExecutionLog, PgWorkflowStore, WorkflowStore},
};
use flowline_steps::collab::{ReqwestCaller, TemplateProvider};
use flowline_steps::StepRunner;

/// Initialize tracing/logging.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,flowline_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the application router with all routes.
fn build_router(state: AppState) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health))
        .route("/api/runs", post(handlers::submit_run))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Assemble the engine over a concrete store implementation.
fn build_engine<S>(
    store: Arc<S>,
    config: &AppConfig,
    sink: Arc<dyn ExecutionLogSink>,
) -> WorkflowEngine
where
    S: WorkflowStore + TemplateProvider + 'static,
{
    let completion = build_completion(config);
    let notifier = Arc::new(build_notifier(config));
    let http = Arc::new(ReqwestCaller::new());
    let templates: Arc<dyn TemplateProvider> = store.clone();

    let runner = StepRunner::new(completion, notifier, templates, http);

    WorkflowEngine::new(store, runner, ExecutionRecorder::new(sink))
        .with_options(config.engine_options())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Flowline Server"
    );

    // Load configuration
    let app_config = AppConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load app config, using defaults");
        AppConfig::default()
    });

    tracing::info!(
        host = %app_config.host,
        port = app_config.port,
        debug = app_config.debug,
        "Configuration loaded"
    );

    // Select the workflow store backend
    let (engine, db_pool) = if let Some(ref dir) = app_config.workflow_dir {
        tracing::info!(dir = %dir, "Serving workflow definitions from directory");

        let store = Arc::new(FileWorkflowStore::load(dir)?);
        let engine = build_engine(store, &app_config, Arc::new(TracingLogSink));

        (engine, None)
    } else {
        let db_config = DatabaseConfig::from_env().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load database config, using defaults");
            DatabaseConfig::default()
        });

        let pool = store::connect(&db_config).await?;

        let workflow_store = Arc::new(PgWorkflowStore::new(pool.clone()));
        let sink = Arc::new(PgExecutionLog::new(pool.clone()));
        let engine = build_engine(workflow_store, &app_config, sink);

        (engine, Some(pool))
    };

    // Create application state
    let state = AppState::new(Arc::new(engine), app_config.clone(), db_pool);

    // Build the router
    let app = build_router(state);

    // Bind to address
    let addr: SocketAddr = app_config.bind_address().parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %addr, "Server listening");

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
