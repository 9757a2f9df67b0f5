pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod sheets;
pub mod shutdown;
pub mod tools;
pub mod validation;

pub use config::{CliArgs, ServerConfig, TransportKind};
pub use dispatch::ToolDispatcher;
pub use error::ToolError;
pub use logging::{LoggingConfig, init_logging};
pub use server::SheetsServer;

use anyhow::Result;
use axum::{Json, Router, http::StatusCode, routing::get};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use serde::Serialize;
use tokio::net::TcpListener;

const HTTP_SERVICE_PATH: &str = "/mcp";

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let server = SheetsServer::from_config(&config)?;

    tracing::info!(
        transport = %config.transport,
        api_base = %config.sheets_api_base,
        client_cache = config.client_cache_capacity,
        "starting sheets MCP server",
    );

    match config.transport {
        TransportKind::Stdio => server.run_stdio().await,
        TransportKind::Http => run_stream_http_transport(&config, server).await,
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics_handler() -> (StatusCode, String) {
    (StatusCode::OK, metrics::METRICS.encode())
}

/// Streamable HTTP MCP endpoint at `/mcp` plus `/health` and `/metrics`.
pub fn http_router(server: SheetsServer) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    Router::new()
        .nest_service(HTTP_SERVICE_PATH, service)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
}

async fn run_stream_http_transport(config: &ServerConfig, server: SheetsServer) -> Result<()> {
    let router = http_router(server);
    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(transport = "http", bind = %actual_addr, path = HTTP_SERVICE_PATH, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await?;

    tracing::info!("http transport stopped");
    Ok(())
}
