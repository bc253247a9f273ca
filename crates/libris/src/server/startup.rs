//! REST server startup and configuration

use anyhow::{anyhow, Result};
use axum::{http::HeaderValue, serve, Router};
use bentley::daemon_logs::DaemonLogs;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::ServerConfig;
use crate::server::{routing::create_router, AppState};
use crate::store::DocumentStore;

const COMPONENT: &str = "libris-server";

/// CORS layer admitting only the configured origins
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
  let origins = origins
    .iter()
    .map(|origin| HeaderValue::from_str(origin).map_err(|e| anyhow!("Invalid origin '{origin}': {e}")))
    .collect::<Result<Vec<_>>>()?;

  Ok(
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(origins))
      .allow_methods(Any)
      .allow_headers(Any),
  )
}

/// Router with tracing and CORS layers applied
pub fn build_app(state: AppState, config: &ServerConfig) -> Result<Router> {
  let trace = TraceLayer::new_for_http()
    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
    .on_response(DefaultOnResponse::new().level(Level::DEBUG));

  let cors = cors_layer(&config.allowed_origins)?;

  Ok(create_router(state).layer(ServiceBuilder::new().layer(trace).layer(cors)))
}

/// Start the REST server and run until ctrl-c
pub async fn start_server(config: ServerConfig) -> Result<()> {
  let daemon_logs = DaemonLogs::new(&config.log_path)?;

  let store = Arc::new(DocumentStore::open(&config.data_dir)?);
  daemon_logs
    .info(&format!("Opened document store at {}", config.data_dir.display()), COMPONENT)
    .await;

  let state = AppState::new(store.clone(), daemon_logs.clone(), &config);
  let app = build_app(state, &config)?;

  let listener = TcpListener::bind(config.bind).await?;
  daemon_logs.info(&format!("Server listening on {}", config.bind), COMPONENT).await;

  let served = serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

  // The store is flushed whether or not serving ended cleanly
  if let Err(e) = store.close().await {
    daemon_logs.error(&format!("Failed to flush document store: {e}"), COMPONENT).await;
  }

  match served {
    Ok(()) => {
      daemon_logs.info("Server shutdown gracefully", COMPONENT).await;
      Ok(())
    }
    Err(e) => {
      daemon_logs.error(&format!("Server error: {e}"), COMPONENT).await;
      Err(anyhow!("Server error: {e}"))
    }
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    bentley::error!("Failed to listen for shutdown signal: {}", e);
    std::future::pending::<()>().await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_cors_layer_rejects_invalid_origin() {
    assert!(cors_layer(&["http://localhost:3000".to_string()]).is_ok());
    assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
  }
}
