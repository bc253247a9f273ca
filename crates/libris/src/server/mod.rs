//! REST API for the library backend
//!
//! Uses axum for routing and schemars for OpenAPI documentation generation.
//! Paths match the routes the web front-end already calls.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod types;

use bentley::daemon_logs::DaemonLogs;
use std::sync::Arc;

use crate::config::{ServerConfig, DEFAULT_LOAN_DAYS};
use crate::recommend::Recommender;
use crate::store::DocumentStore;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<DocumentStore>,
  pub recommender: Arc<Recommender>,
  pub logger: DaemonLogs,
  /// Recommendation count when the request does not ask for one
  pub default_count: usize,
  pub loan_days: i64,
}

impl AppState {
  pub fn new(store: Arc<DocumentStore>, logger: DaemonLogs, config: &ServerConfig) -> Self {
    let recommender = Recommender::new(store.clone()).with_fetch_timeout(Some(config.fetch_timeout));
    Self {
      store,
      recommender: Arc::new(recommender),
      logger,
      default_count: config.default_recommendations,
      loan_days: DEFAULT_LOAN_DAYS,
    }
  }
}
