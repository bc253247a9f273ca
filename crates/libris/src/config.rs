//! Locations and defaults shared by the CLI and the REST server

use anyhow::{anyhow, Result};
use dirs::home_dir;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the directory holding the JSON collections
pub const DATA_DIR_ENV: &str = "LIBRIS_DATA_DIR";

/// Overrides the server's JSONL log file
pub const LOG_PATH_ENV: &str = "LIBRIS_LOG_PATH";

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_LOAN_DAYS: i64 = 14;
pub const DEFAULT_RECOMMENDATIONS: usize = 5;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Get the data root directory (~/.libris/data)
pub fn get_data_root() -> Result<PathBuf> {
  // Allow tests or callers to override the root directory via env var
  if let Ok(custom_root) = std::env::var(DATA_DIR_ENV) {
    return Ok(PathBuf::from(custom_root));
  }

  let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
  Ok(home.join(".libris").join("data"))
}

/// Get the path for server logs
pub fn get_server_logs_path(data_dir: &std::path::Path) -> PathBuf {
  if let Ok(custom_path) = std::env::var(LOG_PATH_ENV) {
    return PathBuf::from(custom_path);
  }

  data_dir
    .parent()
    .map(|parent| parent.to_path_buf())
    .unwrap_or_else(|| data_dir.to_path_buf())
    .join("logs")
    .join("server.logs.jsonl")
}

/// Runtime settings for the REST server
#[derive(Debug, Clone)]
pub struct ServerConfig {
  pub bind: SocketAddr,
  pub data_dir: PathBuf,
  pub log_path: PathBuf,
  /// Origins allowed by CORS, typically the web front-end
  pub allowed_origins: Vec<String>,
  /// Recommendation count when the request does not ask for one
  pub default_recommendations: usize,
  /// Deadline applied to each store fetch made by the recommender
  pub fetch_timeout: Duration,
}

impl ServerConfig {
  pub fn new(bind: SocketAddr, data_dir: PathBuf) -> Self {
    let log_path = get_server_logs_path(&data_dir);
    Self {
      bind,
      data_dir,
      log_path,
      allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
      default_recommendations: DEFAULT_RECOMMENDATIONS,
      fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
    }
  }
}
