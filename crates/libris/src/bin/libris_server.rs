//! Libris REST Server
//!
//! HTTP API for the library web front-end: catalog, accounts, circulation
//! and recommendations.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use libris::config::{
  get_data_root, ServerConfig, DEFAULT_ALLOWED_ORIGIN, DEFAULT_BIND, DEFAULT_FETCH_TIMEOUT_MS,
  DEFAULT_RECOMMENDATIONS,
};
use libris::server::startup::start_server;

#[derive(Parser)]
#[command(name = "libris_server")]
#[command(about = "Libris REST API Server")]
#[command(version)]
struct Args {
  /// Server bind address
  #[arg(long, env = "LIBRIS_BIND", default_value = DEFAULT_BIND)]
  bind: SocketAddr,

  /// Directory holding the JSON collections (defaults to ~/.libris/data)
  #[arg(long, env = "LIBRIS_DATA_DIR")]
  data_dir: Option<PathBuf>,

  /// JSONL server log file (defaults to <data dir>/../logs/server.logs.jsonl)
  #[arg(long, env = "LIBRIS_LOG_PATH")]
  log_path: Option<PathBuf>,

  /// Comma separated origins allowed by CORS
  #[arg(long, env = "LIBRIS_ALLOWED_ORIGINS", value_delimiter = ',', default_value = DEFAULT_ALLOWED_ORIGIN)]
  allowed_origins: Vec<String>,

  /// Recommendations returned when a request gives no count
  #[arg(long, default_value_t = DEFAULT_RECOMMENDATIONS)]
  recommendations: usize,

  /// Deadline for each store fetch made by the recommender, in milliseconds
  #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_MS)]
  fetch_timeout_ms: u64,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let filter = if args.verbose {
    EnvFilter::new("info,tower_http=debug")
  } else {
    EnvFilter::new("libris=info,tower_http=warn,warn")
  };

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let data_dir = match args.data_dir {
    Some(dir) => dir,
    None => get_data_root()?,
  };

  let mut config = ServerConfig::new(args.bind, data_dir);
  if let Some(log_path) = args.log_path {
    config.log_path = log_path;
  }
  config.allowed_origins = args.allowed_origins;
  config.default_recommendations = args.recommendations;
  config.fetch_timeout = Duration::from_millis(args.fetch_timeout_ms);

  bentley::info!("Starting Libris REST Server v{}", env!("CARGO_PKG_VERSION"));
  bentley::info!("Binding to address: {}", args.bind);

  start_server(config).await?;

  Ok(())
}
