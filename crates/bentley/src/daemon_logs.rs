//! Daemon logging infrastructure for bentley
//!
//! Persistent, structured logging for long-running services:
//! - JSONL storage on disk, one entry per line
//! - Async-safe access through an internal tokio mutex
//! - Optional console echo (silent mode for tests and embedded use)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "schemars")]
use schemars::JsonSchema;

// Types
// =====

/// Request context attached to a log entry
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct LogContext {
  /// Request ID for correlation
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,

  /// HTTP method
  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<String>,

  /// Request path
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,

  /// User agent
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_agent: Option<String>,

  /// Request duration in milliseconds
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<f64>,

  /// HTTP status code
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_code: Option<u16>,
}

/// A structured log entry
#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct LogEntry {
  pub timestamp: DateTime<Utc>,
  pub level: String,
  pub message: String,
  pub component: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub context: Option<LogContext>,
}

struct LogFile {
  path: PathBuf,
  silent: bool,
}

/// Thread-safe disk-based log storage using JSONL format
#[derive(Clone)]
pub struct DaemonLogs {
  inner: Arc<tokio::sync::Mutex<LogFile>>,
}

// File Operations
// ===============

impl LogFile {
  fn open(path: &Path, silent: bool) -> std::io::Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    // Never truncate an existing log
    if !path.exists() {
      File::create(path)?;
    }

    Ok(Self { path: path.to_path_buf(), silent })
  }

  fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
    let line = serde_json::to_string(entry)
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    writeln!(file, "{line}")?;
    file.flush()
  }

  /// Most recent `limit` entries matching the level filter, oldest first
  fn read(&self, limit: Option<usize>, level_filter: Option<&str>) -> std::io::Result<Vec<LogEntry>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(&self.path)?);
    let mut logs = Vec::new();

    for line in reader.lines() {
      let line = line?;
      if line.trim().is_empty() {
        continue;
      }

      // Malformed lines are skipped rather than failing the whole read
      let Ok(entry) = serde_json::from_str::<LogEntry>(&line) else {
        continue;
      };

      if level_filter.is_none_or(|filter| filter == "all" || entry.level == filter) {
        logs.push(entry);
      }
    }

    if let Some(limit) = limit {
      let skip = logs.len().saturating_sub(limit);
      logs.drain(..skip);
    }

    Ok(logs)
  }
}

// Core API
// ========

impl DaemonLogs {
  /// Create log storage that echoes every entry to the console
  pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
    Self::new_with_silent(path, false)
  }

  /// Create log storage, optionally without console echo
  pub fn new_with_silent<P: AsRef<Path>>(path: P, silent: bool) -> std::io::Result<Self> {
    let file = LogFile::open(path.as_ref(), silent)?;
    Ok(Self { inner: Arc::new(tokio::sync::Mutex::new(file)) })
  }

  /// Append an entry, reporting I/O failures to the caller
  pub async fn add_log(
    &self,
    level: &str,
    message: &str,
    component: &str,
    context: Option<LogContext>,
  ) -> std::io::Result<()> {
    let entry = LogEntry {
      timestamp: Utc::now(),
      level: level.to_string(),
      message: message.to_string(),
      component: component.to_string(),
      context,
    };

    let guard = self.inner.lock().await;
    guard.append(&entry)?;

    if !guard.silent {
      echo(level, message);
    }

    Ok(())
  }

  /// Append an entry, ignoring I/O failures
  pub async fn log(&self, level: &str, message: &str, component: &str, context: Option<LogContext>) {
    let _ = self.add_log(level, message, component, context).await;
  }

  /// Retrieve logs with optional level filtering and limiting
  pub async fn get_logs(
    &self,
    limit: Option<usize>,
    level_filter: Option<&str>,
  ) -> std::io::Result<Vec<LogEntry>> {
    let guard = self.inner.lock().await;
    guard.read(limit, level_filter)
  }

  /// Path of the backing JSONL file
  pub async fn log_file_path(&self) -> PathBuf {
    self.inner.lock().await.path.clone()
  }

  pub async fn info(&self, message: &str, component: &str) {
    self.log("info", message, component, None).await;
  }

  pub async fn warn(&self, message: &str, component: &str) {
    self.log("warn", message, component, None).await;
  }

  pub async fn error(&self, message: &str, component: &str) {
    self.log("error", message, component, None).await;
  }

  pub async fn success(&self, message: &str, component: &str) {
    self.log("success", message, component, None).await;
  }
}

fn echo(level: &str, message: &str) {
  match level {
    "warn" => crate::warn(message),
    "error" => crate::error(message),
    "success" => crate::success(message),
    "debug" => crate::debug(message),
    _ => crate::info(message),
  }
}

// Tests
// =====
