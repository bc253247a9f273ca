use anyhow::{anyhow, Context, Result};
use bentley::daemon_logs::DaemonLogs;
use colored::*;
use std::path::Path;
use std::sync::Arc;

use crate::accounts;
use crate::circulation;
use crate::cli::display::{book_line, print_recommendations};
use crate::config::{get_data_root, get_server_logs_path, DEFAULT_LOAN_DAYS};
use crate::models::Book;
use crate::recommend::{Recommendations, Recommender};
use crate::store::{CatalogSource, DocumentStore, LibraryStore};

fn open_store() -> Result<DocumentStore> {
  let data_root = get_data_root()?;
  DocumentStore::open(&data_root)
    .with_context(|| format!("Failed to open document store at {}", data_root.display()))
}

/// List the catalog with loan state
pub async fn list_books() -> Result<()> {
  let store = open_store()?;
  let books = circulation::books_with_status(&store).await?;

  if books.is_empty() {
    println!("No books in the inventory.");
    return Ok(());
  }

  for status in &books {
    println!("{}", book_line(status));
  }
  Ok(())
}

/// Print the highest rated books
pub async fn popular(limit: usize) -> Result<()> {
  let store = open_store()?;
  let books = store.popular_books(limit).await?;

  if books.is_empty() {
    println!("No books in the inventory.");
    return Ok(());
  }

  for (i, book) in books.iter().enumerate() {
    let rating = book.average_rating.map(|r| format!("{r:.1}")).unwrap_or_else(|| "unrated".to_string());
    println!("{}. {} by {} ({})", i + 1, book.name.bold(), book.author, rating.cyan());
  }
  Ok(())
}

/// Print recommendations for a user
pub async fn recommend(username: &str, count: usize) -> Result<()> {
  let store = Arc::new(open_store()?);
  let recommender = Recommender::new(store);

  let outcome = recommender.recommend(username, count).await;
  match &outcome {
    Recommendations::Personalized(_) => {
      bentley::info!("Recommendations for {} based on borrowing history", username);
    }
    Recommendations::Popular { reason, .. } => {
      bentley::info!("Popular books for {} ({})", username, reason);
    }
    Recommendations::Empty(reason) => {
      bentley::warn!("Nothing to recommend for {} ({})", username, reason);
    }
  }

  print_recommendations(outcome.items());
  Ok(())
}

/// Load books from a JSON or YAML array and merge them into the inventory
pub async fn import(path: &Path) -> Result<()> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

  let books: Vec<Book> = match path.extension().and_then(|ext| ext.to_str()) {
    Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
    Some("json") => serde_json::from_str(&content)?,
    other => return Err(anyhow!("Unsupported import format: {}", other.unwrap_or("none"))),
  };

  let total = books.len();
  let store = open_store()?;
  let added = store.upsert_books(books).await?;

  println!("{} Imported {} books ({} new)", "✓".green(), total, added);
  Ok(())
}

/// Create a member or admin account
pub async fn register(username: &str, password: &str, admin: bool) -> Result<()> {
  let store = open_store()?;

  if admin {
    accounts::register_admin(&store, username, password).await?;
    println!("{} Created admin {}", "✓".green(), username.cyan());
  } else {
    let id = accounts::register(&store, username, password).await?;
    println!("{} Created user {} ({})", "✓".green(), username.cyan(), id.dimmed());
  }
  Ok(())
}

pub async fn borrow(username: &str, book_name: &str, days: Option<i64>) -> Result<()> {
  let store = open_store()?;
  let receipt =
    circulation::borrow_book(&store, username, book_name, days.unwrap_or(DEFAULT_LOAN_DAYS)).await?;

  println!("{} {}", "✓".green(), receipt.message());
  Ok(())
}

pub async fn return_book(username: &str, book_name: &str) -> Result<()> {
  let store = open_store()?;
  let message = circulation::return_book(&store, username, book_name).await?;

  println!("{} {}", "✓".green(), message);
  Ok(())
}

/// Print recent server log entries
pub async fn logs(limit: usize, level: &str) -> Result<()> {
  let log_path = get_server_logs_path(&get_data_root()?);
  if !log_path.exists() {
    println!("No log entries found.");
    return Ok(());
  }

  let daemon_logs = DaemonLogs::new_with_silent(&log_path, true)?;
  let entries = daemon_logs.get_logs(Some(limit), Some(level)).await?;

  if entries.is_empty() {
    println!("No log entries found.");
    return Ok(());
  }

  for entry in entries {
    println!(
      "{} {:<7} [{}] {}",
      entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
      entry.level,
      entry.component.cyan(),
      entry.message
    );
  }
  Ok(())
}
