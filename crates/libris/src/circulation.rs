//! Borrow and return workflows

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LibraryError, Result};
use crate::models::{Book, BorrowRecord};
use crate::store::{CatalogSource, LibraryStore};

/// A completed loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BorrowReceipt {
  pub book_name: String,
  pub due_date: DateTime<Utc>,
}

impl BorrowReceipt {
  pub fn message(&self) -> String {
    format!(
      "Book {} borrowed successfully, due by {}",
      self.book_name,
      self.due_date.format("%Y-%m-%d")
    )
  }
}

/// Outcome of one book in a batch borrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchResult {
  pub book_name: String,
  pub success: bool,
  pub message: String,
}

/// A catalog entry with its current loan state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BookStatus {
  #[serde(flatten)]
  pub book: Book,
  pub borrowed: bool,
  #[serde(rename = "borrowedBy", skip_serializing_if = "Option::is_none")]
  pub borrowed_by: Option<String>,
}

/// Lend `book_name` to `username` for `days` days
pub async fn borrow_book(
  store: &dyn LibraryStore,
  username: &str,
  book_name: &str,
  days: i64,
) -> Result<BorrowReceipt> {
  if store.find_user(username).await?.is_none() {
    return Err(LibraryError::UserNotFound(username.to_string()));
  }
  if store.find_book(book_name).await?.is_none() {
    return Err(LibraryError::BookNotFound(book_name.to_string()));
  }
  if store.find_borrow_record(book_name).await?.is_some() {
    return Err(LibraryError::AlreadyBorrowed(book_name.to_string()));
  }

  let borrowing_date = Utc::now();
  let due_date = borrowing_date + Duration::days(days);

  store
    .record_loan(BorrowRecord {
      user_id: username.to_string(),
      book_name: book_name.to_string(),
      borrowing_date,
      due_date,
    })
    .await?;

  let receipt = BorrowReceipt { book_name: book_name.to_string(), due_date };
  bentley::info!("{} (user '{}')", receipt.message(), username);
  Ok(receipt)
}

/// Borrow several books; one failure never stops the rest of the batch
pub async fn borrow_many(
  store: &dyn LibraryStore,
  username: &str,
  book_names: &[String],
  days: i64,
) -> Vec<BatchResult> {
  let mut results = Vec::with_capacity(book_names.len());

  for book_name in book_names {
    let result = match borrow_book(store, username, book_name, days).await {
      Ok(receipt) => BatchResult { book_name: book_name.clone(), success: true, message: receipt.message() },
      Err(e) => BatchResult { book_name: book_name.clone(), success: false, message: e.to_string() },
    };
    results.push(result);
  }

  results
}

/// Take back a book lent to `username`
pub async fn return_book(store: &dyn LibraryStore, username: &str, book_name: &str) -> Result<String> {
  if store.find_user(username).await?.is_none() {
    return Err(LibraryError::UserNotFound(username.to_string()));
  }
  if store.find_book(book_name).await?.is_none() {
    return Err(LibraryError::BookNotFound(book_name.to_string()));
  }

  let borrowed_by_user = store
    .find_borrow_record(book_name)
    .await?
    .is_some_and(|record| record.user_id == username);
  if !borrowed_by_user {
    return Err(LibraryError::NotBorrowedByUser {
      username: username.to_string(),
      book: book_name.to_string(),
    });
  }

  store.close_loan(username, book_name).await?;

  let message = format!("Book {book_name} returned successfully");
  bentley::info!("{} (user '{}')", message, username);
  Ok(message)
}

/// The catalog with a borrowed flag on every book
pub async fn books_with_status(store: &dyn LibraryStore) -> Result<Vec<BookStatus>> {
  let borrowed: HashMap<String, String> = store
    .list_borrow_records()
    .await?
    .into_iter()
    .map(|record| (record.book_name, record.user_id))
    .collect();

  Ok(
    store
      .fetch_catalog()
      .await?
      .into_iter()
      .map(|book| {
        let borrowed_by = borrowed.get(&book.name).cloned();
        BookStatus { borrowed: borrowed_by.is_some(), borrowed_by, book }
      })
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::User;
  use crate::store::DocumentStore;
  use tempfile::TempDir;

  async fn seeded_store() -> (TempDir, DocumentStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path()).unwrap();
    store.insert_user(User::new("alice", "hash")).await.unwrap();
    store.insert_user(User::new("bob", "hash")).await.unwrap();
    store
      .upsert_books(vec![
        Book::new("Dune", "Frank Herbert", Some("SciFi"), ""),
        Book::new("Emma", "Jane Austen", Some("Romance"), ""),
      ])
      .await
      .unwrap();
    (temp_dir, store)
  }

  #[tokio::test]
  async fn test_borrow_records_loan_and_history() {
    let (_temp_dir, store) = seeded_store().await;

    let receipt = borrow_book(&store, "alice", "Dune", 14).await.unwrap();

    let expected_due = (Utc::now() + Duration::days(14)).format("%Y-%m-%d").to_string();
    assert_eq!(receipt.message(), format!("Book Dune borrowed successfully, due by {expected_due}"));

    let user = store.find_user("alice").await.unwrap().unwrap();
    assert_eq!(user.borrowed_books.len(), 1);
    assert_eq!(user.past_books, vec!["Dune"]);
    assert!(store.find_borrow_record("Dune").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn test_borrow_rejects_unknown_and_taken_books() {
    let (_temp_dir, store) = seeded_store().await;
    borrow_book(&store, "alice", "Dune", 14).await.unwrap();

    assert!(matches!(
      borrow_book(&store, "ghost", "Emma", 14).await,
      Err(LibraryError::UserNotFound(_))
    ));
    assert!(matches!(
      borrow_book(&store, "bob", "Missing", 14).await,
      Err(LibraryError::BookNotFound(_))
    ));
    assert!(matches!(
      borrow_book(&store, "bob", "Dune", 14).await,
      Err(LibraryError::AlreadyBorrowed(_))
    ));
  }

  #[tokio::test]
  async fn test_borrow_many_continues_after_failures() {
    let (_temp_dir, store) = seeded_store().await;
    let names = vec!["Missing".to_string(), "Emma".to_string()];

    let results = borrow_many(&store, "bob", &names, 7).await;

    assert_eq!(results.len(), 2);
    assert!(!results[0].success);
    assert_eq!(results[0].message, "Book not found: Missing");
    assert!(results[1].success);
  }

  #[tokio::test]
  async fn test_return_only_by_borrower() {
    let (_temp_dir, store) = seeded_store().await;
    borrow_book(&store, "alice", "Dune", 14).await.unwrap();

    assert!(matches!(
      return_book(&store, "bob", "Dune").await,
      Err(LibraryError::NotBorrowedByUser { .. })
    ));

    let message = return_book(&store, "alice", "Dune").await.unwrap();
    assert_eq!(message, "Book Dune returned successfully");

    let user = store.find_user("alice").await.unwrap().unwrap();
    assert!(user.borrowed_books.is_empty());
    assert_eq!(user.past_books, vec!["Dune"]);
    assert!(store.find_borrow_record("Dune").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_books_with_status_marks_borrowed() {
    let (_temp_dir, store) = seeded_store().await;
    borrow_book(&store, "alice", "Emma", 14).await.unwrap();

    let status = books_with_status(&store).await.unwrap();

    assert!(!status[0].borrowed);
    assert_eq!(status[0].borrowed_by, None);
    assert!(status[1].borrowed);
    assert_eq!(status[1].borrowed_by.as_deref(), Some("alice"));

    let json = serde_json::to_value(&status[1]).unwrap();
    assert_eq!(json["name"], "Emma");
    assert_eq!(json["borrowedBy"], "alice");
  }
}
