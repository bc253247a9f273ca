//! Store abstraction layer for the library collections
//!
//! The recommender only needs the read-only queries in [`CatalogSource`];
//! the account and circulation workflows use the wider [`LibraryStore`].
//! Implementations are shared behind an `Arc` and opened once per process.

pub mod document;

use async_trait::async_trait;
use std::cmp::Ordering;

use crate::error::Result;
use crate::models::{Admin, Book, BorrowRecord, User};

pub use document::DocumentStore;

/// Read-only queries consumed by the recommendation engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
  /// Every book in the inventory, in a stable order
  async fn fetch_catalog(&self) -> Result<Vec<Book>>;

  /// Borrowing history of a user, `None` when the user does not exist
  async fn fetch_user_history(&self, username: &str) -> Result<Option<Vec<String>>>;

  /// Highest rated books first, at most `limit` of them
  async fn popular_books(&self, limit: usize) -> Result<Vec<Book>>;
}

/// Full set of document operations used by the backend
#[async_trait]
pub trait LibraryStore: CatalogSource {
  async fn list_users(&self) -> Result<Vec<User>>;

  async fn find_user(&self, username: &str) -> Result<Option<User>>;

  async fn insert_user(&self, user: User) -> Result<()>;

  async fn find_admin(&self, username: &str) -> Result<Option<Admin>>;

  async fn insert_admin(&self, admin: Admin) -> Result<()>;

  async fn find_book(&self, name: &str) -> Result<Option<Book>>;

  /// Insert books, replacing any existing book with the same name in place.
  /// Returns how many books were newly added.
  async fn upsert_books(&self, books: Vec<Book>) -> Result<usize>;

  async fn find_borrow_record(&self, book_name: &str) -> Result<Option<BorrowRecord>>;

  async fn list_borrow_records(&self) -> Result<Vec<BorrowRecord>>;

  /// Store an open loan, mirror it on the user and extend their history
  async fn record_loan(&self, record: BorrowRecord) -> Result<()>;

  /// Remove the open loan on `book_name` and its copy on the user
  async fn close_loan(&self, username: &str, book_name: &str) -> Result<()>;
}

/// Sort books by rating, highest first. Unrated books go last and equal
/// ratings keep their catalog order.
pub fn sort_by_rating(books: &mut [Book]) {
  books.sort_by(|a, b| match (a.average_rating, b.average_rating) {
    (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  });
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sort_by_rating_puts_unrated_last_and_is_stable() {
    let mut books = vec![
      Book::new("unrated", "a", None, ""),
      Book::new("low", "a", None, "").with_rating(2.0),
      Book::new("high-1", "a", None, "").with_rating(4.5),
      Book::new("high-2", "a", None, "").with_rating(4.5),
    ];

    sort_by_rating(&mut books);

    let names: Vec<&str> = books.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["high-1", "high-2", "low", "unrated"]);
  }
}
