//! Error types shared by the library modules

use thiserror::Error;

/// Errors raised by the store and the account/circulation workflows
#[derive(Error, Debug)]
pub enum LibraryError {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("User not found: {0}")]
  UserNotFound(String),

  #[error("Book not found: {0}")]
  BookNotFound(String),

  #[error("User already exists: {0}")]
  UserExists(String),

  #[error("Book is already borrowed: {0}")]
  AlreadyBorrowed(String),

  #[error("Book {book} was not borrowed by {username}")]
  NotBorrowedByUser { username: String, book: String },

  #[error("Invalid username or password")]
  InvalidCredentials,

  #[error("Password hashing failed: {0}")]
  PasswordHash(String),

  #[error("Store operation timed out after {0} ms")]
  Timeout(u128),

  #[error("Store error: {0}")]
  Store(String),
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, LibraryError>;
