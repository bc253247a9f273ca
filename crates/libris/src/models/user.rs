use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::loan::BorrowedEntry;

/// A library member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  #[serde(rename = "_id", default = "new_id")]
  pub id: String,

  pub username: String,

  /// Argon2 PHC string
  pub password: String,

  #[serde(default)]
  pub borrowed_books: Vec<BorrowedEntry>,

  /// Every book the user has ever borrowed, oldest first, no duplicates
  #[serde(default)]
  pub past_books: Vec<String>,
}

/// A staff account; admins live in their own collection and never borrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
  pub username: String,
  pub password: String,
}

fn new_id() -> String {
  Uuid::new_v4().to_string()
}

impl User {
  pub fn new(username: &str, password_hash: &str) -> Self {
    Self {
      id: new_id(),
      username: username.to_string(),
      password: password_hash.to_string(),
      borrowed_books: Vec::new(),
      past_books: Vec::new(),
    }
  }
}
