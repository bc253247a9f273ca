//! Account workflows: registration, login and user profiles
//!
//! Passwords are stored as Argon2id PHC strings with a random 16-byte salt.

use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::{DateTime, Utc};
use rand::RngCore;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LibraryError, Result};
use crate::models::book::UNKNOWN_GENRE;
use crate::models::{Admin, User};
use crate::store::LibraryStore;

const SALT_LEN: usize = 16;

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoginOutcome {
  pub username: String,
  #[serde(rename = "isAdmin")]
  pub is_admin: bool,
  /// Random per-login token; sessions are not tracked server side
  pub token: String,
}

/// A borrowed book as shown on a profile, joined with the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileBook {
  pub name: String,
  pub author: String,
  pub genre: String,
  pub cover_filename: String,
  #[serde(rename = "borrowingDate")]
  pub borrowing_date: DateTime<Utc>,
  #[serde(rename = "dueDate")]
  pub due_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserProfile {
  pub username: String,
  #[serde(rename = "isAdmin")]
  pub is_admin: bool,
  pub borrowed_books: Vec<ProfileBook>,
  pub past_books: Vec<String>,
}

/// Hash a password into an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String> {
  let mut salt = [0u8; SALT_LEN];
  rand::rng().fill_bytes(&mut salt);

  let salt_string = SaltString::encode_b64(&salt)
    .map_err(|e| LibraryError::PasswordHash(format!("Failed to encode salt: {e}")))?;

  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt_string)
    .map_err(|e| LibraryError::PasswordHash(e.to_string()))?;

  Ok(hash.to_string())
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
  let parsed = PasswordHash::new(stored).map_err(|e| LibraryError::PasswordHash(e.to_string()))?;
  Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Create a user account and return its id
pub async fn register(store: &dyn LibraryStore, username: &str, password: &str) -> Result<String> {
  if store.find_user(username).await?.is_some() || store.find_admin(username).await?.is_some() {
    return Err(LibraryError::UserExists(username.to_string()));
  }

  let user = User::new(username, &hash_password(password)?);
  let id = user.id.clone();
  store.insert_user(user).await?;

  bentley::success!("Registered user '{}'", username);
  Ok(id)
}

/// Create a staff account
pub async fn register_admin(store: &dyn LibraryStore, username: &str, password: &str) -> Result<()> {
  if store.find_user(username).await?.is_some() || store.find_admin(username).await?.is_some() {
    return Err(LibraryError::UserExists(username.to_string()));
  }

  let admin = Admin { username: username.to_string(), password: hash_password(password)? };
  store.insert_admin(admin).await?;

  bentley::success!("Registered admin '{}'", username);
  Ok(())
}

/// Verify credentials against users first, then admins
pub async fn login(store: &dyn LibraryStore, username: &str, password: &str) -> Result<LoginOutcome> {
  let (stored, is_admin) = if let Some(user) = store.find_user(username).await? {
    (user.password, false)
  } else if let Some(admin) = store.find_admin(username).await? {
    (admin.password, true)
  } else {
    return Err(LibraryError::UserNotFound(username.to_string()));
  };

  if !verify_password(password, &stored)? {
    bentley::warn!("Failed login for '{}'", username);
    return Err(LibraryError::InvalidCredentials);
  }

  Ok(LoginOutcome {
    username: username.to_string(),
    is_admin,
    token: Uuid::new_v4().to_string(),
  })
}

/// Profile of a user or admin; admins have empty book lists
pub async fn profile(store: &dyn LibraryStore, username: &str) -> Result<UserProfile> {
  let Some(user) = store.find_user(username).await? else {
    if store.find_admin(username).await?.is_some() {
      return Ok(UserProfile {
        username: username.to_string(),
        is_admin: true,
        borrowed_books: Vec::new(),
        past_books: Vec::new(),
      });
    }
    return Err(LibraryError::UserNotFound(username.to_string()));
  };

  let mut borrowed_books = Vec::with_capacity(user.borrowed_books.len());
  for entry in &user.borrowed_books {
    let book = store.find_book(&entry.book_name).await?;
    borrowed_books.push(ProfileBook {
      name: entry.book_name.clone(),
      author: book
        .as_ref()
        .map(|b| b.author.clone())
        .filter(|author| !author.is_empty())
        .unwrap_or_else(|| "Unknown Author".to_string()),
      genre: book
        .as_ref()
        .and_then(|b| b.genre.clone())
        .unwrap_or_else(|| UNKNOWN_GENRE.to_string()),
      cover_filename: book.and_then(|b| b.cover_filename).unwrap_or_default(),
      borrowing_date: entry.borrowing_date,
      due_date: entry.due_date,
    });
  }

  Ok(UserProfile {
    username: user.username,
    is_admin: false,
    borrowed_books,
    past_books: user.past_books,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Book, BorrowRecord};
  use crate::store::DocumentStore;
  use chrono::Duration;
  use tempfile::TempDir;

  fn open_store() -> (TempDir, DocumentStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path()).unwrap();
    (temp_dir, store)
  }

  #[test]
  fn test_hash_is_salted_phc_string() {
    let first = hash_password("hunter2").unwrap();
    let second = hash_password("hunter2").unwrap();

    assert!(first.starts_with("$argon2id$"));
    assert_ne!(first, second);
    assert!(verify_password("hunter2", &first).unwrap());
    assert!(!verify_password("hunter3", &first).unwrap());
  }

  #[test]
  fn test_verify_rejects_non_phc_strings() {
    assert!(matches!(verify_password("x", "plaintext"), Err(LibraryError::PasswordHash(_))));
  }

  #[tokio::test]
  async fn test_register_then_login() {
    let (_temp_dir, store) = open_store();

    let id = register(&store, "alice", "secret").await.unwrap();
    assert!(!id.is_empty());

    let stored = store.find_user("alice").await.unwrap().unwrap();
    assert_ne!(stored.password, "secret");

    let outcome = login(&store, "alice", "secret").await.unwrap();
    assert_eq!(outcome.username, "alice");
    assert!(!outcome.is_admin);
    assert!(Uuid::parse_str(&outcome.token).is_ok());
  }

  #[tokio::test]
  async fn test_register_rejects_duplicates() {
    let (_temp_dir, store) = open_store();
    register(&store, "alice", "secret").await.unwrap();

    let err = register(&store, "alice", "other").await.unwrap_err();
    assert!(matches!(err, LibraryError::UserExists(name) if name == "alice"));
  }

  #[tokio::test]
  async fn test_login_failures() {
    let (_temp_dir, store) = open_store();
    register(&store, "alice", "secret").await.unwrap();

    assert!(matches!(
      login(&store, "alice", "wrong").await,
      Err(LibraryError::InvalidCredentials)
    ));
    assert!(matches!(login(&store, "nobody", "x").await, Err(LibraryError::UserNotFound(_))));
  }

  #[tokio::test]
  async fn test_admin_login_and_profile() {
    let (_temp_dir, store) = open_store();
    register_admin(&store, "root", "toor").await.unwrap();

    let outcome = login(&store, "root", "toor").await.unwrap();
    assert!(outcome.is_admin);

    let profile = profile(&store, "root").await.unwrap();
    assert!(profile.is_admin);
    assert!(profile.borrowed_books.is_empty());
  }

  #[tokio::test]
  async fn test_profile_joins_inventory_with_fallbacks() {
    let (_temp_dir, store) = open_store();
    register(&store, "alice", "secret").await.unwrap();
    store.upsert_books(vec![Book::new("Dune", "Frank Herbert", None, "")]).await.unwrap();

    let now = Utc::now();
    for name in ["Dune", "Vanished"] {
      let record = BorrowRecord {
        user_id: "alice".to_string(),
        book_name: name.to_string(),
        borrowing_date: now,
        due_date: now + Duration::days(14),
      };
      store.record_loan(record).await.unwrap();
    }

    let profile = profile(&store, "alice").await.unwrap();

    assert!(!profile.is_admin);
    assert_eq!(profile.past_books, vec!["Dune", "Vanished"]);
    assert_eq!(profile.borrowed_books[0].author, "Frank Herbert");
    assert_eq!(profile.borrowed_books[0].genre, "Unknown");
    assert_eq!(profile.borrowed_books[1].author, "Unknown Author");
    assert_eq!(profile.borrowed_books[1].cover_filename, "");
  }

  #[tokio::test]
  async fn test_profile_of_unknown_user() {
    let (_temp_dir, store) = open_store();
    assert!(matches!(profile(&store, "ghost").await, Err(LibraryError::UserNotFound(_))));
  }
}
