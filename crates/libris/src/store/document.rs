//! JSON document store
//!
//! Each collection lives in its own JSON array file inside the data
//! directory. Collections are loaded once when the store is opened and every
//! mutation rewrites the affected file.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::{sort_by_rating, CatalogSource, LibraryStore};
use crate::error::{LibraryError, Result};
use crate::models::{Admin, Book, BorrowRecord, BorrowedEntry, User};

#[derive(Debug, Clone, Copy)]
enum Collection {
  Users,
  Admins,
  Inventory,
  BorrowedBooks,
}

impl Collection {
  fn file_name(self) -> &'static str {
    match self {
      Collection::Users => "users.json",
      Collection::Admins => "admins.json",
      Collection::Inventory => "inventory.json",
      Collection::BorrowedBooks => "borrowed_books.json",
    }
  }
}

#[derive(Default)]
struct Collections {
  users: Vec<User>,
  admins: Vec<Admin>,
  inventory: Vec<Book>,
  borrowed_books: Vec<BorrowRecord>,
}

/// Library collections persisted as JSON files
pub struct DocumentStore {
  dir: PathBuf,
  collections: RwLock<Collections>,
}

impl DocumentStore {
  /// Open the store in `dir`, creating the directory when needed.
  /// Missing collection files are treated as empty collections.
  pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    fs::create_dir_all(&dir)?;

    let collections = Collections {
      users: read_collection(&dir, Collection::Users)?,
      admins: read_collection(&dir, Collection::Admins)?,
      inventory: read_collection(&dir, Collection::Inventory)?,
      borrowed_books: read_collection(&dir, Collection::BorrowedBooks)?,
    };

    bentley::debug!(
      "Opened document store at {} ({} books, {} users)",
      dir.display(),
      collections.inventory.len(),
      collections.users.len()
    );

    Ok(Self { dir, collections: RwLock::new(collections) })
  }

  /// Directory holding the collection files
  pub fn data_dir(&self) -> &Path {
    &self.dir
  }

  /// Flush every collection to disk. Called once at shutdown.
  pub async fn close(&self) -> Result<()> {
    let collections = self.collections.read().await;
    write_collection(&self.dir, Collection::Users, &collections.users).await?;
    write_collection(&self.dir, Collection::Admins, &collections.admins).await?;
    write_collection(&self.dir, Collection::Inventory, &collections.inventory).await?;
    write_collection(&self.dir, Collection::BorrowedBooks, &collections.borrowed_books).await?;
    Ok(())
  }
}

fn read_collection<T: DeserializeOwned>(dir: &Path, collection: Collection) -> Result<Vec<T>> {
  let path = dir.join(collection.file_name());
  if !path.exists() {
    return Ok(Vec::new());
  }

  let content = fs::read_to_string(&path)?;
  if content.trim().is_empty() {
    return Ok(Vec::new());
  }

  Ok(serde_json::from_str(&content)?)
}

/// Write through a temporary file so a crash never leaves half a collection.
/// The file I/O runs on the blocking pool; callers hold the collection lock
/// across it so writes to one file never interleave.
async fn write_collection<T: Serialize>(dir: &Path, collection: Collection, items: &[T]) -> Result<()> {
  let path = dir.join(collection.file_name());
  let tmp_path = path.with_extension("json.tmp");
  let content = serde_json::to_string_pretty(items)?;

  tokio::task::spawn_blocking(move || -> Result<()> {
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, &path)?;
    Ok(())
  })
  .await
  .map_err(|e| LibraryError::Store(format!("Write task failed: {e}")))?
}

#[async_trait]
impl CatalogSource for DocumentStore {
  async fn fetch_catalog(&self) -> Result<Vec<Book>> {
    Ok(self.collections.read().await.inventory.clone())
  }

  async fn fetch_user_history(&self, username: &str) -> Result<Option<Vec<String>>> {
    let collections = self.collections.read().await;
    Ok(
      collections
        .users
        .iter()
        .find(|user| user.username == username)
        .map(|user| user.past_books.clone()),
    )
  }

  async fn popular_books(&self, limit: usize) -> Result<Vec<Book>> {
    let mut books = self.fetch_catalog().await?;
    sort_by_rating(&mut books);
    books.truncate(limit);
    Ok(books)
  }
}

#[async_trait]
impl LibraryStore for DocumentStore {
  async fn list_users(&self) -> Result<Vec<User>> {
    Ok(self.collections.read().await.users.clone())
  }

  async fn find_user(&self, username: &str) -> Result<Option<User>> {
    let collections = self.collections.read().await;
    Ok(collections.users.iter().find(|user| user.username == username).cloned())
  }

  async fn insert_user(&self, user: User) -> Result<()> {
    let mut collections = self.collections.write().await;
    if collections.users.iter().any(|existing| existing.username == user.username) {
      return Err(LibraryError::UserExists(user.username));
    }

    let mut users = collections.users.clone();
    users.push(user);
    write_collection(&self.dir, Collection::Users, &users).await?;
    collections.users = users;
    Ok(())
  }

  async fn find_admin(&self, username: &str) -> Result<Option<Admin>> {
    let collections = self.collections.read().await;
    Ok(collections.admins.iter().find(|admin| admin.username == username).cloned())
  }

  async fn insert_admin(&self, admin: Admin) -> Result<()> {
    let mut collections = self.collections.write().await;
    if collections.admins.iter().any(|existing| existing.username == admin.username) {
      return Err(LibraryError::UserExists(admin.username));
    }

    let mut admins = collections.admins.clone();
    admins.push(admin);
    write_collection(&self.dir, Collection::Admins, &admins).await?;
    collections.admins = admins;
    Ok(())
  }

  async fn find_book(&self, name: &str) -> Result<Option<Book>> {
    let collections = self.collections.read().await;
    Ok(collections.inventory.iter().find(|book| book.name == name).cloned())
  }

  async fn upsert_books(&self, books: Vec<Book>) -> Result<usize> {
    let mut collections = self.collections.write().await;
    let mut inventory = collections.inventory.clone();
    let mut added = 0;

    for book in books {
      match inventory.iter_mut().find(|existing| existing.name == book.name) {
        Some(existing) => *existing = book,
        None => {
          inventory.push(book);
          added += 1;
        }
      }
    }

    write_collection(&self.dir, Collection::Inventory, &inventory).await?;
    collections.inventory = inventory;
    Ok(added)
  }

  async fn find_borrow_record(&self, book_name: &str) -> Result<Option<BorrowRecord>> {
    let collections = self.collections.read().await;
    Ok(collections.borrowed_books.iter().find(|record| record.book_name == book_name).cloned())
  }

  async fn list_borrow_records(&self) -> Result<Vec<BorrowRecord>> {
    Ok(self.collections.read().await.borrowed_books.clone())
  }

  async fn record_loan(&self, record: BorrowRecord) -> Result<()> {
    let mut collections = self.collections.write().await;

    let mut users = collections.users.clone();
    let user = users
      .iter_mut()
      .find(|user| user.username == record.user_id)
      .ok_or_else(|| LibraryError::UserNotFound(record.user_id.clone()))?;

    user.borrowed_books.push(BorrowedEntry::from(&record));
    if !user.past_books.contains(&record.book_name) {
      user.past_books.push(record.book_name.clone());
    }

    let mut borrowed_books = collections.borrowed_books.clone();
    borrowed_books.push(record);

    self.commit_loans(&mut collections, users, borrowed_books).await
  }

  async fn close_loan(&self, username: &str, book_name: &str) -> Result<()> {
    let mut collections = self.collections.write().await;

    let mut borrowed_books = collections.borrowed_books.clone();
    borrowed_books.retain(|record| record.book_name != book_name);

    let mut users = collections.users.clone();
    if let Some(user) = users.iter_mut().find(|user| user.username == username) {
      user.borrowed_books.retain(|entry| entry.book_name != book_name);
    }

    self.commit_loans(&mut collections, users, borrowed_books).await
  }
}

impl DocumentStore {
  /// Persist a loan change that spans the users and borrowed-books files.
  /// Memory is only updated once both writes succeed; when the users write
  /// fails the previous borrowed-books file is restored.
  async fn commit_loans(
    &self,
    collections: &mut Collections,
    users: Vec<User>,
    borrowed_books: Vec<BorrowRecord>,
  ) -> Result<()> {
    write_collection(&self.dir, Collection::BorrowedBooks, &borrowed_books).await?;

    if let Err(e) = write_collection(&self.dir, Collection::Users, &users).await {
      if let Err(restore) =
        write_collection(&self.dir, Collection::BorrowedBooks, &collections.borrowed_books).await
      {
        bentley::error!("Failed to restore {}: {}", Collection::BorrowedBooks.file_name(), restore);
      }
      return Err(e);
    }

    collections.users = users;
    collections.borrowed_books = borrowed_books;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, Utc};
  use tempfile::TempDir;

  fn loan(username: &str, book: &str) -> BorrowRecord {
    let now = Utc::now();
    BorrowRecord {
      user_id: username.to_string(),
      book_name: book.to_string(),
      borrowing_date: now,
      due_date: now + Duration::days(14),
    }
  }

  #[tokio::test]
  async fn test_open_empty_directory_has_empty_collections() {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::open(temp.path().join("data")).unwrap();

    assert!(store.fetch_catalog().await.unwrap().is_empty());
    assert!(store.list_users().await.unwrap().is_empty());
    assert_eq!(store.fetch_user_history("nobody").await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_upsert_books_keeps_insertion_order_and_replaces_by_name() {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::open(temp.path()).unwrap();

    let added = store
      .upsert_books(vec![
        Book::new("B", "Y", Some("SciFi"), "first"),
        Book::new("A", "X", Some("SciFi"), "second"),
      ])
      .await
      .unwrap();
    assert_eq!(added, 2);

    let added = store.upsert_books(vec![Book::new("B", "Y", Some("SciFi"), "updated")]).await.unwrap();
    assert_eq!(added, 0);

    let catalog = store.fetch_catalog().await.unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].name, "B");
    assert_eq!(catalog[0].description, "updated");
    assert_eq!(catalog[1].name, "A");
  }

  #[tokio::test]
  async fn test_collections_survive_reopen() {
    let temp = TempDir::new().unwrap();
    {
      let store = DocumentStore::open(temp.path()).unwrap();
      store.upsert_books(vec![Book::new("Dune", "Herbert", None, "")]).await.unwrap();
      store.insert_user(User::new("reader", "hash")).await.unwrap();
      store.close().await.unwrap();
    }

    let store = DocumentStore::open(temp.path()).unwrap();
    assert!(store.find_book("Dune").await.unwrap().is_some());
    assert!(store.find_user("reader").await.unwrap().is_some());
    assert!(!temp.path().join("users.json.tmp").exists());
  }

  #[tokio::test]
  async fn test_insert_duplicate_user_fails() {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::open(temp.path()).unwrap();

    store.insert_user(User::new("reader", "hash")).await.unwrap();
    let result = store.insert_user(User::new("reader", "other")).await;

    assert!(matches!(result, Err(LibraryError::UserExists(name)) if name == "reader"));
  }

  #[tokio::test]
  async fn test_record_loan_updates_user_and_history_once() {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::open(temp.path()).unwrap();
    store.insert_user(User::new("reader", "hash")).await.unwrap();

    store.record_loan(loan("reader", "Dune")).await.unwrap();
    store.close_loan("reader", "Dune").await.unwrap();
    store.record_loan(loan("reader", "Dune")).await.unwrap();

    let user = store.find_user("reader").await.unwrap().unwrap();
    assert_eq!(user.borrowed_books.len(), 1);
    assert_eq!(user.past_books, vec!["Dune".to_string()]);
    assert!(store.find_borrow_record("Dune").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn test_close_loan_removes_record_and_entry() {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::open(temp.path()).unwrap();
    store.insert_user(User::new("reader", "hash")).await.unwrap();
    store.record_loan(loan("reader", "Dune")).await.unwrap();

    store.close_loan("reader", "Dune").await.unwrap();

    assert!(store.find_borrow_record("Dune").await.unwrap().is_none());
    let user = store.find_user("reader").await.unwrap().unwrap();
    assert!(user.borrowed_books.is_empty());
    assert_eq!(user.past_books, vec!["Dune".to_string()]);
  }

  #[tokio::test]
  async fn test_popular_books_sorted_and_limited() {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::open(temp.path()).unwrap();
    store
      .upsert_books(vec![
        Book::new("ok", "a", None, "").with_rating(3.0),
        Book::new("best", "a", None, "").with_rating(4.9),
        Book::new("unrated", "a", None, ""),
      ])
      .await
      .unwrap();

    let popular = store.popular_books(2).await.unwrap();
    let names: Vec<&str> = popular.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["best", "ok"]);
  }

  #[tokio::test]
  async fn test_failed_write_leaves_memory_unchanged() {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::open(temp.path()).unwrap();
    let blocker = temp.path().join("users.json.tmp");
    fs::create_dir(&blocker).unwrap();

    assert!(store.insert_user(User::new("ghost", "hash")).await.is_err());
    assert!(store.find_user("ghost").await.unwrap().is_none());

    fs::remove_dir(&blocker).unwrap();
    store.insert_user(User::new("ghost", "hash")).await.unwrap();
    assert!(store.find_user("ghost").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn test_failed_loan_write_keeps_files_consistent() {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::open(temp.path()).unwrap();
    store.insert_user(User::new("reader", "hash")).await.unwrap();
    fs::create_dir(temp.path().join("users.json.tmp")).unwrap();

    assert!(store.record_loan(loan("reader", "Dune")).await.is_err());

    assert!(store.find_borrow_record("Dune").await.unwrap().is_none());
    let user = store.find_user("reader").await.unwrap().unwrap();
    assert!(user.borrowed_books.is_empty());
    assert!(user.past_books.is_empty());

    let on_disk: Vec<BorrowRecord> = read_collection(temp.path(), Collection::BorrowedBooks).unwrap();
    assert!(on_disk.is_empty());
  }
}
