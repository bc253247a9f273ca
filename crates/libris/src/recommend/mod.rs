//! Content-based book recommendations
//!
//! A reader's borrowing history is compared against the whole catalog using
//! TF-IDF vectors over each book's name, author, genre and description.
//! Readers without a usable history get the most popular books instead.
//!
//! [`Recommender::recommend`] never fails: every outcome, including store
//! failures, is reported through [`Recommendations`].

pub mod features;
pub mod ranker;
pub mod stop_words;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DEFAULT_FETCH_TIMEOUT_MS;
use crate::error::{LibraryError, Result};
use crate::models::Book;
use crate::store::CatalogSource;
use features::{build_features, Features};

/// Reason attached to every popularity fallback item
pub const POPULAR_REASON: &str = "Popular";

/// Why a recommended book was picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Basis {
  Similarity { similarity: f64 },
  Fallback { reason: String },
}

/// One recommended book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationItem {
  pub name: String,
  pub author: String,
  pub genre: String,
  #[serde(flatten)]
  pub basis: Basis,
}

impl RecommendationItem {
  pub fn from_book(book: &Book, basis: Basis) -> Self {
    Self {
      name: book.name.clone(),
      author: book.author.clone(),
      genre: book.genre_or_unknown().to_string(),
      basis,
    }
  }

  pub fn similarity(&self) -> Option<f64> {
    match self.basis {
      Basis::Similarity { similarity } => Some(similarity),
      Basis::Fallback { .. } => None,
    }
  }
}

/// Why the popularity fallback was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
  UnknownUser,
  NoHistory,
  NoValidHistory,
}

impl fmt::Display for FallbackReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FallbackReason::UnknownUser => write!(f, "unknown_user"),
      FallbackReason::NoHistory => write!(f, "no_history"),
      FallbackReason::NoValidHistory => write!(f, "no_valid_history"),
    }
  }
}

/// Why nothing could be recommended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
  EmptyCatalog,
  Failed(String),
}

impl fmt::Display for EmptyReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EmptyReason::EmptyCatalog => write!(f, "empty_catalog"),
      EmptyReason::Failed(message) => write!(f, "failed: {message}"),
    }
  }
}

/// Outcome of a recommendation request
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendations {
  Personalized(Vec<RecommendationItem>),
  Popular { reason: FallbackReason, items: Vec<RecommendationItem> },
  Empty(EmptyReason),
}

impl Recommendations {
  /// Short label of the path that produced the items
  pub fn basis(&self) -> &'static str {
    match self {
      Recommendations::Personalized(_) => "personalized",
      Recommendations::Popular { .. } => "popular",
      Recommendations::Empty(_) => "none",
    }
  }

  pub fn reason(&self) -> Option<String> {
    match self {
      Recommendations::Personalized(_) => None,
      Recommendations::Popular { reason, .. } => Some(reason.to_string()),
      Recommendations::Empty(reason) => Some(reason.to_string()),
    }
  }

  pub fn items(&self) -> &[RecommendationItem] {
    match self {
      Recommendations::Personalized(items) | Recommendations::Popular { items, .. } => {
        items.as_slice()
      }
      Recommendations::Empty(_) => &[],
    }
  }

  pub fn into_items(self) -> Vec<RecommendationItem> {
    match self {
      Recommendations::Personalized(items) | Recommendations::Popular { items, .. } => items,
      Recommendations::Empty(_) => Vec::new(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.items().is_empty()
  }
}

/// Recommendation engine over an injected catalog source
pub struct Recommender {
  source: Arc<dyn CatalogSource>,
  fetch_timeout: Option<Duration>,
}

impl Recommender {
  pub fn new(source: Arc<dyn CatalogSource>) -> Self {
    Self { source, fetch_timeout: Some(Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS)) }
  }

  /// Deadline for each store fetch; `None` waits indefinitely
  pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.fetch_timeout = timeout;
    self
  }

  /// Recommend up to `count` books for `username`
  pub async fn recommend(&self, username: &str, count: usize) -> Recommendations {
    let history = match self.fetch(self.source.fetch_user_history(username)).await {
      Ok(history) => history,
      Err(e) => return failed("fetch user history", e),
    };

    let history = match history {
      None => {
        bentley::info!("User '{}' not found, falling back to popular books", username);
        return self.fallback(FallbackReason::UnknownUser, count).await;
      }
      Some(history) if history.is_empty() => {
        bentley::info!("User '{}' has no borrowing history, falling back to popular books", username);
        return self.fallback(FallbackReason::NoHistory, count).await;
      }
      Some(history) => history,
    };

    let catalog = match self.fetch(self.source.fetch_catalog()).await {
      Ok(catalog) => catalog,
      Err(e) => return failed("fetch catalog", e),
    };

    match build_features(&catalog, &history) {
      Features::EmptyCatalog => {
        bentley::warn!("Inventory is empty, nothing to recommend");
        Recommendations::Empty(EmptyReason::EmptyCatalog)
      }
      Features::NoValidHistory => {
        bentley::warn!("No valid past books for '{}', falling back to popular books", username);
        self.fallback(FallbackReason::NoValidHistory, count).await
      }
      Features::Ready(features) => Recommendations::Personalized(ranker::rank(&features, count)),
    }
  }

  /// The `count` highest rated books as fallback items
  pub async fn popularity_fallback(&self, count: usize) -> Result<Vec<RecommendationItem>> {
    let books = self.fetch(self.source.popular_books(count)).await?;
    Ok(ranker::popularity_items(books))
  }

  async fn fallback(&self, reason: FallbackReason, count: usize) -> Recommendations {
    match self.popularity_fallback(count).await {
      Ok(items) => Recommendations::Popular { reason, items },
      Err(e) => failed("fetch popular books", e),
    }
  }

  async fn fetch<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
    match self.fetch_timeout {
      Some(deadline) => tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| LibraryError::Timeout(deadline.as_millis()))?,
      None => operation.await,
    }
  }
}

fn failed(step: &str, error: LibraryError) -> Recommendations {
  bentley::error!("Failed to {}: {}", step, error);
  Recommendations::Empty(EmptyReason::Failed(error.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MockCatalogSource;
  use async_trait::async_trait;

  fn catalog() -> Vec<Book> {
    vec![
      Book::new("A", "X", Some("SciFi"), "space travel robots").with_rating(3.0),
      Book::new("B", "Y", Some("SciFi"), "space robots and aliens").with_rating(4.0),
      Book::new("C", "Z", Some("Romance"), "love story in Paris").with_rating(5.0),
    ]
  }

  fn popular(limit: usize) -> Vec<Book> {
    let mut books = catalog();
    crate::store::sort_by_rating(&mut books);
    books.truncate(limit);
    books
  }

  fn source_with_history(history: Option<Vec<&'static str>>) -> MockCatalogSource {
    let mut source = MockCatalogSource::new();
    source.expect_fetch_user_history().returning(move |_| {
      Ok(history.as_ref().map(|names| names.iter().map(|n| n.to_string()).collect()))
    });
    source.expect_fetch_catalog().returning(|| Ok(catalog()));
    source.expect_popular_books().returning(|limit| Ok(popular(limit)));
    source
  }

  fn names(recommendations: &Recommendations) -> Vec<&str> {
    recommendations.items().iter().map(|item| item.name.as_str()).collect()
  }

  #[tokio::test]
  async fn test_personalized_recommendations() {
    let recommender = Recommender::new(Arc::new(source_with_history(Some(vec!["A"]))));

    let result = recommender.recommend("alice", 5).await;

    assert_eq!(result.basis(), "personalized");
    assert_eq!(result.reason(), None);
    assert_eq!(names(&result), vec!["B", "C"]);
  }

  #[tokio::test]
  async fn test_unknown_user_gets_popular_books() {
    let recommender = Recommender::new(Arc::new(source_with_history(None)));

    let result = recommender.recommend("ghost", 2).await;

    assert!(matches!(result, Recommendations::Popular { reason: FallbackReason::UnknownUser, .. }));
    assert_eq!(names(&result), vec!["C", "B"]);
    assert!(result.items().iter().all(|item| item.similarity().is_none()));
  }

  #[tokio::test]
  async fn test_empty_and_invalid_history_match_the_fallback() {
    let empty = Recommender::new(Arc::new(source_with_history(Some(vec![]))));
    let invalid = Recommender::new(Arc::new(source_with_history(Some(vec!["Z"]))));

    let from_empty = empty.recommend("bob", 3).await;
    let from_invalid = invalid.recommend("carol", 3).await;
    let fallback = empty.popularity_fallback(3).await.unwrap();

    assert_eq!(from_empty.reason().as_deref(), Some("no_history"));
    assert_eq!(from_invalid.reason().as_deref(), Some("no_valid_history"));
    assert_eq!(from_empty.items(), fallback.as_slice());
    assert_eq!(from_invalid.into_items(), fallback);
  }

  #[tokio::test]
  async fn test_empty_catalog_yields_empty_outcome() {
    let mut source = MockCatalogSource::new();
    source.expect_fetch_user_history().returning(|_| Ok(Some(vec!["A".to_string()])));
    source.expect_fetch_catalog().returning(|| Ok(Vec::new()));
    source.expect_popular_books().never();

    let result = Recommender::new(Arc::new(source)).recommend("alice", 5).await;

    assert_eq!(result, Recommendations::Empty(EmptyReason::EmptyCatalog));
    assert!(result.is_empty());
  }

  #[tokio::test]
  async fn test_store_failure_is_reported_not_raised() {
    let mut source = MockCatalogSource::new();
    source.expect_fetch_user_history().returning(|_| Ok(Some(vec!["A".to_string()])));
    source
      .expect_fetch_catalog()
      .returning(|| Err(LibraryError::Store("connection refused".to_string())));

    let result = Recommender::new(Arc::new(source)).recommend("alice", 5).await;

    let Recommendations::Empty(EmptyReason::Failed(message)) = &result else {
      panic!("expected failure outcome, got {result:?}");
    };
    assert!(message.contains("connection refused"));
    assert_eq!(result.basis(), "none");
  }

  #[tokio::test]
  async fn test_fallback_failure_is_reported_not_raised() {
    let mut source = MockCatalogSource::new();
    source.expect_fetch_user_history().returning(|_| Ok(None));
    source
      .expect_popular_books()
      .returning(|_| Err(LibraryError::Store("disk gone".to_string())));

    let result = Recommender::new(Arc::new(source)).recommend("ghost", 5).await;

    assert!(matches!(result, Recommendations::Empty(EmptyReason::Failed(_))));
  }

  struct SlowSource;

  #[async_trait]
  impl CatalogSource for SlowSource {
    async fn fetch_catalog(&self) -> Result<Vec<Book>> {
      Ok(catalog())
    }

    async fn fetch_user_history(&self, _username: &str) -> Result<Option<Vec<String>>> {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Ok(Some(vec!["A".to_string()]))
    }

    async fn popular_books(&self, limit: usize) -> Result<Vec<Book>> {
      Ok(popular(limit))
    }
  }

  #[tokio::test]
  async fn test_fetch_timeout_yields_failed_outcome() {
    let recommender =
      Recommender::new(Arc::new(SlowSource)).with_fetch_timeout(Some(Duration::from_millis(20)));

    let result = recommender.recommend("alice", 5).await;

    assert_eq!(result, Recommendations::Empty(EmptyReason::Failed(LibraryError::Timeout(20).to_string())));
  }

  #[test]
  fn test_items_serialize_with_flattened_basis() {
    let book = Book::new("Dune", "Herbert", None, "");
    let personalized = RecommendationItem::from_book(&book, Basis::Similarity { similarity: 0.5 });
    let popular =
      RecommendationItem::from_book(&book, Basis::Fallback { reason: POPULAR_REASON.to_string() });

    assert_eq!(
      serde_json::to_value(&personalized).unwrap(),
      serde_json::json!({"name": "Dune", "author": "Herbert", "genre": "Unknown", "similarity": 0.5})
    );
    assert_eq!(serde_json::to_value(&popular).unwrap()["reason"], "Popular");
  }
}
