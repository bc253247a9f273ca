//! Feature building: catalog text to TF-IDF vectors
//!
//! Every book becomes one row of a sparse term-weight matrix. Rows carry
//! their catalog index and a reference to their book, so scoring never
//! depends on two separately held lists staying aligned.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::stop_words::is_stop_word;
use crate::models::Book;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// Build the normalized feature text of a book: name, author, genre and
/// description with punctuation removed, lowercased
pub fn feature_text(book: &Book) -> String {
  let raw = format!(
    "{} {} {} {}",
    book.name,
    book.author,
    book.genre.as_deref().unwrap_or(""),
    book.description
  );
  NON_WORD.replace_all(&raw, "").to_lowercase()
}

/// Unigrams and bigrams of a feature text. Tokens are runs of two or more
/// word characters; stop words are removed before bigrams are formed.
pub fn extract_terms(text: &str) -> Vec<String> {
  let tokens: Vec<&str> = text
    .split_whitespace()
    .filter(|token| token.chars().count() >= 2)
    .filter(|token| !is_stop_word(token))
    .collect();

  let mut terms: Vec<String> = tokens.iter().map(|token| token.to_string()).collect();
  terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
  terms
}

/// Sparse vector of (column, weight) pairs sorted by column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
  entries: Vec<(usize, f64)>,
}

impl SparseVector {
  fn from_unsorted(mut entries: Vec<(usize, f64)>) -> Self {
    entries.sort_by_key(|(column, _)| *column);
    Self { entries }
  }

  pub fn entries(&self) -> &[(usize, f64)] {
    &self.entries
  }

  pub fn is_zero(&self) -> bool {
    self.entries.iter().all(|(_, weight)| *weight == 0.0)
  }

  pub fn norm(&self) -> f64 {
    self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
  }

  fn normalize(&mut self) {
    let norm = self.norm();
    if norm > 0.0 {
      for (_, weight) in &mut self.entries {
        *weight /= norm;
      }
    }
  }

  pub fn dot(&self, other: &SparseVector) -> f64 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < self.entries.len() && j < other.entries.len() {
      let (a_col, a_w) = self.entries[i];
      let (b_col, b_w) = other.entries[j];
      match a_col.cmp(&b_col) {
        std::cmp::Ordering::Less => i += 1,
        std::cmp::Ordering::Greater => j += 1,
        std::cmp::Ordering::Equal => {
          sum += a_w * b_w;
          i += 1;
          j += 1;
        }
      }
    }
    sum
  }

  /// Cosine similarity; a zero vector is dissimilar to everything
  pub fn cosine(&self, other: &SparseVector) -> f64 {
    let magnitude_a = self.norm();
    let magnitude_b = other.norm();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
      0.0
    } else {
      self.dot(other) / (magnitude_a * magnitude_b)
    }
  }
}

/// One matrix row, bound to the catalog entry it was built from
#[derive(Debug, Clone)]
pub struct CatalogRow<'a> {
  pub index: usize,
  pub book: &'a Book,
  pub vector: SparseVector,
}

/// TF-IDF matrix over a catalog, one row per book in catalog order
#[derive(Debug, Clone)]
pub struct TermMatrix<'a> {
  rows: Vec<CatalogRow<'a>>,
  vocabulary: Vec<String>,
}

impl<'a> TermMatrix<'a> {
  /// Fit the vocabulary and weights over the whole catalog.
  ///
  /// Weight = raw term count * (ln((1 + n) / (1 + df)) + 1), each row then
  /// scaled to unit length.
  pub fn build(catalog: &'a [Book]) -> Self {
    let documents: Vec<Vec<String>> =
      catalog.iter().map(|book| extract_terms(&feature_text(book))).collect();

    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for terms in &documents {
      let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
      for term in unique {
        *document_frequency.entry(term).or_insert(0) += 1;
      }
    }

    // BTreeMap iteration gives lexicographically sorted columns
    let vocabulary: Vec<String> = document_frequency.keys().map(|t| t.to_string()).collect();
    let columns: HashMap<&str, usize> =
      document_frequency.keys().enumerate().map(|(column, term)| (*term, column)).collect();

    let n = catalog.len() as f64;
    let idf: Vec<f64> = document_frequency
      .values()
      .map(|df| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
      .collect();

    let rows = catalog
      .iter()
      .zip(&documents)
      .enumerate()
      .map(|(index, (book, terms))| {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in terms {
          *counts.entry(columns[term.as_str()]).or_insert(0.0) += 1.0;
        }

        let mut vector = SparseVector::from_unsorted(
          counts.into_iter().map(|(column, tf)| (column, tf * idf[column])).collect(),
        );
        vector.normalize();

        CatalogRow { index, book, vector }
      })
      .collect();

    Self { rows, vocabulary }
  }

  pub fn rows(&self) -> &[CatalogRow<'a>] {
    &self.rows
  }

  pub fn row(&self, index: usize) -> Option<&CatalogRow<'a>> {
    self.rows.get(index)
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn vocabulary(&self) -> &[String] {
    &self.vocabulary
  }
}

/// Everything the ranker needs for one request
#[derive(Debug, Clone)]
pub struct FeatureSet<'a> {
  pub matrix: TermMatrix<'a>,
  /// History entries found in the catalog, in history order
  pub valid_history: Vec<String>,
  /// Catalog rows whose book name is in the valid history
  pub history_rows: Vec<usize>,
}

/// Result of feature building
#[derive(Debug, Clone)]
pub enum Features<'a> {
  Ready(FeatureSet<'a>),
  EmptyCatalog,
  NoValidHistory,
}

/// Keep the history entries that exactly match a catalog book name.
/// Unknown entries are dropped with a warning.
pub fn validate_history(catalog: &[Book], history: &[String]) -> Vec<String> {
  let inventory: HashSet<&str> = catalog.iter().map(|book| book.name.as_str()).collect();

  history
    .iter()
    .filter(|name| {
      let known = inventory.contains(name.as_str());
      if !known {
        bentley::warn!("Past book '{}' not found in inventory", name);
      }
      known
    })
    .cloned()
    .collect()
}

/// Validate the history and build the term matrix for a catalog
pub fn build_features<'a>(catalog: &'a [Book], history: &[String]) -> Features<'a> {
  if catalog.is_empty() {
    return Features::EmptyCatalog;
  }

  let valid_history = validate_history(catalog, history);
  if valid_history.is_empty() {
    return Features::NoValidHistory;
  }

  let matrix = TermMatrix::build(catalog);
  let valid: HashSet<&str> = valid_history.iter().map(String::as_str).collect();
  let history_rows: Vec<usize> = matrix
    .rows()
    .iter()
    .filter(|row| valid.contains(row.book.name.as_str()))
    .map(|row| row.index)
    .collect();

  if history_rows.is_empty() {
    return Features::NoValidHistory;
  }

  Features::Ready(FeatureSet { matrix, valid_history, history_rows })
}
