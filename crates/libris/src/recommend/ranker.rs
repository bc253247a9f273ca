//! Similarity ranking over a built feature set

use std::collections::HashSet;

use super::features::FeatureSet;
use super::{Basis, RecommendationItem, POPULAR_REASON};
use crate::models::Book;

/// Mean cosine similarity of every catalog row against the history rows.
/// Indexed by catalog row.
pub fn average_similarity(features: &FeatureSet<'_>) -> Vec<f64> {
  let rows = features.matrix.rows();
  let history_count = features.history_rows.len();
  if history_count == 0 {
    return vec![0.0; rows.len()];
  }

  let mut totals = vec![0.0; rows.len()];
  for &history_index in &features.history_rows {
    let Some(history_row) = features.matrix.row(history_index) else {
      continue;
    };
    for row in rows {
      totals[row.index] += history_row.vector.cosine(&row.vector);
    }
  }

  totals.into_iter().map(|total| total / history_count as f64).collect()
}

/// Top `count` books by average similarity, excluding anything already read
pub fn rank(features: &FeatureSet<'_>, count: usize) -> Vec<RecommendationItem> {
  let scores = average_similarity(features);

  let mut candidates: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
  // sort_by is stable, so equal scores keep catalog order
  candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

  let read: HashSet<&str> = features.valid_history.iter().map(String::as_str).collect();
  let mut emitted: HashSet<&str> = HashSet::new();
  let mut items = Vec::with_capacity(count);

  for (index, similarity) in candidates {
    if items.len() >= count {
      break;
    }
    let Some(row) = features.matrix.row(index) else {
      continue;
    };
    let name = row.book.name.as_str();
    if read.contains(name) || !emitted.insert(name) {
      continue;
    }

    items.push(RecommendationItem::from_book(row.book, Basis::Similarity { similarity }));
  }

  items
}

/// Map popular books to fallback items
pub fn popularity_items(books: Vec<Book>) -> Vec<RecommendationItem> {
  books
    .iter()
    .map(|book| {
      RecommendationItem::from_book(book, Basis::Fallback { reason: POPULAR_REASON.to_string() })
    })
    .collect()
}
