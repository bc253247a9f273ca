//! Display formatting utilities for CLI output

use colored::*;

use crate::circulation::BookStatus;
use crate::recommend::{Basis, RecommendationItem};

/// Printed when an outcome carries no items
pub const NO_RECOMMENDATIONS: &str = "No recommendations could be generated";

/// Plain text lines of one ranked recommendation
pub fn recommendation_lines(rank: usize, item: &RecommendationItem) -> Vec<String> {
  let basis = match &item.basis {
    Basis::Similarity { similarity } => format!("Similarity: {similarity:.2}"),
    Basis::Fallback { .. } => "(Popular fallback recommendation)".to_string(),
  };

  vec![
    format!("{rank}. {} by {}", item.name, item.author),
    format!("   Genre: {}", item.genre),
    format!("   {basis}"),
  ]
}

pub fn print_recommendations(items: &[RecommendationItem]) {
  if items.is_empty() {
    println!("{}", NO_RECOMMENDATIONS.yellow());
    return;
  }

  for (i, item) in items.iter().enumerate() {
    let lines = recommendation_lines(i + 1, item);
    println!("{}", lines[0].bold());
    for line in &lines[1..] {
      println!("{}", line.dimmed());
    }
  }
}

/// One catalog row: name, author, genre and loan state
pub fn book_line(status: &BookStatus) -> String {
  let book = &status.book;
  let state = match &status.borrowed_by {
    Some(user) => format!("borrowed by {user}"),
    None => "available".to_string(),
  };
  format!("{} by {} [{}] ({state})", book.name, book.author, book.genre_or_unknown())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Book;

  #[test]
  fn test_similarity_lines() {
    let book = Book::new("Dune", "Frank Herbert", Some("SciFi"), "");
    let item = RecommendationItem::from_book(&book, Basis::Similarity { similarity: 0.4213 });

    assert_eq!(
      recommendation_lines(1, &item),
      vec!["1. Dune by Frank Herbert", "   Genre: SciFi", "   Similarity: 0.42"]
    );
  }

  #[test]
  fn test_fallback_lines() {
    let book = Book::new("Emma", "Jane Austen", None, "");
    let item = RecommendationItem::from_book(&book, Basis::Fallback { reason: "Popular".to_string() });

    let lines = recommendation_lines(3, &item);
    assert_eq!(lines[1], "   Genre: Unknown");
    assert_eq!(lines[2], "   (Popular fallback recommendation)");
  }

  #[test]
  fn test_book_line_shows_borrower() {
    let status = BookStatus {
      book: Book::new("Dune", "Frank Herbert", None, ""),
      borrowed: true,
      borrowed_by: Some("alice".to_string()),
    };
    assert_eq!(book_line(&status), "Dune by Frank Herbert [Unknown] (borrowed by alice)");
  }
}
