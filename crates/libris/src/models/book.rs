use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Genre shown for books stored without one
pub const UNKNOWN_GENRE: &str = "Unknown";

/// A book in the inventory collection, identified by its unique name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Book {
  /// Unique book name
  pub name: String,

  #[serde(default)]
  pub author: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub genre: Option<String>,

  #[serde(default)]
  pub description: String,

  /// Average reader rating; older documents store it as `rating`
  #[serde(default, alias = "rating", skip_serializing_if = "Option::is_none")]
  pub average_rating: Option<f64>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cover_filename: Option<String>,
}

impl Book {
  pub fn new(name: &str, author: &str, genre: Option<&str>, description: &str) -> Self {
    Self {
      name: name.to_string(),
      author: author.to_string(),
      genre: genre.map(str::to_string),
      description: description.to_string(),
      average_rating: None,
      cover_filename: None,
    }
  }

  pub fn with_rating(mut self, rating: f64) -> Self {
    self.average_rating = Some(rating);
    self
  }

  /// Genre for display, "Unknown" when the document has none
  pub fn genre_or_unknown(&self) -> &str {
    self.genre.as_deref().unwrap_or(UNKNOWN_GENRE)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_optional_fields_default() {
    let book: Book = serde_json::from_str(r#"{"name": "Dune"}"#).unwrap();

    assert_eq!(book.author, "");
    assert_eq!(book.description, "");
    assert_eq!(book.genre, None);
    assert_eq!(book.genre_or_unknown(), "Unknown");
    assert_eq!(book.average_rating, None);
  }

  #[test]
  fn test_legacy_rating_field_is_accepted() {
    let book: Book = serde_json::from_str(r#"{"name": "Dune", "rating": 4.5}"#).unwrap();
    assert_eq!(book.average_rating, Some(4.5));

    let json = serde_json::to_value(&book).unwrap();
    assert_eq!(json["average_rating"], 4.5);
    assert!(json.get("rating").is_none());
  }
}
