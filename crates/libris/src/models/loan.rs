use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An open loan in the borrowed_books collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BorrowRecord {
  #[serde(rename = "userID")]
  pub user_id: String,
  pub book_name: String,
  pub borrowing_date: DateTime<Utc>,
  pub due_date: DateTime<Utc>,
}

/// The copy of an open loan kept on the borrowing user's document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BorrowedEntry {
  pub book_name: String,
  pub borrowing_date: DateTime<Utc>,
  pub due_date: DateTime<Utc>,
}

impl From<&BorrowRecord> for BorrowedEntry {
  fn from(record: &BorrowRecord) -> Self {
    Self {
      book_name: record.book_name.clone(),
      borrowing_date: record.borrowing_date,
      due_date: record.due_date,
    }
  }
}
