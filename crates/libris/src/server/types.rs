//! REST API types with schemars annotations for OpenAPI generation

use axum::{http::StatusCode, response::Json as ResponseJson};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::LoginOutcome;
use crate::circulation::{BatchResult, BookStatus};
use crate::error::LibraryError;
use crate::models::Book;
use crate::recommend::{RecommendationItem, Recommendations};

// Base Response Structure
// ======================

/// Base response object for all API endpoints
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BaseResponse<T> {
  /// API versioning information
  pub versioning: VersionInfo,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Optional error information
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Response data (generic for different endpoint types)
  #[serde(flatten)]
  pub data: T,
}

/// API versioning information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionInfo {
  /// The latest version of the API
  pub latest: String,

  /// The version of the API requested by the client
  pub requested: String,

  /// The version of the API that was used in producing the response
  pub resolved: String,
}

/// API error information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
  /// Error key, unique to the error source
  pub key: String,

  /// Human readable error message
  pub message: String,

  /// Additional error context
  #[serde(default)]
  pub context: serde_json::Value,
}

/// Error half of every handler result
pub type HandlerError = (StatusCode, ResponseJson<BaseResponse<()>>);

/// Handler result wrapping `T` in the response envelope
pub type HandlerResult<T> = Result<ResponseJson<BaseResponse<T>>, HandlerError>;

// Status/Version Endpoints
// =======================

/// Response for /status endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  pub status: String,
  /// Directory holding the JSON collections
  pub data_dir: String,
  pub version: String,
}

/// Response for /version endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  /// Current API version
  pub version: String,
}

// Logs Endpoint
// =============

/// Response for /logs endpoint
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogsResponse {
  /// JSON log entries
  pub logs: Vec<LogEntry>,
}

/// Individual log entry (re-exported from bentley)
pub type LogEntry = bentley::daemon_logs::LogEntry;

// Book Endpoints
// ==============

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BooksResponse {
  pub books: Vec<Book>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BookResponse {
  #[serde(flatten)]
  pub book: Book,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BooksWithStatusResponse {
  pub books: Vec<BookStatus>,
}

/// Entry of the /get-popular-books list
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PopularBook {
  pub name: String,
  pub author: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub average_rating: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PopularBooksResponse {
  pub books: Vec<PopularBook>,
}

// User Endpoints
// ==============

/// Response for /get-users; never includes password hashes
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UsersResponse {
  pub users: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CredentialsRequest {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LoginResponse {
  pub message: String,
  #[serde(flatten)]
  pub login: LoginOutcome,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RegisterResponse {
  pub message: String,
  pub id: String,
  pub username: String,
}

// Circulation Endpoints
// =====================

/// Request for /borrow-book and /return-book
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LoanRequest {
  pub username: String,
  pub book_name: String,
}

/// Request for /borrow-books
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BatchBorrowRequest {
  pub username: String,
  #[serde(alias = "bookNames")]
  pub book_names: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
  pub message: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BatchBorrowResponse {
  pub message: String,
  pub results: Vec<BatchResult>,
}

// Recommendations Endpoint
// ========================

/// Query parameters for /recommendations/{username}
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationsQuery {
  pub count: Option<usize>,
}

/// Response for /recommendations/{username}
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationsResponse {
  /// "personalized", "popular" or "none"
  pub basis: String,

  /// Why the fallback or empty outcome was chosen
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,

  pub recommendations: Vec<RecommendationItem>,
}

impl From<Recommendations> for RecommendationsResponse {
  fn from(outcome: Recommendations) -> Self {
    Self {
      basis: outcome.basis().to_string(),
      reason: outcome.reason(),
      recommendations: outcome.into_items(),
    }
  }
}

// Helper Functions
// ================

impl<T> BaseResponse<T> {
  /// Create a successful response
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    let version = env!("CARGO_PKG_VERSION");
    Self {
      versioning: VersionInfo {
        latest: version.to_string(),
        requested: version.to_string(),
        resolved: version.to_string(),
      },
      transaction_id,
      errors: Vec::new(),
      data,
    }
  }

  /// Create an error response
  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { errors, ..BaseResponse::success((), transaction_id) }
  }
}

impl ApiError {
  /// Create a new API error
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string(), context: serde_json::Value::Null }
  }
}

/// Status code and error key for a library error
pub fn classify(error: &LibraryError) -> (StatusCode, &'static str) {
  match error {
    LibraryError::UserNotFound(_) => (StatusCode::NOT_FOUND, "user_not_found"),
    LibraryError::BookNotFound(_) => (StatusCode::NOT_FOUND, "book_not_found"),
    LibraryError::UserExists(_) => (StatusCode::CONFLICT, "user_exists"),
    LibraryError::AlreadyBorrowed(_) => (StatusCode::CONFLICT, "already_borrowed"),
    LibraryError::NotBorrowedByUser { .. } => (StatusCode::BAD_REQUEST, "not_borrowed_by_user"),
    LibraryError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
    LibraryError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "store_timeout"),
    LibraryError::Io(_)
    | LibraryError::Serialization(_)
    | LibraryError::PasswordHash(_)
    | LibraryError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
  }
}

/// Build the error half of a handler result
pub fn error_response(error: &LibraryError, transaction_id: Uuid) -> HandlerError {
  let (status, key) = classify(error);
  let error = ApiError::new(key, &error.to_string());
  (status, ResponseJson(BaseResponse::<()>::error(vec![error], transaction_id)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_envelope_flattens_data() {
    let response = BaseResponse::success(VersionResponse { version: "1.0".to_string() }, Uuid::nil());
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["version"], "1.0");
    assert!(json.get("errors").is_none());
    assert_eq!(json["versioning"]["latest"], env!("CARGO_PKG_VERSION"));
  }

  #[test]
  fn test_library_errors_map_to_status_codes() {
    let cases = [
      (LibraryError::UserNotFound("a".into()), StatusCode::NOT_FOUND),
      (LibraryError::UserExists("a".into()), StatusCode::CONFLICT),
      (LibraryError::InvalidCredentials, StatusCode::UNAUTHORIZED),
      (LibraryError::Store("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, status) in cases {
      let (code, ResponseJson(body)) = error_response(&error, Uuid::nil());
      assert_eq!(code, status);
      assert_eq!(body.errors[0].message, error.to_string());
    }
  }

  #[test]
  fn test_recommendations_response_from_empty_outcome() {
    let response = RecommendationsResponse::from(Recommendations::Empty(
      crate::recommend::EmptyReason::EmptyCatalog,
    ));

    assert_eq!(response.basis, "none");
    assert_eq!(response.reason.as_deref(), Some("empty_catalog"));
    assert!(response.recommendations.is_empty());
  }
}
