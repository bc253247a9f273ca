//! Catalog endpoint handlers

use axum::{
  extract::{Extension, Path, State},
  http::StatusCode,
  response::Json,
};
use uuid::Uuid;

use crate::circulation;
use crate::error::LibraryError;
use crate::server::middleware::RequestContext;
use crate::server::types::{
  error_response, ApiError, BaseResponse, BookResponse, BooksResponse, BooksWithStatusResponse,
  HandlerResult, PopularBook, PopularBooksResponse,
};
use crate::server::AppState;
use crate::store::{CatalogSource, LibraryStore};

/// Size of the /get-popular-books list
const POPULAR_LIMIT: usize = 5;

/// GET /get-books - Every book in the inventory
pub async fn get_books(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> HandlerResult<BooksResponse> {
  let transaction_id = Uuid::new_v4();

  match state.store.fetch_catalog().await {
    Ok(books) => Ok(Json(BaseResponse::success(BooksResponse { books }, transaction_id))),
    Err(e) => {
      context.log_error(&format!("Failed to list books: {e}"), "books-api").await;
      Err(error_response(&e, transaction_id))
    }
  }
}

/// GET /get-book/{name} - One book by name
pub async fn get_book(
  State(state): State<AppState>,
  Path(name): Path<String>,
) -> HandlerResult<BookResponse> {
  let transaction_id = Uuid::new_v4();

  match state.store.find_book(&name).await {
    Ok(Some(book)) => Ok(Json(BaseResponse::success(BookResponse { book }, transaction_id))),
    Ok(None) => Err(error_response(&LibraryError::BookNotFound(name), transaction_id)),
    Err(e) => Err(error_response(&e, transaction_id)),
  }
}

/// GET /get-books-with-status - Catalog with borrowed flags
pub async fn get_books_with_status(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> HandlerResult<BooksWithStatusResponse> {
  let transaction_id = Uuid::new_v4();

  match circulation::books_with_status(state.store.as_ref()).await {
    Ok(books) => Ok(Json(BaseResponse::success(BooksWithStatusResponse { books }, transaction_id))),
    Err(e) => {
      context.log_error(&format!("Failed to build book status: {e}"), "books-api").await;
      Err(error_response(&e, transaction_id))
    }
  }
}

/// GET /get-popular-books - Highest rated books
pub async fn get_popular_books(State(state): State<AppState>) -> HandlerResult<PopularBooksResponse> {
  let transaction_id = Uuid::new_v4();

  match state.store.popular_books(POPULAR_LIMIT).await {
    Ok(books) => {
      let books = books
        .into_iter()
        .map(|book| PopularBook {
          author: if book.author.is_empty() { "Unknown".to_string() } else { book.author },
          name: book.name,
          average_rating: book.average_rating,
        })
        .collect();
      Ok(Json(BaseResponse::success(PopularBooksResponse { books }, transaction_id)))
    }
    Err(e) => {
      let error = ApiError::new("popular_books_failed", &e.to_string());
      Err((StatusCode::INTERNAL_SERVER_ERROR, Json(BaseResponse::<()>::error(vec![error], transaction_id))))
    }
  }
}
