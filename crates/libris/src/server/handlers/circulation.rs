//! Borrow and return endpoint handlers

use axum::{
  extract::{Extension, Json, State},
  response::Json as ResponseJson,
};
use uuid::Uuid;

use crate::circulation;
use crate::server::middleware::RequestContext;
use crate::server::types::{
  error_response, BaseResponse, BatchBorrowRequest, BatchBorrowResponse, HandlerResult, LoanRequest,
  MessageResponse,
};
use crate::server::AppState;

/// POST /borrow-book - Lend one book
pub async fn borrow_book(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<LoanRequest>,
) -> HandlerResult<MessageResponse> {
  let transaction_id = Uuid::new_v4();

  match circulation::borrow_book(state.store.as_ref(), &request.username, &request.book_name, state.loan_days)
    .await
  {
    Ok(receipt) => {
      let message = receipt.message();
      context.log_success(&message, "circulation-api").await;
      Ok(ResponseJson(BaseResponse::success(MessageResponse { message }, transaction_id)))
    }
    Err(e) => {
      context.log_warn(&format!("Borrow failed: {e}"), "circulation-api").await;
      Err(error_response(&e, transaction_id))
    }
  }
}

/// POST /borrow-books - Lend several books, reporting each one
pub async fn borrow_books(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<BatchBorrowRequest>,
) -> HandlerResult<BatchBorrowResponse> {
  let transaction_id = Uuid::new_v4();

  let results =
    circulation::borrow_many(state.store.as_ref(), &request.username, &request.book_names, state.loan_days)
      .await;
  let borrowed = results.iter().filter(|result| result.success).count();

  context
    .log_info(&format!("Borrowed {borrowed} of {} books for '{}'", results.len(), request.username), "circulation-api")
    .await;

  let response = BatchBorrowResponse {
    message: format!("Borrowed {borrowed} of {} books", results.len()),
    results,
  };
  Ok(ResponseJson(BaseResponse::success(response, transaction_id)))
}

/// POST /return-book - Take back a book
pub async fn return_book(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<LoanRequest>,
) -> HandlerResult<MessageResponse> {
  let transaction_id = Uuid::new_v4();

  match circulation::return_book(state.store.as_ref(), &request.username, &request.book_name).await {
    Ok(message) => {
      context.log_success(&message, "circulation-api").await;
      Ok(ResponseJson(BaseResponse::success(MessageResponse { message }, transaction_id)))
    }
    Err(e) => {
      context.log_warn(&format!("Return failed: {e}"), "circulation-api").await;
      Err(error_response(&e, transaction_id))
    }
  }
}
