//! Logs endpoint handler

use axum::{extract::Extension, http::StatusCode, response::Json};
use uuid::Uuid;

use crate::server::{
  middleware::RequestContext,
  types::{ApiError, BaseResponse, HandlerResult, LogsResponse},
};

/// Entries returned by GET /logs
const LOG_LIMIT: usize = 100;

/// GET /logs - Most recent server log entries
pub async fn get_logs(Extension(context): Extension<RequestContext>) -> HandlerResult<LogsResponse> {
  let transaction_id = Uuid::new_v4();

  match context.logger.get_logs(Some(LOG_LIMIT), None).await {
    Ok(logs) => Ok(Json(BaseResponse::success(LogsResponse { logs }, transaction_id))),
    Err(e) => {
      context.log_error(&format!("Failed to read logs: {e}"), "logs-api").await;
      let error = ApiError::new("logs_read_failed", &format!("Failed to read logs: {e}"));
      Err((StatusCode::INTERNAL_SERVER_ERROR, Json(BaseResponse::<()>::error(vec![error], transaction_id))))
    }
  }
}
