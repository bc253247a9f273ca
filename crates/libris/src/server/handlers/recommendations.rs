//! Recommendation endpoint handler

use axum::{
  extract::{Extension, Path, Query, State},
  response::Json,
};
use uuid::Uuid;

use crate::recommend::Recommendations;
use crate::server::middleware::RequestContext;
use crate::server::types::{BaseResponse, RecommendationsQuery, RecommendationsResponse};
use crate::server::AppState;

/// GET /recommendations/{username}?count=N
///
/// Always answers 200: fallbacks and failures are described by `basis` and
/// `reason` instead of an error status.
pub async fn get_recommendations(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(username): Path<String>,
  Query(query): Query<RecommendationsQuery>,
) -> Json<BaseResponse<RecommendationsResponse>> {
  let transaction_id = Uuid::new_v4();
  let count = query.count.unwrap_or(state.default_count);

  let outcome = state.recommender.recommend(&username, count).await;
  match &outcome {
    Recommendations::Empty(reason) => {
      context.log_warn(&format!("No recommendations for '{username}': {reason}"), "recommend-api").await;
    }
    other => {
      context
        .log_info(
          &format!("{} {} recommendations for '{username}'", other.items().len(), other.basis()),
          "recommend-api",
        )
        .await;
    }
  }

  Json(BaseResponse::success(RecommendationsResponse::from(outcome), transaction_id))
}
