//! User endpoint handlers: listing, profiles, login and registration

use axum::{
  extract::{Extension, Json, Path, State},
  response::Json as ResponseJson,
};
use uuid::Uuid;

use crate::accounts;
use crate::server::middleware::RequestContext;
use crate::server::types::{
  error_response, BaseResponse, CredentialsRequest, HandlerResult, LoginResponse, RegisterResponse,
  UsersResponse,
};
use crate::server::AppState;
use crate::store::LibraryStore;

/// GET /get-users - Usernames of every member
pub async fn get_users(State(state): State<AppState>) -> HandlerResult<UsersResponse> {
  let transaction_id = Uuid::new_v4();

  match state.store.list_users().await {
    Ok(users) => {
      let users = users.into_iter().map(|user| user.username).collect();
      Ok(ResponseJson(BaseResponse::success(UsersResponse { users }, transaction_id)))
    }
    Err(e) => Err(error_response(&e, transaction_id)),
  }
}

/// GET /get-user/{username} - Profile with borrowed and past books
pub async fn get_user(
  State(state): State<AppState>,
  Path(username): Path<String>,
) -> HandlerResult<accounts::UserProfile> {
  let transaction_id = Uuid::new_v4();

  match accounts::profile(state.store.as_ref(), &username).await {
    Ok(profile) => Ok(ResponseJson(BaseResponse::success(profile, transaction_id))),
    Err(e) => Err(error_response(&e, transaction_id)),
  }
}

/// POST /login - Verify credentials
pub async fn login(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<CredentialsRequest>,
) -> HandlerResult<LoginResponse> {
  let transaction_id = Uuid::new_v4();

  match accounts::login(state.store.as_ref(), &request.username, &request.password).await {
    Ok(login) => {
      context.log_success(&format!("User '{}' logged in", login.username), "users-api").await;
      let response = LoginResponse { message: "Login successful".to_string(), login };
      Ok(ResponseJson(BaseResponse::success(response, transaction_id)))
    }
    Err(e) => {
      context.log_warn(&format!("Login failed for '{}': {e}", request.username), "users-api").await;
      Err(error_response(&e, transaction_id))
    }
  }
}

/// POST /register-user - Create a member account
pub async fn register(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<CredentialsRequest>,
) -> HandlerResult<RegisterResponse> {
  let transaction_id = Uuid::new_v4();

  match accounts::register(state.store.as_ref(), &request.username, &request.password).await {
    Ok(id) => {
      context.log_success(&format!("Registered user '{}'", request.username), "users-api").await;
      let response = RegisterResponse {
        message: "User created".to_string(),
        id,
        username: request.username,
      };
      Ok(ResponseJson(BaseResponse::success(response, transaction_id)))
    }
    Err(e) => {
      context.log_warn(&format!("Registration failed: {e}"), "users-api").await;
      Err(error_response(&e, transaction_id))
    }
  }
}
