//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{get, post},
  Router,
};

use super::handlers::{books, circulation, logs, recommendations, status, users};
use super::middleware::request_context_middleware;
use super::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  Router::new()
    // Status and version endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    .route("/logs", get(logs::get_logs))
    // Catalog
    .route("/get-books", get(books::get_books))
    .route("/get-book/{name}", get(books::get_book))
    .route("/get-books-with-status", get(books::get_books_with_status))
    .route("/get-popular-books", get(books::get_popular_books))
    // Users; both login and both registration paths are used by the front-end
    .route("/get-users", get(users::get_users))
    .route("/get-user/{username}", get(users::get_user))
    .route("/login", post(users::login))
    .route("/login-user", post(users::login))
    .route("/register-user", post(users::register))
    .route("/create-user", post(users::register))
    // Circulation
    .route("/borrow-book", post(circulation::borrow_book))
    .route("/borrow-books", post(circulation::borrow_books))
    .route("/return-book", post(circulation::return_book))
    // Recommendations
    .route("/recommendations/{username}", get(recommendations::get_recommendations))
    .layer(middleware::from_fn_with_state(state.clone(), request_context_middleware))
    .with_state(state)
}
