//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::auth;
use crate::state::AppState;

/// Both the short and the `/api/auth` prefixed paths are served
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/auth/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/auth/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/user", get(auth::current_user))
        .route("/api/auth/user", get(auth::current_user))
}
