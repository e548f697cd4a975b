// ============================
// authgate-backend-lib/src/router.rs
// ============================
//! HTTP router.
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{index, session_auth, users};
use crate::middleware::auth_gate;
use crate::AppState;

/// Create the API router. The request gate wraps every route, including the
/// not-found fallback, and sees the full request path.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/status", get(index::status))
        .route("/stats", get(index::stats))
        .route("/unauthorized", get(index::unauthorized))
        .route("/forbidden", get(index::forbidden))
        .route("/users", get(users::view_all_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            get(users::view_one_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/auth_session/login", post(session_auth::login))
        .route("/auth_session/logout", delete(session_auth::logout));

    Router::new()
        .nest("/api/v1", api)
        .fallback(index::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
