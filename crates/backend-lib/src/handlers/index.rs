//! Service status routes.
use std::sync::Arc;

use authgate_common::{StatsBody, StatusBody};
use axum::{extract::State, Json};

use crate::{error::AppError, AppState};

/// GET /api/v1/status
pub async fn status() -> Json<StatusBody> {
    Json(StatusBody {
        status: "OK".to_string(),
    })
}

/// GET /api/v1/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsBody> {
    Json(StatsBody {
        users: state.users.count().await,
    })
}

/// GET /api/v1/unauthorized, always 401
pub async fn unauthorized() -> AppError {
    AppError::Unauthorized
}

/// GET /api/v1/forbidden, always 403
pub async fn forbidden() -> AppError {
    AppError::Forbidden
}

/// Any route that does not exist
pub async fn not_found() -> AppError {
    AppError::NotFound
}
