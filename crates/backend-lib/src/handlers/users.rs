// ============================
// crates/backend-lib/src/handlers/users.rs
// ============================
//! User CRUD routes.
use std::sync::Arc;

use authgate_common::{CreateUserRequest, UserJson};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::middleware::CurrentUser;
use crate::models::{NewUser, User};
use crate::storage::Entity;
use crate::{error::AppError, AppState};

async fn get_user_by_id(state: &AppState, user_id: &str) -> Result<User, AppError> {
    state.users.get(user_id).await.ok_or(AppError::NotFound)
}

fn wrong_format() -> AppError {
    AppError::InvalidInput("Wrong format".to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// GET /api/v1/users
pub async fn view_all_users(State(state): State<Arc<AppState>>) -> Json<Vec<UserJson>> {
    let users = state.users.all().await;
    Json(users.iter().map(User::to_json).collect())
}

/// GET /api/v1/users/{user_id}; `me` is the authenticated user
pub async fn view_one_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    current_user: Option<Extension<CurrentUser>>,
) -> Result<Json<UserJson>, AppError> {
    if user_id == "me" {
        let Some(Extension(CurrentUser(user))) = current_user else {
            return Err(AppError::NotFound);
        };
        return Ok(Json(user.to_json()));
    }

    let user = get_user_by_id(&state, &user_id).await?;
    Ok(Json(user.to_json()))
}

/// DELETE /api/v1/users/{user_id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let user = get_user_by_id(&state, &user_id).await?;
    state.users.remove(&user).await?;
    info!(user_id = %user.id(), "user deleted");
    Ok(Json(json!({})))
}

/// POST /api/v1/users. The body must be a non-empty JSON object.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<(StatusCode, Json<UserJson>), AppError> {
    let Json(fields) = payload.map_err(|_| wrong_format())?;
    if fields.is_empty() {
        return Err(wrong_format());
    }
    let request: CreateUserRequest =
        serde_json::from_value(Value::Object(fields)).map_err(|_| wrong_format())?;

    let email = non_empty(request.email)
        .ok_or_else(|| AppError::InvalidInput("email missing".to_string()))?;
    let password = non_empty(request.password)
        .ok_or_else(|| AppError::InvalidInput("password missing".to_string()))?;

    let mut user = User::new(NewUser {
        email: Some(email),
        password: Some(password),
        first_name: request.first_name,
        last_name: request.last_name,
    })?;
    state.users.save(&mut user).await?;

    info!(user_id = %user.id(), "user created");
    Ok((StatusCode::CREATED, Json(user.to_json())))
}

/// PUT /api/v1/users/{user_id}. Only `first_name` and `last_name` change;
/// a key present with a non-string value clears that name.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<UserJson>, AppError> {
    let mut user = get_user_by_id(&state, &user_id).await?;

    let Json(changes) = payload.map_err(|_| wrong_format())?;
    if changes.is_empty() {
        return Err(wrong_format());
    }

    if let Some(first_name) = changes.get("first_name") {
        user.first_name = first_name.as_str().map(String::from);
    }
    if let Some(last_name) = changes.get("last_name") {
        user.last_name = last_name.as_str().map(String::from);
    }

    state.users.save(&mut user).await?;
    Ok(Json(user.to_json()))
}
