// ============================
// crates/backend-lib/src/handlers/session_auth.rs
// ============================
//! Login and logout for the session strategies.
use std::sync::Arc;

use authgate_common::{LoginForm, UserJson};
use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{json, Value};

use crate::storage::Entity;
use crate::{error::AppError, AppState};

/// POST /api/v1/auth_session/login
///
/// Checks the form credentials, opens a session with the active strategy
/// and hands its id back as a cookie.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<(CookieJar, Json<UserJson>), AppError> {
    let form = form.map(|Form(form)| form).unwrap_or_default();

    let email = form
        .email
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidInput("email missing".to_string()))?;
    let password = form
        .password
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidInput("password missing".to_string()))?;

    let users = state.users.search(&[("email", json!(email))]).await;
    let user = users.into_iter().next().ok_or(AppError::UnknownEmail)?;
    if !user.is_valid_password(&password) {
        return Err(AppError::WrongPassword);
    }

    let auth = state.auth.as_ref().ok_or(AppError::NotFound)?;
    let session_id = auth
        .create_session(user.id())
        .await?
        .ok_or(AppError::NotFound)?;

    let cookie = Cookie::build((auth.session_name().to_string(), session_id)).path("/");
    Ok((jar.add(cookie), Json(user.to_json())))
}

/// DELETE /api/v1/auth_session/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let auth = state.auth.as_ref().ok_or(AppError::NotFound)?;
    if !auth.destroy_session(&headers).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({})))
}
