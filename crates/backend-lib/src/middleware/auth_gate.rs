// ============================
// crates/backend-lib/src/middleware/auth_gate.rs
// ============================
//! Request gate run before every route.
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::counter;
use tracing::debug;

use crate::metrics::GATE_REJECTED;
use crate::models::User;
use crate::{error::AppError, AppState};

/// The authenticated user, attached to the request extensions by the gate
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Let the request through, or reject it with 401 when it carries no
/// credential and 403 when the credential resolves to nobody.
pub async fn auth_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(auth) = state.auth.as_ref() else {
        return Ok(next.run(request).await);
    };

    let path = request.uri().path();
    if !auth.require_auth(path, &state.settings.excluded_paths) {
        return Ok(next.run(request).await);
    }

    let headers = request.headers();
    if auth.authorization_header(headers).is_none() && auth.session_cookie(headers).is_none() {
        counter!(GATE_REJECTED, "reason" => "unauthorized").increment(1);
        debug!(path, "no credentials presented");
        return Err(AppError::Unauthorized);
    }

    let Some(user) = auth.current_user(headers).await else {
        counter!(GATE_REJECTED, "reason" => "forbidden").increment(1);
        debug!(path, "credentials did not resolve to a user");
        return Err(AppError::Forbidden);
    };

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
