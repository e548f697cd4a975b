// ============================
// authgate-backend-lib/src/auth/mod.rs
// ============================
//! Authentication strategies.
//!
//! Every strategy answers the same questions for the request gate: does this
//! path need authentication, and which user does this request belong to.
//! The active strategy is picked once at startup from [`Settings::auth_type`].

pub mod basic_auth;
pub mod no_auth;
pub mod password;
pub mod session_auth;
pub mod session_db_auth;
pub mod session_exp_auth;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use crate::config::{AuthType, Settings};
use crate::error::AppError;
use crate::models::{User, UserSession};
use crate::storage::ObjectStore;

pub use basic_auth::BasicAuth;
pub use no_auth::NoAuth;
pub use password::{hash_password, verify_password};
pub use session_auth::SessionAuth;
pub use session_db_auth::SessionDbAuth;
pub use session_exp_auth::SessionExpAuth;

#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Which configured strategy this is
    fn kind(&self) -> AuthType;

    /// Name of the session cookie
    fn session_name(&self) -> &str;

    /// Whether `path` needs an authenticated user
    fn require_auth(&self, path: &str, excluded_paths: &[String]) -> bool {
        path_requires_auth(path, excluded_paths)
    }

    /// Raw Authorization header; an empty value counts as absent
    fn authorization_header<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    }

    fn session_cookie(&self, headers: &HeaderMap) -> Option<String> {
        session_cookie(headers, self.session_name())
    }

    /// Resolve the user a request belongs to
    async fn current_user(&self, headers: &HeaderMap) -> Option<User>;

    /// Open a session for `user_id`; `None` when the strategy has no sessions
    async fn create_session(&self, _user_id: &str) -> Result<Option<String>, AppError> {
        Ok(None)
    }

    async fn user_id_for_session_id(&self, _session_id: &str) -> Option<String> {
        None
    }

    /// End the request's session; false when there was none to end
    async fn destroy_session(&self, _headers: &HeaderMap) -> Result<bool, AppError> {
        Ok(false)
    }
}

/// True unless `path` is excluded. Entries ending in `*` match by prefix,
/// others match exactly, ignoring a trailing slash on either side.
pub fn path_requires_auth(path: &str, excluded_paths: &[String]) -> bool {
    if excluded_paths.is_empty() {
        return true;
    }

    let path = with_trailing_slash(path);
    !excluded_paths.iter().any(|excluded| match excluded.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => with_trailing_slash(excluded) == path,
    })
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Value of the named cookie, if the request carries a non-empty one
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve the request's session cookie to a stored user through the
/// strategy's own session lookup
pub(crate) async fn session_user<S: AuthStrategy + ?Sized>(
    strategy: &S,
    users: &ObjectStore<User>,
    headers: &HeaderMap,
) -> Option<User> {
    let session_id = strategy.session_cookie(headers)?;
    let user_id = strategy.user_id_for_session_id(&session_id).await?;
    users.get(&user_id).await
}

/// A session started at `created_at` is expired once more than `duration`
/// has elapsed. Exactly `duration` old is still valid; no duration never
/// expires.
pub fn session_expired(
    created_at: DateTime<Utc>,
    duration: Option<TimeDelta>,
    now: DateTime<Utc>,
) -> bool {
    match duration {
        Some(duration) => created_at + duration < now,
        None => false,
    }
}

/// Fresh opaque session token
pub(crate) fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Build the strategy named by the settings, or `None` when the gate is off
pub async fn build_strategy(
    settings: &Settings,
    users: Arc<ObjectStore<User>>,
) -> Result<Option<Arc<dyn AuthStrategy>>, AppError> {
    let Some(kind) = settings.auth_type() else {
        info!("no auth type configured, request gate disabled");
        return Ok(None);
    };

    let session_name = settings.session_name.clone();
    let duration = settings.session_duration();

    let strategy: Arc<dyn AuthStrategy> = match kind {
        AuthType::Auth => Arc::new(NoAuth::new(session_name)),
        AuthType::BasicAuth => Arc::new(BasicAuth::new(session_name, users)),
        AuthType::SessionAuth => Arc::new(SessionAuth::new(session_name, users)),
        AuthType::SessionExpAuth => Arc::new(SessionExpAuth::new(session_name, duration, users)),
        AuthType::SessionDbAuth => {
            let sessions = Arc::new(ObjectStore::<UserSession>::open(&settings.data_dir).await?);
            Arc::new(SessionDbAuth::new(session_name, duration, users, sessions))
        }
    };

    info!(auth_type = %kind, "request gate enabled");
    Ok(Some(strategy))
}
