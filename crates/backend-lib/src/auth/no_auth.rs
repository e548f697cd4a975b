//! Strategy that installs the gate but protects nothing.
use async_trait::async_trait;
use axum::http::HeaderMap;

use super::AuthStrategy;
use crate::config::AuthType;
use crate::models::User;

pub struct NoAuth {
    session_name: String,
}

impl NoAuth {
    pub fn new(session_name: String) -> Self {
        Self { session_name }
    }
}

#[async_trait]
impl AuthStrategy for NoAuth {
    fn kind(&self) -> AuthType {
        AuthType::Auth
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    fn require_auth(&self, _path: &str, _excluded_paths: &[String]) -> bool {
        false
    }

    async fn current_user(&self, _headers: &HeaderMap) -> Option<User> {
        None
    }
}
