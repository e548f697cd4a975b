// ============================
// authgate-backend-lib/src/auth/basic_auth.rs
// ============================
//! HTTP Basic credentials checked against stored users.
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use super::AuthStrategy;
use crate::config::AuthType;
use crate::models::User;
use crate::storage::ObjectStore;

pub struct BasicAuth {
    session_name: String,
    users: Arc<ObjectStore<User>>,
}

/// Base64 payload of a `Basic` Authorization header
pub fn extract_base64_authorization_header(header: &str) -> Option<&str> {
    header.strip_prefix("Basic ")
}

/// Decode the payload into UTF-8 text
pub fn decode_base64_authorization_header(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Split `email:password` at the first colon; the password may contain more
pub fn extract_user_credentials(decoded: &str) -> Option<(&str, &str)> {
    decoded.split_once(':')
}

impl BasicAuth {
    pub fn new(session_name: String, users: Arc<ObjectStore<User>>) -> Self {
        Self { session_name, users }
    }

    /// The first user with this email whose password matches
    pub async fn user_object_from_credentials(&self, email: &str, password: &str) -> Option<User> {
        self.users
            .search(&[("email", json!(email))])
            .await
            .into_iter()
            .find(|user| user.is_valid_password(password))
    }
}

#[async_trait]
impl AuthStrategy for BasicAuth {
    fn kind(&self) -> AuthType {
        AuthType::BasicAuth
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        let header = self.authorization_header(headers)?;
        let encoded = extract_base64_authorization_header(header)?;
        let decoded = decode_base64_authorization_header(encoded)?;
        let (email, password) = extract_user_credentials(&decoded)?;
        self.user_object_from_credentials(email, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::storage::Entity;
    use axum::http::HeaderValue;
    use tempfile::TempDir;

    async fn setup() -> (BasicAuth, User, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let users = Arc::new(ObjectStore::<User>::open(temp_dir.path()).await.unwrap());
        let mut user = User::new(NewUser {
            email: Some("a@b.com".to_string()),
            password: Some("sec:ret".to_string()),
            ..NewUser::default()
        })
        .unwrap();
        users.save(&mut user).await.unwrap();
        (BasicAuth::new("_my_session_id".to_string(), users), user, temp_dir)
    }

    fn basic(credentials: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", STANDARD.encode(credentials));
        headers.insert("authorization", HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[test]
    fn test_header_parsing_steps() {
        assert_eq!(extract_base64_authorization_header("Basic abc"), Some("abc"));
        assert_eq!(extract_base64_authorization_header("Bearer abc"), None);
        assert_eq!(extract_base64_authorization_header("Basicabc"), None);

        assert_eq!(
            decode_base64_authorization_header("SG9sYmVydG9u").as_deref(),
            Some("Holberton")
        );
        assert_eq!(decode_base64_authorization_header("***"), None);

        assert_eq!(extract_user_credentials("a@b.com:p:w"), Some(("a@b.com", "p:w")));
        assert_eq!(extract_user_credentials("no-colon"), None);
    }

    #[tokio::test]
    async fn test_resolves_user_with_valid_credentials() {
        let (auth, user, _temp_dir) = setup().await;
        let found = auth.current_user(&basic("a@b.com:sec:ret")).await.unwrap();
        assert_eq!(found, user);
    }

    #[tokio::test]
    async fn test_rejects_bad_credentials() {
        let (auth, _user, _temp_dir) = setup().await;
        assert!(auth.current_user(&basic("a@b.com:wrong")).await.is_none());
        assert!(auth.current_user(&basic("x@y.com:sec:ret")).await.is_none());
        assert!(auth.current_user(&HeaderMap::new()).await.is_none());

        let mut bearer = HeaderMap::new();
        bearer.insert("authorization", HeaderValue::from_static("Bearer abc"));
        assert!(auth.current_user(&bearer).await.is_none());

        let mut garbage = HeaderMap::new();
        garbage.insert("authorization", HeaderValue::from_static("Basic %%%"));
        assert!(auth.current_user(&garbage).await.is_none());
    }

    #[tokio::test]
    async fn test_has_no_sessions() {
        let (auth, user, _temp_dir) = setup().await;
        assert_eq!(auth.create_session(user.id()).await.unwrap(), None);
        assert!(!auth.destroy_session(&HeaderMap::new()).await.unwrap());
    }
}
