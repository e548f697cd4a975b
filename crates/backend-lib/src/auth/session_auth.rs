// ============================
// authgate-backend-lib/src/auth/session_auth.rs
// ============================
//! Cookie sessions held in memory for the life of the process.
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use dashmap::DashMap;
use metrics::counter;
use tracing::info;

use super::{new_session_id, session_user, AuthStrategy};
use crate::config::AuthType;
use crate::error::AppError;
use crate::metrics::{SESSION_CREATED, SESSION_DESTROYED};
use crate::models::User;
use crate::storage::ObjectStore;

pub struct SessionAuth {
    session_name: String,
    users: Arc<ObjectStore<User>>,
    /// session id -> user id
    user_id_by_session_id: DashMap<String, String>,
}

impl SessionAuth {
    pub fn new(session_name: String, users: Arc<ObjectStore<User>>) -> Self {
        Self {
            session_name,
            users,
            user_id_by_session_id: DashMap::new(),
        }
    }
}

#[async_trait]
impl AuthStrategy for SessionAuth {
    fn kind(&self) -> AuthType {
        AuthType::SessionAuth
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        session_user(self, &self.users, headers).await
    }

    async fn create_session(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let session_id = new_session_id();
        self.user_id_by_session_id
            .insert(session_id.clone(), user_id.to_string());

        counter!(SESSION_CREATED).increment(1);
        info!(user_id, "session created");
        Ok(Some(session_id))
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<String> {
        self.user_id_by_session_id
            .get(session_id)
            .map(|entry| entry.value().clone())
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> Result<bool, AppError> {
        let Some(session_id) = self.session_cookie(headers) else {
            return Ok(false);
        };
        let Some((_, user_id)) = self.user_id_by_session_id.remove(&session_id) else {
            return Ok(false);
        };

        counter!(SESSION_DESTROYED).increment(1);
        info!(user_id = %user_id, "session destroyed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::storage::Entity;
    use axum::http::HeaderValue;
    use tempfile::TempDir;

    fn cookie(session_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_str(&format!("_my_session_id={session_id}")).unwrap(),
        );
        headers
    }

    async fn setup() -> (SessionAuth, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let users = Arc::new(ObjectStore::<User>::open(temp_dir.path()).await.unwrap());
        (SessionAuth::new("_my_session_id".to_string(), users), temp_dir)
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (auth, _temp_dir) = setup().await;

        let token = auth.create_session("u1").await.unwrap().unwrap();
        assert_eq!(auth.user_id_for_session_id(&token).await.as_deref(), Some("u1"));

        assert!(auth.destroy_session(&cookie(&token)).await.unwrap());
        assert_eq!(auth.user_id_for_session_id(&token).await, None);
        assert!(!auth.destroy_session(&cookie(&token)).await.unwrap());
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let (auth, _temp_dir) = setup().await;
        let first = auth.create_session("u1").await.unwrap().unwrap();
        let second = auth.create_session("u1").await.unwrap().unwrap();
        assert_ne!(first, second);
        assert_eq!(auth.user_id_for_session_id(&second).await.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_current_user_from_cookie() {
        let (auth, _temp_dir) = setup().await;
        let mut user = User::new(NewUser {
            email: Some("a@b.com".to_string()),
            ..NewUser::default()
        })
        .unwrap();
        auth.users.save(&mut user).await.unwrap();

        let token = auth.create_session(user.id()).await.unwrap().unwrap();
        assert_eq!(auth.current_user(&cookie(&token)).await, Some(user));
        assert_eq!(auth.current_user(&cookie("unknown")).await, None);
        assert_eq!(auth.current_user(&HeaderMap::new()).await, None);
    }

    #[tokio::test]
    async fn test_session_for_deleted_user_resolves_nothing() {
        let (auth, _temp_dir) = setup().await;
        let token = auth.create_session("ghost").await.unwrap().unwrap();
        assert_eq!(auth.current_user(&cookie(&token)).await, None);
    }
}
