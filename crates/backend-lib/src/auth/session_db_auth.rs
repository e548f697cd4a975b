// ============================
// authgate-backend-lib/src/auth/session_db_auth.rs
// ============================
//! Expiring sessions persisted as `UserSession` entities.
//!
//! Sessions are written through the object store and survive a restart.
//! Lapsed sessions are invalid on lookup but stay in the file until logout.
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, TimeDelta, Utc};
use metrics::counter;
use serde_json::json;
use tracing::{debug, info};

use super::{new_session_id, session_expired, session_user, AuthStrategy};
use crate::config::AuthType;
use crate::error::AppError;
use crate::metrics::{SESSION_CREATED, SESSION_DESTROYED};
use crate::models::{User, UserSession};
use crate::storage::ObjectStore;

pub struct SessionDbAuth {
    session_name: String,
    duration: Option<TimeDelta>,
    users: Arc<ObjectStore<User>>,
    sessions: Arc<ObjectStore<UserSession>>,
}

impl SessionDbAuth {
    pub fn new(
        session_name: String,
        duration: Option<TimeDelta>,
        users: Arc<ObjectStore<User>>,
        sessions: Arc<ObjectStore<UserSession>>,
    ) -> Self {
        Self {
            session_name,
            duration,
            users,
            sessions,
        }
    }

    /// Stored records for a session id
    async fn records(&self, session_id: &str) -> Vec<UserSession> {
        self.sessions
            .search(&[("session_id", json!(session_id))])
            .await
    }

    async fn lookup_at(&self, session_id: &str, now: DateTime<Utc>) -> Option<String> {
        let record = self.records(session_id).await.into_iter().next()?;
        if session_expired(record.created_at(), self.duration, now) {
            debug!("persisted session expired");
            return None;
        }
        Some(record.user_id)
    }
}

#[async_trait]
impl AuthStrategy for SessionDbAuth {
    fn kind(&self) -> AuthType {
        AuthType::SessionDbAuth
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        session_user(self, &self.users, headers).await
    }

    async fn create_session(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let session_id = new_session_id();
        let mut record = UserSession::new(user_id, session_id.clone());
        self.sessions.save(&mut record).await?;

        counter!(SESSION_CREATED).increment(1);
        info!(user_id, "persisted session created");
        Ok(Some(session_id))
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<String> {
        self.lookup_at(session_id, Utc::now()).await
    }

    /// Removes every record for the cookie's session id, lapsed or not
    async fn destroy_session(&self, headers: &HeaderMap) -> Result<bool, AppError> {
        let Some(session_id) = self.session_cookie(headers) else {
            return Ok(false);
        };
        let records = self.records(&session_id).await;
        if records.is_empty() {
            return Ok(false);
        }

        for record in &records {
            self.sessions.remove(record).await?;
        }

        counter!(SESSION_DESTROYED).increment(1);
        info!(user_id = %records[0].user_id, "persisted session destroyed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EntityMeta;
    use axum::http::HeaderValue;
    use tempfile::TempDir;

    async fn open(dir: &TempDir, duration: Option<TimeDelta>) -> SessionDbAuth {
        let users = Arc::new(ObjectStore::<User>::open(dir.path()).await.unwrap());
        let sessions = Arc::new(ObjectStore::<UserSession>::open(dir.path()).await.unwrap());
        SessionDbAuth::new("_my_session_id".to_string(), duration, users, sessions)
    }

    fn cookie(session_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_str(&format!("_my_session_id={session_id}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_sessions_survive_restart() {
        let temp_dir = TempDir::new().unwrap();
        let token = {
            let auth = open(&temp_dir, Some(TimeDelta::seconds(300))).await;
            auth.create_session("u1").await.unwrap().unwrap()
        };

        let restarted = open(&temp_dir, Some(TimeDelta::seconds(300))).await;
        assert_eq!(restarted.user_id_for_session_id(&token).await.as_deref(), Some("u1"));
        assert_eq!(restarted.sessions.count().await, 1);
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let temp_dir = TempDir::new().unwrap();
        let auth = open(&temp_dir, Some(TimeDelta::seconds(60))).await;
        let token = auth.create_session("u1").await.unwrap().unwrap();
        let t = auth.records(&token).await[0].created_at();

        assert_eq!(auth.lookup_at(&token, t + TimeDelta::seconds(59)).await.as_deref(), Some("u1"));
        assert_eq!(auth.lookup_at(&token, t + TimeDelta::seconds(60)).await.as_deref(), Some("u1"));
        assert_eq!(auth.lookup_at(&token, t + TimeDelta::seconds(61)).await, None);
    }

    #[tokio::test]
    async fn test_lapsed_record_is_kept_but_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let auth = open(&temp_dir, Some(TimeDelta::seconds(60))).await;

        let meta = EntityMeta::from_fields(None, Some("2020-01-01T00:00:00"), None).unwrap();
        let mut old = UserSession::with_meta(meta, "u1", "old-token");
        auth.sessions.save(&mut old).await.unwrap();

        assert_eq!(auth.user_id_for_session_id("old-token").await, None);
        assert_eq!(auth.sessions.count().await, 1);

        // logout still clears it out of the file
        assert!(auth.destroy_session(&cookie("old-token")).await.unwrap());
        assert_eq!(auth.sessions.count().await, 0);
    }

    #[tokio::test]
    async fn test_destroy_session() {
        let temp_dir = TempDir::new().unwrap();
        let auth = open(&temp_dir, None).await;
        let token = auth.create_session("u1").await.unwrap().unwrap();

        assert!(!auth.destroy_session(&HeaderMap::new()).await.unwrap());
        assert!(!auth.destroy_session(&cookie("unknown")).await.unwrap());
        assert!(auth.destroy_session(&cookie(&token)).await.unwrap());
        assert_eq!(auth.user_id_for_session_id(&token).await, None);

        let reopened = open(&temp_dir, None).await;
        assert_eq!(reopened.sessions.count().await, 0);
    }
}
