// ============================
// authgate-backend-lib/src/auth/session_exp_auth.rs
// ============================
//! In-memory cookie sessions that lapse after a fixed duration.
//!
//! Expiry is checked lazily when a session is looked up; nothing sweeps old
//! entries out of the map.
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use metrics::counter;
use tracing::{debug, info};

use super::{new_session_id, session_expired, session_user, AuthStrategy};
use crate::config::AuthType;
use crate::error::AppError;
use crate::metrics::{SESSION_CREATED, SESSION_DESTROYED};
use crate::models::User;
use crate::storage::ObjectStore;

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: String,
    created_at: DateTime<Utc>,
}

pub struct SessionExpAuth {
    session_name: String,
    /// `None` means sessions never expire
    duration: Option<TimeDelta>,
    users: Arc<ObjectStore<User>>,
    sessions: DashMap<String, SessionEntry>,
}

impl SessionExpAuth {
    pub fn new(
        session_name: String,
        duration: Option<TimeDelta>,
        users: Arc<ObjectStore<User>>,
    ) -> Self {
        Self {
            session_name,
            duration,
            users,
            sessions: DashMap::new(),
        }
    }

    fn lookup_at(&self, session_id: &str, now: DateTime<Utc>) -> Option<String> {
        let entry = self.sessions.get(session_id)?;
        if session_expired(entry.created_at, self.duration, now) {
            debug!("session expired");
            return None;
        }
        Some(entry.user_id.clone())
    }
}

#[async_trait]
impl AuthStrategy for SessionExpAuth {
    fn kind(&self) -> AuthType {
        AuthType::SessionExpAuth
    }

    fn session_name(&self) -> &str {
        &self.session_name
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        session_user(self, &self.users, headers).await
    }

    async fn create_session(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let session_id = new_session_id();
        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            },
        );

        counter!(SESSION_CREATED).increment(1);
        info!(user_id, "session created");
        Ok(Some(session_id))
    }

    async fn user_id_for_session_id(&self, session_id: &str) -> Option<String> {
        self.lookup_at(session_id, Utc::now())
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> Result<bool, AppError> {
        let Some(session_id) = self.session_cookie(headers) else {
            return Ok(false);
        };
        let Some(user_id) = self.user_id_for_session_id(&session_id).await else {
            return Ok(false);
        };
        self.sessions.remove(&session_id);

        counter!(SESSION_DESTROYED).increment(1);
        info!(user_id = %user_id, "session destroyed");
        Ok(true)
    }
}
