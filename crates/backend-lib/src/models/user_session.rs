//! Persisted session entity.
use serde::{Deserialize, Serialize};

use crate::storage::{Entity, EntityMeta};

/// Binds a session id to a user id. `created_at` doubles as the session's
/// start time for expiry checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    #[serde(flatten)]
    meta: EntityMeta,
    pub user_id: String,
    pub session_id: String,
}

impl UserSession {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self::with_meta(EntityMeta::new(), user_id, session_id)
    }

    pub fn with_meta(meta: EntityMeta, user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            meta,
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.meta.created_at
    }
}

impl Entity for UserSession {
    const CLASS_NAME: &'static str = "UserSession";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
