// ============================
// authgate-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `authgate` API server.
//!
//! A user API over a flat-file object store, guarded by a configurable
//! authentication strategy.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod router;
pub mod storage;

use std::sync::Arc;

use crate::auth::{build_strategy, AuthStrategy};
use crate::config::Settings;
use crate::models::User;
use crate::storage::ObjectStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Settings the server was started with
    pub settings: Arc<Settings>,
    /// User store
    pub users: Arc<ObjectStore<User>>,
    /// Active authentication strategy; `None` leaves every route open
    pub auth: Option<Arc<dyn AuthStrategy>>,
}

impl AppState {
    /// Open the stores under `settings.data_dir` and build the configured
    /// strategy
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let users = Arc::new(ObjectStore::<User>::open(&settings.data_dir).await?);
        let auth = build_strategy(&settings, users.clone()).await?;

        Ok(Self {
            settings: Arc::new(settings),
            users,
            auth,
        })
    }
}
