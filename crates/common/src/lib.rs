// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! exchanged between `authgate` clients and the server.
//! This module defines the JSON bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Public representation of a user.
///
/// The password digest is never part of this shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserJson {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Creation time, `YYYY-MM-DDTHH:MM:SS` in UTC
    pub created_at: String,
    /// Last save time, `YYYY-MM-DDTHH:MM:SS` in UTC
    pub updated_at: String,
}

/// Body of `POST /api/v1/users`
/// # Fields
/// * `email` - Login email, required
/// * `password` - Plaintext password, required
/// * `first_name` - Optional first name
/// * `last_name` - Optional last name
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Form body of `POST /api/v1/auth_session/login`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Error body returned by every failing endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of `GET /api/v1/status`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusBody {
    pub status: String,
}

/// Body of `GET /api/v1/stats`: object counts per entity class
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatsBody {
    pub users: usize,
}
