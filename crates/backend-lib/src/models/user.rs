// ============================
// authgate-backend-lib/src/models/user.rs
// ============================
//! User entity.
use authgate_common::UserJson;
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::storage::{format_timestamp, Entity, EntityMeta};

/// Fields accepted when creating a user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: Option<String>,
    /// Plaintext; hashed before it is stored
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    meta: EntityMeta,
    #[serde(default)]
    pub email: Option<String>,
    /// Salted digest, stored under `_password` and never exposed
    #[serde(rename = "_password", default)]
    password_hash: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    /// Create a user with a fresh identity, hashing the given password
    pub fn new(fields: NewUser) -> Result<Self, AppError> {
        Self::with_meta(EntityMeta::new(), fields)
    }

    /// Create a user with an explicit identity
    pub fn with_meta(meta: EntityMeta, fields: NewUser) -> Result<Self, AppError> {
        let mut user = Self {
            meta,
            email: fields.email,
            password_hash: None,
            first_name: fields.first_name,
            last_name: fields.last_name,
        };
        user.set_password(fields.password.as_deref())?;
        Ok(user)
    }

    /// Replace the stored digest. `None` clears it, after which no password
    /// validates.
    pub fn set_password(&mut self, plain: Option<&str>) -> Result<(), AppError> {
        self.password_hash = match plain {
            Some(plain) => Some(hash_password(plain)?),
            None => None,
        };
        Ok(())
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn is_valid_password(&self, candidate: &str) -> bool {
        match &self.password_hash {
            Some(hash) => verify_password(hash, candidate),
            None => false,
        }
    }

    /// First and last name, else whichever one is set, else the email
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().filter(|s| !s.is_empty());
        let last = self.last_name.as_deref().filter(|s| !s.is_empty());
        match (first, last) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.email.clone().unwrap_or_default(),
        }
    }

    /// Public JSON shape, without the digest
    pub fn to_json(&self) -> UserJson {
        UserJson {
            id: self.meta.id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            created_at: format_timestamp(&self.meta.created_at),
            updated_at: format_timestamp(&self.meta.updated_at),
        }
    }
}

impl Entity for User {
    const CLASS_NAME: &'static str = "User";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.meta.id == other.meta.id
    }
}
