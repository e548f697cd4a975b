//! Stored entities.

pub mod user;
pub mod user_session;

pub use user::{NewUser, User};
pub use user_session::UserSession;
