// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `authgate` API server.

pub mod auth_gate;

pub use auth_gate::{auth_gate, CurrentUser};
