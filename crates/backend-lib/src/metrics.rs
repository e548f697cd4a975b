// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_DESTROYED: &str = "session.destroyed";
pub const GATE_REJECTED: &str = "gate.rejected";
pub const STORE_WRITE: &str = "store.write";
