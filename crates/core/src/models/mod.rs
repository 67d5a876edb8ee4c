//! Data models for Taskdeck
//!
//! Wire shapes exchanged with the task backend. Field names follow the
//! backend's camelCase JSON.

mod auth;
mod stats;
mod task;
mod user;

pub use auth::*;
pub use stats::*;
pub use task::*;
pub use user::*;
