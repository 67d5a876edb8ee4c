//! Local persistence for Taskdeck
//!
//! The client persists exactly one value: the bearer token under
//! [`TOKEN_KEY`]. Everything else lives on the backend.

mod memory;
mod migrations;
mod sqlite;
mod token;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use token::{TokenStore, TOKEN_KEY};
pub use traits::KeyValueStore;
