//! Storage traits
//!
//! The token store only needs string keys and string values. Backends may
//! be a SQLite file, memory, or a platform keychain.

use async_trait::async_trait;

use crate::error::Result;

/// Async key-value persistence
///
/// A missing key is `Ok(None)`, never an error. Errors mean the backend
/// itself failed (I/O, corruption, platform denial).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key succeeds
    async fn remove(&self, key: &str) -> Result<()>;
}
