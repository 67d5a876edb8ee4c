//! Bearer token persistence

use std::sync::Arc;

use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::{Error, Result};

/// The only key the client persists
pub const TOKEN_KEY: &str = "token";

/// Typed access to the single stored bearer token
///
/// Cloning shares the underlying store.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Stored token; an empty value counts as absent
    pub async fn load(&self) -> Result<Option<String>> {
        let token = self.inner.get(TOKEN_KEY).await?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    /// Like [`load`](Self::load), but a storage failure reads as "no token"
    pub async fn load_or_absent(&self) -> Option<String> {
        match self.load().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Token store unreadable, treating as signed out");
                None
            }
        }
    }

    pub async fn save(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(Error::Validation(
                "refusing to store an empty token".to_string(),
            ));
        }
        self.inner.set(TOKEN_KEY, token).await?;
        debug!("Token stored");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.inner.remove(TOKEN_KEY).await?;
        debug!("Token cleared");
        Ok(())
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("disk on fire".to_string()))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("disk on fire".to_string()))
        }
        async fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let kv = Arc::new(MemoryStore::new());
        let tokens = TokenStore::new(kv.clone());

        assert_eq!(tokens.load().await.unwrap(), None);
        tokens.save("abc").await.unwrap();
        assert_eq!(kv.get(TOKEN_KEY).await.unwrap().as_deref(), Some("abc"));
        assert_eq!(tokens.load().await.unwrap().as_deref(), Some("abc"));

        tokens.clear().await.unwrap();
        assert_eq!(tokens.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_value_reads_as_absent() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(TOKEN_KEY, "").await.unwrap();
        let tokens = TokenStore::new(kv);
        assert_eq!(tokens.load().await.unwrap(), None);
        assert!(tokens.save("").await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_store_fails_closed() {
        let tokens = TokenStore::new(Arc::new(BrokenStore));
        assert!(tokens.load().await.is_err());
        assert_eq!(tokens.load_or_absent().await, None);
    }
}
