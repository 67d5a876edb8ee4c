//! Typed wrappers over the backend's REST routes
//!
//! Each resource group borrows the shared [`HttpClient`]. Services are
//! stateless: they build the path, send, decode, and hand errors back
//! unchanged.

mod auth;
pub mod paths;
mod tasks;
mod users;

use async_trait::async_trait;
use taskdeck_core::{JwtResponse, LoginRequest, SignupRequest, UserProfile};
use tokio_util::sync::CancellationToken;

pub use auth::AuthApi;
pub use tasks::TaskApi;
pub use users::UserApi;

use crate::client::HttpClient;
use crate::error::Result;

/// Entry point to all resource groups
#[derive(Clone)]
pub struct Api {
    client: HttpClient,
}

impl Api {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.client)
    }

    pub fn tasks(&self) -> TaskApi<'_> {
        TaskApi::new(&self.client)
    }

    pub fn users(&self) -> UserApi<'_> {
        UserApi::new(&self.client)
    }
}

/// What the session manager needs from the backend
///
/// Implemented by [`Api`]; tests substitute an in-memory backend.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Validate `token` by fetching its profile
    async fn fetch_profile(&self, token: &str, cancel: &CancellationToken) -> Result<UserProfile>;

    async fn login(&self, req: &LoginRequest, cancel: &CancellationToken) -> Result<JwtResponse>;

    async fn register(
        &self,
        req: &SignupRequest,
        cancel: &CancellationToken,
    ) -> Result<JwtResponse>;
}

#[async_trait]
impl AuthBackend for Api {
    async fn fetch_profile(&self, token: &str, cancel: &CancellationToken) -> Result<UserProfile> {
        self.users().me_with_token(token, cancel).await
    }

    async fn login(&self, req: &LoginRequest, cancel: &CancellationToken) -> Result<JwtResponse> {
        self.auth().login(req, cancel).await
    }

    async fn register(
        &self,
        req: &SignupRequest,
        cancel: &CancellationToken,
    ) -> Result<JwtResponse> {
        self.auth().register(req, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use taskdeck_core::{MemoryStore, TokenStore};

    use super::*;
    use crate::client::DEFAULT_TIMEOUT;
    use crate::test_support::{spawn_backend, STUB_PASSWORD};
    use crate::Error;

    fn api_for(url: &str, tokens: TokenStore) -> Api {
        Api::new(HttpClient::new(url, DEFAULT_TIMEOUT, tokens).unwrap())
    }

    #[tokio::test]
    async fn test_login_does_not_touch_store() {
        let backend = spawn_backend().await;
        let kv = Arc::new(MemoryStore::new());
        let api = api_for(&backend.url, TokenStore::new(kv.clone()));
        let cancel = CancellationToken::new();

        let jwt = api
            .register(
                &SignupRequest {
                    username: "alice".to_string(),
                    email: "alice@example.com".to_string(),
                    password: STUB_PASSWORD.to_string(),
                },
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(jwt.token_type, "Bearer");

        let jwt = api
            .login(
                &LoginRequest {
                    username: "alice".to_string(),
                    password: STUB_PASSWORD.to_string(),
                },
                &cancel,
            )
            .await
            .unwrap();
        assert!(!jwt.token.is_empty());
        assert!(kv.is_empty().await);

        let profile = api.fetch_profile(&jwt.token, &cancel).await.unwrap();
        assert_eq!(profile.username, "alice");
    }

    #[tokio::test]
    async fn test_bad_login_propagates_status() {
        let backend = spawn_backend().await;
        let api = api_for(&backend.url, TokenStore::new(Arc::new(MemoryStore::new())));

        let err = api
            .login(
                &LoginRequest {
                    username: "nobody".to_string(),
                    password: "wrong".to_string(),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_me_uses_stored_token() {
        let backend = spawn_backend().await;
        backend.allow_token("abc", 1, "alice");
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        tokens.save("abc").await.unwrap();
        let api = api_for(&backend.url, tokens);

        let profile = api.users().me(&CancellationToken::new()).await.unwrap();
        assert_eq!(profile, UserProfile::new(1, "alice"));
    }
}
