//! Auth endpoints

use taskdeck_core::{JwtResponse, LoginRequest, SignupRequest};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::paths;
use crate::client::HttpClient;
use crate::error::Result;

/// Registration and login
///
/// These only return the issued token. Persisting it is the session's job.
pub struct AuthApi<'a> {
    client: &'a HttpClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, req, cancel), fields(username = %req.username))]
    pub async fn register(
        &self,
        req: &SignupRequest,
        cancel: &CancellationToken,
    ) -> Result<JwtResponse> {
        self.client.post(paths::AUTH_REGISTER, req, cancel).await
    }

    #[instrument(skip(self, req, cancel), fields(username = %req.username))]
    pub async fn login(&self, req: &LoginRequest, cancel: &CancellationToken) -> Result<JwtResponse> {
        self.client.post(paths::AUTH_LOGIN, req, cancel).await
    }
}
