//! User profile endpoint

use taskdeck_core::UserProfile;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::paths;
use crate::client::HttpClient;
use crate::error::Result;

pub struct UserApi<'a> {
    client: &'a HttpClient,
}

impl<'a> UserApi<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Profile for the stored token
    #[instrument(skip(self, cancel))]
    pub async fn me(&self, cancel: &CancellationToken) -> Result<UserProfile> {
        self.client.get(paths::USER_ME, cancel).await
    }

    /// Profile for an explicit token, whatever the store holds
    #[instrument(skip(self, token, cancel))]
    pub async fn me_with_token(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<UserProfile> {
        self.client.get_as(paths::USER_ME, token, cancel).await
    }
}
