//! Application state management

use std::sync::Arc;

use taskdeck_core::{AppDirs, ClientConfig, KeyValueStore, SqliteStore, TokenStore};
use taskdeck_net::{Api, HttpClient};
use tracing::info;

use crate::error::Result;
use crate::session::SessionManager;

/// Everything built once at startup
///
/// The API client and the session manager share one token store; only the
/// session manager writes it.
pub struct AppState {
    pub config: ClientConfig,
    pub dirs: AppDirs,
    pub api: Api,
    pub session: Arc<SessionManager>,
}

impl AppState {
    /// Open the on-disk token store under `dirs` and wire the services to it
    pub fn new(config: ClientConfig, dirs: AppDirs) -> Result<Self> {
        let store = SqliteStore::open(&dirs.store_file())?;
        info!(path = %dirs.store_file().display(), "Opened token store");
        Self::with_store(config, dirs, Arc::new(store))
    }

    pub fn with_store(
        config: ClientConfig,
        dirs: AppDirs,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        config.validate()?;

        let tokens = TokenStore::new(store);
        let api = Api::new(HttpClient::from_config(&config.api, tokens.clone())?);
        let session = Arc::new(SessionManager::new(
            Arc::new(api.clone()),
            tokens,
            config.bootstrap.clone(),
        ));

        Ok(Self {
            config,
            dirs,
            api,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use taskdeck_core::{KeyValueStore, TOKEN_KEY};
    use taskdeck_net::test_support::spawn_backend;
    use taskdeck_net::CancellationToken;
    use tempfile::TempDir;

    use super::*;

    fn config_for(url: &str) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.api.base_url = url.to_string();
        config
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let backend = spawn_backend().await;
        backend.allow_token("abc", 1, "alice");
        let tmp = TempDir::new().unwrap();
        let cancel = CancellationToken::new();

        {
            let state = AppState::new(config_for(&backend.url), AppDirs::rooted_at(tmp.path())).unwrap();
            state.session.init(&cancel).await.unwrap();
            assert!(!state.session.snapshot().is_authenticated());

            state.session.sign_in("abc", &cancel).await.unwrap();
            let tasks = state.api.tasks().list(&cancel).await.unwrap();
            assert!(tasks.is_empty());
            assert_eq!(backend.last_authorization().as_deref(), Some("Bearer abc"));
        }

        let state = AppState::new(config_for(&backend.url), AppDirs::rooted_at(tmp.path())).unwrap();
        let snapshot = state.session.init(&cancel).await.unwrap();
        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.user.map(|u| u.username).as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_revoked_token_is_purged_on_restart() {
        let backend = spawn_backend().await;
        backend.allow_token("abc", 1, "alice");
        let tmp = TempDir::new().unwrap();
        let cancel = CancellationToken::new();

        let state = AppState::new(config_for(&backend.url), AppDirs::rooted_at(tmp.path())).unwrap();
        state.session.init(&cancel).await.unwrap();
        state.session.sign_in("abc", &cancel).await.unwrap();
        drop(state);

        backend.revoke_token("abc");

        let store = Arc::new(SqliteStore::open(&AppDirs::rooted_at(tmp.path()).store_file()).unwrap());
        let state = AppState::with_store(
            config_for(&backend.url),
            AppDirs::rooted_at(tmp.path()),
            store.clone(),
        )
        .unwrap();
        let snapshot = state.session.init(&cancel).await.unwrap();
        assert!(!snapshot.is_authenticated());
        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = ClientConfig::default();
        config.api.timeout_secs = 0;
        assert!(AppState::new(config, AppDirs::rooted_at(tmp.path())).is_err());
    }
}
