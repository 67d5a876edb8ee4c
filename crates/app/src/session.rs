//! Session management
//!
//! One [`SessionManager`] per process, built at startup and shared by
//! `Arc`. It is the only component that writes the token store.
//!
//! ```text
//! Uninitialized --init--> Loading --+--> Authenticated
//!                                   +--> Unauthenticated
//!                                   +--> Offline (opt-in, network failure only)
//! ```
//!
//! `sign_in` and `sign_out` move between the settled states from anywhere.

use std::sync::Arc;

use taskdeck_core::config::BootstrapConfig;
use taskdeck_core::{JwtResponse, LoginRequest, SignupRequest, TokenStore, UserProfile};
use taskdeck_net::{AuthBackend, CancellationToken};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] taskdeck_net::Error),

    #[error("Token store error: {0}")]
    Store(#[from] taskdeck_core::Error),

    #[error("Token must not be empty")]
    EmptyToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// `init` has not run yet
    Uninitialized,
    /// Restoring the stored token
    Loading,
    Authenticated,
    Unauthenticated,
    /// A stored token exists but the backend could not be reached to check it
    Offline,
}

/// Snapshot of the session
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub phase: SessionPhase,
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    fn uninitialized() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            token: None,
            user: None,
        }
    }

    fn signed_out() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            token: None,
            user: None,
        }
    }

    fn signed_in(token: String, user: UserProfile) -> Self {
        Self {
            phase: SessionPhase::Authenticated,
            token: Some(token),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }

    /// True until the startup restore has settled
    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Uninitialized | SessionPhase::Loading
        )
    }

    fn check_invariants(&self) {
        debug_assert!(
            !self.is_authenticated()
                || (self.token.as_deref().is_some_and(|t| !t.is_empty()) && self.user.is_some()),
            "authenticated session without token and profile"
        );
        debug_assert!(
            self.user.is_none() || self.token.is_some(),
            "profile cached without a token"
        );
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    tokens: TokenStore,
    policy: BootstrapConfig,
    state: watch::Sender<Session>,
    /// Serializes state transitions
    ops: Mutex<()>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn AuthBackend>, tokens: TokenStore, policy: BootstrapConfig) -> Self {
        let (state, _) = watch::channel(Session::uninitialized());
        Self {
            backend,
            tokens,
            policy,
            state,
            ops: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receive every future session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    fn publish(&self, session: Session) {
        session.check_invariants();
        debug!(phase = ?session.phase, "Session updated");
        self.state.send_replace(session);
    }

    /// Restore the session from the stored token
    ///
    /// Runs once; later calls return the current snapshot untouched. A
    /// missing or unreadable token settles as signed out without any
    /// request. A token the backend rejects is purged.
    #[instrument(skip(self, cancel))]
    pub async fn init(&self, cancel: &CancellationToken) -> Result<Session, SessionError> {
        let _guard = self.ops.lock().await;

        if self.snapshot().phase != SessionPhase::Uninitialized {
            debug!("Session already initialized");
            return Ok(self.snapshot());
        }

        self.publish(Session {
            phase: SessionPhase::Loading,
            token: None,
            user: None,
        });

        let Some(token) = self.tokens.load_or_absent().await else {
            info!("No stored token, starting signed out");
            self.publish(Session::signed_out());
            return Ok(self.snapshot());
        };

        self.publish(Session {
            phase: SessionPhase::Loading,
            token: Some(token.clone()),
            user: None,
        });

        match self.restore(token, cancel).await {
            Err(SessionError::Api(taskdeck_net::Error::Cancelled)) => {
                // Nothing was learned about the token; allow another attempt
                self.publish(Session::uninitialized());
                Err(taskdeck_net::Error::Cancelled.into())
            }
            result => result.map(|_| self.snapshot()),
        }
    }

    /// Re-check a token kept while offline
    #[instrument(skip(self, cancel))]
    pub async fn revalidate(&self, cancel: &CancellationToken) -> Result<Session, SessionError> {
        let _guard = self.ops.lock().await;

        let current = self.snapshot();
        match (current.phase, current.token) {
            (SessionPhase::Offline, Some(token)) => {
                self.restore(token, cancel).await?;
                Ok(self.snapshot())
            }
            _ => Ok(self.snapshot()),
        }
    }

    /// Validate `token` and settle the state accordingly. Caller holds `ops`.
    async fn restore(&self, token: String, cancel: &CancellationToken) -> Result<(), SessionError> {
        match self.backend.fetch_profile(&token, cancel).await {
            Ok(user) => {
                info!(user_id = user.id, "Session restored");
                self.publish(Session::signed_in(token, user));
                Ok(())
            }
            Err(taskdeck_net::Error::Cancelled) => Err(taskdeck_net::Error::Cancelled.into()),
            Err(e) if e.is_network() && self.policy.retain_token_on_network_error => {
                warn!(error = %e, "Backend unreachable, keeping stored token");
                self.publish(Session {
                    phase: SessionPhase::Offline,
                    token: Some(token),
                    user: None,
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Stored token rejected, signing out");
                self.publish(Session::signed_out());
                // The next start re-checks and purges again
                if let Err(e) = self.tokens.clear().await {
                    warn!(error = %e, "Could not purge rejected token");
                }
                Ok(())
            }
        }
    }

    /// Adopt a freshly issued token
    ///
    /// The profile is fetched with the candidate token before anything is
    /// stored, so a failed sign-in leaves both the store and the state as
    /// they were.
    #[instrument(skip(self, token, cancel))]
    pub async fn sign_in(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<UserProfile, SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let _guard = self.ops.lock().await;

        let user = self.backend.fetch_profile(token, cancel).await?;
        self.tokens.save(token).await?;
        self.publish(Session::signed_in(token.to_string(), user.clone()));

        info!(user_id = user.id, username = %user.username, "Signed in");
        Ok(user)
    }

    /// Forget the session locally
    ///
    /// State is cleared first and always; a store failure is still reported.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let _guard = self.ops.lock().await;

        self.publish(Session::signed_out());
        self.tokens.clear().await?;

        info!("Signed out");
        Ok(())
    }

    /// Log in with credentials and adopt the issued token
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<UserProfile, SessionError> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let jwt: JwtResponse = self.backend.login(&req, cancel).await?;
        self.sign_in(&jwt.token, cancel).await
    }

    /// Create an account and adopt the issued token
    pub async fn register(
        &self,
        req: &SignupRequest,
        cancel: &CancellationToken,
    ) -> Result<UserProfile, SessionError> {
        let jwt = self.backend.register(req, cancel).await?;
        self.sign_in(&jwt.token, cancel).await
    }
}
