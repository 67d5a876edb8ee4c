//! Taskdeck Network Library
//!
//! HTTP access to the task backend.
//!
//! # Architecture
//!
//! - **Client**: one base URL, fixed timeout, JSON bodies
//! - **Interceptors**: stored bearer token on the way out, status check on the way in
//! - **Api**: typed auth, task and user services over the client
//!
//! # Usage
//!
//! ```ignore
//! let tokens = TokenStore::new(Arc::new(SqliteStore::open(path)?));
//! let api = Api::new(HttpClient::new("http://localhost:8080", DEFAULT_TIMEOUT, tokens)?);
//!
//! let cancel = CancellationToken::new();
//! for task in api.tasks().list(&cancel).await? {
//!     println!("{} {}", task.id, task.title);
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod interceptor;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use api::{Api, AuthApi, AuthBackend, TaskApi, UserApi};
pub use client::{HttpClient, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
pub use tokio_util::sync::CancellationToken;
