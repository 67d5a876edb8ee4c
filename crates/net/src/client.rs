//! HTTP client for the task backend

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use taskdeck_core::config::ApiConfig;
use taskdeck_core::TokenStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::interceptor::{apply_bearer, bearer, check_status};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request dispatcher bound to one backend
///
/// Every request gets JSON content type, the stored bearer token (unless
/// the caller supplied `Authorization`) and the configured timeout.
/// Errors are returned as-is: no retry, no redirect to login.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    http: reqwest::Client,
    tokens: TokenStore,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration, tokens: TokenStore) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { base, http, tokens })
    }

    pub fn from_config(config: &ApiConfig, tokens: TokenStore) -> Result<Self> {
        Self::new(&config.base_url, config.timeout(), tokens)
    }

    /// Resolve an API path (`/tasks/3`) under the base URL, keeping any base path prefix
    pub fn url(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| Error::InvalidUrl(format!("{}: {}", joined, e)))
    }

    /// Send a request and return the response once it passed the status check
    #[instrument(skip(self, method, headers, body, cancel), fields(method = %method))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        mut headers: HeaderMap,
        body: Option<serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response> {
        let url = self.url(path)?;
        apply_bearer(&mut headers, &self.tokens).await;

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(&body);
        }

        debug!(path, "Sending request");
        let response = cancellable(cancel, async { request.send().await.map_err(Error::from) }).await?;
        debug!(path, status = response.status().as_u16(), "Response received");

        check_status(response).await
    }

    /// Send and decode a JSON response body
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let response = self.send(method, path, headers, body, cancel).await?;
        let bytes = cancellable(cancel, async { response.bytes().await.map_err(Error::from) }).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, cancel: &CancellationToken) -> Result<T> {
        self.send_json(Method::GET, path, HeaderMap::new(), None, cancel)
            .await
    }

    /// GET with an explicit bearer token instead of the stored one
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer(token)?);
        self.send_json(Method::GET, path, headers, None, cancel).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.send_json(Method::POST, path, HeaderMap::new(), Some(body), cancel)
            .await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.send_json(Method::PUT, path, HeaderMap::new(), Some(body), cancel)
            .await
    }

    /// DELETE, ignoring whatever body the server returns
    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> Result<()> {
        self.send(Method::DELETE, path, HeaderMap::new(), None, cancel)
            .await?;
        Ok(())
    }
}

/// Race a future against the cancellation token
async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = fut => res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_backend;
    use std::sync::Arc;
    use taskdeck_core::{MemoryStore, TaskStats};

    fn tokens() -> TokenStore {
        TokenStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = HttpClient::new("http://host:8080/api/", DEFAULT_TIMEOUT, tokens()).unwrap();
        assert_eq!(
            client.url("/tasks/3").unwrap().as_str(),
            "http://host:8080/api/tasks/3"
        );

        let client = HttpClient::new("http://host:8080", DEFAULT_TIMEOUT, tokens()).unwrap();
        assert_eq!(client.url("/tasks").unwrap().as_str(), "http://host:8080/tasks");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            HttpClient::new("not a url", DEFAULT_TIMEOUT, tokens()),
            Err(Error::InvalidUrl(_))
        ));
        assert!(HttpClient::new("mailto:a@b.c", DEFAULT_TIMEOUT, tokens()).is_err());
    }

    #[tokio::test]
    async fn test_bearer_header_iff_token_stored() {
        let backend = spawn_backend().await;
        let store = tokens();
        let client = HttpClient::new(&backend.url, DEFAULT_TIMEOUT, store.clone()).unwrap();
        let cancel = CancellationToken::new();

        // Empty store: no header, backend answers 401
        let err = client.get::<TaskStats>("/tasks/stats", &cancel).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(backend.last_authorization(), None);

        backend.allow_token("abc", 1, "alice");
        store.save("abc").await.unwrap();
        let stats: TaskStats = client.get("/tasks/stats", &cancel).await.unwrap();
        assert_eq!(stats.completed_count, 3);
        assert_eq!(backend.last_authorization().as_deref(), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_explicit_token_not_overwritten() {
        let backend = spawn_backend().await;
        backend.allow_token("explicit", 1, "alice");
        let store = tokens();
        store.save("stored").await.unwrap();
        let client = HttpClient::new(&backend.url, DEFAULT_TIMEOUT, store).unwrap();

        let _: serde_json::Value = client
            .get_as("/users/me", "explicit", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(backend.last_authorization().as_deref(), Some("Bearer explicit"));
    }

    #[tokio::test]
    async fn test_error_body_propagated() {
        let backend = spawn_backend().await;
        backend.allow_token("abc", 1, "alice");
        let store = tokens();
        store.save("abc").await.unwrap();
        let client = HttpClient::new(&backend.url, DEFAULT_TIMEOUT, store).unwrap();

        let err = client
            .get::<serde_json::Value>("/tasks/999", &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            Error::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("999"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_resolves() {
        let backend = spawn_backend().await;
        let client =
            HttpClient::new(&backend.url, Duration::from_millis(200), tokens()).unwrap();

        let err = client
            .get::<serde_json::Value>("/slow", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout), "got {:?}", err);
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_cancellation() {
        let backend = spawn_backend().await;
        let client = HttpClient::new(&backend.url, DEFAULT_TIMEOUT, tokens()).unwrap();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = client
            .get::<serde_json::Value>("/slow", &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new(&format!("http://{}", addr), DEFAULT_TIMEOUT, tokens()).unwrap();
        let err = client
            .get::<serde_json::Value>("/tasks", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_network(), "got {:?}", err);
    }
}
