//! Request and response interceptors
//!
//! Applied by [`HttpClient`](crate::HttpClient) around every exchange.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Response;
use taskdeck_core::TokenStore;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// `Bearer <token>` header value
pub fn bearer(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| Error::InvalidHeader("token contains characters not allowed in a header".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Attach the stored token unless the caller already set `Authorization`
///
/// An unreadable store sends the request anonymously.
pub async fn apply_bearer(headers: &mut HeaderMap, tokens: &TokenStore) {
    if headers.contains_key(AUTHORIZATION) {
        return;
    }

    let Some(token) = tokens.load_or_absent().await else {
        return;
    };

    match bearer(&token) {
        Ok(value) => {
            headers.insert(AUTHORIZATION, value);
        }
        Err(e) => warn!(error = %e, "Stored token is not a valid header value, sending without it"),
    }
}

/// Pass 2xx through untouched, turn everything else into [`Error::Status`]
pub async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "Request rejected by server");
    Err(Error::Status {
        status: status.as_u16(),
        body,
    })
}
