//! User profile model

use serde::{Deserialize, Serialize};

/// Profile of the signed-in user as returned by `GET /users/me`
///
/// Snapshots are replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
}

impl UserProfile {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}
