//! Backend REST envelope

use serde::{Deserialize, Serialize};

/// The `{payload, message, statusCode}` wrapper every backend endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub payload: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_status_code")]
    pub status_code: u16,
}

fn default_status_code() -> u16 {
    200
}

impl<T> ApiEnvelope<T> {
    /// Whether the backend reported success (2xx) and sent a payload.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code) && self.payload.is_some()
    }

    /// Take the payload if the envelope reports success.
    pub fn into_payload(self) -> Option<T> {
        if self.is_success() { self.payload } else { None }
    }
}
