//! MedSource error types

/// MedSource error types
#[derive(Debug, thiserror::Error)]
pub enum MedsourceError {
    // Network errors
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // Cache storage errors
    #[error("cache storage error: {0}")]
    CacheStorage(String),

    /// Precaching failed; nothing was stored and the worker stays uninstalled.
    #[error("install failed: {0}")]
    Install(String),

    #[error("invalid lifecycle transition: cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    // Control channel errors
    #[error("control channel closed")]
    ControlChannelClosed,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MedsourceError {
    /// Whether this error means the network was unreachable.
    ///
    /// Strategies use this to decide between a cached fallback and
    /// propagating the error.
    pub fn is_network(&self) -> bool {
        matches!(self, MedsourceError::Network(_))
    }
}

impl From<reqwest::Error> for MedsourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            MedsourceError::InvalidRequest(err.to_string())
        } else {
            MedsourceError::Network(err.to_string())
        }
    }
}

/// Result type alias for MedSource operations
pub type Result<T> = std::result::Result<T, MedsourceError>;
