//! Core Network trait

use async_trait::async_trait;

use crate::Result;
use crate::types::{Request, Response};

/// The network the interceptor falls through to.
///
/// Implementations return `Ok` for every response the server produced,
/// including 4xx/5xx. `Err(MedsourceError::Network)` means no response was
/// obtained at all; that is the only case the caching strategies treat as
/// "offline".
#[async_trait]
pub trait Network: Send + Sync {
    /// Name for logging/debugging.
    fn name(&self) -> &str;

    /// Perform the request and buffer the full response.
    async fn fetch(&self, request: &Request) -> Result<Response>;
}
