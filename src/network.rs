//! reqwest-backed [`Network`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, HeaderValue, PRAGMA};
use tracing::instrument;

use crate::traits::Network;
use crate::types::{CacheMode, Request, Response, ResponseSource};
use crate::{MedsourceError, Result};

/// Connect timeout. No overall request timeout is set: a slow response only
/// holds up its own request.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Network that performs real HTTP requests.
#[derive(Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    /// Create a network with a fresh client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| MedsourceError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Share an existing client (connection pool, TLS config).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let mut headers = request.headers.clone();
        if request.cache_mode == CacheMode::NoStore {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        }

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }
        let response = builder.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Response {
            status,
            headers,
            body,
            source: ResponseSource::Network,
        })
    }
}
