//! Response type shared by the network, the caches and the interceptor

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, DATE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;

/// Where a response handed back to the caller came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseSource {
    /// Fresh from the network
    #[default]
    Network,
    /// From a cache, within its freshness rules
    Cache,
    /// From a cache because the network failed, regardless of age
    CacheFallback,
    /// Built by the interceptor because neither network nor cache could answer
    Synthetic,
}

impl ResponseSource {
    /// Label used in metrics and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::CacheFallback => "cache_fallback",
            ResponseSource::Synthetic => "synthetic",
        }
    }
}

/// A buffered HTTP response.
///
/// Cloning is cheap: the body is reference counted, which is what lets the
/// strategies store one copy and return another.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub source: ResponseSource,
}

/// Body of the synthetic 503 returned for API requests with no network and no cache.
#[derive(Debug, Serialize)]
struct OfflineBody {
    error: &'static str,
    message: &'static str,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            source: ResponseSource::Network,
        }
    }

    /// Shorthand for a 200 response with `body`.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK).with_body(body)
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Insert a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set the `Date` header to `at`, formatted as an HTTP-date.
    pub fn with_date(self, at: DateTime<Utc>) -> Self {
        let value = at.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        self.with_header(DATE.as_str(), &value)
    }

    pub(crate) fn with_source(mut self, source: ResponseSource) -> Self {
        self.source = source;
        self
    }

    /// Synthetic 404 served for images that are neither reachable nor cached.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .with_header(CONTENT_TYPE.as_str(), "text/plain")
            .with_body("Not Found")
            .with_source(ResponseSource::Synthetic)
    }

    /// Synthetic 503 served when the network is down and nothing is cached.
    pub fn offline() -> Self {
        let body = OfflineBody {
            error: "offline",
            message: "Network unavailable and no cached response",
        };
        // Serializing two static strings cannot fail.
        let json = serde_json::to_vec(&body).unwrap_or_default();
        Self::new(StatusCode::SERVICE_UNAVAILABLE)
            .with_header(CONTENT_TYPE.as_str(), "application/json")
            .with_body(json)
            .with_source(ResponseSource::Synthetic)
    }

    /// Whether the status is 2xx.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The parsed `Date` header.
    ///
    /// Returns `None` when the header is absent or not a valid HTTP-date.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        let raw = self.header(DATE.as_str())?;
        DateTime::parse_from_rfc2822(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whether the response was produced less than `max_age` before `now`,
    /// judged by its `Date` header. Responses without a usable `Date` are
    /// never fresh.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        let Some(date) = self.date() else {
            return false;
        };
        match (now - date).to_std() {
            Ok(age) => age < max_age,
            // Dated in the future: clock skew, treat as just produced.
            Err(_) => true,
        }
    }

    /// Body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
