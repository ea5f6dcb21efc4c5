//! Intercepted request type

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, Url};

use crate::{MedsourceError, Result};

/// What the requesting context intends to do with the response.
///
/// Mirrors the subset of fetch destinations the classifier looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Destination {
    /// `fetch()`/XHR calls from application code
    #[default]
    Empty,
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
}

impl Destination {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "empty" => Some(Destination::Empty),
            "document" => Some(Destination::Document),
            "image" => Some(Destination::Image),
            "script" => Some(Destination::Script),
            "style" => Some(Destination::Style),
            "font" => Some(Destination::Font),
            "manifest" => Some(Destination::Manifest),
            _ => None,
        }
    }
}

/// HTTP cache mode forwarded to the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    #[default]
    Default,
    /// Bypass every HTTP cache on the way and store nothing.
    NoStore,
}

/// A request seen by the interceptor.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    pub headers: HeaderMap,
    /// Sent as-is; only non-GET requests normally carry one.
    pub body: Bytes,
    pub cache_mode: CacheMode,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            destination: Destination::Empty,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            cache_mode: CacheMode::Default,
        }
    }

    /// Parse `url` and build a GET request.
    pub fn get(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| MedsourceError::InvalidRequest(format!("invalid URL {url:?}: {e}")))?;
        Ok(Self::new(Method::GET, url))
    }

    /// Set the fetch destination.
    pub fn destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the cache mode.
    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Key under which responses to this request are cached.
    ///
    /// The full URL without its fragment; query strings are significant.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }
}
