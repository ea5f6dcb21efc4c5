//! Request classification.
//!
//! Picks the handling strategy for an intercepted request from its method,
//! URL shape and destination. First matching rule wins:
//!
//! 1. JavaScript bundles → [`RequestClass::NetworkOnly`]
//! 2. images (by extension or destination) → [`RequestClass::Image`]
//! 3. paths containing the API marker → [`RequestClass::Api`]
//! 4. stylesheets, fonts and JSON → [`RequestClass::Static`]
//! 5. anything else → [`RequestClass::Passthrough`]

use reqwest::Method;

use crate::types::{Destination, Request};

/// Extensions served network-only so a deploy never runs stale bundles.
const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs"];

/// Build-output directories holding hashed bundles and hot-update manifests.
const BUNDLE_PATH_MARKERS: &[&str] = &["/_next/static/chunks/", "/_next/static/webpack/"];

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "ico", "bmp",
];

const STATIC_EXTENSIONS: &[&str] = &[
    "css",
    "woff",
    "woff2",
    "ttf",
    "otf",
    "eot",
    "json",
    "webmanifest",
];

/// Default marker identifying backend API calls.
pub const DEFAULT_API_MARKER: &str = "/api/";

/// How an intercepted request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Network with `no-store`; never read from or written to a cache.
    NetworkOnly,
    /// Cache-first with a freshness window.
    Image,
    /// Network-first with cache fallback.
    Api,
    /// Cache-first, no expiry.
    Static,
    /// Not handled; plain network fetch.
    Passthrough,
}

impl RequestClass {
    /// Label used in metrics and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestClass::NetworkOnly => "network_only",
            RequestClass::Image => "image",
            RequestClass::Api => "api",
            RequestClass::Static => "static",
            RequestClass::Passthrough => "passthrough",
        }
    }
}

/// Stateless request router.
#[derive(Debug, Clone)]
pub struct Classifier {
    api_marker: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_API_MARKER)
    }
}

impl Classifier {
    pub fn new(api_marker: impl Into<String>) -> Self {
        Self {
            api_marker: api_marker.into(),
        }
    }

    /// Classify a request. Never fails: anything unrecognised passes through.
    pub fn classify(&self, request: &Request) -> RequestClass {
        if request.method != Method::GET || !matches!(request.url.scheme(), "http" | "https") {
            return RequestClass::Passthrough;
        }

        let path = request.url.path().to_ascii_lowercase();
        let ext = extension(&path);
        let has_ext = |list: &[&str]| ext.is_some_and(|e| list.contains(&e));

        if has_ext(SCRIPT_EXTENSIONS) || BUNDLE_PATH_MARKERS.iter().any(|m| path.contains(m)) {
            RequestClass::NetworkOnly
        } else if request.destination == Destination::Image || has_ext(IMAGE_EXTENSIONS) {
            RequestClass::Image
        } else if path.contains(&self.api_marker) {
            RequestClass::Api
        } else if has_ext(STATIC_EXTENSIONS) {
            RequestClass::Static
        } else {
            RequestClass::Passthrough
        }
    }
}

/// Extension of the last path segment, if it has one.
fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(url: &str) -> RequestClass {
        Classifier::default().classify(&Request::get(url).unwrap())
    }

    #[test]
    fn scripts_bypass_cache() {
        assert_eq!(
            classify("https://shop.example.com/_next/static/chunks/main-abc.js"),
            RequestClass::NetworkOnly
        );
        assert_eq!(
            classify("https://shop.example.com/sw-helper.mjs"),
            RequestClass::NetworkOnly
        );
        assert_eq!(
            classify("https://shop.example.com/_next/static/webpack/abc.hot-update.json"),
            RequestClass::NetworkOnly
        );
    }

    #[test]
    fn images_by_extension_and_destination() {
        assert_eq!(
            classify("https://shop.example.com/products/glove.PNG"),
            RequestClass::Image
        );
        let req = Request::get("https://cdn.example.com/render?id=7")
            .unwrap()
            .destination(Destination::Image);
        assert_eq!(Classifier::default().classify(&req), RequestClass::Image);
    }

    #[test]
    fn image_wins_over_api_marker() {
        assert_eq!(
            classify("https://shop.example.com/api/products/7/photo.jpg"),
            RequestClass::Image
        );
    }

    #[test]
    fn api_marker() {
        assert_eq!(
            classify("https://shop.example.com/api/orders?page=1"),
            RequestClass::Api
        );
        assert_eq!(
            classify("https://shop.example.com/api/config.json"),
            RequestClass::Api
        );
    }

    #[test]
    fn custom_api_marker() {
        let classifier = Classifier::new("/backend/");
        let req = Request::get("https://shop.example.com/backend/orders").unwrap();
        assert_eq!(classifier.classify(&req), RequestClass::Api);
        let req = Request::get("https://shop.example.com/api/orders").unwrap();
        assert_eq!(classifier.classify(&req), RequestClass::Passthrough);
    }

    #[test]
    fn static_assets() {
        for url in [
            "https://shop.example.com/styles/site.css",
            "https://shop.example.com/fonts/inter.woff2",
            "https://shop.example.com/manifest.json",
        ] {
            assert_eq!(classify(url), RequestClass::Static, "{url}");
        }
    }

    #[test]
    fn everything_else_passes_through() {
        assert_eq!(
            classify("https://shop.example.com/orders/42"),
            RequestClass::Passthrough
        );
        assert_eq!(classify("https://shop.example.com/"), RequestClass::Passthrough);
        assert_eq!(
            classify("https://shop.example.com/.well-known"),
            RequestClass::Passthrough
        );
    }

    #[test]
    fn non_get_passes_through() {
        let mut req = Request::get("https://shop.example.com/api/orders").unwrap();
        req.method = Method::POST;
        assert_eq!(Classifier::default().classify(&req), RequestClass::Passthrough);
    }

    #[test]
    fn extension_edge_cases() {
        assert_eq!(extension("/a/b.tar.gz"), Some("gz"));
        assert_eq!(extension("/a/.hidden"), None);
        assert_eq!(extension("/a/trailing."), None);
        assert_eq!(extension("/dir.d/file"), None);
    }
}
