//! Version information and the cache version tag.
//!
//! The cache version tag is embedded in every cache name. Bumping it on
//! deploy is the only way prior caches get invalidated: the next
//! activation deletes every cache whose name does not carry the new tag.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cache version tag injected at build time via `MEDSOURCE_CACHE_VERSION`,
/// or `v1.1.0` if unset.
pub const CACHE_VERSION: &str = match option_env!("MEDSOURCE_CACHE_VERSION") {
    Some(tag) => tag,
    None => "v1.1.0",
};

/// Prefix shared by all cache names.
pub const CACHE_PREFIX: &str = "medsource";

/// The kinds of cache the worker owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Images,
    Api,
    Static,
}

impl CacheKind {
    pub const ALL: [CacheKind; 3] = [CacheKind::Images, CacheKind::Api, CacheKind::Static];

    /// Segment used inside the cache name and as the metrics label.
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKind::Images => "images",
            CacheKind::Api => "api",
            CacheKind::Static => "static",
        }
    }
}

/// The three version-tagged cache names for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    pub version: String,
    pub images: String,
    pub api: String,
    pub statics: String,
}

impl CacheNames {
    /// Build names of the form `{prefix}-{kind}-{version}`.
    pub fn new(prefix: &str, version: &str) -> Self {
        let name = |kind: CacheKind| format!("{prefix}-{}-{version}", kind.as_str());
        Self {
            version: version.to_owned(),
            images: name(CacheKind::Images),
            api: name(CacheKind::Api),
            statics: name(CacheKind::Static),
        }
    }

    /// Name of the cache for `kind`.
    pub fn get(&self, kind: CacheKind) -> &str {
        match kind {
            CacheKind::Images => &self.images,
            CacheKind::Api => &self.api,
            CacheKind::Static => &self.statics,
        }
    }

    /// Whether `name` is one of this deployment's caches.
    pub fn contains(&self, name: &str) -> bool {
        CacheKind::ALL.iter().any(|kind| self.get(*kind) == name)
    }
}

impl Default for CacheNames {
    fn default() -> Self {
        Self::new(CACHE_PREFIX, CACHE_VERSION)
    }
}

/// Full version string: `{pkg_version}+cache.{cache_version}`.
pub fn version_string() -> String {
    format!("{PKG_VERSION}+cache.{CACHE_VERSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_contains_pkg_version() {
        let version = version_string();
        assert!(
            version.starts_with(PKG_VERSION),
            "version should start with pkg version"
        );
        assert!(version.ends_with(CACHE_VERSION));
    }

    #[test]
    fn cache_names_embed_version() {
        let names = CacheNames::new("medsource", "v1.1.0");
        assert_eq!(names.images, "medsource-images-v1.1.0");
        assert_eq!(names.api, "medsource-api-v1.1.0");
        assert_eq!(names.statics, "medsource-static-v1.1.0");
    }

    #[test]
    fn contains_only_matches_current_version() {
        let names = CacheNames::new("medsource", "v1.1.0");
        assert!(names.contains("medsource-api-v1.1.0"));
        assert!(!names.contains("medsource-api-v1.0.0"));
        assert!(!names.contains("other-cache"));
    }
}
