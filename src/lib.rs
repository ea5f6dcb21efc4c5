//! MedSource edge - caching fetch interceptor and role-based capabilities
//!
//! This crate owns the client-side logic of the MedSource storefront that is
//! worth testing in isolation:
//!
//! - a [`ServiceWorker`] that sits between the application and the
//!   [`Network`], classifies each request and answers it cache-first,
//!   network-first or network-only, with bounded, version-tagged caches and
//!   an install/activate lifecycle;
//! - [`permissions`], the pure mapping from a user's role to what they may
//!   see and do;
//! - [`format`], display helpers that never fail.
//!
//! # Worker Example
//!
//! ```rust,no_run
//! use medsource::{MedSource, Request};
//!
//! #[tokio::main]
//! async fn main() -> medsource::Result<()> {
//!     let worker = MedSource::builder()
//!         .origin("https://shop.medsource.example/")
//!         .build()?;
//!
//!     // Precache critical paths, then activate.
//!     worker.start().await?;
//!
//!     let request = Request::get("https://shop.medsource.example/api/products")?;
//!     let response = worker.handle_fetch(&request).await?;
//!     println!("{} from {}", response.status, response.source.as_str());
//!     Ok(())
//! }
//! ```
//!
//! # Control Channel Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use medsource::{MedSource, worker::control};
//!
//! #[tokio::main]
//! async fn main() -> medsource::Result<()> {
//!     let worker = Arc::new(MedSource::builder().build()?);
//!     worker.start().await?;
//!
//!     let (handle, _task) = control::spawn(worker.clone());
//!     for stat in handle.cache_size().await? {
//!         println!("{}: {}", stat.cache_name, stat.item_count);
//!     }
//!     handle.clear_cache().await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod network;
pub mod permissions;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod version;
pub mod worker;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheStorage, MemoryCacheStorage};
pub use config::{Config, WorkerConfig};
pub use error::{MedsourceError, Result};
pub use network::HttpNetwork;
pub use traits::Network;
pub use version::{CACHE_VERSION, CacheKind, CacheNames, PKG_VERSION, version_string};
pub use worker::{
    CacheStat, ControlHandle, ControlMessage, ControlReply, LifecycleState, MedSource,
    RequestClass, ServiceWorker, WorkerBuilder,
};

// Re-export all types
pub use types::{ApiEnvelope, CacheMode, Destination, Request, Response, ResponseSource};
