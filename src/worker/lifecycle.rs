//! Install and activate.

use futures_util::future::try_join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::strategy::storage_error;
use super::{LifecycleState, ServiceWorker};
use crate::types::{Request, Response};
use crate::version::CacheKind;
use crate::{MedsourceError, Result};

impl ServiceWorker {
    /// Install, then activate immediately if `skip_waiting` is set.
    pub async fn start(&self) -> Result<()> {
        self.install().await?;
        if self.skip_waiting {
            self.activate().await?;
        }
        Ok(())
    }

    /// Precache the critical paths into the static cache.
    ///
    /// All paths are fetched before anything is stored; if any fetch fails
    /// or returns a non-2xx status, nothing is stored, the worker becomes
    /// [`LifecycleState::Redundant`] and [`MedsourceError::Install`] is
    /// returned. If the future is dropped before precaching finishes, the
    /// worker returns to [`LifecycleState::Parsed`] and can be installed
    /// again.
    pub async fn install(&self) -> Result<()> {
        let step = self.transition(
            "install",
            LifecycleState::Parsed,
            LifecycleState::Installing,
        )?;

        match self.precache_critical().await {
            Ok(count) => {
                step.complete(LifecycleState::Installed);
                info!(
                    cache = self.names.get(CacheKind::Static),
                    precached = count,
                    "worker installed"
                );
                Ok(())
            }
            Err(e) => {
                step.complete(LifecycleState::Redundant);
                warn!(error = %e, "worker install failed");
                Err(e)
            }
        }
    }

    /// Delete every cache not belonging to this version, then start
    /// intercepting.
    ///
    /// Returns the names of the deleted caches. Failing to list or delete a
    /// cache is logged and does not block activation. If the future is
    /// dropped midway, the worker stays [`LifecycleState::Installed`].
    pub async fn activate(&self) -> Result<Vec<String>> {
        let step = self.transition(
            "activate",
            LifecycleState::Installed,
            LifecycleState::Activating,
        )?;

        let existing = match self.storage.cache_names().await {
            Ok(names) => names,
            Err(e) => {
                storage_error("list");
                warn!(error = %e, "could not list caches during activation");
                Vec::new()
            }
        };

        let mut deleted = Vec::new();
        for name in existing.into_iter().filter(|n| !self.names.contains(n)) {
            match self.storage.delete_cache(&name).await {
                Ok(_) => {
                    info!(cache = %name, "deleted outdated cache");
                    deleted.push(name);
                }
                Err(e) => {
                    storage_error("delete_cache");
                    warn!(cache = %name, error = %e, "failed to delete outdated cache");
                }
            }
        }

        // Claiming clients: interception starts with the next request.
        step.complete(LifecycleState::Activated);
        info!(version = %self.names.version, "worker activated");
        Ok(deleted)
    }

    /// Activate now if installed and waiting; otherwise do nothing.
    pub async fn skip_waiting(&self) -> Result<()> {
        if self.state() == LifecycleState::Installed {
            self.activate().await?;
        } else {
            debug!(state = self.state().as_str(), "skip_waiting ignored");
        }
        Ok(())
    }

    async fn precache_critical(&self) -> Result<usize> {
        let cache = self.names.get(CacheKind::Static);

        let requests = self
            .precache
            .iter()
            .map(|path| -> Result<Request> {
                let url = self.origin.join(path).map_err(|e| {
                    MedsourceError::Install(format!("invalid precache path {path:?}: {e}"))
                })?;
                Ok(Request::new(reqwest::Method::GET, url))
            })
            .collect::<Result<Vec<_>>>()?;

        let fetches = requests.iter().map(|request| self.fetch_for_precache(request));
        let entries: Vec<(String, Response)> = try_join_all(fetches).await?;
        let count = entries.len();

        self.storage.open(cache).await.map_err(|e| {
            storage_error("precache");
            MedsourceError::Install(format!("failed to open {cache}: {e}"))
        })?;
        self.storage.put_all(cache, entries).await.map_err(|e| {
            storage_error("precache");
            MedsourceError::Install(format!("failed to store precached responses: {e}"))
        })?;
        Ok(count)
    }

    async fn fetch_for_precache(&self, request: &Request) -> Result<(String, Response)> {
        let response = self.network.fetch(request).await.map_err(|e| {
            MedsourceError::Install(format!("failed to precache {}: {e}", request.url))
        })?;
        if !response.is_ok() {
            return Err(MedsourceError::Install(format!(
                "failed to precache {}: HTTP {}",
                request.url, response.status
            )));
        }
        Ok((request.cache_key(), response))
    }

    /// Move from `from` to `to`, or report the state that prevented it.
    ///
    /// The returned step puts the worker back into `from` unless completed.
    fn transition(
        &self,
        action: &'static str,
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<Step<'_>> {
        let mut blocked_by = from;
        let moved = self.state.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                blocked_by = *state;
                false
            }
        });
        if moved {
            Ok(Step {
                state: &self.state,
                action,
                rollback: Some(from),
            })
        } else {
            Err(MedsourceError::InvalidState {
                action,
                state: blocked_by.as_str(),
            })
        }
    }
}

/// An in-flight lifecycle step.
struct Step<'a> {
    state: &'a watch::Sender<LifecycleState>,
    action: &'static str,
    rollback: Option<LifecycleState>,
}

impl Step<'_> {
    fn complete(mut self, to: LifecycleState) {
        self.rollback = None;
        self.state.send_replace(to);
    }
}

impl Drop for Step<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.rollback.take() {
            self.state.send_replace(previous);
            warn!(
                action = self.action,
                state = previous.as_str(),
                "lifecycle step cancelled"
            );
        }
    }
}
