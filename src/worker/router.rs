//! The cache policy engine.
//!
//! `CacheRouter` takes the place of the worker's global event listeners.
//! It is built once per process from injected storage, network and host
//! capabilities, and exposes one method per lifecycle event.

use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::Url;
use tracing::{debug, info, warn};

use super::classify::{classify, RequestKind};
use super::host::WorkerHost;
use super::notify::{Notification, PushPayload};
use crate::cache::CacheStorage;
use crate::config::Config;
use crate::net::{Destination, FetchError, Fetcher, Request, RequestKey, Response};

/// The only background sync tag the worker knows about.
pub const SYNC_PRAYER_TIMES: &str = "sync-prayer-times";

/// Where a routed response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    /// Offline fallback for a navigation
    AppShell,
}

/// Result of routing one intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the platform's default network behavior applies.
    PassThrough,
    Respond {
        response: Response,
        source: ResponseSource,
    },
    /// Intercepted, but neither the network nor the cache produced a response.
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Respond { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchOutcome::Respond { source, .. } => Some(*source),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            FetchOutcome::Respond { response, .. } => Some(response),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Acknowledged,
    Ignored,
}

/// Per-asset result of an install.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cached: Vec<String>,
    pub failed: Vec<String>,
}

pub struct CacheRouter<S, F, H> {
    config: Config,
    scope: Url,
    app_shell: RequestKey,
    storage: S,
    fetcher: F,
    host: H,
}

impl<S, F, H> CacheRouter<S, F, H>
where
    S: CacheStorage,
    F: Fetcher,
    H: WorkerHost,
{
    pub fn new(config: Config, storage: S, fetcher: F, host: H) -> Result<Self> {
        config.validate()?;
        let scope = config.scope_url()?;
        let app_shell = Request::get(
            Request::resolve(&scope, &config.app_shell).context("Invalid app shell path")?,
        )
        .key();

        Ok(Self {
            config,
            scope,
            app_shell,
            storage,
            fetcher,
            host,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn bucket(&self) -> &str {
        &self.config.cache_name
    }

    /// Resolve a possibly relative URL against the worker scope
    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        Request::resolve(&self.scope, url)
    }

    // ===== Install =====

    /// Populate the current bucket with the static assets, then skip waiting.
    ///
    /// Every asset is fetched independently; a failed asset is logged and
    /// left out without affecting the rest.
    pub async fn on_install(&self) -> Result<InstallReport> {
        info!(cache = self.bucket(), "Installing worker");
        self.storage.open(self.bucket())?;

        debug!(count = self.config.static_assets.len(), "Caching static assets");
        let results = join_all(
            self.config
                .static_assets
                .iter()
                .map(|asset| async move { (asset, self.add(asset).await) }),
        )
        .await;

        let mut report = InstallReport::default();
        for (asset, result) in results {
            match result {
                Ok(()) => report.cached.push(asset.clone()),
                Err(e) => {
                    warn!(url = %asset, error = %e, "Could not cache asset");
                    report.failed.push(asset.clone());
                }
            }
        }

        self.host.skip_waiting().await?;
        Ok(report)
    }

    /// Fetch one asset and store it. Anything but a 2xx is rejected.
    async fn add(&self, asset: &str) -> Result<()> {
        let request = Request::get(self.resolve(asset)?);
        let response = self.fetcher.fetch(&request).await?;
        if !response.is_success() {
            return Err(FetchError::bad_status(request.url.as_str(), response.status).into());
        }
        self.storage.put(self.bucket(), &request.key(), response)
    }

    // ===== Activate =====

    /// Delete every bucket but the current one, then claim open clients.
    /// Returns the names of the deleted buckets.
    pub async fn on_activate(&self) -> Result<Vec<String>> {
        info!("Activating worker");
        let stale: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter(|name| name != self.bucket())
            .collect();

        for name in &stale {
            info!(cache = %name, "Deleting old cache");
            self.storage.delete(name)?;
        }

        self.host.claim_clients().await?;
        Ok(stale)
    }

    // ===== Fetch =====

    pub async fn on_fetch(&self, request: &Request) -> FetchOutcome {
        if !request.is_get() {
            return FetchOutcome::PassThrough;
        }

        match classify(request, &self.config.api_host_patterns) {
            RequestKind::Api => self.network_first(request).await,
            RequestKind::Static => self.cache_first(request).await,
        }
    }

    /// Live data first; the last good copy only when the network is down.
    async fn network_first(&self, request: &Request) -> FetchOutcome {
        debug!(url = %request.url, "Network-first");
        match self.fetcher.fetch(request).await {
            Ok(response) => FetchOutcome::Respond {
                response: self.store_if_cacheable(request, response),
                source: ResponseSource::Network,
            },
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network failed, trying cache");
                match self.lookup(&request.key()) {
                    Some(response) => FetchOutcome::Respond {
                        response,
                        source: ResponseSource::Cache,
                    },
                    None => FetchOutcome::Failed(e),
                }
            }
        }
    }

    /// Cached copy first; the network only on a miss.
    async fn cache_first(&self, request: &Request) -> FetchOutcome {
        if let Some(response) = self.lookup(&request.key()) {
            debug!(url = %request.url, "Cache hit");
            return FetchOutcome::Respond {
                response,
                source: ResponseSource::Cache,
            };
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => FetchOutcome::Respond {
                response: self.store_if_cacheable(request, response),
                source: ResponseSource::Network,
            },
            Err(e) if request.destination == Destination::Document => {
                match self.lookup(&self.app_shell) {
                    Some(shell) => {
                        debug!(url = %request.url, "Offline, serving app shell");
                        FetchOutcome::Respond {
                            response: shell,
                            source: ResponseSource::AppShell,
                        }
                    }
                    None => FetchOutcome::Failed(e),
                }
            }
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    /// Store a copy of a 200 response and hand back the other copy.
    /// Storage failures are logged; the caller always gets its response.
    fn store_if_cacheable(&self, request: &Request, response: Response) -> Response {
        if !response.is_cacheable() {
            return response;
        }
        let (response, copy) = response.tee();
        if let Err(e) = self.storage.put(self.bucket(), &request.key(), copy) {
            warn!(url = %request.url, error = %e, "Failed to cache response");
        }
        response
    }

    /// Cache read errors count as a miss
    fn lookup(&self, key: &RequestKey) -> Option<Response> {
        match self.storage.match_request(self.bucket(), key) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cache");
                None
            }
        }
    }

    // ===== Sync / Push =====

    pub async fn on_sync(&self, tag: &str) -> SyncOutcome {
        if tag == SYNC_PRAYER_TIMES {
            info!("Background sync: updating prayer times");
            SyncOutcome::Acknowledged
        } else {
            debug!(tag = tag, "Ignoring unknown sync tag");
            SyncOutcome::Ignored
        }
    }

    /// Show a notification built from the push payload, falling back to the
    /// prayer-time defaults for anything missing.
    pub async fn on_push(&self, data: Option<&[u8]>) -> Result<Notification> {
        let notification = Notification::from_payload(PushPayload::parse(data));
        self.host.show_notification(&notification).await?;
        Ok(notification)
    }
}
