//! Request Interception Policy
//!
//! Decides, per intercepted request, whether to answer from cache, go to
//! the network, keep a copy of the network response, or fall back to a
//! cached document when the network is gone.
//!
//! 1. Non-GET and non-http(s) requests are not intercepted.
//! 2. Exact match in any cache wins. Entries never expire.
//! 3. On a miss the network answers. A `200` basic response whose request
//!    passes [`should_cache`] is copied into the dynamic cache.
//! 4. If the network fails, navigations get the cached offline document and
//!    everything else gets one more exact-match lookup.
//!
//! The dynamic cache has no size bound; every eligible response stays until
//! the namespace is purged on a version change.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use crate::cache::CacheStore;
use crate::config::{CacheWriteMode, WorkerConfig};
use crate::error::NetworkError;
use crate::fetch::{Request, RequestMethod, Response, ResponseType};
use crate::network::Network;

/// Whether a successful network response to `request` is worth keeping.
///
/// True if any of: `Accept` mentions `text/html`, the path is under
/// `/api/`, `/get_` or `/static/`, or the path is one of `dynamic_routes`.
/// A request without `Accept` is treated as not asking for HTML.
pub fn should_cache(request: &Request, dynamic_routes: &[String]) -> bool {
    if request
        .accept()
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
    {
        return true;
    }

    let Some(url) = request.parsed_url() else {
        return false;
    };
    let path = url.path();

    path.starts_with("/api/")
        || path.starts_with("/get_")
        || path.starts_with("/static/")
        || dynamic_routes.iter().any(|route| route == path)
}

/// Where an intercepted response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// Exact cache match
    Cache,
    /// Live network response
    Network,
    /// Cached offline document served in place of a failed navigation
    OfflineFallback,
}

/// A response produced by the policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub response: Response,
    pub source: FetchSource,
}

/// Result of intercepting a fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// Answer the page with this response
    Response(FetchResponse),
    /// Not intercepted; the host performs its default fetch
    Passthrough,
    /// Network failed and no cached fallback exists
    Unresolved(NetworkError),
}

impl FetchResult {
    fn respond(response: Response, source: FetchSource) -> Self {
        FetchResult::Response(FetchResponse { response, source })
    }

    /// The response, if any
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchResult::Response(r) => Some(&r.response),
            _ => None,
        }
    }

    /// The response source, if any
    pub fn source(&self) -> Option<FetchSource> {
        match self {
            FetchResult::Response(r) => Some(r.source),
            _ => None,
        }
    }
}

/// A dynamic-cache write not yet applied
#[derive(Debug, Clone)]
struct PendingWrite {
    request: Request,
    response: Response,
}

/// The interception policy
pub struct InterceptionPolicy {
    store: Arc<dyn CacheStore>,
    network: Arc<dyn Network>,
    dynamic_cache: String,
    dynamic_routes: Vec<String>,
    /// Absolute URL of the offline document
    fallback_url: String,
    write_mode: CacheWriteMode,
    /// Writes queued in deferred mode, oldest first
    pending: Mutex<Vec<PendingWrite>>,
}

impl InterceptionPolicy {
    /// Create a policy over the given store and network
    pub fn new(config: &WorkerConfig, store: Arc<dyn CacheStore>, network: Arc<dyn Network>) -> Self {
        Self {
            store,
            network,
            dynamic_cache: config.dynamic_cache.clone(),
            dynamic_routes: config.dynamic_routes.clone(),
            fallback_url: config.resolve(&config.offline_fallback),
            write_mode: config.write_mode,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Handle one intercepted request
    pub fn handle(&self, request: &Request) -> FetchResult {
        if request.method != RequestMethod::Get {
            return FetchResult::Passthrough;
        }
        if !request.parsed_url().map(|u| u.is_http()).unwrap_or(false) {
            return FetchResult::Passthrough;
        }

        if let Some(cached) = self.store.match_any(request) {
            log::debug!("[SW] Serving from cache: {}", request.url);
            return FetchResult::respond(cached, FetchSource::Cache);
        }

        match self.network.fetch(request) {
            Ok(response) => {
                if self.is_storable(&response) && should_cache(request, &self.dynamic_routes) {
                    self.store_dynamic(request, response.clone());
                }
                FetchResult::respond(response, FetchSource::Network)
            }
            Err(error) => {
                log::info!("[SW] Fetch failed for: {} ({})", request.url, error);
                self.fallback(request, error)
            }
        }
    }

    /// Apply every queued dynamic-cache write. Returns how many succeeded.
    ///
    /// In deferred mode the host calls this once the response has been
    /// handed back to the page. Failures are logged and dropped.
    pub fn flush_pending_writes(&self) -> usize {
        let writes = core::mem::take(&mut *self.pending.lock());
        writes
            .into_iter()
            .map(|write| self.commit(write))
            .filter(|stored| *stored)
            .count()
    }

    /// Number of writes waiting for [`flush_pending_writes`](Self::flush_pending_writes)
    pub fn pending_writes(&self) -> usize {
        self.pending.lock().len()
    }

    /// Only complete same-origin responses are copied. Opaque, CORS and
    /// redirect-passthrough responses go back to the page untouched.
    fn is_storable(&self, response: &Response) -> bool {
        response.status == 200 && response.response_type == ResponseType::Basic
    }

    fn store_dynamic(&self, request: &Request, response: Response) {
        let write = PendingWrite {
            request: request.clone(),
            response,
        };
        match self.write_mode {
            CacheWriteMode::Deferred => self.pending.lock().push(write),
            CacheWriteMode::Immediate => {
                self.commit(write);
            }
        }
    }

    fn commit(&self, write: PendingWrite) -> bool {
        let result = self.store.open(&self.dynamic_cache).and_then(|_| {
            self.store
                .put(&self.dynamic_cache, &write.request, write.response)
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[SW] Dynamic cache write failed for {}: {}", write.request.url, e);
                false
            }
        }
    }

    fn fallback(&self, request: &Request, error: NetworkError) -> FetchResult {
        if request.is_navigation() {
            let offline = Request::new(self.fallback_url.clone());
            return match self.store.match_any(&offline) {
                Some(page) => FetchResult::respond(page, FetchSource::OfflineFallback),
                None => FetchResult::Unresolved(error),
            };
        }

        match self.store.match_any(request) {
            Some(cached) => FetchResult::respond(cached, FetchSource::Cache),
            None => FetchResult::Unresolved(error),
        }
    }
}
