//! Test harness for running E2E scenarios
//!
//! [`TestApp`] wires a worker to an in-memory store, a scripted network and
//! a recording host.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};
use spin::{Mutex, RwLock};

use cms_worker::fetch::strip_fragment;
use cms_worker::{
    FetchResult, MemoryCacheStore, MemorySubmissionQueue, Network, NetworkError, RecordingHost,
    Request, Response, ServiceWorker, WorkerConfig, WorkerError, WorkerEvent,
};

use crate::fixtures::{self, app_url};

/// Network answering from a fixed route table
#[derive(Debug, Default)]
pub struct ScriptedNetwork {
    routes: RwLock<BTreeMap<String, Response>>,
    offline: AtomicBool,
    /// Every URL the worker asked for, including while offline
    requests: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `response`
    pub fn route(&self, url: &str, response: Response) {
        self.routes.write().insert(url.to_string(), response);
    }

    /// Serve `body` at an app path
    pub fn serve(&self, path: &str, body: impl Into<Vec<u8>>) {
        let url = app_url(path);
        self.route(&url, fixtures::response_for(&url, body));
    }

    /// Serve every asset the worker pre-caches
    pub fn serve_app_shell(&self, config: &WorkerConfig) {
        for url in config.static_asset_urls() {
            let response = fixtures::response_for(&url, fixtures::asset_body(&url));
            self.route(&url, response);
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// How often `url` was requested
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|u| *u == url).count()
    }
}

impl Network for ScriptedNetwork {
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.requests.lock().push(request.url.clone());

        if self.offline.load(Ordering::SeqCst) {
            log::debug!("[E2E] offline: {}", request.url);
            return Err(NetworkError::Offline);
        }

        let url = strip_fragment(&request.url);
        let response = self
            .routes
            .read()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Response::basic(404, "Not Found").with_url(url));
        Ok(response)
    }
}

/// A worker with every capability stubbed
pub struct TestApp {
    pub store: Arc<MemoryCacheStore>,
    pub network: Arc<ScriptedNetwork>,
    pub host: Arc<RecordingHost>,
    pub queue: Arc<MemorySubmissionQueue>,
    pub worker: ServiceWorker,
}

impl TestApp {
    /// App with the shipped configuration and the shell online
    pub fn new() -> Result<Self, WorkerError> {
        Self::with_config(WorkerConfig::default())
    }

    pub fn with_config(config: WorkerConfig) -> Result<Self, WorkerError> {
        Self::with_store(config, Arc::new(MemoryCacheStore::new()))
    }

    /// App over an existing store, as after a version upgrade
    pub fn with_store(config: WorkerConfig, store: Arc<MemoryCacheStore>) -> Result<Self, WorkerError> {
        let network = Arc::new(ScriptedNetwork::new());
        network.serve_app_shell(&config);
        let host = Arc::new(RecordingHost::new());
        let queue = Arc::new(MemorySubmissionQueue::new());

        let worker = ServiceWorker::new(config, store.clone(), network.clone(), host.clone())?
            .with_submission_queue(queue.clone());

        Ok(Self {
            store,
            network,
            host,
            queue,
            worker,
        })
    }

    /// A new worker over this app's store, as after the host terminated
    /// and restarted it. The network comes back with the same routes.
    pub fn restart(&self) -> Result<Self, WorkerError> {
        let app = Self::with_store(self.worker.config().clone(), self.store.clone())?;
        for (url, response) in self.network.routes.read().iter() {
            app.network.route(url, response.clone());
        }
        app.network.set_offline(self.network.offline.load(Ordering::SeqCst));
        app.worker.resume()?;
        Ok(app)
    }

    /// Install and activate
    pub fn start(&self) -> Result<(), WorkerError> {
        self.worker.dispatch(WorkerEvent::Install)?;
        self.worker.dispatch(WorkerEvent::Activate)?;
        Ok(())
    }

    /// Top-level navigation to an app path
    pub fn navigate(&self, path: &str) -> FetchResult {
        self.worker.fetch(&Request::navigate(app_url(path)))
    }

    /// Plain GET of an app path
    pub fn get(&self, path: &str) -> FetchResult {
        self.worker.fetch(&Request::new(app_url(path)))
    }

    /// URLs in the static cache
    pub fn static_entries(&self) -> Vec<String> {
        self.store.urls(&self.worker.config().static_cache)
    }

    /// URLs in the dynamic cache
    pub fn dynamic_entries(&self) -> Vec<String> {
        self.store.urls(&self.worker.config().dynamic_cache)
    }
}
