//! Service Worker
//!
//! Owns the configuration and the injected capabilities and routes each
//! host event to its handler.

use alloc::sync::Arc;
use spin::Mutex;

use crate::cache::CacheStore;
use crate::config::WorkerConfig;
use crate::error::Result;
use crate::events::{WorkerEvent, WorkerOutcome};
use crate::fetch::Request;
use crate::host::WorkerHost;
use crate::lifecycle::{self, ActivateReport, InstallReport, Lifecycle, WorkerState};
use crate::message::{MessageEvent, VersionReply, WorkerMessage};
use crate::network::Network;
use crate::policy::{FetchResult, InterceptionPolicy};
use crate::push::{self, ClickOutcome, NotificationClickEvent, NotificationOptions, PushEvent};
use crate::sync::{self, SubmissionQueue, SyncEvent, SyncReport, UnimplementedSubmissionQueue};

/// A service worker instance
pub struct ServiceWorker {
    config: WorkerConfig,
    store: Arc<dyn CacheStore>,
    network: Arc<dyn Network>,
    host: Arc<dyn WorkerHost>,
    queue: Arc<dyn SubmissionQueue>,
    policy: InterceptionPolicy,
    lifecycle: Mutex<Lifecycle>,
}

impl ServiceWorker {
    /// Create a worker. Fails if the configuration is invalid.
    ///
    /// Background sync has no queue until
    /// [`with_submission_queue`](Self::with_submission_queue) provides one.
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn CacheStore>,
        network: Arc<dyn Network>,
        host: Arc<dyn WorkerHost>,
    ) -> Result<Self> {
        config.validate()?;
        let policy = InterceptionPolicy::new(&config, store.clone(), network.clone());
        Ok(Self {
            config,
            store,
            network,
            host,
            queue: Arc::new(UnimplementedSubmissionQueue),
            policy,
            lifecycle: Mutex::new(Lifecycle::new()),
        })
    }

    /// Use `queue` for background sync replay
    pub fn with_submission_queue(mut self, queue: Arc<dyn SubmissionQueue>) -> Self {
        self.queue = queue;
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Get current state
    pub fn state(&self) -> WorkerState {
        self.lifecycle.lock().state()
    }

    /// Route an event to its handler.
    ///
    /// Dynamic-cache writes deferred by earlier fetches are applied first,
    /// once their responses have gone back to the page.
    pub fn dispatch(&self, event: WorkerEvent) -> Result<WorkerOutcome> {
        let flushed = self.policy.flush_pending_writes();
        if flushed > 0 {
            log::debug!("[SW] Applied {} deferred cache writes", flushed);
        }

        Ok(match event {
            WorkerEvent::Install => WorkerOutcome::Installed(self.install()?),
            WorkerEvent::Activate => WorkerOutcome::Activated(self.activate()?),
            WorkerEvent::Fetch(request) => WorkerOutcome::Fetched(self.fetch(&request)),
            WorkerEvent::Push(event) => WorkerOutcome::Notified(self.push(&event)?),
            WorkerEvent::NotificationClick(event) => {
                WorkerOutcome::Clicked(self.notification_click(&event)?)
            }
            WorkerEvent::Message(event) => WorkerOutcome::Messaged(self.message(&event)?),
            WorkerEvent::Sync(event) => WorkerOutcome::Synced(self.sync(&event)?),
        })
    }

    /// Install: fill the static cache, then ask to activate right away.
    ///
    /// A failed pre-cache is logged and reported but does not fail the
    /// install.
    pub fn install(&self) -> Result<InstallReport> {
        self.lifecycle.lock().transition(WorkerState::Installing)?;
        log::info!("[SW] Installing...");

        log::info!("[SW] Caching static files");
        let report = match lifecycle::precache(&self.config, self.store.as_ref(), self.network.as_ref()) {
            Ok(cached) => InstallReport { cached, error: None },
            Err(e) => {
                log::error!("[SW] Error caching static files: {}", e);
                InstallReport {
                    cached: 0,
                    error: Some(e),
                }
            }
        };

        self.lifecycle.lock().transition(WorkerState::Installed)?;
        if let Err(e) = self.host.skip_waiting() {
            log::warn!("[SW] skip waiting failed: {}", e);
        }

        Ok(report)
    }

    /// Restart over a registration that is already active.
    ///
    /// The host calls this instead of install/activate when it starts the
    /// worker again after terminating it. Caches are used as they are.
    pub fn resume(&self) -> Result<()> {
        self.lifecycle.lock().resume()?;
        log::info!("[SW] Resumed active worker");
        Ok(())
    }

    /// Activate: drop caches from other versions, then claim open pages
    pub fn activate(&self) -> Result<ActivateReport> {
        self.lifecycle.lock().transition(WorkerState::Activating)?;
        log::info!("[SW] Activating...");

        let report = lifecycle::purge_stale_caches(&self.config, self.store.as_ref());

        self.lifecycle.lock().transition(WorkerState::Activated)?;
        if let Err(e) = self.host.claim_clients() {
            log::warn!("[SW] claiming clients failed: {}", e);
        }

        Ok(report)
    }

    /// Intercept a request. Only an activated worker intercepts.
    pub fn fetch(&self, request: &Request) -> FetchResult {
        if self.state() != WorkerState::Activated {
            log::debug!("[SW] Not active, passing through: {}", request.url);
            return FetchResult::Passthrough;
        }
        self.policy.handle(request)
    }

    /// Apply dynamic-cache writes queued by [`fetch`](Self::fetch)
    pub fn flush_pending_writes(&self) -> usize {
        self.policy.flush_pending_writes()
    }

    /// Writes still queued
    pub fn pending_writes(&self) -> usize {
        self.policy.pending_writes()
    }

    /// Show a notification for a push message
    pub fn push(&self, event: &PushEvent) -> Result<NotificationOptions> {
        let options = push::build_notification(&self.config.notification, event, self.host.now_ms());
        self.host
            .show_notification(&self.config.notification.title, &options)?;
        Ok(options)
    }

    /// Close the clicked notification and open the app unless dismissed
    pub fn notification_click(&self, event: &NotificationClickEvent) -> Result<ClickOutcome> {
        self.host.close_notification(event.notification_tag())?;

        let outcome = push::click_outcome(&self.config.notification, event);
        if let ClickOutcome::OpenWindow(url) = &outcome {
            self.host.open_window(url)?;
        }
        Ok(outcome)
    }

    /// Handle a page message. Returns the command acted on, if any.
    pub fn message(&self, event: &MessageEvent) -> Result<Option<WorkerMessage>> {
        let Some(command) = event.command() else {
            log::debug!("[SW] Ignoring message from {}", event.origin());
            return Ok(None);
        };

        match command {
            WorkerMessage::SkipWaiting => {
                if self.lifecycle.lock().can_skip_waiting() {
                    self.host.skip_waiting()?;
                } else {
                    log::debug!("[SW] skip waiting ignored in state {:?}", self.state());
                }
            }
            WorkerMessage::GetVersion => {
                let reply = VersionReply {
                    version: self.config.version.clone(),
                };
                match event.ports().first() {
                    Some(port) => self.host.post_message(*port, &reply.to_bytes())?,
                    None => log::warn!("[SW] GET_VERSION without a reply port"),
                }
            }
        }

        Ok(Some(command))
    }

    /// Replay deferred submissions for the background-sync tag
    pub fn sync(&self, event: &SyncEvent) -> Result<Option<SyncReport>> {
        if event.tag != self.config.sync_tag {
            return Ok(None);
        }

        match sync::replay_submissions(self.queue.as_ref(), self.network.as_ref()) {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                log::error!("[SW] Background sync error: {}", e);
                Err(e.into())
            }
        }
    }
}
