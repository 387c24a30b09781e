//! Worker Lifecycle
//!
//! State transitions plus the two pieces of work tied to them: filling the
//! static cache at install and purging stale caches at activation.

use alloc::string::String;
use alloc::vec::Vec;

use crate::cache::CacheStore;
use crate::config::WorkerConfig;
use crate::error::{PrecacheError, WorkerError};
use crate::fetch::Request;
use crate::network::Network;

/// Worker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Script evaluated, nothing run yet
    Parsed,
    /// Install handler running
    Installing,
    /// Installed, waiting to activate
    Installed,
    /// Activate handler running
    Activating,
    /// Active and controlling pages
    Activated,
    /// Failed or replaced
    Redundant,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::Parsed
    }
}

/// Check if a state transition is valid
fn is_valid_transition(from: WorkerState, to: WorkerState) -> bool {
    use WorkerState::*;

    matches!(
        (from, to),
        (Parsed, Installing)
            | (Installing, Installed)
            | (Installing, Redundant)
            | (Installed, Activating)
            | (Activating, Activated)
            | (Activating, Redundant)
            | (Activated, Redundant)
    )
}

/// Lifecycle state of one worker
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: WorkerState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Move to `to`. Returns the previous state.
    pub fn transition(&mut self, to: WorkerState) -> Result<WorkerState, WorkerError> {
        let from = self.state;
        if !is_valid_transition(from, to) {
            return Err(WorkerError::InvalidStateTransition { from, to });
        }
        self.state = to;
        log::debug!("[SW] State {:?} -> {:?}", from, to);
        Ok(from)
    }

    /// Bring a freshly started worker straight to `Activated`.
    ///
    /// The host may stop a worker between events and start it again later;
    /// the registration is still active and its caches are already filled,
    /// so install and activate are not run again.
    pub fn resume(&mut self) -> Result<WorkerState, WorkerError> {
        let from = self.state;
        if from != WorkerState::Parsed {
            return Err(WorkerError::InvalidStateTransition {
                from,
                to: WorkerState::Activated,
            });
        }
        self.state = WorkerState::Activated;
        log::debug!("[SW] State {:?} -> {:?} (resumed)", from, self.state);
        Ok(from)
    }

    /// Whether skip-waiting still has an effect. Only before activation.
    pub fn can_skip_waiting(&self) -> bool {
        matches!(self.state, WorkerState::Installing | WorkerState::Installed)
    }
}

/// Outcome of the install handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Entries written to the static cache
    pub cached: usize,
    /// Why population was abandoned, if it was
    pub error: Option<PrecacheError>,
}

/// Outcome of the activate handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    /// Namespaces deleted
    pub deleted: Vec<String>,
    /// Namespaces kept
    pub kept: Vec<String>,
}

/// Fetch every static asset and store them in one bulk write.
///
/// All-or-nothing: the first failed fetch or non-ok status abandons the
/// whole batch and nothing from the asset list is stored.
pub fn precache(
    config: &WorkerConfig,
    store: &dyn CacheStore,
    network: &dyn Network,
) -> Result<usize, PrecacheError> {
    store
        .open(&config.static_cache)
        .map_err(PrecacheError::Cache)?;

    let mut entries = Vec::with_capacity(config.static_assets.len());
    for url in config.static_asset_urls() {
        let request = Request::new(url);
        let response = network
            .fetch(&request)
            .map_err(|error| PrecacheError::Network {
                url: request.url.clone(),
                error,
            })?;
        if !response.ok() {
            return Err(PrecacheError::BadStatus {
                url: request.url,
                status: response.status,
            });
        }
        entries.push((request, response));
    }

    let count = entries.len();
    store
        .put_all(&config.static_cache, entries)
        .map_err(PrecacheError::Cache)?;
    Ok(count)
}

/// Delete every namespace other than the current static and dynamic ones.
///
/// A failed delete is logged and the namespace reported as kept.
pub fn purge_stale_caches(config: &WorkerConfig, store: &dyn CacheStore) -> ActivateReport {
    let mut report = ActivateReport::default();

    for name in store.keys() {
        if config.is_current_cache(&name) {
            report.kept.push(name);
            continue;
        }

        log::info!("[SW] Deleting old cache: {}", name);
        match store.delete(&name) {
            Ok(_) => report.deleted.push(name),
            Err(e) => {
                log::warn!("[SW] Failed to delete cache {}: {}", name, e);
                report.kept.push(name);
            }
        }
    }

    report
}
