//! Background Sync
//!
//! Form submissions made while offline are parked in a durable
//! [`SubmissionQueue`] by the page. When the host fires the sync tag the
//! worker replays each one over the network and drops those the server
//! accepted. A failed replay is logged and left queued for the next sync;
//! it never stops the rest of the batch.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use spin::RwLock;

use crate::error::SyncError;
use crate::fetch::{Headers, Request, RequestMethod};
use crate::network::Network;

/// Sync event
#[derive(Debug, Clone)]
pub struct SyncEvent {
    /// Registration tag
    pub tag: String,
}

impl SyncEvent {
    /// Create new sync event
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// A form submission waiting to be replayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSubmission {
    pub id: u64,
    pub url: String,
    pub method: RequestMethod,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Option<Vec<u8>>,
}

impl PendingSubmission {
    /// The request that re-sends this submission
    pub fn to_request(&self) -> Request {
        Request {
            url: self.url.clone(),
            method: self.method,
            headers: self.headers.clone(),
            body: self.body.clone(),
            ..Request::new("")
        }
    }
}

/// Durable queue of deferred submissions
pub trait SubmissionQueue: Send + Sync {
    /// All queued submissions, oldest first
    fn pending(&self) -> Result<Vec<PendingSubmission>, SyncError>;

    /// Drop a submission once the server has accepted it
    fn remove(&self, id: u64) -> Result<(), SyncError>;
}

/// Queue for hosts with no durable storage; every read fails
pub struct UnimplementedSubmissionQueue;

impl SubmissionQueue for UnimplementedSubmissionQueue {
    fn pending(&self) -> Result<Vec<PendingSubmission>, SyncError> {
        Err(SyncError::QueueUnavailable)
    }

    fn remove(&self, _id: u64) -> Result<(), SyncError> {
        Err(SyncError::QueueUnavailable)
    }
}

/// In-memory submission queue
#[derive(Debug, Default)]
pub struct MemorySubmissionQueue {
    submissions: RwLock<BTreeMap<u64, PendingSubmission>>,
}

impl MemorySubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a submission, replacing one with the same id
    pub fn push(&self, submission: PendingSubmission) {
        self.submissions.write().insert(submission.id, submission);
    }

    pub fn len(&self) -> usize {
        self.submissions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.read().is_empty()
    }

    /// Ids still queued
    pub fn ids(&self) -> Vec<u64> {
        self.submissions.read().keys().copied().collect()
    }
}

impl SubmissionQueue for MemorySubmissionQueue {
    fn pending(&self) -> Result<Vec<PendingSubmission>, SyncError> {
        Ok(self.submissions.read().values().cloned().collect())
    }

    fn remove(&self, id: u64) -> Result<(), SyncError> {
        log::debug!("[SW] Removing pending submission: {}", id);
        self.submissions.write().remove(&id);
        Ok(())
    }
}

/// Outcome of one replay pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Accepted by the server and removed from the queue
    pub replayed: Vec<u64>,
    /// No response from the network
    pub failed: Vec<u64>,
    /// Answered with a non-ok status, left queued
    pub kept: Vec<u64>,
}

/// Replay every queued submission once
pub fn replay_submissions(queue: &dyn SubmissionQueue, network: &dyn Network) -> Result<SyncReport, SyncError> {
    let pending = queue.pending()?;
    let mut report = SyncReport::default();

    for submission in pending {
        match network.fetch(&submission.to_request()) {
            Ok(response) if response.ok() => match queue.remove(submission.id) {
                Ok(()) => {
                    log::info!("[SW] Background sync successful for: {}", submission.url);
                    report.replayed.push(submission.id);
                }
                Err(e) => {
                    log::warn!("[SW] Could not dequeue submission {}: {}", submission.id, e);
                    report.kept.push(submission.id);
                }
            },
            Ok(response) => {
                log::info!(
                    "[SW] Background sync for {} answered {}, keeping it queued",
                    submission.url,
                    response.status
                );
                report.kept.push(submission.id);
            }
            Err(e) => {
                log::info!("[SW] Background sync failed for: {} ({})", submission.url, e);
                report.failed.push(submission.id);
            }
        }
    }

    Ok(report)
}
