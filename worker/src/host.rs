//! Host controls
//!
//! Everything the worker asks of the browser runtime goes through
//! [`WorkerHost`]: lifecycle controls, windows, notifications, message
//! replies and the wall clock.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

use crate::error::HostError;
use crate::push::NotificationOptions;

/// Handle of a message port transferred with a message
pub type MessagePortId = u64;

/// Lifecycle and UI controls provided by the host runtime
pub trait WorkerHost: Send + Sync {
    /// Activate the installed worker without waiting for open pages to close
    fn skip_waiting(&self) -> Result<(), HostError>;

    /// Take control of every open page in scope
    fn claim_clients(&self) -> Result<(), HostError>;

    /// Open a new window at `url`
    fn open_window(&self, url: &str) -> Result<(), HostError>;

    /// Display a system notification
    fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<(), HostError>;

    /// Dismiss a displayed notification
    fn close_notification(&self, tag: Option<&str>) -> Result<(), HostError>;

    /// Send a reply on a message port
    fn post_message(&self, port: MessagePortId, payload: &[u8]) -> Result<(), HostError>;

    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;
}

/// A control the worker issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostControl {
    SkipWaiting,
    ClaimClients,
    OpenWindow(String),
    ShowNotification { title: String, options: NotificationOptions },
    CloseNotification(Option<String>),
    PostMessage { port: MessagePortId, payload: Vec<u8> },
}

/// Host that records every control instead of acting on it.
///
/// Used for tests and dry runs; the clock is set by hand.
#[derive(Debug, Default)]
pub struct RecordingHost {
    controls: Mutex<Vec<HostControl>>,
    clock: AtomicU64,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value returned by [`WorkerHost::now_ms`]
    pub fn set_now(&self, ms: u64) {
        self.clock.store(ms, Ordering::SeqCst);
    }

    /// Controls issued so far, oldest first
    pub fn controls(&self) -> Vec<HostControl> {
        self.controls.lock().clone()
    }

    /// Drain the recorded controls
    pub fn take_controls(&self) -> Vec<HostControl> {
        core::mem::take(&mut *self.controls.lock())
    }

    fn record(&self, control: HostControl) -> Result<(), HostError> {
        self.controls.lock().push(control);
        Ok(())
    }
}

impl WorkerHost for RecordingHost {
    fn skip_waiting(&self) -> Result<(), HostError> {
        self.record(HostControl::SkipWaiting)
    }

    fn claim_clients(&self) -> Result<(), HostError> {
        self.record(HostControl::ClaimClients)
    }

    fn open_window(&self, url: &str) -> Result<(), HostError> {
        self.record(HostControl::OpenWindow(url.to_string()))
    }

    fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<(), HostError> {
        self.record(HostControl::ShowNotification {
            title: title.to_string(),
            options: options.clone(),
        })
    }

    fn close_notification(&self, tag: Option<&str>) -> Result<(), HostError> {
        self.record(HostControl::CloseNotification(tag.map(|t| t.to_string())))
    }

    fn post_message(&self, port: MessagePortId, payload: &[u8]) -> Result<(), HostError> {
        self.record(HostControl::PostMessage {
            port,
            payload: payload.to_vec(),
        })
    }

    fn now_ms(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }
}
