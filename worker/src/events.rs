//! Worker Events
//!
//! Host events the worker consumes and what handling each one produced.

use crate::fetch::Request;
use crate::lifecycle::{ActivateReport, InstallReport};
use crate::message::{MessageEvent, WorkerMessage};
use crate::policy::FetchResult;
use crate::push::{ClickOutcome, NotificationClickEvent, NotificationOptions, PushEvent};
use crate::sync::{SyncEvent, SyncReport};

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Install,
    Activate,
    Fetch,
    Push,
    NotificationClick,
    Message,
    Sync,
}

/// An event delivered by the host
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    Push(PushEvent),
    NotificationClick(NotificationClickEvent),
    Message(MessageEvent),
    Sync(SyncEvent),
}

impl WorkerEvent {
    /// Get event type
    pub fn event_type(&self) -> EventType {
        match self {
            WorkerEvent::Install => EventType::Install,
            WorkerEvent::Activate => EventType::Activate,
            WorkerEvent::Fetch(_) => EventType::Fetch,
            WorkerEvent::Push(_) => EventType::Push,
            WorkerEvent::NotificationClick(_) => EventType::NotificationClick,
            WorkerEvent::Message(_) => EventType::Message,
            WorkerEvent::Sync(_) => EventType::Sync,
        }
    }
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetched(FetchResult),
    Notified(NotificationOptions),
    Clicked(ClickOutcome),
    /// The decoded command, or `None` if the message was ignored
    Messaged(Option<WorkerMessage>),
    /// The replay report, or `None` for a tag the worker does not handle
    Synced(Option<SyncReport>),
}
