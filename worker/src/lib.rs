//! Criminology Management System offline worker
//!
//! The service worker behind the CMS web app. It pre-caches the app shell
//! on install, drops caches left by older versions on activate and answers
//! fetches from cache or network so the app keeps working offline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          Host (browser runtime)         │
//! └───────────────────┬─────────────────────┘
//!                     │ WorkerEvent
//! ┌───────────────────▼─────────────────────┐
//! │        ServiceWorker (dispatch)         │
//! │  ┌─────────┐ ┌────────┐ ┌─────┐ ┌────┐  │
//! │  │lifecycle│ │ policy │ │push │ │sync│  │
//! │  └────┬────┘ └───┬────┘ └──┬──┘ └─┬──┘  │
//! └───────┼──────────┼─────────┼──────┼─────┘
//!         │          │         │      │
//!    CacheStore   Network   WorkerHost  SubmissionQueue
//! ```
//!
//! # Modules
//!
//! - `cache`: Named cache namespaces and the in-memory store
//! - `config`: Cache names, asset lists and routes
//! - `fetch`: Request, response and URL types
//! - `lifecycle`: Install/activate state machine, pre-cache and purge
//! - `policy`: Fetch interception and offline fallback
//! - `push`: Push notifications and clicks
//! - `message`: Page-to-worker commands
//! - `sync`: Background replay of offline form submissions
//! - `host`: Controls the worker issues to its host
//! - `worker`: The event dispatcher tying it together

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod host;
pub mod lifecycle;
pub mod message;
pub mod network;
pub mod policy;
pub mod push;
pub mod sync;
pub mod worker;

// Re-exports for convenience
pub use cache::{CacheStore, MemoryCacheStore};
pub use config::{CacheWriteMode, NotificationConfig, WorkerConfig};
pub use error::{
    CacheError, ConfigError, HostError, NetworkError, PrecacheError, Result, SyncError, WorkerError,
};
pub use events::{EventType, WorkerEvent, WorkerOutcome};
pub use fetch::{Headers, Request, RequestMethod, RequestMode, Response, ResponseType};
pub use host::{HostControl, MessagePortId, RecordingHost, WorkerHost};
pub use lifecycle::{ActivateReport, InstallReport, WorkerState};
pub use message::{MessageEvent, WorkerMessage};
pub use network::{Network, OfflineNetwork};
pub use policy::{FetchResponse, FetchResult, FetchSource, InterceptionPolicy};
pub use push::{ClickOutcome, NotificationClickEvent, NotificationOptions, PushEvent};
pub use sync::{MemorySubmissionQueue, PendingSubmission, SubmissionQueue, SyncEvent, SyncReport};
pub use worker::ServiceWorker;
