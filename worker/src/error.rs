//! Worker error types

use alloc::string::String;
use core::fmt;

use crate::lifecycle::WorkerState;

/// Cache store errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Namespace does not exist
    NotFound,
    /// Storage quota exceeded
    QuotaExceeded,
    /// Request cannot be used as a cache key
    InvalidRequest(String),
    /// Backing storage failure
    Storage(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::NotFound => write!(f, "cache not found"),
            CacheError::QuotaExceeded => write!(f, "cache quota exceeded"),
            CacheError::InvalidRequest(url) => write!(f, "request not cacheable: {}", url),
            CacheError::Storage(msg) => write!(f, "cache storage error: {}", msg),
        }
    }
}

/// Network error kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// No connectivity at all
    Offline,
    /// Request timed out
    TimedOut,
    /// Host name could not be resolved
    DnsLookupFailed,
    /// Peer refused the connection
    ConnectionRefused,
    /// Request was abandoned by the caller
    Aborted,
    /// Anything else
    Other(String),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::Offline => write!(f, "network offline"),
            NetworkError::TimedOut => write!(f, "request timed out"),
            NetworkError::DnsLookupFailed => write!(f, "DNS lookup failed"),
            NetworkError::ConnectionRefused => write!(f, "connection refused"),
            NetworkError::Aborted => write!(f, "request aborted"),
            NetworkError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Static asset pre-cache failures.
///
/// Any one of these aborts population of the whole static namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrecacheError {
    /// An asset could not be fetched
    Network { url: String, error: NetworkError },
    /// An asset was fetched but the status was not ok
    BadStatus { url: String, status: u16 },
    /// The bulk store failed
    Cache(CacheError),
}

impl fmt::Display for PrecacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrecacheError::Network { url, error } => write!(f, "fetch of {} failed: {}", url, error),
            PrecacheError::BadStatus { url, status } => {
                write!(f, "fetch of {} returned status {}", url, status)
            }
            PrecacheError::Cache(e) => write!(f, "bulk store failed: {}", e),
        }
    }
}

/// Host control errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host does not support this control
    Unsupported,
    /// The host refused the control
    Rejected(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Unsupported => write!(f, "operation not supported by host"),
            HostError::Rejected(msg) => write!(f, "host rejected operation: {}", msg),
        }
    }
}

/// Background sync errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No durable queue is available on this host
    QueueUnavailable,
    /// The queue failed to read or update
    Queue(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::QueueUnavailable => write!(f, "submission queue not available"),
            SyncError::Queue(msg) => write!(f, "submission queue error: {}", msg),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// JSON could not be parsed
    Parse(String),
    /// Origin is not an absolute http(s) origin
    InvalidOrigin(String),
    /// A namespace name is empty
    EmptyNamespace,
    /// Static and dynamic namespaces share a name
    DuplicateNamespace(String),
    /// Dynamic route is not an absolute path
    InvalidRoute(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "invalid config: {}", msg),
            ConfigError::InvalidOrigin(origin) => write!(f, "invalid origin: {}", origin),
            ConfigError::EmptyNamespace => write!(f, "cache namespace name is empty"),
            ConfigError::DuplicateNamespace(name) => {
                write!(f, "static and dynamic caches both named {}", name)
            }
            ConfigError::InvalidRoute(route) => write!(f, "dynamic route must start with '/': {}", route),
        }
    }
}

/// Worker error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Lifecycle transition not allowed from the current state
    InvalidStateTransition { from: WorkerState, to: WorkerState },
    /// Cache store error
    Cache(CacheError),
    /// Network error
    Network(NetworkError),
    /// Host control error
    Host(HostError),
    /// Background sync error
    Sync(SyncError),
    /// Configuration error
    Config(ConfigError),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::InvalidStateTransition { from, to } => {
                write!(f, "invalid state transition: {:?} -> {:?}", from, to)
            }
            WorkerError::Cache(e) => write!(f, "Cache error: {}", e),
            WorkerError::Network(e) => write!(f, "Network error: {}", e),
            WorkerError::Host(e) => write!(f, "Host error: {}", e),
            WorkerError::Sync(e) => write!(f, "Sync error: {}", e),
            WorkerError::Config(e) => write!(f, "Config error: {}", e),
        }
    }
}

impl From<CacheError> for WorkerError {
    fn from(e: CacheError) -> Self {
        WorkerError::Cache(e)
    }
}

impl From<NetworkError> for WorkerError {
    fn from(e: NetworkError) -> Self {
        WorkerError::Network(e)
    }
}

impl From<HostError> for WorkerError {
    fn from(e: HostError) -> Self {
        WorkerError::Host(e)
    }
}

impl From<SyncError> for WorkerError {
    fn from(e: SyncError) -> Self {
        WorkerError::Sync(e)
    }
}

impl From<ConfigError> for WorkerError {
    fn from(e: ConfigError) -> Self {
        WorkerError::Config(e)
    }
}

/// Result type for worker operations
pub type Result<T> = core::result::Result<T, WorkerError>;
