//! Network capability
//!
//! The host performs the actual HTTP exchange; the worker only sees a
//! response or a failure.

use crate::error::NetworkError;
use crate::fetch::{Request, Response};

/// Network fetch capability
pub trait Network: Send + Sync {
    /// Issue the request. A response with any status is `Ok`; only the
    /// absence of a response is an error.
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// A network that is always unreachable
pub struct OfflineNetwork;

impl Network for OfflineNetwork {
    fn fetch(&self, _request: &Request) -> Result<Response, NetworkError> {
        Err(NetworkError::Offline)
    }
}

impl<F> Network for F
where
    F: Fn(&Request) -> Result<Response, NetworkError> + Send + Sync,
{
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self(request)
    }
}
