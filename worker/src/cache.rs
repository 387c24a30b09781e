//! Cache Storage
//!
//! The worker never touches storage directly; it goes through the
//! [`CacheStore`] capability so a host can back it with whatever
//! persistence it has. [`MemoryCacheStore`] is the in-process
//! implementation used by tests and by hosts without durable storage.
//!
//! Entries are keyed on method + URL (fragment dropped). A stored response
//! carrying `Vary` only matches requests whose varied header values equal
//! the ones recorded at store time.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;
use spin::RwLock;

use crate::error::CacheError;
use crate::fetch::{strip_fragment, Headers, Request, RequestMethod, Response};

/// Key a request is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: RequestMethod,
    url: String,
}

impl CacheKey {
    /// Build the key for a request
    pub fn for_request(request: &Request) -> Self {
        Self {
            method: request.method,
            url: strip_fragment(&request.url).to_string(),
        }
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A stored request/response pair
#[derive(Debug, Clone)]
struct CachedEntry {
    /// Request headers named by the response's `Vary`, captured at store time
    varied: Headers,
    /// `Vary: *` was present; such entries never match
    vary_any: bool,
    response: Response,
    size: usize,
}

impl CachedEntry {
    fn new(request: &Request, response: Response) -> Self {
        let vary = response.vary();
        let vary_any = vary.iter().any(|name| name == "*");
        let varied = vary
            .iter()
            .filter_map(|name| request.headers.get(name).map(|v| (name.as_str(), v.to_string())))
            .collect();
        let size = entry_size(&response);
        Self {
            varied,
            vary_any,
            response,
            size,
        }
    }

    fn matches(&self, request: &Request) -> bool {
        if self.vary_any {
            return false;
        }
        self.response
            .vary()
            .iter()
            .all(|name| request.headers.get(name) == self.varied.get(name))
    }
}

fn entry_size(response: &Response) -> usize {
    let headers: usize = response.headers.iter().map(|(k, v)| k.len() + v.len()).sum();
    response.body.len() + headers + response.url.len()
}

/// A named cache partition
#[derive(Debug, Default)]
struct Namespace {
    entries: HashMap<CacheKey, Vec<CachedEntry>>,
    total_size: usize,
}

impl Namespace {
    fn lookup(&self, request: &Request) -> Option<&CachedEntry> {
        self.entries
            .get(&CacheKey::for_request(request))?
            .iter()
            .find(|entry| entry.matches(request))
    }

    /// Bytes held by the entries a put of `request` would replace
    fn replaced_size(&self, request: &Request) -> usize {
        self.entries
            .get(&CacheKey::for_request(request))
            .map(|slot| slot.iter().filter(|e| e.matches(request)).map(|e| e.size).sum())
            .unwrap_or(0)
    }

    fn insert(&mut self, request: &Request, response: Response) {
        let entry = CachedEntry::new(request, response);
        let added = entry.size;
        let slot = self.entries.entry(CacheKey::for_request(request)).or_default();

        // Replace whatever this request would have matched
        let mut freed = 0;
        slot.retain(|old| {
            if old.matches(request) {
                freed += old.size;
                false
            } else {
                true
            }
        });
        slot.push(entry);

        self.total_size = self.total_size + added - freed;
    }

    fn len(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }
}

/// Cache store capability.
///
/// Mirrors the host cache API: namespaces are opened (created on first
/// open), listed and deleted by name; entries are put one at a time or in
/// one atomic bulk operation and looked up by exact request match.
pub trait CacheStore: Send + Sync {
    /// Open (or create) a namespace
    fn open(&self, name: &str) -> Result<(), CacheError>;

    /// Check if a namespace exists
    fn has(&self, name: &str) -> bool;

    /// All namespace names, in creation order
    fn keys(&self) -> Vec<String>;

    /// Delete a namespace with all its entries. Returns whether it existed.
    fn delete(&self, name: &str) -> Result<bool, CacheError>;

    /// Store one entry in an open namespace, replacing any match
    fn put(&self, name: &str, request: &Request, response: Response) -> Result<(), CacheError>;

    /// Store several entries at once; either all are stored or none
    fn put_all(&self, name: &str, entries: Vec<(Request, Response)>) -> Result<(), CacheError>;

    /// Exact-match lookup in one namespace
    fn match_in(&self, name: &str, request: &Request) -> Option<Response>;

    /// Exact-match lookup across every namespace, first hit in creation order
    fn match_any(&self, request: &Request) -> Option<Response>;
}

/// Only GET requests over http(s) can be stored
fn check_cacheable(request: &Request) -> Result<(), CacheError> {
    let http = request.parsed_url().map(|u| u.is_http()).unwrap_or(false);
    if request.method != RequestMethod::Get || !http {
        return Err(CacheError::InvalidRequest(request.url.clone()));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct MemoryInner {
    /// Namespace names in creation order
    order: Vec<String>,
    caches: HashMap<String, Namespace>,
}

impl MemoryInner {
    fn usage(&self) -> usize {
        self.caches.values().map(|c| c.total_size).sum()
    }
}

/// In-memory cache store
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    inner: RwLock<MemoryInner>,
    /// Byte quota across all namespaces; `None` means unlimited
    quota: Option<usize>,
}

impl MemoryCacheStore {
    /// Create an unlimited store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes beyond `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            inner: RwLock::new(MemoryInner::default()),
            quota: Some(bytes),
        }
    }

    /// Number of entries in a namespace (0 if it does not exist)
    pub fn entry_count(&self, name: &str) -> usize {
        self.inner.read().caches.get(name).map(|c| c.len()).unwrap_or(0)
    }

    /// URLs stored in a namespace, sorted
    pub fn urls(&self, name: &str) -> Vec<String> {
        let inner = self.inner.read();
        let mut urls: Vec<String> = inner
            .caches
            .get(name)
            .map(|c| c.entries.keys().map(|k| k.url.clone()).collect())
            .unwrap_or_default();
        urls.sort();
        urls
    }

    /// Total bytes stored
    pub fn usage(&self) -> usize {
        self.inner.read().usage()
    }

    fn check_quota(&self, usage: usize, incoming: usize) -> Result<(), CacheError> {
        match self.quota {
            Some(quota) if usage + incoming > quota => Err(CacheError::QuotaExceeded),
            _ => Ok(()),
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn open(&self, name: &str) -> Result<(), CacheError> {
        let mut inner = self.inner.write();
        if !inner.caches.contains_key(name) {
            inner.order.push(name.to_string());
            inner.caches.insert(name.to_string(), Namespace::default());
        }
        Ok(())
    }

    fn has(&self, name: &str) -> bool {
        self.inner.read().caches.contains_key(name)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let mut inner = self.inner.write();
        if inner.caches.remove(name).is_some() {
            inner.order.retain(|n| n != name);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn put(&self, name: &str, request: &Request, response: Response) -> Result<(), CacheError> {
        check_cacheable(request)?;
        let mut inner = self.inner.write();
        let usage = inner.usage();
        let cache = inner.caches.get_mut(name).ok_or(CacheError::NotFound)?;
        self.check_quota(usage - cache.replaced_size(request), entry_size(&response))?;
        cache.insert(request, response);
        Ok(())
    }

    fn put_all(&self, name: &str, entries: Vec<(Request, Response)>) -> Result<(), CacheError> {
        for (request, _) in &entries {
            check_cacheable(request)?;
        }
        let incoming = entries.iter().map(|(_, r)| entry_size(r)).sum();

        // Validate everything before the first insert so a failure leaves
        // the namespace untouched
        let mut inner = self.inner.write();
        let usage = inner.usage();
        self.check_quota(usage, incoming)?;
        let cache = inner.caches.get_mut(name).ok_or(CacheError::NotFound)?;
        for (request, response) in entries {
            cache.insert(&request, response);
        }
        Ok(())
    }

    fn match_in(&self, name: &str, request: &Request) -> Option<Response> {
        let inner = self.inner.read();
        inner
            .caches
            .get(name)?
            .lookup(request)
            .map(|e| e.response.clone())
    }

    fn match_any(&self, request: &Request) -> Option<Response> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|name| inner.caches.get(name))
            .find_map(|cache| cache.lookup(request))
            .map(|e| e.response.clone())
    }
}
