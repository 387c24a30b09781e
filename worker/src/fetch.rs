//! Fetch Primitives
//!
//! Request and response types seen by the worker, plus the little URL
//! handling the interception policy needs (scheme, origin, path).

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Default for RequestMethod {
    fn default() -> Self {
        Self::Get
    }
}

impl RequestMethod {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
        }
    }

    /// Parse a method name (case-insensitive)
    pub fn parse(method: &str) -> Option<Self> {
        [
            Self::Get,
            Self::Head,
            Self::Post,
            Self::Put,
            Self::Delete,
            Self::Patch,
            Self::Options,
        ]
        .into_iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(method))
    }
}

/// Request mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Subresource or script fetch
    Cors,
    /// Top-level page navigation
    Navigate,
}

impl Default for RequestMode {
    fn default() -> Self {
        Self::Cors
    }
}

/// Header list with case-insensitive names.
///
/// Names are stored lower-cased; setting a name again replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// Create an empty header list
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a header, replacing any previous value
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Get a header value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    /// Check whether a header is present
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    /// Iterate `(name, value)` pairs, names lower-cased
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name.as_ref(), value);
        }
        headers
    }
}

impl From<BTreeMap<String, String>> for Headers {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Headers> for BTreeMap<String, String> {
    fn from(headers: Headers) -> Self {
        headers.0
    }
}

/// Borrowed view of an absolute URL.
///
/// Only splits what the worker looks at; no percent-decoding and no
/// normalization beyond dropping the fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Url<'a> {
    scheme: &'a str,
    authority: &'a str,
    path: &'a str,
    query: Option<&'a str>,
}

impl<'a> Url<'a> {
    /// Split an absolute URL. Returns `None` when there is no scheme.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let colon = raw.find(':')?;
        let scheme = &raw[..colon];
        let scheme_ok = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return None;
        }

        let rest = strip_fragment(&raw[colon + 1..]);
        let (authority, rest) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after
                    .find(|c| matches!(c, '/' | '?'))
                    .unwrap_or(after.len());
                (&after[..end], &after[end..])
            }
            None => ("", rest),
        };
        let (path, query) = match rest.find('?') {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };

        Some(Self {
            scheme,
            authority,
            path,
            query,
        })
    }

    /// Scheme without the trailing `:`
    pub fn scheme(&self) -> &'a str {
        self.scheme
    }

    /// Whether the scheme is `http` or `https`
    pub fn is_http(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("http") || self.scheme.eq_ignore_ascii_case("https")
    }

    /// Host and optional port
    pub fn authority(&self) -> &'a str {
        self.authority
    }

    /// Path component; `/` for hierarchical URLs with an empty path
    pub fn path(&self) -> &'a str {
        if self.path.is_empty() && !self.authority.is_empty() {
            "/"
        } else {
            self.path
        }
    }

    /// Query string without the leading `?`
    pub fn query(&self) -> Option<&'a str> {
        self.query
    }

    /// `scheme://authority`
    pub fn origin(&self) -> String {
        alloc::format!("{}://{}", self.scheme.to_ascii_lowercase(), self.authority.to_ascii_lowercase())
    }
}

/// Drop the `#fragment` part of a URL.
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// Resolve a path-absolute reference (`/static/...`) against an origin.
/// Anything else is returned as-is.
pub fn resolve(origin: &str, reference: &str) -> String {
    if reference.starts_with('/') && !reference.starts_with("//") {
        let mut url = String::with_capacity(origin.len() + reference.len());
        url.push_str(origin.trim_end_matches('/'));
        url.push_str(reference);
        url
    } else {
        reference.to_string()
    }
}

/// Fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Absolute request URL
    pub url: String,
    /// HTTP method
    pub method: RequestMethod,
    /// Request headers
    pub headers: Headers,
    /// Request body (if any)
    pub body: Option<Vec<u8>>,
    /// Request mode
    pub mode: RequestMode,
}

impl Request {
    /// Create a new GET request
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::Get,
            headers: Headers::new(),
            body: None,
            mode: RequestMode::Cors,
        }
    }

    /// Create a page navigation, as the host issues for a top-level load
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::new(url)
            .with_mode(RequestMode::Navigate)
            .with_header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
    }

    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether this is a top-level navigation
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// The `Accept` header, if sent
    pub fn accept(&self) -> Option<&str> {
        self.headers.get("accept")
    }

    /// Split the request URL
    pub fn parsed_url(&self) -> Option<Url<'_>> {
        Url::parse(&self.url)
    }
}

/// Response type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Same-origin response
    Basic,
    /// Cross-origin response with CORS headers exposed
    Cors,
    /// Synthesized by the worker
    Default,
    /// Network error
    Error,
    /// Cross-origin no-cors response
    Opaque,
    /// Manual-redirect passthrough
    OpaqueRedirect,
}

impl Default for ResponseType {
    fn default() -> Self {
        Self::Default
    }
}

/// Fetch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response type
    pub response_type: ResponseType,
    /// Final URL
    pub url: String,
    /// Status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers
    pub headers: Headers,
    /// Response body
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response
    pub fn new(status: u16) -> Self {
        Self {
            response_type: ResponseType::Default,
            url: String::new(),
            status,
            status_text: status_text_for(status).to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Create a same-origin response, as the network returns for the app's own routes
    pub fn basic(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let mut response = Self::new(status);
        response.response_type = ResponseType::Basic;
        response.body = body.into();
        response
    }

    /// Create error response
    pub fn error() -> Self {
        Self {
            response_type: ResponseType::Error,
            status: 0,
            status_text: String::new(),
            ..Self::new(0)
        }
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Check if response is OK
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Header names listed in `Vary`, lower-cased. `*` is kept as-is.
    pub fn vary(&self) -> Vec<String> {
        self.headers
            .get("vary")
            .map(|v| {
                v.split(',')
                    .map(|name| name.trim().to_ascii_lowercase())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Get status text for status code
fn status_text_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}
