//! Worker configuration
//!
//! [`WorkerConfig::default`] carries the values the Criminology Management
//! System ships with. Hosts may override any of them from JSON.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fetch::{resolve, Url};

/// Superseded general cache; its name doubles as the reported version
pub const LEGACY_CACHE_NAME: &str = "criminology-ms-v1";
/// Pre-cached static assets
pub const STATIC_CACHE_NAME: &str = "criminology-static-v1";
/// Opportunistically cached network responses
pub const DYNAMIC_CACHE_NAME: &str = "criminology-dynamic-v1";

/// Default application origin (Flask development server)
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:5000";

/// Document served to navigations while offline
pub const OFFLINE_FALLBACK: &str = "/";

/// Background sync tag that triggers submission replay
pub const SYNC_TAG: &str = "background-sync";

/// Assets fetched into the static cache at install time
pub const STATIC_ASSETS: &[&str] = &[
    "/",
    "/static/css/bootstrap.min.css",
    "/static/css/style.css",
    "/static/js/main.js",
    "/static/images/favicon.ico",
    "/static/images/icon-192x192.png",
    "/static/images/icon-512x512.png",
    "/static/manifest.json",
    // AdminLTE
    "/static/dist/css/adminlte.min.css",
    "/static/dist/js/adminlte.min.js",
    // FontAwesome
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css",
    // Bootstrap
    "https://cdn.jsdelivr.net/npm/bootstrap/dist/css/bootstrap.min.css",
    "https://cdn.jsdelivr.net/npm/bootstrap/dist/js/bootstrap.bundle.min.js",
    // jQuery
    "https://code.jquery.com/jquery-3.6.0.min.js",
];

/// Routes cached dynamically even without an asset-like path
pub const DYNAMIC_ROUTES: &[&str] = &[
    "/home",
    "/add_user",
    "/search_record",
    "/user_details",
    "/admin-login",
    "/super_admin_login",
    "/judge-login",
    "/about-us",
    "/contact-us",
];

/// When dynamic-cache writes happen relative to returning the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheWriteMode {
    /// Queue the write and return at once; the host drains the queue later
    Deferred,
    /// Finish the write before returning
    Immediate,
}

impl Default for CacheWriteMode {
    fn default() -> Self {
        Self::Deferred
    }
}

/// Push notification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub title: String,
    /// Body used when the push carries no text
    pub default_body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// URL opened when a notification is clicked
    pub open_url: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Criminology Management System".to_string(),
            default_body: "New notification from Criminology Management System".to_string(),
            icon: "/static/images/icon-192x192.png".to_string(),
            badge: "/static/images/icon-192x192.png".to_string(),
            vibrate: alloc::vec![100, 50, 100],
            open_url: "/".to_string(),
        }
    }
}

/// Worker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Origin relative paths resolve against
    pub origin: String,
    /// Version string reported over the message channel
    pub version: String,
    /// Current static cache name
    pub static_cache: String,
    /// Current dynamic cache name
    pub dynamic_cache: String,
    /// Assets pre-cached at install, in order
    pub static_assets: Vec<String>,
    /// Exact paths always eligible for dynamic caching
    pub dynamic_routes: Vec<String>,
    /// Cached document served to offline navigations
    pub offline_fallback: String,
    pub write_mode: CacheWriteMode,
    pub sync_tag: String,
    pub notification: NotificationConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            version: LEGACY_CACHE_NAME.to_string(),
            static_cache: STATIC_CACHE_NAME.to_string(),
            dynamic_cache: DYNAMIC_CACHE_NAME.to_string(),
            static_assets: STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            dynamic_routes: DYNAMIC_ROUTES.iter().map(|s| s.to_string()).collect(),
            offline_fallback: OFFLINE_FALLBACK.to_string(),
            write_mode: CacheWriteMode::default(),
            sync_tag: SYNC_TAG.to_string(),
            notification: NotificationConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// Default configuration for another origin
    pub fn for_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_write_mode(mut self, mode: CacheWriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn with_static_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.static_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cache_names(mut self, static_cache: &str, dynamic_cache: &str) -> Self {
        self.static_cache = static_cache.to_string();
        self.dynamic_cache = dynamic_cache.to_string();
        self
    }

    /// Check the invariants the handlers rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin_ok = Url::parse(&self.origin)
            .map(|u| u.is_http() && !u.authority().is_empty())
            .unwrap_or(false);
        if !origin_ok {
            return Err(ConfigError::InvalidOrigin(self.origin.clone()));
        }
        if self.static_cache.is_empty() || self.dynamic_cache.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        if self.static_cache == self.dynamic_cache {
            return Err(ConfigError::DuplicateNamespace(self.static_cache.clone()));
        }
        if let Some(route) = self.dynamic_routes.iter().find(|r| !r.starts_with('/')) {
            return Err(ConfigError::InvalidRoute(route.clone()));
        }
        Ok(())
    }

    /// Whether `name` is one of the two namespaces kept on activation
    pub fn is_current_cache(&self, name: &str) -> bool {
        name == self.static_cache || name == self.dynamic_cache
    }

    /// Resolve a path-absolute reference against the configured origin
    pub fn resolve(&self, reference: &str) -> String {
        resolve(&self.origin, reference)
    }

    /// Absolute URLs of the static asset list, in order
    pub fn static_asset_urls(&self) -> Vec<String> {
        self.static_assets.iter().map(|a| self.resolve(a)).collect()
    }
}
