//! Push Notifications
//!
//! Turns push messages into system notifications and decides what a click
//! on one of them does.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::config::NotificationConfig;

/// Action id that opens the app
pub const ACTION_EXPLORE: &str = "explore";
/// Action id that only dismisses
pub const ACTION_CLOSE: &str = "close";

/// A button shown on a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Data attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// When the push arrived (ms since epoch)
    pub date_of_arrival: u64,
    pub primary_key: u64,
}

/// Options passed to the host along with the notification title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// Push event
#[derive(Debug, Clone, Default)]
pub struct PushEvent {
    data: Option<Vec<u8>>,
}

impl PushEvent {
    /// Create new push event
    pub fn new(data: Option<Vec<u8>>) -> Self {
        Self { data }
    }

    /// Push carrying a text payload
    pub fn text_payload(text: &str) -> Self {
        Self::new(Some(text.as_bytes().to_vec()))
    }

    /// Get data as text
    pub fn text(&self) -> Option<&str> {
        self.data.as_deref().and_then(|d| core::str::from_utf8(d).ok())
    }
}

/// Notification click event
#[derive(Debug, Clone, Default)]
pub struct NotificationClickEvent {
    notification_tag: Option<String>,
    action: Option<String>,
}

impl NotificationClickEvent {
    /// Click on the notification body
    pub fn new() -> Self {
        Self::default()
    }

    /// Set notification tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.notification_tag = Some(tag.into());
        self
    }

    /// Set action
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Get notification tag
    pub fn notification_tag(&self) -> Option<&str> {
        self.notification_tag.as_deref()
    }

    /// Get action
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

/// What a notification click leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Open a window at this URL
    OpenWindow(String),
    /// Only dismiss
    Dismiss,
}

/// Build the notification for a push message
pub fn build_notification(config: &NotificationConfig, event: &PushEvent, now_ms: u64) -> NotificationOptions {
    let body = event
        .text()
        .map(|t| t.to_string())
        .unwrap_or_else(|| config.default_body.clone());

    let action = |id: &str, title: &str| NotificationAction {
        action: id.to_string(),
        title: title.to_string(),
        icon: config.icon.clone(),
    };

    NotificationOptions {
        body,
        icon: config.icon.clone(),
        badge: config.badge.clone(),
        vibrate: config.vibrate.clone(),
        data: NotificationData {
            date_of_arrival: now_ms,
            primary_key: 1,
        },
        actions: alloc::vec![action(ACTION_EXPLORE, "View Details"), action(ACTION_CLOSE, "Close")],
    }
}

/// Decide what a click does. `close` only dismisses; `explore`, no
/// action and unknown actions all open the app.
pub fn click_outcome(config: &NotificationConfig, event: &NotificationClickEvent) -> ClickOutcome {
    match event.action() {
        Some(ACTION_CLOSE) => ClickOutcome::Dismiss,
        _ => ClickOutcome::OpenWindow(config.open_url.clone()),
    }
}
