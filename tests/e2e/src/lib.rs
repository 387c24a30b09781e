//! CMS End-to-End Testing
//!
//! Drives a full [`ServiceWorker`](cms_worker::ServiceWorker) through the
//! app's real scenarios: first visit, offline navigation, version upgrade,
//! notifications and background sync. The network is scripted and the
//! host records every control it receives.

#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod fixtures;
pub mod harness;

#[cfg(test)]
mod pwa;

pub use harness::{ScriptedNetwork, TestApp};
