//! Request routing and lifecycle handling for the offline worker.
//!
//! This module provides:
//! - `CacheRouter`: install / activate / fetch / sync / push handlers
//! - `classify`: hostname-based choice between network-first and cache-first
//! - `WorkerHost`: platform hooks (skip waiting, claim clients, notifications)
//! - `Notification`: push notification built from an optional JSON payload

pub mod classify;
pub mod host;
pub mod notify;
pub mod router;

pub use classify::{classify, RequestKind};
pub use host::{ConsoleHost, WorkerHost};
pub use notify::{Notification, NotificationOptions, PushPayload};
pub use router::{
    CacheRouter, FetchOutcome, InstallReport, ResponseSource, SyncOutcome, SYNC_PRAYER_TIMES,
};
