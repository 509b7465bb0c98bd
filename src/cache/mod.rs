//! Cache bucket storage for offline responses.
//!
//! This module provides the `CacheStorage` trait the router reads and
//! writes through, plus two backends:
//! - `MemoryStorage`: process-local, used in tests and embedders
//! - `DiskStorage`: one JSON file per entry, used by the host binary
//!
//! Buckets are named after the cache version tag. Activating a new version
//! deletes every bucket with a different name.

pub mod disk;
pub mod storage;

pub use disk::DiskStorage;
pub use storage::{CacheStorage, MemoryStorage, StoredResponse};
