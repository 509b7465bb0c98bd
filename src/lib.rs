//! Offline cache policy engine for the StepToDeen web app.
//!
//! Intercepted requests are routed network-first (prayer-time, Quran and
//! Hadith data providers) or cache-first (app shell and static assets), with
//! the cache bucket replaced wholesale whenever the version tag changes.

pub mod cache;
pub mod config;
pub mod net;
pub mod worker;

pub use cache::{CacheStorage, DiskStorage, MemoryStorage};
pub use config::Config;
pub use net::{Destination, FetchError, Fetcher, HttpFetcher, Request, Response};
pub use worker::{CacheRouter, ConsoleHost, FetchOutcome, WorkerHost};
