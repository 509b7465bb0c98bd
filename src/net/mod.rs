//! Request/response primitives and the network fetch capability.
//!
//! This module provides:
//! - `Request` / `Response`: the values flowing through the fetch router
//! - `Fetcher`: the injected capability that performs a live fetch
//! - `HttpFetcher`: the `reqwest`-backed fetcher used by the host binary
//!
//! A `Response` is consumed at most once. Code that needs to both return and
//! persist a response must split it with `Response::tee` first.

pub mod client;
pub mod error;
pub mod types;

pub use client::{Fetcher, HttpFetcher};
pub use error::FetchError;
pub use types::{Destination, Request, RequestKey, Response};
