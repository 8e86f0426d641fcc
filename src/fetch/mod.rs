//! Fetch backends
//!
//! Thin adapters that retrieve raw content from a URL. The plain HTTP
//! backend lives here; the browser-automation backend lives in
//! [`crate::browser`] because its lifecycle needs a dedicated manager.

pub mod http;

pub use http::HttpFetcher;
