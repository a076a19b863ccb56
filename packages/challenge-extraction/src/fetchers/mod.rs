//! Content fetcher implementations.

pub mod http;
pub mod readable;

pub use http::{validate_url, HttpFetcher};
pub use readable::{extract_readable, Readable};
