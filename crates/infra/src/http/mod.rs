//! HTTP client abstractions used by external integrations.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
