//! Host APIs for the harvesting engine.
//!
//! - [`http`] - reqwest-backed [`Transport`](crate::Transport) with tracing and domain allowlist

pub mod http;

pub use http::{HttpClient, HttpClientBuilder};
