//! HTTP transport module
//!
//! Provides the asynchronous HTTP-call capability the provider adapters are
//! built on.

mod client;
mod types;

pub use client::HttpClient;
pub use types::{HttpMethod, ProviderRequest, ProviderResponse};
