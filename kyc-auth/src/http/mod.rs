//! HTTP client building for provider calls.

mod client;

pub use client::{AuthenticatedClient, AuthenticatedClientBuilder, HttpClientConfig, HttpResponse};
