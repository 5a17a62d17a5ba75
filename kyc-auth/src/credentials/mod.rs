//! Credentials for authenticating requests to verification providers.
//!
//! Providers differ in how they expect credentials on the wire; ShuftiPro uses
//! HTTP Basic authentication with the client id as user name and the secret key
//! as password.

mod auth;
mod basic;

pub use auth::{Provider, ProviderAuth};
pub use basic::BasicAuth;
