//! # kyc-auth
//!
//! Authentication plumbing shared by KYC provider drivers:
//! - Provider credentials (HTTP Basic)
//! - HTTP client building with authentication and timeouts
//! - Webhook signature validation
//! - Provider endpoint configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kyc_auth::{
//!     credentials::{BasicAuth, Provider},
//!     http::AuthenticatedClientBuilder,
//!     webhook::{SignedPayloadValidator, WebhookValidator},
//! };
//! ```

pub mod credentials;
pub mod error;
pub mod http;
pub mod providers;
pub mod webhook;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
