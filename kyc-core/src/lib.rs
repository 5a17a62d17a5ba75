//! KYC abstraction layer for identity-verification providers.
//!
//! This crate provides the provider-agnostic side of a verification workflow:
//! - Requests describing who should be verified and how
//! - Normalized results and a closed status taxonomy
//! - The driver trait every provider integration implements
//!
//! Applications depend on these types only, so a provider (ShuftiPro, Onfido,
//! Sumsub, etc.) can be swapped without touching application code.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::verification::{
    Capabilities, SimpleVerificationOptions, User, VerificationRequest, VerificationResult,
    VerificationStatus,
};
