//! ShuftiPro semantics for the KYC abstraction layer.
//!
//! [`driver::ShuftiProDriver`] is the entry point; the other modules are the
//! collaborators it is assembled from and can be used on their own.

pub use kyc_core::{
    Capabilities, SimpleVerificationOptions, User, VerificationRequest, VerificationResult,
    VerificationStatus,
};

pub mod activity;
pub mod documents;
pub mod driver;
pub mod error;
pub mod storage;
pub mod verification;
pub mod webhook;

pub mod gateway;
