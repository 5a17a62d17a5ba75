//! Provider-agnostic data types.

pub mod verification;
