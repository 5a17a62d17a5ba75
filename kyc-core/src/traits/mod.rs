//! Provider traits.

pub mod driver;
