//! Pre-defined provider configurations.

mod config;

pub use config::{shufti_pro_config, ProviderConfig};
