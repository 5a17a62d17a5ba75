//! Pre-configured provider settings.

use crate::credentials::Provider;

/// Provider configuration with endpoints.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier.
    pub provider: Provider,
    /// Base API URL; verification requests are posted here.
    pub base_url: String,
    /// Endpoint for verification status lookups.
    pub status_url: String,
}

/// Get ShuftiPro configuration.
///
/// # Arguments
///
/// * `base_url` - API base URL; a trailing slash is ignored
pub fn shufti_pro_config(base_url: &str) -> ProviderConfig {
    let base_url = base_url.trim_end_matches('/').to_string();

    ProviderConfig {
        provider: Provider::ShuftiPro,
        status_url: format!("{}/status", base_url),
        base_url,
    }
}
