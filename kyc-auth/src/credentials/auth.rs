//! Provider authentication trait.

use reqwest::RequestBuilder;

/// Known verification providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    ShuftiPro,
}

impl Provider {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::ShuftiPro => "shuftipro",
        }
    }
}

/// Trait for authenticating HTTP requests to a provider.
pub trait ProviderAuth: Send + Sync {
    /// Get the provider identifier.
    fn provider(&self) -> Provider;

    /// Apply authentication to a request builder.
    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_as_str() {
        assert_eq!(Provider::ShuftiPro.as_str(), "shuftipro");
    }
}
