//! Language-model provider implementations for Parley.
//!
//! All providers implement the `parley_core::Provider` trait. The tutor
//! talks to any OpenAI-compatible chat-completions endpoint (Groq by
//! default) through [`OpenAiCompatProvider`].

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use parley_config::AppConfig;
use parley_core::error::ProviderError;

/// Build the configured provider.
///
/// Fails with [`ProviderError::NotConfigured`] when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<OpenAiCompatProvider, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            ProviderError::NotConfigured(format!("no API key for provider '{}'", config.provider))
        })?;

    tracing::debug!(provider = %config.provider, "Building provider from config");
    OpenAiCompatProvider::new(&config.provider, config.resolved_base_url(), api_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::Provider;

    #[test]
    fn build_requires_api_key() {
        let config = AppConfig::default();
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn build_uses_configured_base_url() {
        let config = AppConfig {
            api_key: Some("gsk-test".into()),
            base_url: Some("http://localhost:9999/v1/".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.base_url(), "http://localhost:9999/v1");
    }
}
