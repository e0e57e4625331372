//! Content safety clients.

pub mod azure;

use farmiq_core::safety::BoxContentSafety;
use farmiq_types::config::ContentSafetyConfig;
use farmiq_types::error::ConfigError;

pub use azure::AzureContentSafety;

/// Build the content safety client, or `None` when `[content_safety]` is disabled.
pub fn create_content_safety(
    config: &ContentSafetyConfig,
) -> Result<Option<BoxContentSafety>, ConfigError> {
    if !config.enabled {
        tracing::debug!("Content safety disabled");
        return Ok(None);
    }
    let safety = AzureContentSafety::new(config)?;
    tracing::info!(
        endpoint = %safety.endpoint(),
        threshold = config.violation_threshold,
        "Content safety enabled"
    );
    Ok(Some(BoxContentSafety::new(safety)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_disabled_returns_none() {
        assert!(create_content_safety(&ContentSafetyConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_enabled_requires_key_and_endpoint() {
        let config = ContentSafetyConfig {
            enabled: true,
            endpoint: "https://farmiq.cognitiveservices.azure.com".to_string(),
            ..Default::default()
        };
        let err = create_content_safety(&config).err().unwrap();
        assert!(matches!(err, ConfigError::MissingValue(ref v) if v == "content_safety.key"));

        let config = ContentSafetyConfig {
            enabled: true,
            key: Some(SecretString::from("k")),
            ..Default::default()
        };
        let err = create_content_safety(&config).err().unwrap();
        assert!(matches!(err, ConfigError::MissingValue(ref v) if v == "content_safety.endpoint"));
    }
}
