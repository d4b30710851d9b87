/*!
 * Tests for the translation service
 */

use anyhow::Result;
use std::sync::Arc;

use twintext::app_config::{TranslationConfig, TranslationProvider};
use twintext::errors::ProviderError;
use twintext::providers::mock::MockProvider;
use twintext::translation::core::parse_endpoint;
use twintext::translation::{TranslationGateway, TranslationService};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Test the service picks the configured backend
#[test]
fn test_new_withMockProvider_shouldKeepLanguages() -> Result<()> {
    let config = TranslationConfig {
        provider: TranslationProvider::Mock,
        ..TranslationConfig::default()
    };
    let service = TranslationService::new(config, "en", "ja")?;
    assert_eq!(service.source_language(), "en");
    assert_eq!(service.target_language(), "ja");
    assert_eq!(service.config.provider, TranslationProvider::Mock);
    Ok(())
}

#[test]
fn test_new_withBadOllamaEndpoint_shouldFail() {
    let mut config = TranslationConfig {
        provider: TranslationProvider::Ollama,
        ..TranslationConfig::default()
    };
    config.active_provider_config_mut().endpoint = "http://host:notaport".to_string();
    assert!(TranslationService::new(config, "en", "fr").is_err());
}

#[test]
fn test_parseEndpoint_withExplicitPort_shouldUseIt() -> Result<()> {
    assert_eq!(parse_endpoint("http://10.0.0.2:8080")?, ("10.0.0.2".to_string(), 8080));
    Ok(())
}

/// Test a batch keeps its order and length
#[tokio::test]
async fn test_translateBatch_shouldPreserveOrderAndLength() -> Result<()> {
    let service = TranslationService::with_mock(MockProvider::working(), "en", "it");
    let texts = strings(&["Hello ", "world", ", friend.", "Next line."]);

    let translated = service.translate_batch(&texts).await?;

    assert_eq!(translated.len(), texts.len());
    assert_eq!(translated[0], "[it] Hello ");
    assert_eq!(translated[3], "[it] Next line.");
    Ok(())
}

/// Test an empty batch makes no backend request
#[tokio::test]
async fn test_translateBatch_withEmptyInput_shouldNotCallBackend() -> Result<()> {
    let provider = MockProvider::working();
    let service = TranslationService::with_mock(provider.clone(), "en", "it");

    let translated = service.translate_batch(&[]).await?;

    assert!(translated.is_empty());
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

/// Test blank texts never reach the backend
#[tokio::test]
async fn test_translateText_withBlankText_shouldSkipBackend() -> Result<()> {
    let provider = MockProvider::working();
    let service = TranslationService::with_mock(provider.clone(), "en", "it");

    assert_eq!(service.translate_text(" \n ").await?, " \n ");
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

/// Test one failing request fails the whole batch
#[tokio::test]
async fn test_translateBatch_withIntermittentFailure_shouldFailWholeBatch() {
    let service = TranslationService::with_mock(MockProvider::intermittent(2), "en", "it");
    let result = service.translate_batch(&strings(&["a", "b", "c"])).await;
    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 503, .. })));
}

/// Test the gateway is usable behind an Arc
#[tokio::test]
async fn test_arcGateway_shouldDelegate() -> Result<()> {
    let service = Arc::new(TranslationService::with_mock(MockProvider::echo(), "en", "it"));
    let translated = service.translate_batch(&strings(&["same"])).await?;
    assert_eq!(translated, vec!["same"]);
    Ok(())
}

#[tokio::test]
async fn test_testConnection_withFailingProvider_shouldFail() {
    let service = TranslationService::with_mock(MockProvider::failing(), "en", "it");
    assert!(service.test_connection().await.is_err());
}
