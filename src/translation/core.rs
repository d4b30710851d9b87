/*!
 * Core translation service implementation.
 *
 * `TranslationService` owns one backend client built from the configuration
 * and answers the gateway's batch calls with it. Per-text backends (Google,
 * mock) run with bounded concurrency; the Ollama backend packs texts into
 * entry-marked prompts and falls back to one prompt per text when a
 * response loses its markers.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info, warn};
use std::time::Instant;
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::Provider;
use crate::providers::google::{GoogleRequest, GoogleTranslate};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};

use super::TranslationGateway;
use super::batch;

/// Parse an endpoint string into host and port
pub fn parse_endpoint(endpoint: &str) -> Result<(String, u16)> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url.host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?
        .to_string();

    let port = url.port().unwrap_or(if url.scheme() == "https" { 443 } else { 80 });

    Ok((host, port))
}

/// Backend client variants
enum Backend {
    Google { client: GoogleTranslate },
    Ollama { client: Ollama },
    Mock { client: MockProvider },
}

/// Translation service backing the HTML processor
pub struct TranslationService {
    backend: Backend,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    source_language: String,
    target_language: String,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(
        config: TranslationConfig,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Result<Self> {
        let retry_count = config.common.retry_count;
        let retry_backoff_ms = config.common.retry_backoff_ms;
        let timeout_secs = config.get_timeout_secs();

        let backend = match config.provider {
            TranslationProvider::Google => Backend::Google {
                client: GoogleTranslate::new(config.get_endpoint(), timeout_secs, retry_count, retry_backoff_ms),
            },
            TranslationProvider::Ollama => {
                let (host, port) = parse_endpoint(&config.get_endpoint())?;
                Backend::Ollama {
                    client: Ollama::new_with_config(
                        host,
                        port,
                        retry_count,
                        retry_backoff_ms,
                        config.get_rate_limit(),
                        timeout_secs,
                    ),
                }
            }
            TranslationProvider::Mock => Backend::Mock {
                client: MockProvider::working(),
            },
        };

        Ok(Self {
            backend,
            config,
            source_language: source_language.into(),
            target_language: target_language.into(),
        })
    }

    /// Service backed by the given mock provider
    pub fn with_mock(
        provider: MockProvider,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        let config = TranslationConfig {
            provider: TranslationProvider::Mock,
            ..TranslationConfig::default()
        };
        Self {
            backend: Backend::Mock { client: provider },
            config,
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<()> {
        let start = Instant::now();
        let result = match &self.backend {
            Backend::Google { client } => client.test_connection().await,
            Backend::Ollama { client } => client.test_connection().await,
            Backend::Mock { client } => client.test_connection().await,
        };
        match result {
            Ok(()) => {
                info!("Connected to {} in {:?}", self.config.provider.display_name(), start.elapsed());
                Ok(())
            }
            Err(e) => Err(anyhow!("Failed to connect to {}: {}", self.config.provider.display_name(), e)),
        }
    }

    /// System prompt with the language placeholders filled in
    pub fn system_prompt(&self) -> String {
        let describe = |tag: &str| {
            if tag.eq_ignore_ascii_case("auto") {
                "the source language".to_string()
            } else {
                language_utils::get_language_name(tag).unwrap_or_else(|_| tag.to_string())
            }
        };
        self.config
            .common
            .system_prompt
            .replace("{source_language}", &describe(&self.source_language))
            .replace("{target_language}", &describe(&self.target_language))
    }

    /// Translate one text with the active backend
    pub async fn translate_text(&self, text: &str) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        match &self.backend {
            Backend::Google { client } => {
                let response = client
                    .complete(GoogleRequest {
                        text: text.to_string(),
                        source_language: self.source_language.clone(),
                        target_language: self.target_language.clone(),
                    })
                    .await?;
                Ok(GoogleTranslate::extract_text(&response))
            }
            Backend::Mock { client } => {
                let response = client
                    .complete(MockRequest {
                        text: text.to_string(),
                        source_language: self.source_language.clone(),
                        target_language: self.target_language.clone(),
                    })
                    .await?;
                Ok(MockProvider::extract_text(&response))
            }
            Backend::Ollama { client } => {
                let texts = [text.to_string()];
                let response = client.generate(&self.ollama_request(&texts)).await?;
                let raw = Ollama::extract_text(&response);
                Ok(batch::parse_entries(&raw, 1)
                    .ok()
                    .and_then(|mut entries| entries.pop())
                    .unwrap_or_else(|| raw.trim().to_string()))
            }
        }
    }

    fn ollama_request(&self, texts: &[String]) -> GenerationRequest {
        GenerationRequest::new(self.config.get_model(), batch::format_entries(texts))
            .system(self.system_prompt())
            .temperature(self.config.common.temperature)
    }

    /// One request per text, in order, at most `concurrent_requests` in flight
    async fn translate_each(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        stream::iter(0..texts.len())
            .map(|i| self.translate_text(&texts[i]))
            .buffered(self.config.optimal_concurrent_requests())
            .try_collect()
            .await
    }

    /// Entry-marked prompts chunked by `max_chars_per_request`
    async fn translate_marked(&self, client: &Ollama, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        let chunks = batch::chunk_by_chars(texts, self.config.get_max_chars_per_request());
        debug!("Sending {} texts to Ollama in {} chunks", texts.len(), chunks.len());

        let translated: Vec<Vec<String>> = stream::iter(chunks)
            .map(|range| async move {
                let chunk = &texts[range];
                let response = client.generate(&self.ollama_request(chunk)).await?;
                match batch::parse_entries(&Ollama::extract_text(&response), chunk.len()) {
                    Ok(entries) => Ok(entries),
                    Err(e) => {
                        warn!("Batch of {} entries came back malformed ({}), retrying individually", chunk.len(), e);
                        self.translate_each(chunk).await
                    }
                }
            })
            .buffered(self.config.optimal_concurrent_requests())
            .try_collect()
            .await?;

        Ok(translated.into_iter().flatten().collect())
    }
}

#[async_trait]
impl TranslationGateway for TranslationService {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        let start = Instant::now();
        let translated = match &self.backend {
            Backend::Ollama { client } => self.translate_marked(client, texts).await?,
            Backend::Google { .. } | Backend::Mock { .. } => self.translate_each(texts).await?,
        };
        debug!(
            "{} translated {} texts in {:?}",
            self.config.provider.display_name(),
            translated.len(),
            start.elapsed()
        );
        Ok(translated)
    }
}
