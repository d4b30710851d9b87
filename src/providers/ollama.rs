use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{Provider, backoff_delay_ms};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    rate_limit: Option<u32>,
}

/// Generate request for the Ollama API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    /// How long to keep the model loaded in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

/// Generation options for the Ollama API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl GenerationRequest {
    /// Create a new generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
            keep_alive: None,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Set the keep-alive duration
    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

impl Ollama {
    /// Create a new Ollama client with configuration
    ///
    /// Ollama speaks HTTP/1.1; connections are pooled for concurrent requests.
    pub fn new_with_config(
        host: impl Into<String>,
        port: u16,
        max_retries: u32,
        backoff_base_ms: u64,
        rate_limit: Option<u32>,
        timeout_secs: u64,
    ) -> Self {
        let host = host.into();

        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            match host.split_once("://") {
                Some((scheme, host_part)) if !host_part.contains(':') => {
                    format!("{}://{}:{}", scheme, host_part, port)
                }
                _ => host,
            }
        } else {
            format!("http://{}:{}", host, port)
        };

        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs.max(1)))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .pool_max_idle_per_host(20)
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            max_retries,
            backoff_base_ms,
            rate_limit,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parse a generate response body, accepting a single object or JSONL stream
    pub fn parse_generation(body: &str) -> Result<GenerationResponse, ProviderError> {
        if let Ok(response) = serde_json::from_str::<GenerationResponse>(body) {
            return Ok(response);
        }

        // Streaming output: one JSON object per line, response pieces concatenated
        let objects: Vec<serde_json::Value> = body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .collect();

        let Some(last) = objects.last() else {
            let preview: String = body.chars().take(500).collect();
            error!("Failed to parse Ollama API response. Raw response (first 500 chars): {}", preview);
            return Err(ProviderError::ParseError(
                "Ollama API response contains invalid JSON".to_string(),
            ));
        };

        let response: String = objects
            .iter()
            .filter_map(|obj| obj.get("response").and_then(|v| v.as_str()))
            .collect();

        Ok(GenerationResponse {
            model: last.get("model").and_then(|v| v.as_str()).unwrap_or("unknown").to_string(),
            created_at: last.get("created_at").and_then(|v| v.as_str()).unwrap_or("").to_string(),
            response,
            done: true,
            prompt_eval_count: last.get("prompt_eval_count").and_then(|v| v.as_u64()),
            eval_count: last.get("eval_count").and_then(|v| v.as_u64()),
        })
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            if let Some(rate_limit) = self.rate_limit.filter(|limit| *limit > 0) {
                if attempt > 0 {
                    tokio::time::sleep(Duration::from_millis(60_000 / rate_limit as u64)).await;
                }
            }

            match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to get response text".to_string());

                    if status.is_success() {
                        return Self::parse_generation(&body);
                    }

                    let api_error = ProviderError::ApiError {
                        status_code: status.as_u16(),
                        message: body,
                    };
                    if !status.is_server_error() {
                        // Client error - don't retry
                        error!("Ollama API error: {}", api_error);
                        return Err(api_error);
                    }
                    error!("Ollama API error: {} - attempt {}/{}", api_error, attempt + 1, self.max_retries + 1);
                    last_error = Some(api_error);
                }
                Err(e) => {
                    warn!("Ollama API network error: {} - attempt {}/{}", e, attempt + 1, self.max_retries + 1);
                    last_error = Some(ProviderError::ConnectionError(e.to_string()));
                }
            }

            attempt += 1;
            if attempt <= self.max_retries {
                tokio::time::sleep(Duration::from_millis(backoff_delay_ms(self.backoff_base_ms, attempt))).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!(
                "Ollama API request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama: {}", e)))?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e)))?;

        response["version"]
            .as_str()
            .map(|version| version.to_string())
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

#[async_trait]
impl Provider for Ollama {
    type Request = GenerationRequest;
    type Response = GenerationResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        self.generate(&request).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }

    fn extract_text(response: &Self::Response) -> String {
        response.response.clone()
    }
}
