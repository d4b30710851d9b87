/*!
 * Google web translation client.
 *
 * Uses the public `translate_a/single` endpoint (`client=gtx`), one GET per
 * text. The response is a nested JSON array whose first element lists the
 * translated sentence segments.
 */

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{Provider, backoff_delay_ms};

/// Google translation client
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    /// Endpoint URL
    endpoint: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// A single text to translate
#[derive(Debug, Clone)]
pub struct GoogleRequest {
    pub text: String,
    /// Source language, `auto` for detection
    pub source_language: String,
    pub target_language: String,
}

/// Translated text with the detected source language, when reported
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleResponse {
    pub text: String,
    pub detected_source: Option<String>,
}

impl GoogleTranslate {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64, max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs.max(1)))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            max_retries,
            backoff_base_ms,
        }
    }

    /// Full request URL with the query string encoded
    pub fn request_url(&self, request: &GoogleRequest) -> Result<Url, ProviderError> {
        let source = if request.source_language.trim().is_empty() {
            "auto"
        } else {
            request.source_language.as_str()
        };
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("client", "gtx"),
                ("sl", source),
                ("tl", request.target_language.as_str()),
                ("dt", "t"),
                ("q", request.text.as_str()),
            ],
        )
        .map_err(|e| ProviderError::RequestFailed(format!("Invalid Google endpoint {}: {}", self.endpoint, e)))
    }

    /// Concatenate the translated segments of a `translate_a/single` response
    pub fn parse_response(body: &str) -> Result<GoogleResponse, ProviderError> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| ProviderError::ParseError(format!("Google response is not JSON: {}", e)))?;

        let segments = value
            .get(0)
            .and_then(|segments| segments.as_array())
            .ok_or_else(|| ProviderError::ParseError("Google response has no segment list".to_string()))?;

        let text: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(|part| part.as_str()))
            .collect();

        let detected_source = value
            .get(2)
            .and_then(|lang| lang.as_str())
            .map(|lang| lang.to_string());

        Ok(GoogleResponse { text, detected_source })
    }

    async fn send_once(&self, url: &Url) -> Result<String, (ProviderError, bool)> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| (ProviderError::ConnectionError(e.to_string()), true))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| (ProviderError::RequestFailed(e.to_string()), true))?;

        if status.is_success() {
            return Ok(body);
        }
        Err(Self::status_error(status, body))
    }

    /// Error for a non-success status, and whether the request may be retried
    pub fn status_error(status: StatusCode, body: String) -> (ProviderError, bool) {
        match status {
            StatusCode::TOO_MANY_REQUESTS => (ProviderError::RateLimitExceeded(body), true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                (ProviderError::AuthenticationError(format!("{}: {}", status, body)), false)
            }
            _ => (
                ProviderError::ApiError {
                    status_code: status.as_u16(),
                    message: body,
                },
                status.is_server_error(),
            ),
        }
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    type Request = GoogleRequest;
    type Response = GoogleResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let url = self.request_url(&request)?;
        let mut attempt = 0;

        loop {
            match self.send_once(&url).await {
                Ok(body) => return Self::parse_response(&body),
                Err((error, retryable)) => {
                    if !retryable || attempt >= self.max_retries {
                        return Err(error);
                    }
                    attempt += 1;
                    let delay = backoff_delay_ms(self.backoff_base_ms, attempt);
                    warn!("Google request failed: {} - retrying in {}ms (attempt {}/{})",
                          error, delay, attempt, self.max_retries);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let response = self
            .complete(GoogleRequest {
                text: "hello".to_string(),
                source_language: "en".to_string(),
                target_language: "fr".to_string(),
            })
            .await?;
        debug!("Google connection test returned {:?}", response.text);
        Ok(())
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
