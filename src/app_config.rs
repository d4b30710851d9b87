/*!
 * Application configuration: loading, validating and defaults.
 */

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::bilingual::markers::DEFAULT_PREFIX;
use crate::document::classify::{
    DEFAULT_INLINE_IGNORE, DEFAULT_INLINE_TEXT, DEFAULT_LINE_BREAK, DEFAULT_NO_TRANSLATE,
};
use crate::document::TagClassifier;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language tag (BCP-47 or ISO 639, "auto" for detection)
    pub source_language: String,

    /// Target language tag (BCP-47 or ISO 639)
    pub target_language: String,

    /// How blocks are sent for translation
    #[serde(default)]
    pub mode: TranslationMode,

    /// Translation config
    pub translation: TranslationConfig,

    /// HTML processing config
    #[serde(default)]
    pub html: HtmlConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation mode
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    // @mode: One unit per text leaf, inline markup kept in the translation
    #[default]
    Structured,
    // @mode: One unit per block, translation inserted as plain text
    Simple,
}

impl std::fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::Simple => write!(f, "simple"),
        }
    }
}

impl std::str::FromStr for TranslationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "structured" => Ok(Self::Structured),
            "simple" => Ok(Self::Simple),
            _ => Err(anyhow!("Invalid translation mode: {}", s)),
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google web translation endpoint
    #[default]
    Google,
    // @provider: Ollama
    Ollama,
    // @provider: Offline deterministic translator
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google",
            Self::Ollama => "Ollama",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Max chars per request
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::Google => Self {
                provider_type: "google".to_string(),
                model: String::new(),
                endpoint: default_google_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                max_chars_per_request: default_google_max_chars_per_request(),
                timeout_secs: default_timeout_secs(),
                rate_limit: default_google_rate_limit(),
            },
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                endpoint: default_ollama_endpoint(),
                concurrent_requests: 1,
                max_chars_per_request: default_max_chars_per_request(),
                timeout_secs: default_ollama_timeout_secs(),
                rate_limit: None,
            },
            TranslationProvider::Mock => Self {
                provider_type: "mock".to_string(),
                model: String::new(),
                endpoint: String::new(),
                concurrent_requests: default_concurrent_requests(),
                max_chars_per_request: default_max_chars_per_request(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for LLM backends
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// HTML processing settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HtmlConfig {
    /// Prefix used for every generated attribute and class
    #[serde(default = "default_attribute_prefix")]
    pub attribute_prefix: String,

    /// Inline formatting tags kept inside their paragraph
    #[serde(default = "default_inline_text_tags")]
    pub inline_text_tags: Vec<String>,

    /// Inline tags that never start a paragraph
    #[serde(default = "default_inline_ignore_tags")]
    pub inline_ignore_tags: Vec<String>,

    /// Line break tags
    #[serde(default = "default_line_break_tags")]
    pub line_break_tags: Vec<String>,

    /// Tags whose content is never translated
    #[serde(default = "default_no_translate_tags")]
    pub no_translate_tags: Vec<String>,

    /// Leave the block end markers in the output
    #[serde(default)]
    pub keep_end_markers: bool,

    /// Append the bilingual stylesheets to `<head>`
    #[serde(default = "default_true")]
    pub inject_styles: bool,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            attribute_prefix: default_attribute_prefix(),
            inline_text_tags: default_inline_text_tags(),
            inline_ignore_tags: default_inline_ignore_tags(),
            line_break_tags: default_line_break_tags(),
            no_translate_tags: default_no_translate_tags(),
            keep_end_markers: false,
            inject_styles: true,
        }
    }
}

impl HtmlConfig {
    /// Tag classifier built from the configured lists
    pub fn classifier(&self) -> TagClassifier {
        TagClassifier::from_lists(
            self.inline_text_tags.as_slice(),
            self.inline_ignore_tags.as_slice(),
            self.line_break_tags.as_slice(),
            self.no_translate_tags.as_slice(),
        )
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_max_chars_per_request() -> usize {
    1000
}

fn default_google_max_chars_per_request() -> usize {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_google_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama2".to_string()
}

fn default_google_rate_limit() -> Option<u32> {
    None
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate each entry from {source_language} to {target_language}. Keep every <<ENTRY_n>> marker and the final <<END>> marker exactly as given. Only respond with the translated entries.".to_string()
}

fn default_attribute_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn to_strings(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|tag| tag.to_string()).collect()
}

fn default_inline_text_tags() -> Vec<String> {
    to_strings(DEFAULT_INLINE_TEXT)
}

fn default_inline_ignore_tags() -> Vec<String> {
    to_strings(DEFAULT_INLINE_IGNORE)
}

fn default_line_break_tags() -> Vec<String> {
    to_strings(DEFAULT_LINE_BREAK)
}

fn default_no_translate_tags() -> Vec<String> {
    to_strings(DEFAULT_NO_TRANSLATE)
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // "auto" lets the backend detect the source language
        if !self.source_language.eq_ignore_ascii_case("auto") {
            crate::language_utils::validate_language_tag(&self.source_language)?;
        }
        crate::language_utils::validate_language_tag(&self.target_language)?;

        if self.html.attribute_prefix.is_empty()
            || !self
                .html
                .attribute_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(anyhow!(
                "Attribute prefix must be non-empty and contain only ASCII letters, digits or '-': {:?}",
                self.html.attribute_prefix
            ));
        }

        // A listed Ollama entry must name its model; a missing entry uses the default
        if self.translation.provider == TranslationProvider::Ollama
            && self
                .translation
                .get_active_provider_config()
                .is_some_and(|provider| provider.model.trim().is_empty())
        {
            return Err(anyhow!("A model is required for the Ollama provider"));
        }

        if self.translation.get_max_chars_per_request() == 0 {
            return Err(anyhow!("max_chars_per_request must be greater than zero"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "auto".to_string(),
            target_language: "zh-CN".to_string(),
            mode: TranslationMode::default(),
            translation: TranslationConfig::default(),
            html: HtmlConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    pub fn optimal_concurrent_requests(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.concurrent_requests.max(1);
        }

        // Default fallback
        default_concurrent_requests()
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the configuration of the active provider, created on demand
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_model(),
            TranslationProvider::Google | TranslationProvider::Mock => String::new(),
        }
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::Google => default_google_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
            TranslationProvider::Mock => String::new(),
        }
    }

    /// Get the max chars per request for the active provider
    pub fn get_max_chars_per_request(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.max_chars_per_request;
        }

        match self.provider {
            TranslationProvider::Google => default_google_max_chars_per_request(),
            _ => default_max_chars_per_request(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_timeout_secs(),
            _ => default_timeout_secs(),
        }
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.rate_limit;
        }

        match self.provider {
            TranslationProvider::Google => default_google_rate_limit(),
            _ => None,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: TranslationProvider::default(),
            available_providers: Vec::new(),
            common: TranslationCommonConfig::default(),
        };

        // Add default providers
        config.available_providers.push(ProviderConfig::new(TranslationProvider::Google));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::Ollama));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::Mock));

        config
    }
}
