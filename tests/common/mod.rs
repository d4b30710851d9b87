/*!
 * Common test utilities for the twintext test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use twintext::app_config::{Config, TranslationProvider};
use twintext::document::{Document, NodeId};
use twintext::errors::ProviderError;
use twintext::translation::TranslationGateway;

/// Routes library logs to the test output; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a small HTML page for testing
pub fn create_test_html(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"<!DOCTYPE html>
<html><head><title>Test page</title></head>
<body>
<h1>Welcome</h1>
<p>This is a <em>test</em> page.<br>It has two lines.</p>
<pre class="notranslate">let x = 1;</pre>
</body></html>"#;
    create_test_file(dir, filename, content)
}

/// Configuration using the offline mock provider
pub fn mock_config(target_language: &str) -> Config {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = target_language.to_string();
    config.translation.provider = TranslationProvider::Mock;
    config
}

/// How the recording gateway answers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GatewayReply {
    /// `«text»` for every input
    Quote,
    /// Fails with an API error
    Fail,
    /// Drops the last translation
    DropLast,
}

/// Gateway that records every batch it receives
pub struct RecordingGateway {
    reply: GatewayReply,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingGateway {
    pub fn new(reply: GatewayReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn quote() -> Self {
        Self::new(GatewayReply::Quote)
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranslationGateway for RecordingGateway {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        self.calls.lock().unwrap().push(texts.to_vec());
        match self.reply {
            GatewayReply::Quote => Ok(texts.iter().map(|text| format!("«{}»", text.trim())).collect()),
            GatewayReply::Fail => Err(ProviderError::ApiError {
                status_code: 503,
                message: "backend unavailable".to_string(),
            }),
            GatewayReply::DropLast => {
                let mut out: Vec<String> = texts.to_vec();
                out.pop();
                Ok(out)
            }
        }
    }
}

/// Elements carrying the given class, in document order
pub fn elements_with_class(document: &Document, class: &str) -> Vec<NodeId> {
    document
        .descendants(document.root())
        .filter(|&id| document.element(id).is_some_and(|element| element.has_class(class)))
        .collect()
}
