/*!
 * Translation backends behind a single batch interface.
 *
 * - `core`: `TranslationService`, the configured backend
 * - `batch`: entry-marker protocol used to pack texts into LLM prompts
 */

use async_trait::async_trait;

use crate::errors::ProviderError;

pub use self::core::TranslationService;

pub mod batch;
pub mod core;

/// Translates an ordered list of texts in one call.
///
/// Implementations return exactly one string per input, in input order.
/// The HTML processor calls this once per document.
#[async_trait]
pub trait TranslationGateway: Send + Sync {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError>;
}

#[async_trait]
impl<G: TranslationGateway + ?Sized> TranslationGateway for std::sync::Arc<G> {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        (**self).translate_batch(texts).await
    }
}
