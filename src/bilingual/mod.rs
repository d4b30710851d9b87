/*!
 * Bilingual rendering of HTML documents.
 *
 * - `paragraphs`: locates paragraph roots
 * - `blocks`: splits paragraphs into semantic blocks with end markers
 * - `sanitizer`: pruned copies of blocks and their translation units
 * - `reinsert`: inserts translated copies after their blocks
 * - `processor`: runs the whole pipeline against a translation gateway
 */

pub use self::blocks::{BlockEnd, BlockExtractor, SemanticBlock, translatable_text_nodes};
pub use self::markers::{MarkerNames, NodeMarks};
pub use self::paragraphs::ParagraphLocator;
pub use self::processor::{HtmlProcessor, ProcessingReport, ProcessorOptions};
pub use self::reinsert::ResultReinserter;
pub use self::sanitizer::{BlockSanitizer, SanitizedBlock, TextCollector, TranslationUnit};

pub mod blocks;
pub mod markers;
pub mod paragraphs;
pub mod processor;
pub mod reinsert;
pub mod sanitizer;
pub mod styles;
