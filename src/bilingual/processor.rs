/*!
 * End-to-end bilingual processing of one document.
 *
 * Paragraphs are located and split into blocks, every block is sanitized,
 * all texts of the document go to the gateway in a single call, and the
 * translations are inserted after their source blocks. A failed or
 * inconsistent translation call leaves the document without any inserted
 * translation and without end markers.
 */

use log::{debug, info, warn};
use std::time::Instant;
use uuid::Uuid;

use crate::app_config::{Config, TranslationMode};
use crate::document::{Document, NodeId, TagClassifier, parse_html, to_html};
use crate::errors::ProcessingError;
use crate::translation::TranslationGateway;

use super::blocks::{BlockExtractor, SemanticBlock};
use super::markers::{MarkerNames, NodeMarks};
use super::paragraphs::ParagraphLocator;
use super::reinsert::ResultReinserter;
use super::sanitizer::{BlockSanitizer, SanitizedBlock};
use super::styles::{annotate_document, inject_styles};

/// Settings of one processing run
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    pub mode: TranslationMode,
    /// Written to the `lang` attribute of every inserted wrapper
    pub target_language: String,
    pub names: MarkerNames,
    pub classifier: TagClassifier,
    /// Leave the block end markers in the output
    pub keep_end_markers: bool,
    pub inject_styles: bool,
}

impl ProcessorOptions {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            mode: TranslationMode::default(),
            target_language: target_language.into(),
            names: MarkerNames::default(),
            classifier: TagClassifier::default(),
            keep_end_markers: false,
            inject_styles: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.mode,
            target_language: config.target_language.clone(),
            names: MarkerNames::new(config.html.attribute_prefix.clone()),
            classifier: config.html.classifier(),
            keep_end_markers: config.html.keep_end_markers,
            inject_styles: config.html.inject_styles,
        }
    }

    pub fn with_mode(mut self, mode: TranslationMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Counters of one processing run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingReport {
    pub paragraphs: usize,
    pub blocks: usize,
    /// Texts sent to the gateway
    pub units: usize,
    /// Translation wrappers inserted
    pub inserted: usize,
    pub session_id: String,
}

/// A block ready for translation
struct PreparedBlock {
    block: SemanticBlock,
    sanitized: SanitizedBlock,
    /// Offset of the block's first text in the gateway batch
    offset: usize,
    count: usize,
}

/// Translates HTML documents into bilingual documents through a gateway
pub struct HtmlProcessor<G: TranslationGateway> {
    options: ProcessorOptions,
    gateway: G,
}

impl<G: TranslationGateway> HtmlProcessor<G> {
    pub fn new(options: ProcessorOptions, gateway: G) -> Self {
        Self { options, gateway }
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Parse, translate and serialize an HTML string
    pub async fn translate_html(&self, html: &str) -> Result<(String, ProcessingReport), ProcessingError> {
        let mut document = parse_html(html)?;
        let report = self.translate_document(&mut document).await?;
        Ok((to_html(&document), report))
    }

    /// Translate a parsed document in place
    pub async fn translate_document(&self, document: &mut Document) -> Result<ProcessingReport, ProcessingError> {
        let start = Instant::now();
        let options = &self.options;
        let mut report = ProcessingReport {
            session_id: Uuid::new_v4().to_string(),
            ..ProcessingReport::default()
        };
        let mut marks = NodeMarks::new();

        let paragraphs = ParagraphLocator::new(&options.classifier).locate(document, &mut marks)?;
        report.paragraphs = paragraphs.len();

        let prepared = match self.prepare(document, &mut marks, &paragraphs) {
            Ok(prepared) => prepared,
            Err(e) => {
                marks.remove_end_markers(document);
                return Err(e);
            }
        };
        report.blocks = prepared.len();

        let texts = self.collect_texts(&prepared);
        report.units = texts.len();
        debug!(
            "Located {} paragraphs, {} blocks, {} texts in {:?}",
            report.paragraphs,
            report.blocks,
            report.units,
            start.elapsed()
        );

        if texts.is_empty() {
            marks.remove_end_markers(document);
            annotate_document(document, &options.names, &report.session_id);
            info!("Nothing to translate");
            return Ok(report);
        }

        let translations = match self.gateway.translate_batch(&texts).await {
            Ok(translations) => translations,
            Err(source) => {
                warn!("Translation of {} texts failed: {}", texts.len(), source);
                marks.remove_end_markers(document);
                return Err(ProcessingError::Service {
                    units: texts.len(),
                    source,
                });
            }
        };
        if translations.len() != texts.len() {
            marks.remove_end_markers(document);
            return Err(ProcessingError::TranslationCountMismatch {
                expected: texts.len(),
                actual: translations.len(),
            });
        }

        report.inserted = self.reinsert_all(document, &mut marks, prepared, &translations)?;

        if !options.keep_end_markers {
            marks.remove_end_markers(document);
        }
        annotate_document(document, &options.names, &report.session_id);
        if options.inject_styles {
            inject_styles(document, &options.names)?;
        }
        marks.project(document, &options.names)?;

        info!(
            "Inserted {} translations for {} paragraphs in {:?}",
            report.inserted,
            report.paragraphs,
            start.elapsed()
        );
        Ok(report)
    }

    /// Extract and sanitize every block of every paragraph, in document order
    fn prepare(
        &self,
        document: &mut Document,
        marks: &mut NodeMarks,
        paragraphs: &[NodeId],
    ) -> Result<Vec<PreparedBlock>, ProcessingError> {
        let extractor = BlockExtractor::new(&self.options.classifier);
        let mut prepared = Vec::new();
        let mut offset = 0;

        for (paragraph_index, &paragraph) in paragraphs.iter().enumerate() {
            for block in extractor.extract(document, marks, paragraph, paragraph_index)? {
                let sanitized = BlockSanitizer::sanitize(document, &block)?;
                let count = match self.options.mode {
                    TranslationMode::Structured => sanitized.units.len(),
                    TranslationMode::Simple => 1,
                };
                prepared.push(PreparedBlock {
                    block,
                    sanitized,
                    offset,
                    count,
                });
                offset += count;
            }
        }
        Ok(prepared)
    }

    /// Insert every block's translation; on failure the document gets back
    /// its state from before the first insertion
    fn reinsert_all(
        &self,
        document: &mut Document,
        marks: &mut NodeMarks,
        prepared: Vec<PreparedBlock>,
        translations: &[String],
    ) -> Result<usize, ProcessingError> {
        let options = &self.options;
        let mut reinserter = ResultReinserter::new(&options.names, &options.target_language);

        for entry in prepared {
            let slice = &translations[entry.offset..entry.offset + entry.count];
            let result = match (options.mode, slice.first()) {
                (TranslationMode::Structured, _) => {
                    reinserter.reinsert_structured(document, marks, &entry.block, entry.sanitized, slice)
                }
                (TranslationMode::Simple, Some(translation)) => {
                    reinserter.reinsert_plain(document, marks, &entry.block, translation)
                }
                (TranslationMode::Simple, None) => Err(ProcessingError::TranslationCountMismatch {
                    expected: 1,
                    actual: 0,
                }),
            };
            if let Err(e) = result {
                warn!(
                    "Reinsertion of block {}.{} failed after {} insertions: {}",
                    entry.block.paragraph_index,
                    entry.block.index,
                    reinserter.inserted(),
                    e
                );
                marks.remove_translations(document);
                marks.remove_end_markers(document);
                return Err(e);
            }
        }
        Ok(reinserter.inserted())
    }

    fn collect_texts(&self, prepared: &[PreparedBlock]) -> Vec<String> {
        match self.options.mode {
            TranslationMode::Structured => prepared
                .iter()
                .flat_map(|entry| entry.sanitized.units.iter().map(|unit| unit.text.clone()))
                .collect(),
            TranslationMode::Simple => prepared.iter().map(|entry| entry.sanitized.joined_text()).collect(),
        }
    }
}
