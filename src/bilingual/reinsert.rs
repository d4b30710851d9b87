/*!
 * Reinsertion of translated blocks.
 *
 * Translations are written into the block's sanitized copy, which is then
 * materialised inside a non-editable wrapper and inserted right before the
 * block's end marker. Original nodes are never touched.
 */

use log::trace;

use crate::document::{Document, ElementData, NodeId, fragment_inner_html};
use crate::errors::{ProcessingError, TreeError};

use super::blocks::SemanticBlock;
use super::markers::{MarkerNames, NodeMarks};
use super::sanitizer::SanitizedBlock;

/// Inline style of the inner container in plain-text mode
pub const MUTED_INNER_STYLE: &str = "color:#2f4f4f;";

/// Tag used for every level of the translation wrapper
pub const WRAPPER_TAG: &str = "font";

/// Re-apply the leading and trailing whitespace of `source` around `translated`
pub fn with_source_whitespace(source: &str, translated: &str) -> String {
    let core = translated.trim();
    let leading = &source[..source.len() - source.trim_start().len()];
    let trailing = &source[source.trim_end().len()..];
    if source.trim().is_empty() {
        return format!("{}{}", source, core);
    }
    format!("{}{}{}", leading, core, trailing)
}

/// Inserts translated fragments into the live document
pub struct ResultReinserter<'a> {
    names: &'a MarkerNames,
    target_language: &'a str,
    inserted: usize,
}

impl<'a> ResultReinserter<'a> {
    pub fn new(names: &'a MarkerNames, target_language: &'a str) -> Self {
        Self {
            names,
            target_language,
            inserted: 0,
        }
    }

    /// Number of blocks inserted so far
    pub fn inserted(&self) -> usize {
        self.inserted
    }

    /// Insert a block's translated copy, one translation per unit
    pub fn reinsert_structured(
        &mut self,
        document: &mut Document,
        marks: &mut NodeMarks,
        block: &SemanticBlock,
        mut sanitized: SanitizedBlock,
        translations: &[String],
    ) -> Result<NodeId, ProcessingError> {
        if translations.len() != sanitized.units.len() {
            return Err(ProcessingError::TranslationCountMismatch {
                expected: sanitized.units.len(),
                actual: translations.len(),
            });
        }

        for (unit, translated) in sanitized.units.iter().zip(translations) {
            let value = with_source_whitespace(&unit.text, translated);
            if !sanitized.copy.set_text(&unit.path, value) {
                return Err(ProcessingError::Extraction {
                    paragraph: block.paragraph_index,
                    block: block.index,
                    reason: format!("no text leaf at {} in sanitized copy", unit.path),
                });
            }
        }
        trace!(
            "Block {}.{} translated markup: {}",
            block.paragraph_index,
            block.index,
            fragment_inner_html(&sanitized.copy)
        );

        let (outer, inner) = self.build_wrapper(document, false)?;
        for child in sanitized.copy.children() {
            let node = document.instantiate(child);
            document.append_child(inner, node)?;
        }
        self.insert(document, marks, block, outer)
    }

    /// Insert a block's translation as plain text
    pub fn reinsert_plain(
        &mut self,
        document: &mut Document,
        marks: &mut NodeMarks,
        block: &SemanticBlock,
        translation: &str,
    ) -> Result<NodeId, ProcessingError> {
        let (outer, inner) = self.build_wrapper(document, true)?;
        let text = document.create_text(translation.trim());
        document.append_child(inner, text)?;
        self.insert(document, marks, block, outer)
    }

    fn insert(
        &mut self,
        document: &mut Document,
        marks: &mut NodeMarks,
        block: &SemanticBlock,
        wrapper: NodeId,
    ) -> Result<NodeId, ProcessingError> {
        document.insert_before(block.end_marker, wrapper)?;
        marks.mark_translation(wrapper);
        self.inserted += 1;
        Ok(wrapper)
    }

    /// Build the three-level wrapper; returns the outer and innermost elements
    fn build_wrapper(&self, document: &mut Document, muted: bool) -> Result<(NodeId, NodeId), TreeError> {
        let prefix = self.names.prefix();
        let mark = self.names.translation_mark();

        let outer = document.create_element(
            ElementData::new(WRAPPER_TAG)
                .with_attr("class", format!("notranslate {prefix}-target-wrapper"))
                .with_attr(mark.as_str(), "1")
                .with_attr("lang", self.target_language)
                .with_attr("contenteditable", "false"),
        );
        let br = document.create_element(ElementData::new("br"));
        let block_wrapper = document.create_element(
            ElementData::new(WRAPPER_TAG)
                .with_attr(
                    "class",
                    format!(
                        "notranslate {prefix}-target-translation-theme-none \
                         {prefix}-target-translation-block-wrapper-theme-none \
                         {prefix}-target-translation-block-wrapper"
                    ),
                )
                .with_attr(mark.as_str(), "1"),
        );
        let mut inner_data = ElementData::new(WRAPPER_TAG)
            .with_attr(
                "class",
                format!("notranslate {prefix}-target-inner {prefix}-target-translation-theme-none-inner"),
            )
            .with_attr(mark.as_str(), "1");
        if muted {
            inner_data.set_attr("style", MUTED_INNER_STYLE);
        }
        let inner = document.create_element(inner_data);

        document.append_child(outer, br)?;
        document.append_child(outer, block_wrapper)?;
        document.append_child(block_wrapper, inner)?;
        Ok((outer, inner))
    }
}
