/*!
 * Block sanitizing and text collection.
 *
 * The sanitized copy of a block is a deep copy of its common ancestor pruned
 * down to the block's own text nodes and the elements on their paths. Its
 * text leaves, in document order, become the block's translation units.
 */

use std::collections::HashSet;

use crate::document::{Document, Fragment, NodeId, NodePath};
use crate::errors::ProcessingError;

use super::blocks::SemanticBlock;

/// One string sent to the translation backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Source text, whitespace included
    pub text: String,
    /// Address of the text leaf inside the sanitized copy
    pub path: NodePath,
}

/// Pruned, detached copy of a block's ancestor and the units read from it
#[derive(Debug, Clone)]
pub struct SanitizedBlock {
    pub copy: Fragment,
    pub units: Vec<TranslationUnit>,
}

impl SanitizedBlock {
    /// Block text as a single line: leaves trimmed and joined by single spaces
    pub fn joined_text(&self) -> String {
        self.units
            .iter()
            .map(|unit| unit.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Flattens the text leaves of a fragment into translation units
pub struct TextCollector;

impl TextCollector {
    /// Non-blank text leaves in document order
    pub fn collect(fragment: &Fragment) -> Vec<TranslationUnit> {
        fragment
            .text_leaves()
            .into_iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(path, text)| TranslationUnit {
                text: text.to_string(),
                path,
            })
            .collect()
    }
}

pub struct BlockSanitizer;

impl BlockSanitizer {
    /// Nodes kept in the copy: the block's text nodes and every element on
    /// their way up to the ancestor
    pub fn retain_set(document: &Document, block: &SemanticBlock) -> HashSet<NodeId> {
        let mut keep: HashSet<NodeId> = HashSet::new();
        keep.insert(block.ancestor);
        for &node in &block.nodes {
            keep.insert(node);
            for ancestor in document.ancestors(node) {
                if !keep.insert(ancestor) || ancestor == block.ancestor {
                    break;
                }
            }
        }
        keep
    }

    pub fn sanitize(document: &Document, block: &SemanticBlock) -> Result<SanitizedBlock, ProcessingError> {
        let keep = Self::retain_set(document, block);
        let mut copy = document.deep_copy(block.ancestor);
        copy.retain_origins(&keep);
        copy.remove_empty_elements();

        let units = TextCollector::collect(&copy);
        let collected: String = units.iter().map(|unit| unit.text.as_str()).collect();
        let expected = block.source_text(document);
        if collected != expected || units.len() != block.nodes.len() {
            return Err(ProcessingError::Extraction {
                paragraph: block.paragraph_index,
                block: block.index,
                reason: format!(
                    "sanitized copy holds {} text leaves ({:?}) but the block has {} ({:?})",
                    units.len(),
                    collected,
                    block.nodes.len(),
                    expected
                ),
            });
        }

        Ok(SanitizedBlock { copy, units })
    }
}
