/*!
 * Out-of-band node marks.
 *
 * Paragraph roots, end markers, synthesized wrappers and inserted translation
 * containers are tracked by `NodeId` while the document is processed. They
 * only become attributes when `NodeMarks::project` runs just before output.
 */

use std::collections::HashSet;

use crate::document::{Document, NodeId};
use crate::errors::TreeError;

/// Default prefix for every attribute and class written into the output
pub const DEFAULT_PREFIX: &str = "twintext";

/// Attribute names derived from a prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerNames {
    prefix: String,
}

impl Default for MarkerNames {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl MarkerNames {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix>-state` on the root element
    pub fn state(&self) -> String {
        format!("{}-state", self.prefix)
    }

    /// `data-<prefix>-walked` on the body, holds the session id
    pub fn walked(&self) -> String {
        format!("data-{}-walked", self.prefix)
    }

    pub fn paragraph(&self) -> String {
        format!("data-{}-paragraph", self.prefix)
    }

    pub fn generated(&self) -> String {
        format!("data-{}-generated", self.prefix)
    }

    pub fn block_end(&self) -> String {
        format!("data-{}-block-end-marker", self.prefix)
    }

    pub fn translation_mark(&self) -> String {
        format!("data-{}-translation-element-mark", self.prefix)
    }
}

/// Marks accumulated while a document is processed
#[derive(Debug, Clone, Default)]
pub struct NodeMarks {
    paragraphs: HashSet<NodeId>,
    end_markers: HashSet<NodeId>,
    generated: HashSet<NodeId>,
    translations: HashSet<NodeId>,
}

impl NodeMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a paragraph root; returns `false` if it was already marked
    pub fn mark_paragraph(&mut self, id: NodeId) -> bool {
        self.paragraphs.insert(id)
    }

    pub fn is_paragraph(&self, id: NodeId) -> bool {
        self.paragraphs.contains(&id)
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Marked paragraph roots in document order
    pub fn paragraphs_in_order(&self, document: &Document) -> Vec<NodeId> {
        document
            .descendants(document.root())
            .filter(|id| self.paragraphs.contains(id))
            .collect()
    }

    pub fn mark_end_marker(&mut self, id: NodeId) {
        self.end_markers.insert(id);
    }

    pub fn is_end_marker(&self, id: NodeId) -> bool {
        self.end_markers.contains(&id)
    }

    pub fn end_markers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.end_markers.iter().copied()
    }

    pub fn mark_generated(&mut self, id: NodeId) {
        self.generated.insert(id);
    }

    pub fn is_generated(&self, id: NodeId) -> bool {
        self.generated.contains(&id)
    }

    pub fn mark_translation(&mut self, id: NodeId) {
        self.translations.insert(id);
    }

    /// Whether the node belongs to inserted translation content
    pub fn is_translation(&self, id: NodeId) -> bool {
        self.translations.contains(&id)
    }

    /// Detach every end marker and forget it
    pub fn remove_end_markers(&mut self, document: &mut Document) {
        for id in self.end_markers.drain() {
            document.detach(id);
        }
    }

    /// Detach every inserted translation wrapper and forget it
    pub fn remove_translations(&mut self, document: &mut Document) {
        for id in self.translations.drain() {
            document.detach(id);
        }
    }

    /// Write the marks as attributes onto the attached nodes they refer to
    pub fn project(&self, document: &mut Document, names: &MarkerNames) -> Result<usize, TreeError> {
        let paragraph = names.paragraph();
        let generated = names.generated();
        let block_end = names.block_end();
        let mut written = 0;

        let targets = [
            (&self.paragraphs, &paragraph),
            (&self.generated, &generated),
            (&self.end_markers, &block_end),
        ];
        for (ids, attribute) in targets {
            for &id in ids {
                if !document.is_attached(id) {
                    continue;
                }
                let element = document.element_mut(id).ok_or(TreeError::NotContainer(id.index()))?;
                element.set_attr(attribute.as_str(), "1");
                written += 1;
            }
        }
        Ok(written)
    }
}
