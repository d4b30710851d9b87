/*!
 * Semantic block extraction.
 *
 * A paragraph is split into blocks at nested paragraph roots and at the
 * end of line-break and block-level elements. Each block records its text
 * nodes, their deepest common ancestor and an invisible end marker placed
 * in the live tree where the translation will go.
 */

use log::trace;

use crate::document::{Document, ElementData, NodeId, NodeKind, TagClass, TagClassifier};
use crate::errors::ProcessingError;

use super::markers::NodeMarks;

/// Tag of the invisible end marker element
pub const END_MARKER_TAG: &str = "span";

/// Why a block was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEnd {
    /// A nested paragraph root started
    NestedParagraph(NodeId),
    /// A line break, a block-level element or the paragraph itself ended
    Natural,
}

/// A run of text nodes translated as one unit of meaning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticBlock {
    /// Index of the owning paragraph in document order
    pub paragraph_index: usize,
    /// Index of the block within its paragraph
    pub index: usize,
    /// The paragraph root that owns the block
    pub paragraph: NodeId,
    /// Non-empty text nodes, in document order
    pub nodes: Vec<NodeId>,
    /// Deepest element enclosing every text node
    pub ancestor: NodeId,
    /// Marker the translated fragment is inserted before
    pub end_marker: NodeId,
    pub closed_by: BlockEnd,
}

impl SemanticBlock {
    /// Concatenated source text of the block
    pub fn source_text(&self, document: &Document) -> String {
        self.nodes
            .iter()
            .filter_map(|&id| document.text(id))
            .collect()
    }
}

/// Deepest element that is a strict ancestor of every node
///
/// For a single node this is its parent. `None` when the list is empty or
/// the nodes share no ancestor.
pub fn common_ancestor(document: &Document, nodes: &[NodeId]) -> Option<NodeId> {
    let (first, rest) = nodes.split_first()?;
    let mut shared = document.ancestor_path(*first);
    for &node in rest {
        let path = document.ancestor_path(node);
        let common = shared
            .iter()
            .zip(path.iter())
            .take_while(|(a, b)| a == b)
            .count();
        shared.truncate(common);
    }
    shared
        .into_iter()
        .rev()
        .find(|&id| document.is_element(id))
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Splits paragraphs into semantic blocks and places their end markers
pub struct BlockExtractor<'a> {
    classifier: &'a TagClassifier,
}

impl<'a> BlockExtractor<'a> {
    pub fn new(classifier: &'a TagClassifier) -> Self {
        Self { classifier }
    }

    /// Partition one paragraph into blocks, inserting an end marker per block
    pub fn extract(
        &self,
        document: &mut Document,
        marks: &mut NodeMarks,
        paragraph: NodeId,
        paragraph_index: usize,
    ) -> Result<Vec<SemanticBlock>, ProcessingError> {
        let mut blocks = Vec::new();
        let mut buffer: Vec<NodeId> = Vec::new();
        let mut stack: Vec<Step> = document
            .children(paragraph)
            .iter()
            .rev()
            .map(|&id| Step::Enter(id))
            .collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    if document.is_content_text(id) {
                        buffer.push(id);
                        continue;
                    }
                    let Some(skipped) = document.element(id).map(|data| self.classifier.skips(data)) else {
                        continue;
                    };
                    if skipped || marks.is_end_marker(id) || marks.is_translation(id) {
                        continue;
                    }
                    if marks.is_paragraph(id) {
                        self.close(
                            document,
                            marks,
                            paragraph,
                            paragraph_index,
                            &mut buffer,
                            &mut blocks,
                            BlockEnd::NestedParagraph(id),
                        )?;
                        continue;
                    }
                    stack.push(Step::Leave(id));
                    stack.extend(document.children(id).iter().rev().map(|&child| Step::Enter(child)));
                }
                Step::Leave(id) => {
                    let class = document
                        .tag_name(id)
                        .map(|tag| self.classifier.classify(tag))
                        .unwrap_or(TagClass::Block);
                    if matches!(class, TagClass::LineBreak | TagClass::Block) {
                        self.close(
                            document,
                            marks,
                            paragraph,
                            paragraph_index,
                            &mut buffer,
                            &mut blocks,
                            BlockEnd::Natural,
                        )?;
                    }
                }
            }
        }

        self.close(
            document,
            marks,
            paragraph,
            paragraph_index,
            &mut buffer,
            &mut blocks,
            BlockEnd::Natural,
        )?;
        trace!("Paragraph {} produced {} blocks", paragraph_index, blocks.len());
        Ok(blocks)
    }

    #[allow(clippy::too_many_arguments)]
    fn close(
        &self,
        document: &mut Document,
        marks: &mut NodeMarks,
        paragraph: NodeId,
        paragraph_index: usize,
        buffer: &mut Vec<NodeId>,
        blocks: &mut Vec<SemanticBlock>,
        closed_by: BlockEnd,
    ) -> Result<(), ProcessingError> {
        if buffer.is_empty() {
            return Ok(());
        }
        let index = blocks.len();
        let nodes = std::mem::take(buffer);
        let extraction_error = |reason: String| ProcessingError::Extraction {
            paragraph: paragraph_index,
            block: index,
            reason,
        };

        let ancestor = common_ancestor(document, &nodes)
            .ok_or_else(|| extraction_error("text nodes share no element ancestor".to_string()))?;
        if ancestor != paragraph && !document.is_ancestor_of(paragraph, ancestor) {
            return Err(extraction_error(format!(
                "common ancestor {:?} lies outside paragraph {:?}",
                ancestor, paragraph
            )));
        }

        let marker = document.create_element(
            ElementData::new(END_MARKER_TAG).with_attr("style", "display:none;"),
        );
        match closed_by {
            BlockEnd::NestedParagraph(next) => document.insert_before(next, marker)?,
            BlockEnd::Natural => {
                let anchor = Self::child_of_ancestor(document, &nodes, ancestor)
                    .ok_or_else(|| extraction_error("last text node is not below its ancestor".to_string()))?;
                document.insert_after(anchor, marker)?;
            }
        }
        marks.mark_end_marker(marker);

        blocks.push(SemanticBlock {
            paragraph_index,
            index,
            paragraph,
            nodes,
            ancestor,
            end_marker: marker,
            closed_by,
        });
        Ok(())
    }

    /// The direct child of `ancestor` on the path to the block's last text node
    fn child_of_ancestor(document: &Document, nodes: &[NodeId], ancestor: NodeId) -> Option<NodeId> {
        let mut current = *nodes.last()?;
        loop {
            let parent = document.parent(current)?;
            if parent == ancestor {
                return Some(current);
            }
            current = parent;
        }
    }
}

/// Text nodes of `paragraph` that extraction is expected to cover
///
/// Skipped subtrees, nested paragraphs and inserted nodes are excluded.
pub fn translatable_text_nodes(
    document: &Document,
    marks: &NodeMarks,
    classifier: &TagClassifier,
    paragraph: NodeId,
) -> Vec<NodeId> {
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = document.children(paragraph).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        match document.kind(id) {
            NodeKind::Text(text) if !text.trim().is_empty() => found.push(id),
            NodeKind::Element(data) => {
                if marks.is_paragraph(id)
                    || marks.is_end_marker(id)
                    || marks.is_translation(id)
                    || classifier.skips(data)
                {
                    continue;
                }
                stack.extend(document.children(id).iter().rev().copied());
            }
            _ => {}
        }
    }
    found
}
