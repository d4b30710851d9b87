/*!
 * Paragraph detection.
 *
 * A top-down pass marks every block-level element, the first element that
 * follows a line break, and bare text runs after a line break (wrapped in a
 * synthesized `<span>`). A second pass catches inline text that no marked
 * element captured.
 */

use log::{debug, trace};

use crate::document::{Document, ElementData, NodeId, NodeKind, TagClass, TagClassifier};
use crate::errors::ProcessingError;

use super::markers::NodeMarks;

/// Tag used for the container wrapped around text that follows a line break
pub const GENERATED_WRAPPER_TAG: &str = "span";

struct Frame {
    id: NodeId,
    next_child: usize,
    block_level: bool,
    saved_flag: bool,
}

/// Marks paragraph roots
pub struct ParagraphLocator<'a> {
    classifier: &'a TagClassifier,
    after_break: bool,
}

impl<'a> ParagraphLocator<'a> {
    pub fn new(classifier: &'a TagClassifier) -> Self {
        Self {
            classifier,
            after_break: false,
        }
    }

    /// Where the walk starts: `<body>` when present, else the document root
    pub fn traversal_root(document: &Document) -> NodeId {
        document.find_element("body").unwrap_or_else(|| document.root())
    }

    /// Mark all paragraph roots and return them in document order
    ///
    /// Running the locator again over the same document and marks leaves
    /// both unchanged.
    pub fn locate(&mut self, document: &mut Document, marks: &mut NodeMarks) -> Result<Vec<NodeId>, ProcessingError> {
        let root = Self::traversal_root(document);
        self.after_break = false;

        self.mark_pass(document, marks, root)?;
        let rescued = self.rescue_pass(document, marks, root);
        if rescued > 0 {
            debug!("Marked {} additional paragraph roots for uncaptured inline text", rescued);
        }

        Ok(marks.paragraphs_in_order(document))
    }

    fn mark_pass(&mut self, document: &mut Document, marks: &mut NodeMarks, root: NodeId) -> Result<(), ProcessingError> {
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.enter(document, marks, root)? {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            // Children are read by index so wrappers inserted ahead of the
            // cursor are visited like any other sibling
            if let Some(&child) = document.children(frame.id).get(frame.next_child) {
                frame.next_child += 1;
                if let Some(child_frame) = self.enter(document, marks, child)? {
                    stack.push(child_frame);
                }
                continue;
            }

            if let Some(done) = stack.pop() {
                self.after_break = if done.block_level { true } else { done.saved_flag };
            }
        }
        Ok(())
    }

    /// Apply the marking rules to one node; returns a frame when its children must be visited
    fn enter(&mut self, document: &mut Document, marks: &mut NodeMarks, id: NodeId) -> Result<Option<Frame>, ProcessingError> {
        let class = match document.kind(id) {
            NodeKind::Element(data) => {
                if self.classifier.skips(data) || marks.is_translation(id) || marks.is_end_marker(id) {
                    return Ok(None);
                }
                self.classifier.classify(&data.name)
            }
            NodeKind::Document => TagClass::Block,
            _ => return Ok(None),
        };

        if class == TagClass::LineBreak {
            self.after_break = true;
            self.wrap_text_after_break(document, marks, id)?;
            return Ok(None);
        }

        let block_level = class == TagClass::Block;
        if document.is_element(id) && (block_level || self.after_break) {
            if marks.mark_paragraph(id) {
                trace!("Paragraph root <{}> ({:?})", document.tag_name(id).unwrap_or_default(), id);
            }
            self.after_break = false;
        }

        Ok(Some(Frame {
            id,
            next_child: 0,
            block_level,
            saved_flag: self.after_break,
        }))
    }

    /// Wrap the run of text and inline nodes that starts with bare text right after `br`
    ///
    /// Blank text and comments between the break and the run are not part of
    /// it. When the first non-blank sibling is an element, nothing is wrapped
    /// and the element is marked as the node after the break instead.
    fn wrap_text_after_break(&self, document: &mut Document, marks: &mut NodeMarks, br: NodeId) -> Result<(), ProcessingError> {
        let mut cursor = document.next_sibling(br);
        while let Some(id) = cursor {
            let blank = match document.kind(id) {
                NodeKind::Text(text) => text.trim().is_empty(),
                NodeKind::Comment(_) => true,
                _ => false,
            };
            if !blank {
                break;
            }
            cursor = document.next_sibling(id);
        }
        let Some(first) = cursor else {
            return Ok(());
        };
        if !document.is_text(first) {
            return Ok(());
        }

        let mut run = Vec::new();
        let mut cursor = Some(first);
        while let Some(id) = cursor {
            let joins = match document.kind(id) {
                NodeKind::Text(_) | NodeKind::Comment(_) => true,
                NodeKind::Element(data) => {
                    !self.classifier.skips(data)
                        && matches!(
                            self.classifier.classify(&data.name),
                            TagClass::InlineText | TagClass::InlineIgnore
                        )
                }
                _ => false,
            };
            if !joins {
                break;
            }
            run.push(id);
            cursor = document.next_sibling(id);
        }

        // Trailing whitespace stays outside the wrapper
        while run.last().is_some_and(|&id| {
            document.text(id).is_some_and(|text| text.trim().is_empty())
                || matches!(document.kind(id), NodeKind::Comment(_))
        }) {
            run.pop();
        }

        let (Some(&start), Some(&end)) = (run.first(), run.last()) else {
            return Ok(());
        };

        let wrapper = document.create_element(ElementData::new(GENERATED_WRAPPER_TAG));
        document.wrap_siblings(start, end, wrapper)?;
        marks.mark_generated(wrapper);
        trace!("Wrapped {} nodes after line break into generated paragraph", run.len());
        Ok(())
    }

    /// Mark the enclosing block of inline text that no paragraph root captured
    fn rescue_pass(&self, document: &Document, marks: &mut NodeMarks, root: NodeId) -> usize {
        let mut rescued = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match document.kind(id) {
                NodeKind::Element(data) => {
                    if self.classifier.skips(data) || marks.is_translation(id) || marks.is_end_marker(id) {
                        continue;
                    }
                }
                NodeKind::Document => {}
                NodeKind::Text(text) => {
                    if !text.trim().is_empty() && self.rescue_text(document, marks, id, root) {
                        rescued += 1;
                    }
                    continue;
                }
                _ => continue,
            }
            stack.extend(document.children(id).iter().rev().copied());
        }
        rescued
    }

    fn rescue_text(&self, document: &Document, marks: &mut NodeMarks, text: NodeId, root: NodeId) -> bool {
        let Some(parent) = document.parent(text) else {
            return false;
        };
        let parent_inline = document
            .tag_name(parent)
            .is_some_and(|tag| self.classifier.is_inline(tag));
        if !parent_inline {
            return false;
        }

        // Captured when a marked element other than the traversal root encloses the text
        let captured = document
            .ancestors(text)
            .take_while(|&id| id != root)
            .any(|id| marks.is_paragraph(id));
        if captured {
            return false;
        }

        let mut outermost_inline = parent;
        for id in document.ancestors(text) {
            match document.tag_name(id) {
                Some(tag) if self.classifier.is_inline(tag) => outermost_inline = id,
                Some(_) => return marks.mark_paragraph(id),
                None => break,
            }
        }
        marks.mark_paragraph(outermost_inline)
    }
}
