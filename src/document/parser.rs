/*!
 * HTML parsing into the arena tree.
 *
 * Parsing goes through html5ever's standards-compliant tree builder, so tag soup
 * is repaired the way a browser would repair it. The resulting RcDom is then
 * copied into a `Document` with an explicit stack.
 */

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use log::debug;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::errors::ProcessingError;

use super::node::{Document, ElementData, NodeId};

/// Parse raw bytes as an HTML document
///
/// The bytes must be valid UTF-8; anything else is rejected rather than
/// silently repaired.
pub fn parse_html_bytes(bytes: &[u8]) -> Result<Document, ProcessingError> {
    let html = std::str::from_utf8(bytes)
        .map_err(|e| ProcessingError::Parse(format!("input is not valid UTF-8: {}", e)))?;
    parse_html(html)
}

/// Parse a string as an HTML document
pub fn parse_html(html: &str) -> Result<Document, ProcessingError> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(|e| ProcessingError::Parse(e.to_string()))?;

    let recovered = dom.errors.borrow().len();
    if recovered > 0 {
        debug!("HTML parser recovered from {} markup errors", recovered);
    }

    let mut document = Document::new();
    let root = document.root();
    let mut stack: Vec<(Handle, NodeId)> = dom
        .document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), root))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let id = match &handle.data {
            NodeData::Document | NodeData::ProcessingInstruction { .. } => continue,
            NodeData::Doctype { name, .. } => document.create_doctype(name.to_string()),
            NodeData::Text { contents } => document.create_text(contents.borrow().to_string()),
            NodeData::Comment { contents } => document.create_comment(contents.to_string()),
            NodeData::Element { name, attrs, .. } => {
                let attrs = attrs
                    .borrow()
                    .iter()
                    .map(|attr| {
                        let local = attr.name.local.as_ref();
                        let key = match &attr.name.prefix {
                            Some(prefix) => format!("{}:{}", prefix.as_ref(), local),
                            None => local.to_string(),
                        };
                        (key, attr.value.to_string())
                    })
                    .collect();
                document.create_element(ElementData {
                    name: name.local.as_ref().to_string(),
                    attrs,
                })
            }
        };

        document
            .append_child(parent, id)
            .map_err(|e| ProcessingError::Parse(e.to_string()))?;

        for child in child_handles(&handle).into_iter().rev() {
            stack.push((child, id));
        }
    }

    Ok(document)
}

/// Regular children, followed by template contents for `<template>`
fn child_handles(handle: &Handle) -> Vec<Handle> {
    let mut children: Vec<Handle> = handle.children.borrow().iter().cloned().collect();
    if let NodeData::Element {
        template_contents, ..
    } = &handle.data
    {
        if let Some(contents) = template_contents.borrow().as_ref() {
            children.extend(contents.children.borrow().iter().cloned());
        }
    }
    children
}
