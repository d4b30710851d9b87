/*!
 * Stylesheets injected into bilingual output.
 */

use crate::document::{Document, ElementData, NodeId};
use crate::errors::TreeError;

use super::markers::MarkerNames;

const PREFIX_PLACEHOLDER: &str = "{p}";

const DEFAULT_CSS: &str = r#"
:root {
  --{p}-theme-grey-textColor: #2f4f4f;
  --{p}-theme-dashed-borderColor: #59c1bd;
  --{p}-theme-dividingLine-borderColor: #94a3b8;
}

[{p}-state="dual"] .{p}-target-translation-pre-whitespace {
  white-space: pre-wrap !important;
}

[{p}-state="dual"] .{p}-target-wrapper[dir="rtl"] {
  text-align: right;
}

[{p}-state="translation"] .{p}-target-wrapper > br {
  display: none;
}

[{p}-state="translation"] .{p}-target-translation-block-wrapper {
  margin: 0 !important;
}

[{p}-state="dual"] .{p}-target-translation-block-wrapper {
  margin: 8px 0 !important;
  display: inline-block;
}

.{p}-target-wrapper {
  word-break: break-word;
  user-select: text;
}

[dir='rtl'] .{p}-target-wrapper:not([dir]) {
  text-align: left;
}
"#;

const DYNAMIC_CSS: &str = r#".{p}-target-wrapper[dir='rtl'] {text-align: right;}
.{p}-target-wrapper {word-break:break-word; user-select:text;}
[{p}-state="translation"] .{p}-target-wrapper[dir='rtl'] {display:inline-block;}
[{p}-state=dual] .{p}-target-translation-block-wrapper-theme-dividingLine::before {display:block;}"#;

const USER_CSS: &str = r#".{p}-target-inner { font-family: inherit; }"#;

/// The three stylesheets as `(data-id, css)` pairs, prefix applied
pub fn stylesheets(names: &MarkerNames) -> Vec<(String, String)> {
    let prefix = names.prefix();
    [
        ("default-injected-css", DEFAULT_CSS),
        ("dynamic-injected-css", DYNAMIC_CSS),
        ("user-custom-style", USER_CSS),
    ]
    .into_iter()
    .map(|(id, css)| (format!("{prefix}-{id}"), css.replace(PREFIX_PLACEHOLDER, prefix)))
    .collect()
}

/// `<head>` of the document, created under `<html>` when missing
fn ensure_head(document: &mut Document) -> Result<NodeId, TreeError> {
    if let Some(head) = document.find_element("head") {
        return Ok(head);
    }
    let head = document.create_element(ElementData::new("head"));
    match document.find_element("html") {
        Some(html) => document.insert_child(html, 0, head)?,
        None => {
            let root = document.root();
            document.append_child(root, head)?;
        }
    }
    Ok(head)
}

/// Append the stylesheets to `<head>`; returns the inserted `<style>` elements
pub fn inject_styles(document: &mut Document, names: &MarkerNames) -> Result<Vec<NodeId>, TreeError> {
    let head = ensure_head(document)?;
    let mut inserted = Vec::new();
    for (id, css) in stylesheets(names) {
        let style = document.create_element(ElementData::new("style").with_attr("data-id", id));
        let text = document.create_text(css);
        document.append_child(style, text)?;
        document.append_child(head, style)?;
        inserted.push(style);
    }
    Ok(inserted)
}

/// Mark the root element as dual-display and stamp the session id on `<body>`
pub fn annotate_document(document: &mut Document, names: &MarkerNames, session_id: &str) {
    if let Some(html) = document.find_element("html") {
        if let Some(element) = document.element_mut(html) {
            element.set_attr(names.state(), "dual");
        }
    }
    if let Some(body) = document.find_element("body") {
        if let Some(element) = document.element_mut(body) {
            element.set_attr(names.walked(), session_id);
        }
    }
}
