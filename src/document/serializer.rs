/*!
 * HTML serialization for documents and fragments.
 *
 * `Document` and `Fragment` implement html5ever's `Serialize`; escaping, void
 * elements and raw-text elements are handled by html5ever's `HtmlSerializer`.
 */

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use html5ever::{LocalName, QualName, ns};
use log::warn;

use super::fragment::Fragment;
use super::node::{Document, ElementData, NodeId, NodeKind};

/// Elements whose first newline is dropped by the parser
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

fn element_name(name: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(name))
}

fn attribute_name(name: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(name))
}

fn start_element<S>(serializer: &mut S, data: &ElementData, first_text: Option<&str>) -> io::Result<()>
where
    S: Serializer,
{
    let names: Vec<QualName> = data.attrs.iter().map(|(name, _)| attribute_name(name)).collect();
    let attrs = names
        .iter()
        .zip(&data.attrs)
        .map(|(name, (_, value))| (name, value.as_str()));
    serializer.start_elem(element_name(&data.name), attrs)?;

    // The parser eats one leading newline, so a text that starts with one needs another
    if LEADING_NEWLINE_ELEMENTS.contains(&data.name.as_str())
        && first_text.is_some_and(|text| text.starts_with('\n'))
    {
        serializer.write_text("\n")?;
    }
    Ok(())
}

enum Step<T> {
    Open(T),
    Close(QualName),
}

/// A live node and everything below it
struct Subtree<'a> {
    document: &'a Document,
    id: NodeId,
}

impl Serialize for Subtree<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let document = self.document;
        let mut stack: Vec<Step<NodeId>> = match traversal_scope {
            TraversalScope::IncludeNode => vec![Step::Open(self.id)],
            TraversalScope::ChildrenOnly(_) => document
                .children(self.id)
                .iter()
                .rev()
                .map(|&child| Step::Open(child))
                .collect(),
        };

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Open(id) => id,
                Step::Close(name) => {
                    serializer.end_elem(name)?;
                    continue;
                }
            };
            match document.kind(id) {
                NodeKind::Document => {
                    stack.extend(document.children(id).iter().rev().map(|&child| Step::Open(child)));
                }
                NodeKind::Doctype(name) => serializer.write_doctype(name)?,
                NodeKind::Comment(text) => serializer.write_comment(text)?,
                NodeKind::Text(text) => serializer.write_text(text)?,
                NodeKind::Element(data) => {
                    let first_text = document.children(id).first().and_then(|&child| document.text(child));
                    start_element(serializer, data, first_text)?;
                    stack.push(Step::Close(element_name(&data.name)));
                    stack.extend(document.children(id).iter().rev().map(|&child| Step::Open(child)));
                }
            }
        }
        Ok(())
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        Subtree {
            document: self,
            id: self.root(),
        }
        .serialize(serializer, traversal_scope)
    }
}

impl Serialize for Fragment {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        let mut stack: Vec<Step<&Fragment>> = match traversal_scope {
            TraversalScope::IncludeNode => vec![Step::Open(self)],
            TraversalScope::ChildrenOnly(_) => self.children().iter().rev().map(Step::Open).collect(),
        };

        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Open(node) => node,
                Step::Close(name) => {
                    serializer.end_elem(name)?;
                    continue;
                }
            };
            match node {
                Fragment::Text { text, .. } => serializer.write_text(text)?,
                Fragment::Comment(text) => serializer.write_comment(text)?,
                Fragment::Element { data, children, .. } => {
                    let first_text = match children.first() {
                        Some(Fragment::Text { text, .. }) => Some(text.as_str()),
                        _ => None,
                    };
                    start_element(serializer, data, first_text)?;
                    stack.push(Step::Close(element_name(&data.name)));
                    stack.extend(children.iter().rev().map(Step::Open));
                }
            }
        }
        Ok(())
    }
}

fn render<T: Serialize>(node: &T, traversal_scope: TraversalScope) -> String {
    let mut out = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    if let Err(e) = serialize(&mut out, node, opts) {
        warn!("HTML serialization stopped early: {}", e);
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Serialize the whole document
pub fn to_html(document: &Document) -> String {
    render(document, TraversalScope::ChildrenOnly(None))
}

/// Markup of the node itself and its subtree
pub fn outer_html(document: &Document, id: NodeId) -> String {
    render(&Subtree { document, id }, TraversalScope::IncludeNode)
}

/// Markup of the node's children
pub fn inner_html(document: &Document, id: NodeId) -> String {
    let parent = document.tag_name(id).map(element_name);
    render(&Subtree { document, id }, TraversalScope::ChildrenOnly(parent))
}

/// Markup of a fragment's children
pub fn fragment_inner_html(fragment: &Fragment) -> String {
    let parent = fragment.element_data().map(|data| element_name(&data.name));
    render(fragment, TraversalScope::ChildrenOnly(parent))
}
