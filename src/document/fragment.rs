/*!
 * Owned, detached copies of document subtrees.
 *
 * A `Fragment` never aliases the live `Document`: it is built by structural
 * deep copy and every copied node keeps the `NodeId` of its original, which
 * is what lets a copy be pruned against a set of live nodes.
 */

use std::collections::HashSet;
use std::fmt;

use super::node::{Document, ElementData, NodeId, NodeKind};

/// Positional address of a node inside a fragment: child indices from the root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(steps: Vec<usize>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|step| step.to_string()).collect();
        write!(f, "/{}", rendered.join("/"))
    }
}

/// Owned copy of a subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Element {
        origin: Option<NodeId>,
        data: ElementData,
        children: Vec<Fragment>,
    },
    Text {
        origin: Option<NodeId>,
        text: String,
    },
    Comment(String),
}

struct CopyFrame<'a> {
    node: Fragment,
    children: &'a [NodeId],
    next: usize,
}

impl Fragment {
    /// Detached element with no origin
    pub fn element(data: ElementData) -> Self {
        Self::Element {
            origin: None,
            data,
            children: Vec::new(),
        }
    }

    /// Detached text with no origin
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            origin: None,
            text: text.into(),
        }
    }

    fn shallow(document: &Document, id: NodeId) -> Self {
        match document.kind(id) {
            NodeKind::Element(data) => Self::Element {
                origin: Some(id),
                data: data.clone(),
                children: Vec::new(),
            },
            NodeKind::Document => Self::Element {
                origin: Some(id),
                data: ElementData::new("#document"),
                children: Vec::new(),
            },
            NodeKind::Text(text) => Self::Text {
                origin: Some(id),
                text: text.clone(),
            },
            NodeKind::Comment(text) => Self::Comment(text.clone()),
            NodeKind::Doctype(name) => Self::Comment(format!("DOCTYPE {name}")),
        }
    }

    /// Structural deep copy of the subtree rooted at `id`
    pub(crate) fn copy_of(document: &Document, id: NodeId) -> Self {
        let mut stack = vec![CopyFrame {
            node: Self::shallow(document, id),
            children: document.children(id),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if let Some(&child) = frame.children.get(frame.next) {
                frame.next += 1;
                stack.push(CopyFrame {
                    node: Self::shallow(document, child),
                    children: document.children(child),
                    next: 0,
                });
                continue;
            }

            let Some(finished) = stack.pop() else { break };
            match stack.last_mut() {
                Some(parent) => parent.node.push_child(finished.node),
                None => return finished.node,
            }
        }

        Self::shallow(document, id)
    }

    /// Live node this copy was taken from
    pub fn origin(&self) -> Option<NodeId> {
        match self {
            Self::Element { origin, .. } | Self::Text { origin, .. } => *origin,
            Self::Comment(_) => None,
        }
    }

    pub fn element_data(&self) -> Option<&ElementData> {
        match self {
            Self::Element { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Fragment] {
        match self {
            Self::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Append a child; a no-op on text and comment nodes
    pub fn push_child(&mut self, child: Fragment) {
        if let Self::Element { children, .. } = self {
            children.push(child);
        }
    }

    pub fn get(&self, path: &NodePath) -> Option<&Fragment> {
        path.steps()
            .iter()
            .try_fold(self, |node, &step| node.children().get(step))
    }

    pub fn get_mut(&mut self, path: &NodePath) -> Option<&mut Fragment> {
        let mut node = self;
        for &step in path.steps() {
            node = match node {
                Self::Element { children, .. } => children.get_mut(step)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Replace the payload of the text node at `path`
    ///
    /// Returns `false` when `path` does not address a text node.
    pub fn set_text(&mut self, path: &NodePath, value: impl Into<String>) -> bool {
        match self.get_mut(path) {
            Some(Self::Text { text, .. }) => {
                *text = value.into();
                true
            }
            _ => false,
        }
    }

    /// Concatenated text of every text node in the fragment
    pub fn text_content(&self) -> String {
        self.text_leaves()
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .concat()
    }

    /// Whether the fragment holds no non-whitespace text
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text { text, .. } => text.trim().is_empty(),
            Self::Comment(_) => true,
            Self::Element { children, .. } => children.iter().all(Fragment::is_blank),
        }
    }

    /// Every text node with its path, in document order
    pub fn text_leaves(&self) -> Vec<(NodePath, &str)> {
        let mut leaves = Vec::new();
        let mut stack: Vec<(NodePath, &Fragment)> = vec![(NodePath::root(), self)];
        while let Some((path, node)) = stack.pop() {
            match node {
                Self::Text { text, .. } => leaves.push((path, text.as_str())),
                Self::Element { children, .. } => {
                    for (index, child) in children.iter().enumerate().rev() {
                        stack.push((path.child(index), child));
                    }
                }
                Self::Comment(_) => {}
            }
        }
        leaves
    }

    /// Drop every element and non-blank text whose origin is not in `keep`
    ///
    /// Comments are dropped as well; whitespace-only text is left in place so
    /// the copy keeps its original spacing.
    pub fn retain_origins(&mut self, keep: &HashSet<NodeId>) {
        if let Self::Element { children, .. } = self {
            children.retain(|child| match child {
                Self::Element { origin, .. } => origin.is_some_and(|id| keep.contains(&id)),
                Self::Text { origin, text } => {
                    text.trim().is_empty() || origin.is_some_and(|id| keep.contains(&id))
                }
                Self::Comment(_) => false,
            });
            for child in children.iter_mut() {
                child.retain_origins(keep);
            }
        }
    }

    /// Remove descendant elements that are left without meaningful content
    pub fn remove_empty_elements(&mut self) {
        if let Self::Element { children, .. } = self {
            for child in children.iter_mut() {
                child.remove_empty_elements();
            }
            children.retain(|child| !matches!(child, Self::Element { .. }) || !child.is_blank());
        }
    }
}
