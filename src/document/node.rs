/*!
 * Arena-backed HTML tree.
 *
 * Every node lives in a single `Vec` owned by the `Document`; nodes refer to
 * each other through `NodeId` indices. Detached nodes stay in the arena, so a
 * `NodeId` remains valid for the lifetime of the document.
 */

use crate::errors::TreeError;

use super::fragment::Fragment;

/// Stable identity of a node inside one `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element payload: tag name plus attributes in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercase tag name for HTML elements
    pub name: String,
    /// Attribute name/value pairs
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Whether the whitespace-separated `class` attribute contains `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// The payload of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root
    Document,
    /// `<!DOCTYPE ...>`
    Doctype(String),
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeSlot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable HTML document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeSlot>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only its root node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeSlot {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes ever allocated, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[self.root.0].children.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|data| data.name.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element(_))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Text(_))
    }

    /// Text node carrying at least one non-whitespace character
    pub fn is_content_text(&self, id: NodeId) -> bool {
        self.text(id).is_some_and(|text| !text.trim().is_empty())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Position of `id` among its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).map(|prev| self.children(parent)[prev])
    }

    /// Parent chain of `id`, nearest first, `id` excluded
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(id),
        }
    }

    /// Ancestor chain from the document root down to the parent of `id`
    pub fn ancestor_path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = self.ancestors(id).collect();
        path.reverse();
        path
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// Whether `id` is reachable from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.is_ancestor_of(self.root, id)
    }

    /// Pre-order walk of the subtree rooted at `id`, `id` included
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: vec![id],
        }
    }

    /// Concatenated text of every text node under `id`
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// First element in document order with the given tag name
    pub fn find_element(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|&id| self.tag_name(id).is_some_and(|tag| tag.eq_ignore_ascii_case(name)))
    }

    /// Every text node attached to the document, in document order
    pub fn text_nodes(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .filter(|&id| self.is_text(id))
            .collect()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, data: ElementData) -> NodeId {
        self.alloc(NodeKind::Element(data))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(text.into()))
    }

    pub fn create_doctype(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Doctype(name.into()))
    }

    /// Unlink `id` from its parent; the node and its subtree stay allocated
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    fn ensure_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if parent == child || self.is_ancestor_of(child, parent) {
            return Err(TreeError::Cycle(child.0));
        }
        match self.kind(parent) {
            NodeKind::Element(_) | NodeKind::Document => Ok(()),
            _ => Err(TreeError::NotContainer(parent.0)),
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.ensure_insertable(parent, child)?;
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Insert `child` at `index` among the children of `parent`
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), TreeError> {
        self.ensure_insertable(parent, child)?;
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Insert `new_node` as the immediately preceding sibling of `reference`
    pub fn insert_before(&mut self, reference: NodeId, new_node: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(reference).ok_or(TreeError::Detached(reference.0))?;
        self.ensure_insertable(parent, new_node)?;
        self.detach(new_node);
        let index = self
            .index_in_parent(reference)
            .ok_or(TreeError::Detached(reference.0))?;
        self.nodes[parent.0].children.insert(index, new_node);
        self.nodes[new_node.0].parent = Some(parent);
        Ok(())
    }

    /// Insert `new_node` as the immediately following sibling of `reference`
    pub fn insert_after(&mut self, reference: NodeId, new_node: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(reference).ok_or(TreeError::Detached(reference.0))?;
        self.ensure_insertable(parent, new_node)?;
        self.detach(new_node);
        let index = self
            .index_in_parent(reference)
            .ok_or(TreeError::Detached(reference.0))?;
        self.nodes[parent.0].children.insert(index + 1, new_node);
        self.nodes[new_node.0].parent = Some(parent);
        Ok(())
    }

    /// Move the consecutive siblings `first..=last` into `wrapper`, which takes
    /// their place in the parent
    pub fn wrap_siblings(&mut self, first: NodeId, last: NodeId, wrapper: NodeId) -> Result<(), TreeError> {
        let parent = self.parent(first).ok_or(TreeError::Detached(first.0))?;
        if self.parent(last) != Some(parent) {
            return Err(TreeError::NotSiblings(first.0, last.0));
        }
        let start = self.index_in_parent(first).ok_or(TreeError::Detached(first.0))?;
        let end = self.index_in_parent(last).ok_or(TreeError::Detached(last.0))?;
        if end < start {
            return Err(TreeError::NotSiblings(first.0, last.0));
        }

        self.insert_before(first, wrapper)?;
        let moved: Vec<NodeId> = self.nodes[parent.0].children[start + 1..=end + 1].to_vec();
        for node in moved {
            self.append_child(wrapper, node)?;
        }
        Ok(())
    }

    /// Independent owned copy of the subtree rooted at `id`
    ///
    /// Each copied node remembers the `NodeId` it was copied from.
    pub fn deep_copy(&self, id: NodeId) -> Fragment {
        Fragment::copy_of(self, id)
    }

    /// Materialise an owned fragment as a new detached subtree of this document
    pub fn instantiate(&mut self, fragment: &Fragment) -> NodeId {
        let root = self.alloc_fragment_node(fragment);
        let mut stack: Vec<(NodeId, &Fragment)> = vec![(root, fragment)];
        while let Some((parent, source)) = stack.pop() {
            for child in source.children() {
                let id = self.alloc_fragment_node(child);
                self.nodes[id.0].parent = Some(parent);
                self.nodes[parent.0].children.push(id);
                stack.push((id, child));
            }
        }
        root
    }

    fn alloc_fragment_node(&mut self, fragment: &Fragment) -> NodeId {
        match fragment {
            Fragment::Element { data, .. } => self.alloc(NodeKind::Element(data.clone())),
            Fragment::Text { text, .. } => self.alloc(NodeKind::Text(text.clone())),
            Fragment::Comment(text) => self.alloc(NodeKind::Comment(text.clone())),
        }
    }
}

/// Iterator over the parent chain of a node
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

/// Explicit-stack pre-order iterator
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.document.children(current).iter().rev().copied());
        Some(current)
    }
}
