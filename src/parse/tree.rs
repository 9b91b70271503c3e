//! Arena-backed document tree
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`].
//! A node can only be appended under an existing parent, so every parent
//! index is smaller than its children's and the tree is acyclic and
//! single-rooted by construction.

use url::Url;

/// Index of a node inside its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Attributes that survive parsing; everything else is dropped
pub const KEPT_ATTRIBUTES: &[&str] = &[
    "id",
    "class",
    "role",
    "href",
    "src",
    "alt",
    "title",
    "hidden",
    "aria-hidden",
    "start",
    "lang",
];

/// An element's tag and the attributes the pipeline cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase local tag name
    pub tag: String,
    /// Kept attributes in source order
    pub attrs: Vec<(String, String)>,
}

impl Element {
    /// Build an element, dropping attributes not in [`KEPT_ATTRIBUTES`]
    pub fn new<'a>(tag: &str, attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .into_iter()
                .filter(|(name, _)| KEPT_ATTRIBUTES.contains(name))
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    /// Element without attributes
    pub fn bare(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the element is explicitly hidden from readers
    pub fn is_hidden(&self) -> bool {
        self.attr("hidden").is_some()
            || self
                .attr("aria-hidden")
                .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The single root
    Document,
    /// A markup element
    Element(Element),
    /// Character data, verbatim
    Text(String),
    /// A markup comment
    Comment(String),
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Node payload
    pub kind: NodeKind,
    /// Parent index; `None` only for the root
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
}

/// Where the tree came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOrigin {
    /// Parsed from HTML/XML
    Markup,
    /// Built from plain text paragraphs; carries no structural hints
    PlainText,
}

/// A parsed document
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    origin: TreeOrigin,
    base_url: Option<Url>,
}

impl Tree {
    /// A tree holding only the root
    pub fn new(origin: TreeOrigin) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            origin,
            base_url: None,
        }
    }

    /// Root node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Origin of the tree
    pub fn origin(&self) -> TreeOrigin {
        self.origin
    }

    /// URL relative links resolve against
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Set the base URL for link resolution
    pub fn set_base_url(&mut self, url: Option<Url>) {
        self.base_url = url;
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Append a node as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Element payload, if the node is an element
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Lowercase tag name, if the node is an element
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Children in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent, `None` for the root
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Distance from the root
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// All ids in arena order
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// `id` and all its descendants in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Concatenated text of the subtree, comments excluded
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match &self.nodes[n.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// First element with the given tag, in document order
    pub fn find_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.tag(id) == Some(tag))
    }
}
