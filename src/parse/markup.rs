//! Tolerant markup parsing
//!
//! HTML and XML go through html5ever (via `scraper`), which applies the
//! browser recovery rules: mismatched tags are auto-closed, misnested
//! formatting is reparented and unknown entities are left as text. The
//! resulting DOM is copied into the arena [`Tree`]. Plain-text formats
//! become one paragraph element per blank-line separated block.

use crate::content_type::{self, ContentKind};
use crate::error::ParseError;
use crate::parse::encoding::{self, Decoded};
use crate::parse::tree::{Element, NodeKind, Tree, TreeOrigin};
use encoding_rs::Encoding;
use scraper::Html;
use tracing::{debug, instrument};
use url::Url;

/// A fetched and parsed document
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL of the document
    pub url: Url,
    /// Raw payload as received
    pub bytes: Vec<u8>,
    /// Encoding the payload was decoded with
    pub encoding: &'static Encoding,
    /// Parsed tree
    pub tree: Tree,
}

/// Turns raw bytes into a [`Tree`]
#[derive(Debug, Clone, Copy)]
pub struct MarkupParser {
    max_bytes: usize,
}

impl MarkupParser {
    /// Parser rejecting payloads larger than `max_bytes`
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// Parse a payload into a tree
    ///
    /// Only empty or oversized input fails; malformed markup never does.
    pub fn parse(&self, bytes: &[u8], content_type: Option<&str>) -> Result<Tree, ParseError> {
        self.parse_with_encoding(bytes, content_type)
            .map(|(tree, _)| tree)
    }

    /// Parse a fetched payload, keeping the bytes and the detected encoding
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn parse_document(
        &self,
        url: Url,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<Document, ParseError> {
        let (mut tree, encoding) = self.parse_with_encoding(&bytes, content_type)?;
        tree.set_base_url(Some(url.clone()));
        debug!("Parsed {} nodes as {}", tree.len(), encoding.name());
        Ok(Document {
            url,
            bytes,
            encoding,
            tree,
        })
    }

    fn parse_with_encoding(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<(Tree, &'static Encoding), ParseError> {
        if bytes.is_empty() {
            return Err(ParseError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(ParseError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let kind = match content_type {
            Some(ct) => content_type::classify(ct),
            None if content_type::looks_like_markup(bytes) => ContentKind::Markup,
            None => ContentKind::PlainText,
        };
        let declared = content_type.and_then(content_type::charset);

        let is_markup = kind == ContentKind::Markup;
        let Decoded { text, encoding } = encoding::decode(bytes, declared, is_markup)?;
        let tree = if is_markup {
            tree_from_html(&text)
        } else {
            tree_from_plain_text(&text)
        };
        Ok((tree, encoding))
    }
}

/// Build a tree from HTML/XML source
pub fn tree_from_html(source: &str) -> Tree {
    let html = Html::parse_document(source);
    let mut tree = Tree::new(TreeOrigin::Markup);

    let mut stack: Vec<_> = html
        .tree
        .root()
        .children()
        .rev()
        .map(|child| (child, tree.root()))
        .collect();

    while let Some((node, parent)) = stack.pop() {
        let kind = match node.value() {
            scraper::Node::Element(el) => NodeKind::Element(Element::new(el.name(), el.attrs())),
            scraper::Node::Text(text) => NodeKind::Text(String::from(&**text)),
            scraper::Node::Comment(comment) => NodeKind::Comment(String::from(&**comment)),
            _ => continue,
        };
        let id = tree.append(parent, kind);
        for child in node.children().rev() {
            stack.push((child, id));
        }
    }
    tree
}

/// Build a tree of paragraphs from plain text
pub fn tree_from_plain_text(source: &str) -> Tree {
    let mut tree = Tree::new(TreeOrigin::PlainText);
    let normalized = source.replace("\r\n", "\n");
    for block in normalized.split("\n\n") {
        if block.trim().is_empty() {
            continue;
        }
        let p = tree.append(tree.root(), NodeKind::Element(Element::bare("p")));
        tree.append(p, NodeKind::Text(block.to_string()));
    }
    tree
}
