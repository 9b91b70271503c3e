//! Flattening a subtree into text
//!
//! Walks the selected subtree in document order. Block elements end the
//! current paragraph, whitespace runs collapse to one space, and script,
//! style and comment nodes are dropped whatever was selected. In markdown
//! mode headings, lists, emphasis, code, quotes and links keep their
//! structure using the usual markers.

use crate::config::OutputFormat;
use crate::extraction::weights;
use crate::parse::{NodeId, NodeKind, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    ListItem,
}

#[derive(Debug)]
struct Block {
    kind: BlockKind,
    text: String,
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(usize),
}

struct Renderer<'t> {
    tree: &'t Tree,
    format: OutputFormat,
    blocks: Vec<Block>,
    current: String,
    lists: Vec<ListKind>,
    pending_marker: Option<String>,
}

/// Render the subtree under `node` as text in the given format
///
/// The output depends only on the tree and the format.
pub fn normalize(tree: &Tree, node: NodeId, format: OutputFormat) -> String {
    let mut renderer = Renderer::new(tree, format);
    renderer.walk(node);
    renderer.finish()
}

/// Collapse whitespace runs to single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

impl<'t> Renderer<'t> {
    fn new(tree: &'t Tree, format: OutputFormat) -> Self {
        Self {
            tree,
            format,
            blocks: Vec::new(),
            current: String::new(),
            lists: Vec::new(),
            pending_marker: None,
        }
    }

    fn markdown(&self) -> bool {
        self.format == OutputFormat::Markdown
    }

    fn finish(mut self) -> String {
        self.flush();
        let mut out = String::new();
        let mut previous: Option<BlockKind> = None;
        for block in &self.blocks {
            if let Some(prev) = previous {
                let tight = self.markdown() && prev == BlockKind::ListItem && block.kind == BlockKind::ListItem;
                out.push_str(if tight { "\n" } else { "\n\n" });
            }
            out.push_str(&block.text);
            previous = Some(block.kind);
        }
        out
    }

    /// End the current paragraph
    fn flush(&mut self) {
        let text = collapse_whitespace(&self.current);
        self.current.clear();
        let marker = self.pending_marker.take();
        if text.is_empty() {
            return;
        }
        match marker {
            Some(marker) => self.blocks.push(Block {
                kind: BlockKind::ListItem,
                text: format!("{}{}", marker, text),
            }),
            None => self.push_block(text),
        }
    }

    fn push_block(&mut self, text: String) {
        self.blocks.push(Block {
            kind: BlockKind::Paragraph,
            text,
        });
    }

    fn walk(&mut self, id: NodeId) {
        let tree = self.tree;
        match &tree.node(id).kind {
            NodeKind::Document => self.walk_children(id),
            NodeKind::Text(text) => self.current.push_str(text),
            NodeKind::Comment(_) => {}
            NodeKind::Element(el) => {
                if weights::is_skipped(&el.tag) || el.is_hidden() {
                    return;
                }
                match el.tag.as_str() {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(id, &el.tag),
                    "ul" | "ol" | "menu" | "dir" => self.list(id, el.tag == "ol", el.attr("start")),
                    "li" => self.list_item(id),
                    "pre" => self.preformatted(id),
                    "blockquote" if self.markdown() => self.blockquote(id),
                    "hr" => {
                        self.flush();
                        if self.markdown() {
                            self.push_block("---".to_string());
                        }
                    }
                    "br" => self.flush(),
                    tag if weights::is_block(tag) => {
                        self.flush();
                        self.walk_children(id);
                        self.flush();
                    }
                    _ => self.inline_element(id),
                }
            }
        }
    }

    fn walk_children(&mut self, id: NodeId) {
        for &child in self.tree.children(id) {
            self.walk(child);
        }
    }

    fn heading(&mut self, id: NodeId, tag: &str) {
        self.flush();
        let text = collapse_whitespace(&self.inline_text(id));
        if text.is_empty() {
            return;
        }
        if self.markdown() {
            let level = tag[1..].parse::<usize>().unwrap_or(1);
            self.push_block(format!("{} {}", "#".repeat(level), text));
        } else {
            self.push_block(text);
        }
    }

    fn list(&mut self, id: NodeId, ordered: bool, start: Option<&str>) {
        self.flush();
        let kind = if ordered {
            ListKind::Ordered(start.and_then(|s| s.trim().parse().ok()).unwrap_or(1))
        } else {
            ListKind::Unordered
        };
        self.lists.push(kind);
        self.walk_children(id);
        self.flush();
        self.lists.pop();
    }

    fn list_item(&mut self, id: NodeId) {
        self.flush();
        if self.markdown() {
            let depth = self.lists.len().saturating_sub(1);
            let bullet = match self.lists.last_mut() {
                Some(ListKind::Ordered(n)) => {
                    let bullet = format!("{}. ", n);
                    *n += 1;
                    bullet
                }
                _ => "- ".to_string(),
            };
            self.pending_marker = Some(format!("{}{}", "  ".repeat(depth), bullet));
        }
        self.walk_children(id);
        self.flush();
    }

    fn preformatted(&mut self, id: NodeId) {
        self.flush();
        let raw = self.tree.text_content(id);
        let raw = raw.trim_matches('\n').trim_end();
        if raw.trim().is_empty() {
            return;
        }
        if self.markdown() {
            self.push_block(format!("```\n{}\n```", raw));
        } else {
            self.push_block(raw.to_string());
        }
    }

    fn blockquote(&mut self, id: NodeId) {
        self.flush();
        let mut inner = Renderer::new(self.tree, self.format);
        inner.walk_children(id);
        let quoted = inner.finish();
        if quoted.is_empty() {
            return;
        }
        let text = quoted
            .lines()
            .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {}", line) })
            .collect::<Vec<_>>()
            .join("\n");
        self.push_block(text);
    }

    /// Inline elements wrapping blocks (`<a><h3>..</h3><p>..</p></a>`) lose
    /// their own markup and render their children as blocks
    fn inline_element(&mut self, id: NodeId) {
        if self.has_block_descendant(id) {
            self.walk_children(id);
        } else {
            let rendered = self.inline_markup(id);
            self.current.push_str(&rendered);
        }
    }

    fn has_block_descendant(&self, id: NodeId) -> bool {
        self.tree.children(id).iter().any(|&child| match self.tree.element(child) {
            Some(el) if weights::is_skipped(&el.tag) || el.is_hidden() => false,
            Some(el) if el.tag != "br" && weights::is_block(&el.tag) => true,
            Some(_) => self.has_block_descendant(child),
            None => false,
        })
    }

    /// Inline content of `id` as one string, markers included
    fn inline_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.tree.children(id) {
            out.push_str(&self.inline_markup(child));
        }
        out
    }

    fn inline_markup(&self, id: NodeId) -> String {
        let el = match &self.tree.node(id).kind {
            NodeKind::Text(text) => return text.clone(),
            NodeKind::Element(el) => el,
            _ => return String::new(),
        };
        if weights::is_skipped(&el.tag) || el.is_hidden() {
            return String::new();
        }
        if el.tag == "br" {
            return " ".to_string();
        }

        let inner = self.inline_text(id);
        if !self.markdown() {
            return match el.tag.as_str() {
                "td" | "th" => format!("{} ", inner),
                _ => inner,
            };
        }

        match el.tag.as_str() {
            "strong" | "b" => wrap(&inner, "**", "**"),
            "em" | "i" | "cite" => wrap(&inner, "*", "*"),
            "del" | "s" | "strike" => wrap(&inner, "~~", "~~"),
            "code" | "kbd" | "samp" => wrap(&inner, "`", "`"),
            "a" => match el.attr("href").and_then(|href| self.resolve(href)) {
                Some(href) => wrap(&inner, "[", &format!("]({})", href)),
                None => inner,
            },
            "img" => match (el.attr("src").and_then(|src| self.resolve(src)), el.attr("alt")) {
                (Some(src), Some(alt)) if !alt.trim().is_empty() => {
                    format!("![{}]({})", collapse_whitespace(alt), src)
                }
                _ => String::new(),
            },
            "td" | "th" => format!("{} ", inner),
            _ => inner,
        }
    }

    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || href.to_ascii_lowercase().starts_with("javascript:") {
            return None;
        }
        match self.tree.base_url() {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Some(href.to_string()),
        }
    }
}

/// Surround collapsed `inner` with markers, keeping outer whitespace outside
fn wrap(inner: &str, open: &str, close: &str) -> String {
    let body = collapse_whitespace(inner);
    if body.is_empty() {
        return if inner.is_empty() { String::new() } else { " ".to_string() };
    }
    let lead = if inner.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if inner.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{}{}{}{}{}", lead, open, body, close, trail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::markup::{tree_from_html, tree_from_plain_text};
    use pretty_assertions::assert_eq;
    use url::Url;

    fn body_of(html: &str) -> (Tree, NodeId) {
        let tree = tree_from_html(html);
        let body = tree.find_tag("body").unwrap();
        (tree, body)
    }

    #[test]
    fn test_paragraphs_and_whitespace() {
        let (tree, body) = body_of("<body><p>Hello   <b>world</b>\n  again</p><div>Second\tblock</div></body>");
        assert_eq!(
            normalize(&tree, body, OutputFormat::Plain),
            "Hello world again\n\nSecond block"
        );
    }

    #[test]
    fn test_strips_scripts_styles_comments() {
        let (tree, body) = body_of(
            "<body><p>Keep<script>alert('x')</script> this<!-- hidden note --></p><style>p{}</style></body>",
        );
        assert_eq!(normalize(&tree, body, OutputFormat::Plain), "Keep this");
        assert_eq!(normalize(&tree, body, OutputFormat::Markdown), "Keep this");
    }

    #[test]
    fn test_markdown_structure() {
        let (tree, body) = body_of(
            "<body><h2>Section</h2><p>Some <strong>bold</strong> and <em>soft</em> text with \
             <a href=\"https://rust-lang.org\">a link</a>.</p>\
             <ul><li>one</li><li>two<ol><li>nested</li></ol></li></ul></body>",
        );
        let md = normalize(&tree, body, OutputFormat::Markdown);
        assert_eq!(
            md,
            "## Section\n\n\
             Some **bold** and *soft* text with [a link](https://rust-lang.org).\n\n\
             - one\n- two\n  1. nested"
        );
    }

    #[test]
    fn test_plain_flattens_markup() {
        let (tree, body) = body_of(
            "<body><h2>Section</h2><ul><li>one</li><li>two</li></ul><p><a href=\"/x\">link</a></p></body>",
        );
        assert_eq!(
            normalize(&tree, body, OutputFormat::Plain),
            "Section\n\none\n\ntwo\n\nlink"
        );
    }

    #[test]
    fn test_relative_links_resolve_against_base() {
        let mut tree = tree_from_html("<body><p>See <a href=\"/docs\">docs</a></p></body>");
        tree.set_base_url(Some(Url::parse("https://example.com/a/b").unwrap()));
        let body = tree.find_tag("body").unwrap();
        assert_eq!(
            normalize(&tree, body, OutputFormat::Markdown),
            "See [docs](https://example.com/docs)"
        );
    }

    #[test]
    fn test_emphasis_whitespace_stays_outside_markers() {
        let (tree, body) = body_of("<body><p>a<b> spaced </b>b</p></body>");
        assert_eq!(normalize(&tree, body, OutputFormat::Markdown), "a **spaced** b");
    }

    #[test]
    fn test_preformatted_and_quote() {
        let (tree, body) = body_of(
            "<body><pre>fn main() {\n    println!(\"hi\");\n}</pre><blockquote><p>Quoted</p><p>Twice</p></blockquote></body>",
        );
        assert_eq!(
            normalize(&tree, body, OutputFormat::Markdown),
            "```\nfn main() {\n    println!(\"hi\");\n}\n```\n\n> Quoted\n>\n> Twice"
        );
    }

    #[test]
    fn test_inline_wrapper_around_blocks_keeps_breaks() {
        let (tree, body) = body_of(
            "<body><a href=\"/x\"><h3>Title</h3><p>Description</p></a>\
             <span><div>alpha</div><div>beta</div></span></body>",
        );
        assert_eq!(
            normalize(&tree, body, OutputFormat::Plain),
            "Title\n\nDescription\n\nalpha\n\nbeta"
        );
        assert_eq!(
            normalize(&tree, body, OutputFormat::Markdown),
            "### Title\n\nDescription\n\nalpha\n\nbeta"
        );
    }

    #[test]
    fn test_inline_wrapper_without_blocks_keeps_markup() {
        let (tree, body) = body_of("<body><p><a href=\"https://rust-lang.org\"><b>Rust</b> home</a></p></body>");
        assert_eq!(
            normalize(&tree, body, OutputFormat::Markdown),
            "[**Rust** home](https://rust-lang.org)"
        );
    }

    #[test]
    fn test_plain_text_tree_round_trip() {
        let tree = tree_from_plain_text("A single   paragraph\nof text.");
        assert_eq!(
            normalize(&tree, tree.root(), OutputFormat::Plain),
            "A single paragraph of text."
        );
    }

    #[test]
    fn test_deterministic() {
        let (tree, body) = body_of(
            "<body><article><h1>T</h1><p>x <i>y</i></p><ul><li>a</li></ul></article></body>",
        );
        for format in [OutputFormat::Plain, OutputFormat::Markdown] {
            assert_eq!(normalize(&tree, body, format), normalize(&tree, body, format));
        }
    }
}
