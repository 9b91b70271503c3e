//! Static scoring tables for the content selector
//!
//! Tag weights and class/id/role hint weights are plain data so the
//! selector's signals can be tuned and tested in isolation.

/// Share of a child's aggregate score credited to its parent
pub const PROPAGATION: f64 = 0.5;

/// Minimum aggregate score a node needs to be selected
pub const SELECTION_THRESHOLD: f64 = 20.0;

/// Share of the top score that the other children of its parent must add
/// up to before the parent is selected instead
pub const SIBLING_SHARE: f64 = 0.1;

/// Nodes whose own tag and hint weight is at or below this never pull the
/// selection up to their parent
pub const BOILERPLATE_WEIGHT: f64 = -10.0;

/// Hint keywords shorter than this only match whole tokens
const MIN_PREFIX_LEN: usize = 4;

/// Subtrees that never hold readable content
pub const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link", "svg", "math",
    "iframe", "object", "embed", "canvas", "button", "input", "select", "textarea", "option",
];

/// Elements that start a new block of text
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "center", "dd", "details", "dialog",
    "dir", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "li", "main", "menu", "nav", "ol",
    "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
    "br",
];

/// Score contribution of the tag itself
pub const TAG_WEIGHTS: &[(&str, f64)] = &[
    ("article", 30.0),
    ("main", 30.0),
    ("section", 5.0),
    ("p", 5.0),
    ("pre", 5.0),
    ("blockquote", 3.0),
    ("td", 3.0),
    ("div", 0.0),
    ("address", -5.0),
    ("dl", -3.0),
    ("ol", -3.0),
    ("ul", -3.0),
    ("li", -3.0),
    ("h1", -5.0),
    ("h2", -5.0),
    ("h3", -5.0),
    ("h4", -5.0),
    ("h5", -5.0),
    ("h6", -5.0),
    ("th", -5.0),
    ("header", -20.0),
    ("form", -20.0),
    ("aside", -30.0),
    ("menu", -30.0),
    ("nav", -40.0),
    ("footer", -40.0),
];

/// Score contribution of class/id/role tokens
pub const HINT_WEIGHTS: &[(&str, f64)] = &[
    ("article", 25.0),
    ("content", 25.0),
    ("main", 25.0),
    ("post", 20.0),
    ("entry", 20.0),
    ("story", 20.0),
    ("body", 15.0),
    ("text", 15.0),
    ("blog", 10.0),
    ("ad", -25.0),
    ("ads", -25.0),
    ("advert", -25.0),
    ("banner", -25.0),
    ("breadcrumb", -25.0),
    ("comment", -20.0),
    ("cookie", -25.0),
    ("footer", -25.0),
    ("header", -15.0),
    ("masthead", -25.0),
    ("menu", -25.0),
    ("nav", -25.0),
    ("newsletter", -25.0),
    ("pagination", -25.0),
    ("popup", -25.0),
    ("promo", -25.0),
    ("related", -20.0),
    ("share", -20.0),
    ("sidebar", -25.0),
    ("social", -20.0),
    ("sponsor", -25.0),
    ("subscribe", -25.0),
    ("widget", -20.0),
];

/// Weight of a tag, zero when unlisted
pub fn tag_weight(tag: &str) -> f64 {
    TAG_WEIGHTS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

/// Sum of hint weights matched by the tokens of `value`
///
/// `value` is split on anything that is not alphanumeric. Short keywords
/// like `ad` must equal a token; longer ones also match as a prefix, so
/// `navigation` hits `nav` and `advertisement` hits `advert`.
pub fn hint_weight(value: &str) -> f64 {
    let value = value.to_ascii_lowercase();
    let mut total = 0.0;
    for token in value.split(|c: char| !c.is_ascii_alphanumeric()).filter(|t| !t.is_empty()) {
        // One keyword per token; the longest match wins.
        let best = HINT_WEIGHTS
            .iter()
            .filter(|(kw, _)| token == *kw || (is_prefix_match(kw) && token.starts_with(kw)))
            .max_by_key(|(kw, _)| kw.len());
        if let Some((_, weight)) = best {
            total += weight;
        }
    }
    total
}

fn is_prefix_match(keyword: &str) -> bool {
    keyword.len() >= MIN_PREFIX_LEN || keyword == "nav"
}

/// Whether the subtree under `tag` is ignored entirely
pub fn is_skipped(tag: &str) -> bool {
    SKIPPED_TAGS.contains(&tag)
}

/// Whether `tag` starts a new block
pub fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}
