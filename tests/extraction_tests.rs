//! Selection and normalization tests
//!
//! These tests run the parse, select and normalize stages without any I/O.

use chew::extraction::{normalize, score, select};
use chew::parse::{MarkupParser, TreeOrigin};
use chew::OutputFormat;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn parse(html: &str) -> chew::parse::Tree {
    MarkupParser::new(1 << 20)
        .parse(html.as_bytes(), Some("text/html"))
        .unwrap()
}

const BODY: &str = "The committee met on Tuesday to review the proposal in detail. \
    Members raised concerns about the timeline and the budget, and asked for a revised plan \
    before the next session.";

#[test]
fn test_selection_ignores_sidebars_and_ads() {
    let html = format!(
        "<html><body>\
         <header class=\"masthead\"><h1>Daily News</h1></header>\
         <div class=\"sidebar\"><p>{b}</p></div>\
         <div id=\"content\"><p>{b}</p><p>{b}</p></div>\
         <div class=\"ad\"><p>{b}</p></div>\
         </body></html>",
        b = BODY
    );
    let tree = parse(&html);
    let node = select(&tree).unwrap();
    assert_eq!(tree.element(node).and_then(|e| e.attr("id")), Some("content"));
}

#[test]
fn test_uneven_paragraphs_select_whole_story() {
    let long = [BODY; 3].join(" ");
    let html = format!(
        "<html><body>\
         <nav class=\"menu\"><a href=\"/\">Home</a> <a href=\"/world\">World</a></nav>\
         <div class=\"story\"><h1>Budget vote delayed</h1><p>{long}</p><p>{short}</p>\
         <ul><li>Timeline under review</li><li>Budget to be revised</li></ul></div>\
         <footer class=\"site-footer\">Copyright 2024 <a href=\"/terms\">Terms</a></footer>\
         </body></html>",
        long = long,
        short = "A vote is expected next month, once the committee has seen the revised figures."
    );
    let tree = parse(&html);
    let node = select(&tree).unwrap();
    assert_eq!(tree.element(node).and_then(|e| e.attr("class")), Some("story"));

    let text = normalize(&tree, node, OutputFormat::Markdown);
    assert!(text.starts_with("# Budget vote delayed\n\n"));
    assert!(text.contains("A vote is expected next month, once the committee has seen the revised figures."));
    assert!(text.ends_with("- Timeline under review\n- Budget to be revised"));
    assert!(!text.contains("Home"));
    assert!(!text.contains("Copyright"));
}

#[test]
fn test_linked_card_blocks_stay_apart() {
    let tree = parse(
        "<html><body><div class=\"cards\">\
         <a href=\"/one\"><h3>First card</h3><p>What the first card says.</p></a>\
         <a href=\"/two\"><h3>Second card</h3><p>What the second card says.</p></a>\
         </div></body></html>",
    );
    let body = tree.find_tag("body").unwrap();
    assert_eq!(
        normalize(&tree, body, OutputFormat::Plain),
        "First card\n\nWhat the first card says.\n\nSecond card\n\nWhat the second card says."
    );
}

#[test]
fn test_malformed_markup_still_selects() {
    let html = format!(
        "<html><body><div class=\"article-body\"><p>{b}<p>{b}<b>unclosed <i>nesting</b></i></div>",
        b = BODY
    );
    let tree = parse(&html);
    let node = select(&tree).unwrap();
    let text = normalize(&tree, node, OutputFormat::Plain);
    assert!(text.contains("unclosed nesting"));
    assert_eq!(text.matches("The committee").count(), 2);
}

#[test]
fn test_hidden_elements_dropped() {
    let html = format!(
        "<html><body><main><p>{}</p><p hidden>secret</p><div aria-hidden=\"true\">also secret</div></main></body></html>",
        BODY
    );
    let tree = parse(&html);
    let node = select(&tree).unwrap();
    let text = normalize(&tree, node, OutputFormat::Plain);
    assert_eq!(text, BODY);
}

#[test]
fn test_scores_reported_in_document_order() {
    let tree = parse("<html><body><div><p>a</p></div><p>b</p></body></html>");
    let nodes: Vec<_> = score(&tree).into_iter().map(|c| c.node).collect();
    let mut sorted = nodes.clone();
    sorted.sort();
    assert_eq!(nodes, sorted);
}

#[test]
fn test_json_is_plain_text() {
    let tree = MarkupParser::new(1 << 20)
        .parse(br#"{"title": "hello", "body": "world"}"#, Some("application/json"))
        .unwrap();
    assert_eq!(tree.origin(), TreeOrigin::PlainText);
    let node = select(&tree).unwrap();
    assert_eq!(
        normalize(&tree, node, OutputFormat::Plain),
        r#"{"title": "hello", "body": "world"}"#
    );
}

#[test]
fn test_markdown_ordered_list_start() {
    let tree = parse("<html><body><ol start=\"3\"><li>three</li><li>four</li></ol></body></html>");
    let body = tree.find_tag("body").unwrap();
    assert_eq!(normalize(&tree, body, OutputFormat::Markdown), "3. three\n4. four");
}

#[test]
fn test_markdown_image_and_javascript_link() {
    let tree = parse(
        "<html><body><p><img src=\"https://cdn.example/a.png\" alt=\"A chart\"> \
         <a href=\"javascript:void(0)\">click</a></p></body></html>",
    );
    let body = tree.find_tag("body").unwrap();
    assert_eq!(
        normalize(&tree, body, OutputFormat::Markdown),
        "![A chart](https://cdn.example/a.png) click"
    );
}

fn arb_fragment() -> impl Strategy<Value = String> {
    let word = "[a-zA-Z]{1,8}";
    let leaf = prop_oneof![
        proptest::collection::vec(word, 1..6).prop_map(|w| w.join(" ")),
        word.prop_map(|w| format!("<b>{}</b>", w)),
        word.prop_map(|w| format!("<a href=\"/{}\">{}</a>", w, w)),
        word.prop_map(|w| format!("<script>{}</script>", w)),
        word.prop_map(|w| format!("<!-- {} -->", w)),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        let children = proptest::collection::vec(inner, 1..4).prop_map(|c| c.concat());
        prop_oneof![
            children.clone().prop_map(|c| format!("<p>{}</p>", c)),
            children.clone().prop_map(|c| format!("<div class=\"content\">{}</div>", c)),
            children.clone().prop_map(|c| format!("<ul><li>{}</li></ul>", c)),
            children.prop_map(|c| format!("<h2>{}</h2>", c)),
        ]
    })
}

fn arb_sentence(words: std::ops::Range<usize>) -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,9}", words).prop_map(|w| w.join(" "))
}

/// An article with paragraphs of uneven length, maybe a heading and a list
fn arb_story() -> impl Strategy<Value = String> {
    (
        proptest::option::of(arb_sentence(2..8)),
        proptest::collection::vec(arb_sentence(3..80), 1..5),
        proptest::option::of(proptest::collection::vec(arb_sentence(1..6), 1..4)),
    )
        .prop_map(|(heading, paragraphs, list)| {
            let mut html = String::from("<article class=\"post\">");
            if let Some(heading) = heading {
                html.push_str(&format!("<h2>{}</h2>", heading));
            }
            for p in paragraphs {
                html.push_str(&format!("<p>{}</p>", p));
            }
            if let Some(items) = list {
                html.push_str("<ul>");
                for item in items {
                    html.push_str(&format!("<li>{}</li>", item));
                }
                html.push_str("</ul>");
            }
            html.push_str("</article>");
            html
        })
}

fn arb_boilerplate() -> impl Strategy<Value = String> {
    let word = "[a-z]{1,8}";
    prop_oneof![
        proptest::collection::vec(word, 1..5).prop_map(|links| {
            let links: String = links
                .iter()
                .map(|l| format!("<a href=\"/{l}\">{l}</a> ", l = l))
                .collect();
            format!("<nav class=\"menu\">{}</nav>", links)
        }),
        word.prop_map(|w| format!(
            "<footer class=\"site-footer\">Copyright {} <a href=\"/terms\">Terms</a></footer>",
            w
        )),
        word.prop_map(|w| format!(
            "<aside class=\"sidebar\"><ul><li><a href=\"/{w}\">{w}</a></li></ul></aside>",
            w = w
        )),
        word.prop_map(|w| format!("<div class=\"ad-banner\">Buy {} now</div>", w)),
    ]
}

proptest! {
    #[test]
    fn prop_normalize_is_deterministic(fragment in arb_fragment()) {
        let html = format!("<html><body>{}</body></html>", fragment);
        let tree = parse(&html);
        let body = tree.find_tag("body").unwrap();
        for format in [OutputFormat::Plain, OutputFormat::Markdown] {
            let first = normalize(&tree, body, format);
            let second = normalize(&tree, body, format);
            prop_assert_eq!(&first, &second);
            prop_assert!(!first.contains("<!--"));
        }
        let plain = normalize(&tree, body, OutputFormat::Plain);
        prop_assert!(!plain.contains("  "));
    }

    #[test]
    fn prop_boilerplate_does_not_move_selection(
        story in arb_story(),
        before in proptest::collection::vec(arb_boilerplate(), 0..3),
        after in proptest::collection::vec(arb_boilerplate(), 0..3),
    ) {
        let clean = parse(&format!("<html><body>{}</body></html>", story));
        let noisy = parse(&format!(
            "<html><body>{}{}{}</body></html>",
            before.concat(),
            story,
            after.concat()
        ));
        let distill = |tree: &chew::parse::Tree| {
            select(tree).map(|node| normalize(tree, node, OutputFormat::Plain))
        };
        prop_assert_eq!(distill(&clean), distill(&noisy));
    }
}
