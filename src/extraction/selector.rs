//! Content selection
//!
//! Scores every element by text density, tag and class/id hints and link
//! density, lets a fraction of each child's score flow into its parent and
//! picks the best node above [`SELECTION_THRESHOLD`]. The winner then gives
//! way to its parent for as long as its siblings carry content of their own,
//! so an article with one long paragraph is still taken whole.

use crate::error::SelectionError;
use crate::extraction::weights::{self, BOILERPLATE_WEIGHT, PROPAGATION, SELECTION_THRESHOLD, SIBLING_SHARE};
use crate::parse::{NodeId, NodeKind, Tree, TreeOrigin};
use std::cmp::Ordering;
use tracing::debug;

/// A scored element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentCandidate {
    /// The scored node
    pub node: NodeId,
    /// Aggregate score including propagated child scores
    pub score: f64,
    /// Visible text length of the subtree
    pub text_len: usize,
    /// Text not separated from the node by a block element, per block descendant
    pub text_density: f64,
    /// Share of the text that sits inside links
    pub link_density: f64,
    /// Tag and class/id/role hint weight of the node itself
    pub weight: f64,
    /// Distance from the root
    pub depth: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Metrics {
    text_len: usize,
    inline_text_len: usize,
    link_len: usize,
    block_count: usize,
    score: f64,
    is_block: bool,
    skipped: bool,
}

/// Score every element of the tree, in document order
pub fn score(tree: &Tree) -> Vec<ContentCandidate> {
    let mut depth = vec![0usize; tree.len()];
    for id in tree.ids().skip(1) {
        if let Some(parent) = tree.parent(id) {
            depth[id.index()] = depth[parent.index()] + 1;
        }
    }

    // Children always have larger ids than their parent, so a reverse sweep
    // visits every child before its parent.
    let mut metrics = vec![Metrics::default(); tree.len()];
    let mut candidates = Vec::new();
    for id in tree.ids().rev() {
        let m = match &tree.node(id).kind {
            NodeKind::Text(text) => {
                let len = visible_len(text);
                Metrics {
                    text_len: len,
                    inline_text_len: len,
                    ..Metrics::default()
                }
            }
            NodeKind::Comment(_) => Metrics {
                skipped: true,
                ..Metrics::default()
            },
            NodeKind::Document => aggregate(tree, id, &metrics, false),
            NodeKind::Element(el) => {
                if weights::is_skipped(&el.tag) || el.is_hidden() {
                    Metrics {
                        skipped: true,
                        ..Metrics::default()
                    }
                } else {
                    let mut m = aggregate(tree, id, &metrics, weights::is_block(&el.tag));
                    if el.tag == "a" {
                        m.link_len = m.text_len;
                    }
                    let link_density = ratio(m.link_len, m.text_len);
                    let text_density = m.inline_text_len as f64 / (1 + m.block_count) as f64;
                    let weight = weights::tag_weight(&el.tag)
                        + ["class", "id", "role"]
                            .iter()
                            .filter_map(|name| el.attr(name))
                            .map(weights::hint_weight)
                            .sum::<f64>();
                    m.score = if m.text_len == 0 {
                        0.0
                    } else {
                        let raw = text_density + weight + m.score;
                        if raw > 0.0 {
                            raw * (1.0 - link_density)
                        } else {
                            raw
                        }
                    };
                    candidates.push(ContentCandidate {
                        node: id,
                        score: m.score,
                        text_len: m.text_len,
                        text_density,
                        link_density,
                        weight,
                        depth: depth[id.index()],
                    });
                    m
                }
            }
        };
        metrics[id.index()] = m;
    }

    candidates.reverse();
    candidates
}

/// Fold the children's metrics into their parent's. `score` carries the
/// propagated share of the children's scores.
fn aggregate(tree: &Tree, id: NodeId, metrics: &[Metrics], is_block: bool) -> Metrics {
    let mut m = Metrics {
        is_block,
        ..Metrics::default()
    };
    for &child in tree.children(id) {
        let c = &metrics[child.index()];
        if c.skipped {
            continue;
        }
        m.text_len += c.text_len;
        m.link_len += c.link_len;
        m.score += PROPAGATION * c.score;
        if c.is_block {
            m.block_count += 1 + c.block_count;
        } else {
            m.block_count += c.block_count;
            m.inline_text_len += c.inline_text_len;
        }
    }
    m
}

fn visible_len(text: &str) -> usize {
    let mut words = 0usize;
    let mut chars = 0usize;
    for word in text.split_whitespace() {
        words += 1;
        chars += word.chars().count();
    }
    chars + words.saturating_sub(1)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64).min(1.0)
    }
}

/// Highest scoring candidate; ties go to the shallower node
pub fn select_candidate(tree: &Tree) -> Result<ContentCandidate, SelectionError> {
    if tree.origin() == TreeOrigin::PlainText {
        let text_len = visible_len(&tree.text_content(tree.root()));
        if text_len == 0 {
            return Err(SelectionError::Empty);
        }
        return Ok(ContentCandidate {
            node: tree.root(),
            score: text_len as f64,
            text_len,
            text_density: text_len as f64,
            link_density: 0.0,
            weight: 0.0,
            depth: 0,
        });
    }

    let candidates = score(tree);
    let best = candidates
        .iter()
        .copied()
        .filter(|c| c.score >= SELECTION_THRESHOLD)
        .reduce(|best, c| match c.score.total_cmp(&best.score) {
            Ordering::Greater => c,
            Ordering::Equal if c.depth < best.depth => c,
            _ => best,
        })
        .map(|top| promote(tree, &candidates, top));

    match best {
        Some(candidate) => {
            debug!(
                "Selected node {} (score {:.1}, depth {}, {} chars)",
                candidate.node.index(),
                candidate.score,
                candidate.depth,
                candidate.text_len
            );
            Ok(candidate)
        }
        None => Err(SelectionError::Empty),
    }
}

/// Climb from `top` to its parent while the parent's other children score at
/// least [`SIBLING_SHARE`] of `top` between them. Boilerplate siblings do not
/// count, however much text they hold.
fn promote(tree: &Tree, candidates: &[ContentCandidate], top: ContentCandidate) -> ContentCandidate {
    let mut by_node = vec![None; tree.len()];
    for c in candidates {
        by_node[c.node.index()] = Some(*c);
    }

    let floor = top.score * SIBLING_SHARE;
    let mut current = top;
    while let Some(parent) = tree.parent(current.node).and_then(|p| by_node[p.index()]) {
        if parent.score < SELECTION_THRESHOLD {
            break;
        }
        let siblings: f64 = tree
            .children(parent.node)
            .iter()
            .filter(|&&child| child != current.node)
            .filter_map(|child| by_node[child.index()])
            .filter(|c| c.weight > BOILERPLATE_WEIGHT && c.score > 0.0)
            .map(|c| c.score)
            .sum();
        if siblings < floor {
            break;
        }
        debug!(
            "Promoting node {} to parent {} (siblings score {:.1})",
            current.node.index(),
            parent.node.index(),
            siblings
        );
        current = parent;
    }
    current
}

/// The node most likely to hold the primary content
pub fn select(tree: &Tree) -> Result<NodeId, SelectionError> {
    select_candidate(tree).map(|c| c.node)
}
