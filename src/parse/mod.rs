//! Markup parsing module
//!
//! This module turns raw payloads into an arena-backed document tree,
//! detecting the character encoding and recovering from malformed markup.

pub mod encoding;
pub mod markup;
pub mod tree;

pub use markup::{Document, MarkupParser};
pub use tree::{Element, Node, NodeId, NodeKind, Tree, TreeOrigin};
