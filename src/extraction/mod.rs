//! Content extraction module
//!
//! Picks the node holding a document's primary content and flattens it to
//! text. Scoring signals live in [`weights`], the scoring and selection in
//! [`selector`], the text rendering in [`normalize`].

pub mod normalize;
pub mod selector;
pub mod weights;

pub use normalize::normalize;
pub use selector::{score, select, select_candidate, ContentCandidate};
