//! Fetch layer
//!
//! Retrieves raw document bytes for http, https and file URLs.

pub mod client;
pub mod robots;

pub use client::{FetchedDocument, Fetcher};
