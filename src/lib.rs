//! Chew - Content Distillation Engine
//!
//! This crate fetches web documents, isolates their primary content from
//! navigation, ads and other boilerplate, and returns it as clean text. It
//! builds as a Rust library and as a C-compatible shared library.
//!
//! # Features
//!
//! - **Fetching**: HTTP(S) with timeouts, redirect limits and retries, plus `file://`
//! - **Tolerant parsing**: browser-grade recovery from malformed markup, charset sniffing
//! - **Content selection**: density and hint based scoring over an arena tree
//! - **Normalization**: plain text or markdown output
//! - **C boundary**: `Process`, `ProcessBatch`, `ProcessWithConfig` and `FreeString`
//!
//! # Architecture
//!
//! ```text
//! C caller ──▶ ffi ──▶ Distiller (worker pool, deadline)
//!                          │
//!                          ▼
//!           Fetcher ─▶ MarkupParser ─▶ select ─▶ normalize
//!                          │
//!                          ▼
//!                  ResultSet (input order)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chew::{DistillConfig, Distiller};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let distiller = Distiller::new(DistillConfig::default())?;
//!
//!     let results = distiller.process(&["https://example.com".to_string()]).await;
//!     for result in &results {
//!         println!("{} [{}]\n{}", result.url, result.status, result.text);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod content_type;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod ffi;
pub mod parse;
pub mod pipeline;

// Re-exports for convenience
pub use config::{DistillConfig, OutputFormat};
pub use error::{Error, Result};
pub use extraction::{normalize, select};
pub use fetch::Fetcher;
pub use parse::MarkupParser;
pub use pipeline::{DistillResult, Distiller, ItemStatus, ResultSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
