//! Distillation pipeline
//!
//! [`Distiller`] sequences fetch, parse, select and normalize for each URL
//! and fans a batch out over a bounded worker pool.

pub mod orchestrator;
pub mod result;

pub use orchestrator::Distiller;
pub use result::{DistillResult, ItemStatus, ResultSet};
