//! Foreign-call boundary
//!
//! The C ABI surface of the shared library: [`exports`] holds the
//! `extern "C"` functions, [`boundary`] the string wire format and
//! [`buffers`] the table of strings awaiting release by the caller.

pub mod boundary;
pub mod buffers;
pub mod exports;

pub use boundary::{decode_output, Record, ERROR_MARKER, RECORD_SEPARATOR};
pub use exports::process_blocking;
