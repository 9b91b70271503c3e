//! Error types for Chew
//!
//! This module provides the error hierarchy for every pipeline stage using
//! `thiserror`. Each stage error carries a short kebab-case `kind()` tag that
//! is what callers on the other side of the C boundary get to see.

use thiserror::Error;

/// The main error type for Chew operations
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-stage errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Markup parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Content selection errors
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Foreign-call boundary errors
    #[error("Boundary error: {0}")]
    Boundary(#[from] BoundaryError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while retrieving a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connect/read exceeded the configured timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Redirect chain longer than allowed
    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// Connection could not be established or was reset
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Response is not a text document
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// URL could not be parsed or uses an unsupported scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Non-success HTTP status
    #[error("HTTP error {status} for {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// robots.txt forbids the URL for our user agent
    #[error("Disallowed by robots.txt: {0}")]
    Disallowed(String),

    /// Local file could not be read
    #[error("Cannot read file {path}: {message}")]
    FileUnreadable {
        /// Filesystem path
        path: String,
        /// Underlying I/O message
        message: String,
    },
}

impl FetchError {
    /// Short kebab-case tag for this error
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::TooManyRedirects(_) => "too-many-redirects",
            FetchError::ConnectionFailed(_) => "connection-failed",
            FetchError::UnsupportedContentType(_) => "unsupported-content-type",
            FetchError::InvalidUrl(_) => "invalid-url",
            FetchError::HttpStatus { .. } => "http-status",
            FetchError::Disallowed(_) => "disallowed",
            FetchError::FileUnreadable { .. } => "file-unreadable",
        }
    }

    /// Whether another attempt may succeed (connection resets and 5xx only)
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::ConnectionFailed(_) => true,
            FetchError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors raised while turning raw bytes into a tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No bytes at all
    #[error("Document is empty")]
    Empty,

    /// Payload exceeds the configured maximum
    #[error("Document is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Observed size (may be a lower bound when the body was cut off)
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Bytes do not decode to text in any candidate encoding
    #[error("Cannot decode document as {0}")]
    DecodeFailed(String),
}

impl ParseError {
    /// Short kebab-case tag for this error
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::Empty => "empty",
            ParseError::TooLarge { .. } => "too-large",
            ParseError::DecodeFailed(_) => "decode-failed",
        }
    }
}

/// Errors raised by the content selector
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    /// No node scored above the threshold
    #[error("No content node scored above the selection threshold")]
    Empty,
}

impl SelectionError {
    /// Short kebab-case tag for this error
    pub fn kind(&self) -> &'static str {
        match self {
            SelectionError::Empty => "empty",
        }
    }
}

/// Errors in the input handed to an exported entry point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// Null pointer passed where a string was expected
    #[error("Null input pointer")]
    NullInput,

    /// Input is not valid UTF-8
    #[error("Input is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// Batch input contains no usable URL, or the config object is malformed
    #[error("Malformed batch: {0}")]
    MalformedBatch(String),

    /// Engine could not run (runtime construction failure or a caught panic)
    #[error("Internal failure: {0}")]
    Internal(String),
}

impl BoundaryError {
    /// Short kebab-case tag for this error
    pub fn kind(&self) -> &'static str {
        match self {
            BoundaryError::NullInput => "null-input",
            BoundaryError::InvalidEncoding(_) => "invalid-encoding",
            BoundaryError::MalformedBatch(_) => "malformed-batch",
            BoundaryError::Internal(_) => "internal",
        }
    }
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// The HTTP client could not be built from this configuration
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

/// Result type alias for Chew operations
pub type Result<T> = std::result::Result<T, Error>;
