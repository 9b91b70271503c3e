//! Per-URL results

use crate::error::{Error, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome class of one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    /// Content extracted
    Ok,
    /// Document could not be retrieved
    FetchError,
    /// Document could not be parsed
    ParseError,
    /// Nothing worth returning was found
    EmptyContent,
}

impl ItemStatus {
    /// Kebab-case tag as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Ok => "ok",
            ItemStatus::FetchError => "fetch-error",
            ItemStatus::ParseError => "parse-error",
            ItemStatus::EmptyContent => "empty-content",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result for a single URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistillResult {
    /// URL as given by the caller
    pub url: String,
    /// Distilled text; empty unless `status` is ok
    pub text: String,
    /// Outcome class
    pub status: ItemStatus,
    /// Error kind tag, e.g. `timeout`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human readable error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DistillResult {
    /// Successful result
    pub fn ok(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            status: ItemStatus::Ok,
            reason: None,
            message: None,
        }
    }

    /// Failed result with an explicit status and reason tag
    pub fn failed(
        url: impl Into<String>,
        status: ItemStatus,
        reason: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            text: String::new(),
            status,
            reason: Some(reason.to_string()),
            message: Some(message.into()),
        }
    }

    /// Result for a pipeline error
    pub fn from_error(url: impl Into<String>, error: &Error) -> Self {
        let (status, reason) = classify(error);
        Self::failed(url, status, reason, error.to_string())
    }

    /// Whether content was extracted
    pub fn is_ok(&self) -> bool {
        self.status == ItemStatus::Ok
    }
}

/// Status and reason tag an error maps to
pub fn classify(error: &Error) -> (ItemStatus, &'static str) {
    match error {
        Error::Fetch(e) => (ItemStatus::FetchError, e.kind()),
        Error::Parse(ParseError::Empty) => (ItemStatus::EmptyContent, ParseError::Empty.kind()),
        Error::Parse(e) => (ItemStatus::ParseError, e.kind()),
        Error::Selection(e) => (ItemStatus::EmptyContent, e.kind()),
        Error::Io(_) => (ItemStatus::FetchError, "file-unreadable"),
        Error::Boundary(e) => (ItemStatus::ParseError, e.kind()),
        Error::Config(_) | Error::Json(_) => (ItemStatus::ParseError, "internal"),
    }
}

/// Ordered results of a batch, one per input URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Results in input order
    pub results: Vec<DistillResult>,
}

impl ResultSet {
    /// Number of results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the set holds no results
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results with status ok
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    /// Iterate in input order
    pub fn iter(&self) -> std::slice::Iter<'_, DistillResult> {
        self.results.iter()
    }
}

impl From<Vec<DistillResult>> for ResultSet {
    fn from(results: Vec<DistillResult>) -> Self {
        Self { results }
    }
}

impl IntoIterator for ResultSet {
    type Item = DistillResult;
    type IntoIter = std::vec::IntoIter<DistillResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a DistillResult;
    type IntoIter = std::slice::Iter<'a, DistillResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
