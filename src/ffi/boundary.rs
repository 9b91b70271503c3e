//! Wire codec for the C entry points
//!
//! Input batches are URLs separated by newlines, or by commas when the input
//! has no newline. Output batches are one record per input URL joined by
//! [`RECORD_SEPARATOR`]. A failed record is [`ERROR_MARKER`] followed by
//! `<status>:<reason>`, e.g. `\u{15}fetch-error:timeout`.

use crate::config::DistillConfig;
use crate::error::BoundaryError;
use crate::pipeline::{DistillResult, ResultSet};

/// Separates records in a batch response (ASCII RS)
pub const RECORD_SEPARATOR: char = '\u{1E}';

/// Starts an error record (ASCII NAK)
pub const ERROR_MARKER: char = '\u{15}';

/// Status used for errors in the call itself rather than in one URL
pub const BOUNDARY_ERROR_STATUS: &str = "boundary-error";

/// One decoded output record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Distilled text
    Text(String),
    /// Error marker
    Error {
        /// Status tag, e.g. `fetch-error`
        status: String,
        /// Reason tag, e.g. `timeout`
        reason: String,
    },
}

/// Split a batch input into URLs
pub fn parse_batch(input: &str) -> Result<Vec<String>, BoundaryError> {
    let separator = if input.contains('\n') { '\n' } else { ',' };
    let urls: Vec<String> = input
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if urls.is_empty() {
        return Err(BoundaryError::MalformedBatch("no URL in input".to_string()));
    }
    Ok(urls)
}

/// Parse a single-URL input
pub fn parse_single(input: &str) -> Result<String, BoundaryError> {
    let url = input.trim();
    if url.is_empty() {
        return Err(BoundaryError::MalformedBatch("no URL in input".to_string()));
    }
    Ok(url.to_string())
}

/// Parse a JSON configuration object; missing fields keep their defaults
pub fn parse_config(json: &str) -> Result<DistillConfig, BoundaryError> {
    if json.trim().is_empty() {
        return Ok(DistillConfig::default());
    }
    let config: DistillConfig = serde_json::from_str(json)
        .map_err(|e| BoundaryError::MalformedBatch(format!("config: {}", e)))?;
    config
        .validate()
        .map_err(|e| BoundaryError::MalformedBatch(format!("config: {}", e)))?;
    Ok(config)
}

/// Error record for `status` and `reason`
pub fn error_marker(status: &str, reason: &str) -> String {
    format!("{}{}:{}", ERROR_MARKER, status, reason)
}

/// Error record for a failed call
pub fn encode_boundary_error(error: &BoundaryError) -> String {
    error_marker(BOUNDARY_ERROR_STATUS, error.kind())
}

/// Drop characters that would break framing (and NUL, which C strings cannot hold)
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|&c| c != RECORD_SEPARATOR && c != ERROR_MARKER && c != '\0')
        .collect()
}

/// Encode one result as text or an error record
pub fn encode_result(result: &DistillResult) -> String {
    if result.is_ok() {
        sanitize(&result.text)
    } else {
        error_marker(result.status.as_str(), result.reason.as_deref().unwrap_or("unknown"))
    }
}

/// Encode a batch, one record per result in order
pub fn encode_result_set(set: &ResultSet) -> String {
    let mut out = String::new();
    for (i, result) in set.iter().enumerate() {
        if i > 0 {
            out.push(RECORD_SEPARATOR);
        }
        out.push_str(&encode_result(result));
    }
    out
}

/// Decode one record
pub fn decode_record(record: &str) -> Record {
    match record.strip_prefix(ERROR_MARKER) {
        Some(rest) => {
            let (status, reason) = rest.split_once(':').unwrap_or((rest, ""));
            Record::Error {
                status: status.to_string(),
                reason: reason.to_string(),
            }
        }
        None => Record::Text(record.to_string()),
    }
}

/// Decode a batch response
pub fn decode_output(output: &str) -> Vec<Record> {
    output.split(RECORD_SEPARATOR).map(decode_record).collect()
}
