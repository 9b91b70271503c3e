//! Batch orchestration
//!
//! One task per URL, at most `workers` of them running at once. Results are
//! collected in input order; whatever has not finished when the batch
//! deadline passes is aborted and reported as a fetch timeout.

use crate::config::DistillConfig;
use crate::error::{FetchError, Result};
use crate::extraction::{normalize, select};
use crate::fetch::client::parse_url;
use crate::fetch::Fetcher;
use crate::parse::MarkupParser;
use crate::pipeline::result::{DistillResult, ItemStatus, ResultSet};
use std::sync::Arc;
use std::time::{Duration, Instant as StdInstant};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Stand-in deadline when the configured one overflows the clock
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365);

/// Runs the fetch, parse, select and normalize pipeline
#[derive(Debug, Clone)]
pub struct Distiller {
    fetcher: Fetcher,
    parser: MarkupParser,
}

impl Distiller {
    /// Validate `config` and set up the shared HTTP client
    pub fn new(config: DistillConfig) -> Result<Self> {
        config.validate()?;
        let parser = MarkupParser::new(config.max_document_bytes);
        let fetcher = Fetcher::new(config)?;
        Ok(Self { fetcher, parser })
    }

    /// Active configuration
    pub fn config(&self) -> &DistillConfig {
        self.fetcher.config()
    }

    /// Distill every URL, returning one result per URL in input order
    #[instrument(skip(self, urls), fields(count = urls.len()))]
    pub async fn process(&self, urls: &[String]) -> ResultSet {
        if urls.is_empty() {
            return ResultSet::default();
        }

        let config = self.config();
        let started = StdInstant::now();
        let now = Instant::now();
        let deadline = now
            .checked_add(config.batch_deadline())
            .unwrap_or_else(|| now + FAR_FUTURE);
        let permits = Arc::new(Semaphore::new(config.workers.max(1)));

        let handles: Vec<_> = urls
            .iter()
            .map(|url| {
                let distiller = self.clone();
                let permits = Arc::clone(&permits);
                let url = url.clone();
                tokio::spawn(async move {
                    let _permit = match permits.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return DistillResult::failed(
                                url,
                                ItemStatus::ParseError,
                                "internal",
                                "worker pool closed",
                            )
                        }
                    };
                    distiller.process_one(&url).await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(urls.len());
        for (url, mut handle) in urls.iter().zip(handles) {
            let result = match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    warn!("Task for {} did not complete: {}", url, e);
                    DistillResult::failed(url.as_str(), ItemStatus::ParseError, "internal", e.to_string())
                }
                Err(_) => {
                    handle.abort();
                    warn!("Batch deadline passed, aborting {}", url);
                    let error = FetchError::Timeout(config.batch_deadline_ms);
                    DistillResult::failed(url.as_str(), ItemStatus::FetchError, error.kind(), error.to_string())
                }
            };
            results.push(result);
        }

        let set = ResultSet::from(results);
        info!(
            "Distilled {}/{} URLs in {:?}",
            set.succeeded(),
            set.len(),
            started.elapsed()
        );
        set
    }

    /// Distill a single URL
    #[instrument(skip(self))]
    pub async fn process_one(&self, url: &str) -> DistillResult {
        let outcome = match self.fetcher.fetch(url).await {
            Ok(doc) => self.distill_bytes(doc.final_url.as_str(), doc.bytes, doc.content_type.as_deref()),
            Err(e) => Err(e.into()),
        };
        match outcome {
            Ok(text) => self.check_length(url, text),
            Err(e) => {
                debug!("{} failed: {}", url, e);
                DistillResult::from_error(url, &e)
            }
        }
    }

    /// Parse, select and normalize an already retrieved payload
    ///
    /// `url` becomes the base for resolving relative links.
    pub fn distill_bytes(&self, url: &str, bytes: Vec<u8>, content_type: Option<&str>) -> Result<String> {
        let url = parse_url(url)?;
        let doc = self.parser.parse_document(url, bytes, content_type)?;
        let node = select(&doc.tree)?;
        Ok(normalize(&doc.tree, node, self.config().format))
    }

    fn check_length(&self, url: &str, text: String) -> DistillResult {
        let chars = text.chars().filter(|c| !c.is_whitespace()).count();
        let min = self.config().min_content_chars;
        if chars < min {
            DistillResult::failed(
                url,
                ItemStatus::EmptyContent,
                "too-short",
                format!("{} characters of content, need {}", chars, min),
            )
        } else {
            DistillResult::ok(url, text)
        }
    }
}
