//! Document retrieval
//!
//! HTTP(S) through a shared `reqwest` client (its connection pool is safe to
//! use from many tasks at once) and `file://` through `tokio::fs`.

use crate::config::DistillConfig;
use crate::content_type::{self, ContentKind};
use crate::error::{ConfigError, FetchError};
use crate::fetch::robots;
use rand::Rng;
use reqwest::{redirect, Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Raw payload of a fetched document
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Body bytes, at most `max_document_bytes + 1` of them
    pub bytes: Vec<u8>,
    /// Content-Type header, or the type implied by a file extension
    pub content_type: Option<String>,
    /// URL after redirects
    pub final_url: Url,
}

/// Retrieves documents with timeouts, redirects and retries
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: DistillConfig,
}

impl Fetcher {
    /// Build a fetcher and its connection pool
    pub fn new(config: DistillConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.fetch_timeout())
            .connect_timeout(config.fetch_timeout())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ConfigError::ClientSetup(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Configuration this fetcher was built with
    pub fn config(&self) -> &DistillConfig {
        &self.config
    }

    /// Fetch `url`, retrying transient failures with exponential backoff
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let url = parse_url(url)?;
        if url.scheme() == "file" {
            return self.fetch_file(url).await;
        }

        if self.config.respect_robots_txt {
            let agent = agent_token(&self.config.user_agent);
            if !robots::is_allowed(&self.client, agent, &url, self.config.fetch_timeout()).await {
                return Err(FetchError::Disallowed(url.to_string()));
            }
        }

        let mut attempt = 0;
        loop {
            match self.fetch_once(&url).await {
                Ok(doc) => {
                    info!("Fetched {} bytes from {}", doc.bytes.len(), doc.final_url);
                    return Ok(doc);
                }
                Err(e) if e.is_transient() && attempt < self.config.retries => {
                    let delay = self.jittered_backoff(attempt);
                    warn!(
                        "Fetch attempt {} of {} failed: {}; retrying in {:?}",
                        attempt + 1,
                        self.config.retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<FetchedDocument, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(ct) = &content_type {
            if content_type::classify(ct) == ContentKind::Binary {
                return Err(FetchError::UnsupportedContentType(content_type::essence(ct)));
            }
        }

        let final_url = response.url().clone();
        let bytes = self.read_capped(response).await?;
        debug!("{} answered {} with {} bytes", final_url, status, bytes.len());

        Ok(FetchedDocument {
            bytes,
            content_type,
            final_url,
        })
    }

    /// Read the body, stopping one byte past the size limit so the parser
    /// can still tell the document was too large
    async fn read_capped(&self, response: Response) -> Result<Vec<u8>, FetchError> {
        let cap = self.config.max_document_bytes.saturating_add(1);
        let body = read_limited(response, cap).await.map_err(|e| self.map_error(e))?;
        if body.len() >= cap {
            debug!("Body exceeds {} bytes, truncating", self.config.max_document_bytes);
        }
        Ok(body)
    }

    async fn fetch_file(&self, url: Url) -> Result<FetchedDocument, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let unreadable = |e: std::io::Error| FetchError::FileUnreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let file = tokio::fs::File::open(&path).await.map_err(unreadable)?;
        let cap = self.config.max_document_bytes.saturating_add(1) as u64;
        let mut bytes = Vec::new();
        file.take(cap)
            .read_to_end(&mut bytes)
            .await
            .map_err(unreadable)?;

        let content_type = file_content_type(&path)?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(FetchedDocument {
            bytes,
            content_type,
            final_url: url,
        })
    }

    fn map_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.config.fetch_timeout_ms)
        } else if e.is_redirect() {
            FetchError::TooManyRedirects(self.config.max_redirects)
        } else {
            FetchError::ConnectionFailed(e.to_string())
        }
    }

    fn jittered_backoff(&self, attempt: u32) -> Duration {
        let base = self.config.backoff(attempt);
        let spread = (base.as_millis() as u64 / 4).max(1);
        let jitter = rand::rng().random_range(0..spread);
        base + Duration::from_millis(jitter)
    }
}

/// Read at most `cap` bytes of a response body, chunk by chunk
pub(crate) async fn read_limited(mut response: Response, cap: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = cap - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if body.len() >= cap {
            break;
        }
    }
    Ok(body)
}

/// Parse and vet a URL; only http, https and file are fetchable
pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        other => Err(FetchError::InvalidUrl(format!("unsupported scheme {}", other))),
    }
}

/// Product token of a User-Agent string (`chew/0.1 (+https://...)` -> `chew`)
pub fn agent_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .filter(|t| !t.is_empty())
        .unwrap_or("*")
}

fn file_content_type(path: &Path) -> Result<Option<String>, FetchError> {
    match content_type::from_extension(path) {
        Some(ct) => Ok(Some(ct.to_string())),
        None => match path.extension().and_then(|e| e.to_str()) {
            // Unknown extensions are sniffed by the parser; known binary ones are refused.
            Some(ext) if is_binary_extension(ext) => {
                Err(FetchError::UnsupportedContentType(format!(".{}", ext)))
            }
            _ => Ok(None),
        },
    }
}

fn is_binary_extension(ext: &str) -> bool {
    const BINARY: &[&str] = &[
        "png", "jpg", "jpeg", "gif", "webp", "bmp", "ico", "pdf", "zip", "gz", "tar", "mp3",
        "mp4", "wav", "flac", "ogg", "webm", "exe", "dll", "so", "dylib", "bin", "docx", "pptx",
    ];
    BINARY.contains(&ext.to_ascii_lowercase().as_str())
}
