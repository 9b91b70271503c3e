//! robots.txt checks
//!
//! Every check downloads the origin's robots.txt afresh. Nothing is cached
//! between tasks, so the HTTP connection pool stays the only shared state.

use crate::fetch::client::read_limited;
use reqwest::Client;
use std::time::Duration;
use texting_robots::Robot;
use tracing::debug;
use url::Url;

/// Upper bound on the robots.txt body we are willing to read
pub const MAX_ROBOTS_BYTES: usize = 512 * 1024;

/// Location of the robots.txt governing `url`
pub fn robots_url(url: &Url) -> Option<Url> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.join("/robots.txt").ok()
}

/// Whether `txt` lets `agent` fetch `url`
///
/// Unparseable files allow everything.
pub fn allowed_by(txt: &[u8], agent: &str, url: &Url) -> bool {
    match Robot::new(agent, txt) {
        Ok(robot) => robot.allowed(url.as_str()),
        Err(e) => {
            debug!("Ignoring unparseable robots.txt: {}", e);
            true
        }
    }
}

/// Fetch robots.txt for `url` and check it
///
/// Unreachable or non-200 robots.txt files allow the fetch.
pub async fn is_allowed(client: &Client, agent: &str, url: &Url, timeout: Duration) -> bool {
    let Some(robots) = robots_url(url) else {
        return true;
    };

    let response = match client.get(robots.clone()).timeout(timeout).send().await {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            debug!("{} answered {}, allowing", robots, response.status());
            return true;
        }
        Err(e) => {
            debug!("{} unreachable ({}), allowing", robots, e);
            return true;
        }
    };

    match read_limited(response, MAX_ROBOTS_BYTES).await {
        Ok(body) => allowed_by(&body, agent, url),
        Err(e) => {
            debug!("{} body unreadable ({}), allowing", robots, e);
            true
        }
    }
}
