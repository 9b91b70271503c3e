//! Shared fixtures for integration tests
//!
//! A tiny HTTP/1.1 server on a random local port, serving canned routes.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the fixture server does for a path
#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with a body
    Page {
        content_type: &'static str,
        body: Vec<u8>,
    },
    /// Empty response with this status
    Status(u16),
    /// 302 to the given location
    Redirect(&'static str),
    /// 503 for the first `failures` hits, then a 200 page
    FailFirst {
        failures: usize,
        content_type: &'static str,
        body: Vec<u8>,
    },
    /// Accept the request and never answer
    Hang,
}

impl Route {
    pub fn html(body: &str) -> Self {
        Route::Page {
            content_type: "text/html; charset=utf-8",
            body: body.as_bytes().to_vec(),
        }
    }
}

pub struct FixtureServer {
    addr: SocketAddr,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl FixtureServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().get(path).copied().unwrap_or(0)
    }
}

pub async fn serve(routes: Vec<(&'static str, Route)>) -> FixtureServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<String, Route>> =
        Arc::new(routes.into_iter().map(|(p, r)| (p.to_string(), r)).collect());
    let hits = Arc::new(Mutex::new(HashMap::new()));

    let server_hits = Arc::clone(&hits);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(handle(stream, Arc::clone(&routes), Arc::clone(&server_hits)));
        }
    });

    FixtureServer { addr, hits }
}

async fn handle(
    mut stream: TcpStream,
    routes: Arc<HashMap<String, Route>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
    let count = {
        let mut hits = hits.lock();
        let count = hits.entry(path.clone()).or_insert(0);
        *count += 1;
        *count
    };

    let response = match routes.get(&path) {
        None => response(404, "text/plain", &[], None),
        Some(Route::Page { content_type, body }) => response(200, content_type, body, None),
        Some(Route::Status(status)) => response(*status, "text/plain", &[], None),
        Some(Route::Redirect(location)) => response(302, "text/plain", &[], Some(location)),
        Some(Route::FailFirst {
            failures,
            content_type,
            body,
        }) => {
            if count <= *failures {
                response(503, "text/plain", &[], None)
            } else {
                response(200, content_type, body, None)
            }
        }
        Some(Route::Hang) => {
            tokio::time::sleep(Duration::from_secs(60)).await;
            return;
        }
    };

    let _ = stream.write_all(&response).await;
    let _ = stream.shutdown().await;
}

fn response(status: u16, content_type: &str, body: &[u8], location: Option<&str>) -> Vec<u8> {
    let mut head = format!(
        "HTTP/1.1 {} Fixture\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        content_type,
        body.len()
    );
    if let Some(location) = location {
        head.push_str(&format!("Location: {}\r\n", location));
    }
    head.push_str("\r\n");
    let mut out = head.into_bytes();
    out.extend_from_slice(body);
    out
}

pub const EXAMPLE_TEXT: &str = "Example Domain. This domain is for use in illustrative examples.";

pub fn example_page() -> String {
    format!(
        "<!doctype html><html><head><title>Example Domain</title></head><body><main>{}</main></body></html>",
        EXAMPLE_TEXT
    )
}

pub const PARAGRAPH: &str = "Rust is a multi-paradigm, general-purpose programming language that \
    emphasizes performance, type safety, and concurrency. It enforces memory safety without a \
    garbage collector.";

pub fn article_page() -> String {
    format!(
        "<html><head><title>Story</title><script>var tracking = true;</script></head><body>\
         <nav class=\"main-nav\"><a href=\"/\">Home</a> <a href=\"/news\">News</a></nav>\
         <article class=\"post\"><h2>Why Rust</h2><p>{p}</p><p>{p}</p>\
         <ul><li>Fast</li><li>Reliable</li></ul></article>\
         <footer class=\"site-footer\">Copyright 2024 <a href=\"/terms\">Terms</a></footer>\
         </body></html>",
        p = PARAGRAPH
    )
}

/// `file://` URL for a path
pub fn file_url(path: &Path) -> String {
    url::Url::from_file_path(path).unwrap().to_string()
}
