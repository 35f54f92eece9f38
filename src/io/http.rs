use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, trace, warn};

use super::{PlatformStream, StreamSource};
use crate::config::HttpOptions;
use crate::{Error, Result};

/// Asset root served over HTTP, read with Range requests
pub struct HttpSource {
    client: Client,
    base_url: String,
    runtime: Arc<Runtime>,
    max_retry: u32,
}

impl HttpSource {
    /// Create a source rooted at `base_url`.
    ///
    /// Streams block the caller on an internal runtime, so this must not be
    /// called from within an async context.
    pub fn new(base_url: impl Into<String>, options: &HttpOptions) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::io("<http>", format!("failed to start runtime: {e}")))?;
        let client = {
            let _guard = runtime.enter();
            Client::builder()
                .timeout(options.timeout)
                .build()
                .map_err(|e| Error::io("<http>", format!("failed to build client: {e}")))?
        };

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            runtime: Arc::new(runtime),
            max_retry: options.max_retry,
        })
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name.trim_start_matches('/'))
    }

    /// HEAD the asset to verify Range support and learn its size.
    async fn probe(client: &Client, url: &str) -> std::result::Result<u64, String> {
        let resp = client.head(url).send().await.map_err(|e| e.to_string())?;

        if !resp.status().is_success() {
            return Err(format!("HTTP request failed with status: {}", resp.status()));
        }

        let accept_ranges = resp
            .headers()
            .get("accept-ranges")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");

        if !accept_ranges.contains("bytes") {
            return Err("remote server does not support Range requests".to_string());
        }

        resp.headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| "remote server did not return Content-Length".to_string())
    }
}

impl StreamSource for HttpSource {
    fn open(&self, name: &str) -> Result<Box<dyn PlatformStream>> {
        if name.is_empty() || name.split('/').any(|seg| seg == "..") {
            return Err(Error::InvalidName(name.to_string()));
        }
        let url = self.url_for(name);
        debug!(%url, "opening remote asset");

        let size = self
            .runtime
            .block_on(Self::probe(&self.client, &url))
            .map_err(|msg| Error::Open {
                name: name.to_string(),
                source: std::io::Error::other(msg),
            })?;

        Ok(Box::new(HttpStream {
            client: self.client.clone(),
            runtime: self.runtime.clone(),
            url,
            size,
            position: 0,
            max_retry: self.max_retry,
            last_error: None,
        }))
    }

    fn describe(&self) -> String {
        format!("url:{}", self.base_url)
    }
}

/// Platform stream over one remote asset
pub struct HttpStream {
    client: Client,
    runtime: Arc<Runtime>,
    url: String,
    size: u64,
    position: u64,
    max_retry: u32,
    last_error: Option<String>,
}

impl HttpStream {
    async fn fetch(&self, offset: u64, buf: &mut [u8]) -> std::result::Result<usize, String> {
        let end = (offset + buf.len() as u64 - 1).min(self.size - 1);
        let expected_size = (end - offset + 1) as usize;

        let mut received = 0;
        let mut retry_count = 0;

        while received < expected_size {
            let current_start = offset + received as u64;
            let range = format!("bytes={}-{}", current_start, end);

            let result = self
                .client
                .get(&self.url)
                .header("Range", &range)
                .send()
                .await;

            match result {
                Ok(resp) => {
                    if resp.status() != reqwest::StatusCode::PARTIAL_CONTENT {
                        return Err(format!("HTTP request failed with status: {}", resp.status()));
                    }

                    let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
                    if bytes.is_empty() {
                        return Err(format!("server returned no data for range {range}"));
                    }
                    let chunk_len = bytes.len().min(expected_size - received);
                    buf[received..received + chunk_len].copy_from_slice(&bytes[..chunk_len]);
                    received += chunk_len;
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        return Err(format!("max retries exceeded: {e}"));
                    }
                    warn!(
                        url = %self.url,
                        retry = retry_count,
                        max = self.max_retry,
                        error = %e,
                        "connection error, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.to_string()),
            }
        }

        Ok(received)
    }
}

impl PlatformStream for HttpStream {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() || self.position >= self.size {
            return 0;
        }

        match self.runtime.block_on(self.fetch(self.position, buf)) {
            Ok(n) => {
                trace!(url = %self.url, offset = self.position, n, "range read");
                self.position += n as u64;
                n
            }
            Err(msg) => {
                self.last_error = Some(msg);
                0
            }
        }
    }

    fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    fn seek(&mut self, offset: u64) -> i64 {
        if offset > self.size {
            self.last_error = Some(format!("offset {offset} beyond length {}", self.size));
            return -1;
        }
        self.position = offset;
        i64::try_from(offset).unwrap_or(-1)
    }

    fn length(&mut self) -> i64 {
        i64::try_from(self.size).unwrap_or(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_names_onto_base_url() {
        let source = HttpSource::new("https://cdn.example.com/assets/", &HttpOptions::default())
            .unwrap();
        assert_eq!(
            source.url_for("data/game.pak"),
            "https://cdn.example.com/assets/data/game.pak"
        );
        assert_eq!(source.describe(), "url:https://cdn.example.com/assets");
    }

    #[test]
    fn rejects_parent_segments() {
        let source = HttpSource::new("https://cdn.example.com", &HttpOptions::default()).unwrap();
        assert!(matches!(
            source.open("../etc/passwd"),
            Err(Error::InvalidName(_))
        ));
    }
}
