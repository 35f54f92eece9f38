//! Asset root configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::Result;
use crate::io::{HttpSource, LocalSource, StreamSource};

/// Where archive identifiers are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRoot {
    Directory(PathBuf),
    Url(String),
}

impl AssetRoot {
    pub fn parse(root: &str) -> Self {
        if is_http_url(root) {
            AssetRoot::Url(root.to_string())
        } else {
            AssetRoot::Directory(PathBuf::from(root))
        }
    }

    /// Build the stream source for this root.
    pub fn open_source(&self, http: &HttpOptions) -> Result<Arc<dyn StreamSource>> {
        Ok(match self {
            AssetRoot::Directory(dir) => Arc::new(LocalSource::new(dir.clone())),
            AssetRoot::Url(url) => Arc::new(HttpSource::new(url.clone(), http)?),
        })
    }
}

/// Tuning for HTTP-backed streams.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    /// Attempts per range read before the platform read fails.
    pub max_retry: u32,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retry: 10,
        }
    }
}

pub fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
