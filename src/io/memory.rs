use super::{PlatformStream, StreamSource};
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::Arc;

/// Asset root holding archives in memory
#[derive(Default, Clone)]
pub struct MemorySource {
    assets: HashMap<String, Arc<[u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.assets.insert(name.into(), data.into());
    }

    pub fn with(mut self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        self.insert(name, data);
        self
    }
}

impl StreamSource for MemorySource {
    fn open(&self, name: &str) -> Result<Box<dyn PlatformStream>> {
        let data = self.assets.get(name).cloned().ok_or_else(|| Error::Open {
            name: name.to_string(),
            source: ErrorKind::NotFound.into(),
        })?;
        Ok(Box::new(MemoryStream::new(data)))
    }

    fn describe(&self) -> String {
        format!("memory:{} assets", self.assets.len())
    }
}

/// Platform stream over a shared in-memory buffer
pub struct MemoryStream {
    data: Arc<[u8]>,
    position: usize,
}

impl MemoryStream {
    pub fn new(data: Arc<[u8]>) -> Self {
        Self { data, position: 0 }
    }
}

impl PlatformStream for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let remaining = &self.data[self.position.min(self.data.len())..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        n
    }

    fn take_error(&mut self) -> Option<String> {
        None
    }

    fn seek(&mut self, offset: u64) -> i64 {
        match usize::try_from(offset) {
            Ok(pos) if pos <= self.data.len() => {
                self.position = pos;
                offset as i64
            }
            _ => -1,
        }
    }

    fn length(&mut self) -> i64 {
        self.data.len() as i64
    }
}
