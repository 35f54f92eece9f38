use super::{PlatformStream, StreamSource};
use crate::{Error, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Asset root backed by a local directory
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `name` beneath the root, refusing anything that could leave it.
    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        if name.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl StreamSource for LocalSource {
    fn open(&self, name: &str) -> Result<Box<dyn PlatformStream>> {
        let path = self.resolve(name)?;
        debug!(path = %path.display(), "opening local asset");
        let file = File::open(&path).map_err(|source| Error::Open {
            name: name.to_string(),
            source,
        })?;
        Ok(Box::new(LocalStream::new(file)))
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}

/// Platform stream over an open local file
pub struct LocalStream {
    file: File,
    last_error: Option<String>,
}

impl LocalStream {
    pub fn new(file: File) -> Self {
        Self {
            file,
            last_error: None,
        }
    }
}

impl PlatformStream for LocalStream {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        match self.file.read(buf) {
            Ok(n) => n,
            Err(e) => {
                self.last_error = Some(e.to_string());
                0
            }
        }
    }

    fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    fn seek(&mut self, offset: u64) -> i64 {
        match self.file.seek(SeekFrom::Start(offset)) {
            Ok(pos) => i64::try_from(pos).unwrap_or(-1),
            Err(e) => {
                self.last_error = Some(e.to_string());
                -1
            }
        }
    }

    fn length(&mut self) -> i64 {
        match self.file.metadata() {
            Ok(meta) if meta.is_file() => i64::try_from(meta.len()).unwrap_or(-1),
            Ok(_) => {
                self.last_error = Some("not a regular file".to_string());
                -1
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                -1
            }
        }
    }
}
