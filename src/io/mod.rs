mod http;
mod local;
mod memory;

pub use http::{HttpSource, HttpStream};
pub use local::{LocalSource, LocalStream};
pub use memory::{MemorySource, MemoryStream};

use crate::Result;

/// A byte stream as the hosting platform exposes it.
///
/// The contract is deliberately the platform's, not Rust's: a read that
/// returns `0` may mean end of stream or failure, and only [`take_error`]
/// tells the two apart. Seek and length report failure with a negative value.
/// The stream is closed when dropped.
///
/// [`take_error`]: PlatformStream::take_error
pub trait PlatformStream: Send {
    /// Read up to `buf.len()` bytes from the current position.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Return and clear the last error recorded by this stream.
    fn take_error(&mut self) -> Option<String>;

    /// Move to an absolute `offset`, returning the new position or a negative value.
    fn seek(&mut self, offset: u64) -> i64;

    /// Total length of the stream in bytes, or a negative value if unknown.
    fn length(&mut self) -> i64;
}

/// Opens platform streams by archive identifier, relative to some asset root.
pub trait StreamSource: Send + Sync {
    /// Open a new, independent stream positioned at offset 0.
    fn open(&self, name: &str) -> Result<Box<dyn PlatformStream>>;

    /// Human readable description of the asset root, for logs.
    fn describe(&self) -> String;
}
