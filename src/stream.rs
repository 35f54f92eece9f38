//! The archive I/O adapter.
//!
//! [`ArchiveStream`] binds one platform stream to the read-only contract an
//! archive-mounting layer expects: read, seek, tell, length, duplicate and
//! destroy. Position and size are cached so that `tell` and `length` never
//! touch the platform stream.

use std::io::{self, SeekFrom};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::io::{PlatformStream, StreamSource};
use crate::{Error, Result};

/// Outcome of a successful [`ArchiveIo::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// This many bytes were read, always at least one.
    Read(usize),
    /// No bytes were read and the platform reported no error.
    Eof,
}

impl ReadStatus {
    /// Bytes read, `0` for end of file.
    pub fn count(self) -> usize {
        match self {
            ReadStatus::Read(n) => n,
            ReadStatus::Eof => 0,
        }
    }
}

/// Read-only stream contract consumed by archive-mounting layers.
///
/// An instance is not internally synchronised. Independent readers of the
/// same archive each take their own [`duplicate`](ArchiveIo::duplicate).
pub trait ArchiveIo: Send {
    /// Read into `buf` from the current position, advancing it.
    ///
    /// Never reads past [`length`](ArchiveIo::length).
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus>;

    /// Archive streams are read-only; this always fails.
    fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(Error::ReadOnly)
    }

    /// Archive streams are read-only; this always fails.
    fn flush(&mut self) -> Result<()> {
        Err(Error::ReadOnly)
    }

    /// Move to the absolute `offset`, which must be below `length()`.
    fn seek(&mut self, offset: u64) -> Result<()>;

    fn tell(&self) -> u64;

    fn length(&self) -> u64;

    /// Open a second stream over the same archive at the same position.
    ///
    /// The two share no state afterwards.
    fn duplicate(&self) -> Result<Box<dyn ArchiveIo>>;

    /// Release the stream and everything it owns.
    fn destroy(self: Box<Self>) {}
}

/// Archive stream backed by a [`PlatformStream`] from a [`StreamSource`].
pub struct ArchiveStream {
    source: Arc<dyn StreamSource>,
    name: String,
    stream: Box<dyn PlatformStream>,
    cursor: u64,
    size: u64,
}

impl ArchiveStream {
    /// Open `name` from `source`.
    ///
    /// Either returns a ready stream at offset 0 or fails having closed
    /// anything it opened.
    pub fn open(source: Arc<dyn StreamSource>, name: &str) -> Result<Self> {
        let mut stream = source.open(name)?;

        let reported = stream.length();
        let size = match u64::try_from(reported) {
            Ok(size) => size,
            Err(_) => {
                debug!(
                    name,
                    reported,
                    error = stream.take_error().as_deref().unwrap_or("none"),
                    "size query failed, closing stream"
                );
                return Err(Error::SizeQuery {
                    name: name.to_string(),
                    reported,
                });
            }
        };

        debug!(name, size, source = %source.describe(), "opened archive stream");
        Ok(Self {
            source,
            name: name.to_string(),
            stream,
            cursor: 0,
            size,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        let remaining = self.size - self.cursor;
        let len = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));

        let n = self.stream.read(&mut buf[..len]);
        trace!(name = %self.name, offset = self.cursor, requested = len, n, "read");

        if n > len {
            return Err(Error::io(
                &self.name,
                format!("platform read returned {n} bytes for a {len} byte request"),
            ));
        }
        if n > 0 {
            self.cursor += n as u64;
            return Ok(ReadStatus::Read(n));
        }

        // A zero-length platform read is only an error if the platform says so.
        match self.stream.take_error() {
            Some(message) => Err(Error::io(&self.name, message)),
            None => Ok(ReadStatus::Eof),
        }
    }

    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset >= self.size {
            return Err(Error::PastEndOfFile {
                offset,
                length: self.size,
            });
        }
        self.reposition(offset)
    }

    pub fn tell(&self) -> u64 {
        self.cursor
    }

    pub fn length(&self) -> u64 {
        self.size
    }

    /// Open an independent stream over the same archive at the same position.
    pub fn try_clone(&self) -> Result<ArchiveStream> {
        let mut dup = ArchiveStream::open(self.source.clone(), &self.name)
            .map_err(|e| Error::duplicate(&self.name, e))?;

        // `dup` is dropped, and its platform stream closed, if this fails.
        dup.reposition(self.cursor)
            .map_err(|e| Error::duplicate(&self.name, e))?;

        debug!(name = %self.name, offset = self.cursor, "duplicated archive stream");
        Ok(dup)
    }

    /// Platform seek without the end-of-file policy, so a duplicate may sit
    /// exactly at the end of the archive.
    fn reposition(&mut self, offset: u64) -> Result<()> {
        if offset > self.size {
            return Err(Error::PastEndOfFile {
                offset,
                length: self.size,
            });
        }

        let result = self.stream.seek(offset);
        trace!(name = %self.name, offset, result, "seek");

        match u64::try_from(result) {
            Ok(pos) if pos <= self.size => {
                self.cursor = pos;
                Ok(())
            }
            Ok(pos) => Err(Error::io(
                &self.name,
                format!("platform seek landed at {pos}, beyond length {}", self.size),
            )),
            Err(_) => {
                let message = self
                    .stream
                    .take_error()
                    .unwrap_or_else(|| format!("seek to {offset} failed"));
                Err(Error::io(&self.name, message))
            }
        }
    }
}

impl ArchiveIo for ArchiveStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        ArchiveStream::read(self, buf)
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        ArchiveStream::seek(self, offset)
    }

    fn tell(&self) -> u64 {
        self.cursor
    }

    fn length(&self) -> u64 {
        self.size
    }

    fn duplicate(&self) -> Result<Box<dyn ArchiveIo>> {
        Ok(Box::new(self.try_clone()?))
    }
}

impl Drop for ArchiveStream {
    fn drop(&mut self) {
        debug!(name = %self.name, offset = self.cursor, "closing archive stream");
    }
}

impl io::Read for ArchiveStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        ArchiveStream::read(self, buf)
            .map(ReadStatus::count)
            .map_err(Error::into_io_error)
    }
}

/// Offsets are resolved to absolute ones and then checked as in
/// [`ArchiveIo::seek`]. Seeking to the current position always succeeds, so
/// `stream_position` works at end of file.
impl io::Seek for ArchiveStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.cursor.checked_add_signed(delta),
            SeekFrom::End(delta) => self.size.checked_add_signed(delta),
        }
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek to a negative offset")
        })?;

        if target != self.cursor {
            ArchiveStream::seek(self, target).map_err(Error::into_io_error)?;
        }
        Ok(self.cursor)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.cursor)
    }
}
