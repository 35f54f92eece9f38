//! # assetio
//!
//! Read-only archive streams over opaque platform asset streams.
//!
//! Archive-mounting layers want a seekable, duplicable byte stream. Packaged
//! assets are often only reachable through a platform handle with its own
//! read/seek/close primitives and its own way of reporting errors. This crate
//! adapts one to the other.
//!
//! ## Features
//!
//! - [`ArchiveStream`]: cached position and size, reads clamped to the archive
//!   length, end of file told apart from platform failure
//! - Independent duplicates of a stream at the same position
//! - Platform sources for local directories, HTTP Range requests and memory
//! - [`MountTable`], a small consumer of the stream contract
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use assetio::{ArchiveIo, ArchiveStream, LocalSource, ReadStatus};
//!
//! fn main() -> assetio::Result<()> {
//!     let source = Arc::new(LocalSource::new("assets"));
//!     let mut stream = ArchiveStream::open(source, "data/game.pak")?;
//!     println!("{} bytes", stream.length());
//!
//!     let mut magic = [0u8; 4];
//!     if let ReadStatus::Read(n) = stream.read(&mut magic)? {
//!         println!("{:?}", &magic[..n]);
//!     }
//!
//!     // A second cursor that moves independently of the first.
//!     let other = stream.duplicate()?;
//!     assert_eq!(other.tell(), stream.tell());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
mod error;
pub mod io;
pub mod mount;
pub mod stream;

pub use cli::Cli;
pub use config::{AssetRoot, HttpOptions};
pub use error::{Error, Result};
pub use io::{HttpSource, LocalSource, MemorySource, PlatformStream, StreamSource};
pub use mount::{MountError, MountErrorKind, MountTable};
pub use stream::{ArchiveIo, ArchiveStream, ReadStatus};
