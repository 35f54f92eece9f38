//! A minimal mount table that consumes [`ArchiveIo`] streams.
//!
//! Ownership follows the usual mounting protocol. A successful
//! [`MountTable::mount`] takes the stream and destroys it on unmount. A failed
//! mount hands the stream back inside the [`MountError`]; the caller decides
//! whether to destroy it or try again.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::stream::ArchiveIo;
use crate::{Error, Result};

#[derive(Debug, Error)]
pub enum MountErrorKind {
    #[error("mount point is empty")]
    EmptyMountPoint,

    #[error("`{0}` is already mounted")]
    AlreadyMounted(String),

    #[error("archive is empty")]
    EmptyArchive,
}

/// A rejected mount, carrying the stream back to the caller.
#[derive(Error)]
#[error("mount failed: {kind}")]
pub struct MountError {
    pub kind: MountErrorKind,
    io: Box<dyn ArchiveIo>,
}

impl MountError {
    /// Recover the stream that was offered for mounting.
    pub fn into_io(self) -> Box<dyn ArchiveIo> {
        self.io
    }
}

impl fmt::Debug for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountError")
            .field("kind", &self.kind)
            .field("length", &self.io.length())
            .finish()
    }
}

/// Archives mounted by name
#[derive(Default)]
pub struct MountTable {
    mounts: BTreeMap<String, Box<dyn ArchiveIo>>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(
        &mut self,
        mount_point: &str,
        io: Box<dyn ArchiveIo>,
    ) -> std::result::Result<(), MountError> {
        let rejected = if mount_point.is_empty() {
            Some(MountErrorKind::EmptyMountPoint)
        } else if self.mounts.contains_key(mount_point) {
            Some(MountErrorKind::AlreadyMounted(mount_point.to_string()))
        } else if io.length() == 0 {
            Some(MountErrorKind::EmptyArchive)
        } else {
            None
        };

        if let Some(kind) = rejected {
            return Err(MountError { kind, io });
        }

        info!(mount_point, length = io.length(), "mounted archive");
        self.mounts.insert(mount_point.to_string(), io);
        Ok(())
    }

    /// Open an independent reader over the archive mounted at `mount_point`.
    pub fn open(&self, mount_point: &str) -> Result<Box<dyn ArchiveIo>> {
        self.mounts
            .get(mount_point)
            .ok_or_else(|| Error::NotMounted(mount_point.to_string()))?
            .duplicate()
    }

    /// Unmount and destroy. Returns `false` if nothing was mounted there.
    pub fn unmount(&mut self, mount_point: &str) -> bool {
        match self.mounts.remove(mount_point) {
            Some(io) => {
                debug!(mount_point, "unmounting archive");
                io.destroy();
                true
            }
            None => false,
        }
    }

    pub fn is_mounted(&self, mount_point: &str) -> bool {
        self.mounts.contains_key(mount_point)
    }

    pub fn mount_points(&self) -> impl Iterator<Item = &str> {
        self.mounts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

impl Drop for MountTable {
    fn drop(&mut self) {
        for (mount_point, io) in std::mem::take(&mut self.mounts) {
            debug!(%mount_point, "unmounting archive");
            io.destroy();
        }
    }
}
