//! Entity and file handles produced by backend operations.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use crate::VfsError;

/// Upper bound on one read/write step of the streaming copy loop: 50 MiB.
pub const COPY_CHUNK_SIZE: usize = 50 * 1024 * 1024;

/// Handle to one node in a backend's namespace: a file or a directory.
///
/// Entities are produced by [`FileSystem::open`](crate::FileSystem::open) and
/// [`FileSystem::create`](crate::FileSystem::create) and owned exclusively by
/// the caller. For directories, the children listing is a snapshot captured
/// when the handle was produced and is never refreshed; reopen the entity to
/// observe later mutations.
pub trait Entity: Send {
    /// Returns `true` if this entity is a directory.
    fn is_dir(&self) -> bool;

    /// The path this entity was opened or created with (backend-local).
    fn name(&self) -> &Path;

    /// Snapshot of immediate children paths, captured at open time.
    ///
    /// Empty for files. Paths are backend-local, in the same coordinate space
    /// as [`name`](Entity::name).
    fn children(&self) -> &[PathBuf];

    /// Returns `true` if the entity has no content: an empty children snapshot
    /// for directories, size zero for files.
    fn empty(&self) -> bool;

    /// Borrow this entity as a file.
    ///
    /// Returns `None` for directories. This is the only route from an entity
    /// handle to the byte-level [`File`] surface.
    fn as_file(&mut self) -> Option<&mut dyn File>;
}

/// Byte-level operations on a file entity.
///
/// All offsets are absolute from the start of the file. `read` and `write`
/// address bytes by explicit offset; the cursor maintained by [`seek`](File::seek)
/// exists for callers that track a position themselves and is not consumed by
/// the other operations.
pub trait File: Entity {
    /// Current size in bytes. A file whose content was never written is
    /// size zero.
    ///
    /// # Errors
    ///
    /// [`VfsError::FileOperation`] if the backend cannot determine the size.
    fn size(&self) -> Result<u64, VfsError>;

    /// Read up to `buf.len()` bytes at `offset`.
    ///
    /// Returns the number of bytes read, which may be less than requested;
    /// zero exactly at end-of-data.
    ///
    /// # Errors
    ///
    /// [`VfsError::FileOperation`] on I/O faults.
    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, VfsError>;

    /// Write the whole buffer at `offset`.
    ///
    /// Partial writes are retried internally; on success the return value is
    /// `buf.len()`.
    ///
    /// # Errors
    ///
    /// [`VfsError::FileOperation`] on I/O faults.
    fn write(&mut self, buf: &[u8], offset: u64) -> Result<usize, VfsError>;

    /// Reposition the logical cursor, returning the new absolute position.
    ///
    /// `seek(SeekFrom::End(0))` reports the current size. Seeking past the
    /// end is allowed; seeking before the start is an error.
    ///
    /// # Errors
    ///
    /// [`VfsError::FileOperation`] if the resulting position is invalid or the
    /// size cannot be determined.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, VfsError>;

    /// Stream the full content of `src` into this file.
    ///
    /// Chunks of at most [`COPY_CHUNK_SIZE`] bytes are read from `src` at
    /// increasing offsets and written here at the same offsets until a
    /// zero-length read signals end-of-data. The transfer goes through `read`
    /// and `write` only, so it works between any two backends regardless of
    /// their storage media.
    ///
    /// # Errors
    ///
    /// Propagates the first [`VfsError`] raised by either side; bytes written
    /// before the fault are not rolled back.
    fn copy_from(&mut self, src: &mut dyn File) -> Result<(), VfsError> {
        let chunk = src.size()?.clamp(1, COPY_CHUNK_SIZE as u64) as usize;
        let mut buf = vec![0u8; chunk];
        let mut offset = 0u64;
        loop {
            let n = src.read(&mut buf, offset)?;
            if n == 0 {
                return Ok(());
            }
            self.write(&buf[..n], offset)?;
            offset += n as u64;
        }
    }
}
