//! Backend construction at mount time.

use std::sync::Arc;

use crate::{BackendKind, FileSystem, MountOptions, NativeFileSystem, VfsError};

/// Construct a backend instance from a kind tag and its options.
///
/// This is the seam [`Volume::mount`](crate::Volume::mount) goes through, and
/// the place additional kinds plug in once they have implementations.
/// [`Memory`](BackendKind::Memory) and [`Archive`](BackendKind::Archive) are
/// declared but unimplemented; asking for them reports
/// [`VfsError::UnsupportedBackend`] rather than handing back a broken backend.
///
/// # Errors
///
/// - [`VfsError::InvalidConfiguration`] when the backend constructor rejects
///   `options`
/// - [`VfsError::UnsupportedBackend`] for kinds without an implementation
pub fn create_filesystem(
    kind: BackendKind,
    options: &MountOptions,
) -> Result<Arc<dyn FileSystem>, VfsError> {
    match kind {
        BackendKind::Native => Ok(Arc::new(NativeFileSystem::new(options)?)),
        BackendKind::Memory | BackendKind::Archive => {
            Err(VfsError::UnsupportedBackend { kind })
        }
    }
}
