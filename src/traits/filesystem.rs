//! The backend trait.

use std::path::Path;

use crate::{Entity, VfsError};

/// A storage backend exposing one rooted namespace.
///
/// Backends are addressed exclusively through backend-local absolute paths
/// (`/` is the backend's own root); by the time a backend sees a path, the
/// router has already stripped the mount prefix from it. Distinct instances
/// never share identity — the router tells backends apart by instance, so two
/// backends over the same storage are still "different" for routing purposes.
///
/// `open` and `create` report faults as typed [`VfsError`] values; `copy`,
/// `move_entity` and `remove` are best-effort and collapse any failure into
/// `false`, per the two-tier reporting contract.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: the router shares backends behind
/// `Arc` and may call in from any thread. Its critical section guarantees
/// calls into one backend never overlap, so no internal locking is required
/// beyond what the backend's own state demands.
///
/// # Object Safety
///
/// Object-safe; the router stores `Arc<dyn FileSystem>`.
pub trait FileSystem: Send + Sync {
    /// Open an existing entity.
    ///
    /// Directories come back with their children eagerly snapshotted.
    ///
    /// # Errors
    ///
    /// - [`VfsError::EntityNotExist`] if nothing exists at `path`
    /// - [`VfsError::FileOperation`] for I/O faults while inspecting the entry
    fn open(&self, path: &Path) -> Result<Box<dyn Entity>, VfsError>;

    /// Create an entity.
    ///
    /// For directories the parent must already exist — creation is
    /// non-recursive. For files this produces a handle only; no content exists
    /// in backing storage until the first write through the handle. Creating a
    /// file over an existing file discards the previous content — the handle
    /// always starts empty, so a shorter rewrite leaves no stale trailing
    /// bytes.
    ///
    /// # Errors
    ///
    /// - [`VfsError::DirectoryExists`] if `directory` is set and `path`
    ///   already is one
    /// - [`VfsError::FileOperation`] for I/O faults (a missing parent included)
    fn create(&self, path: &Path, directory: bool) -> Result<Box<dyn Entity>, VfsError>;

    /// Copy `src` to `dst` inside this backend, using whatever native copy the
    /// backing storage offers. Best-effort: `false` on any failure.
    fn copy(&self, src: &Path, dst: &Path) -> bool;

    /// Move `src` to `dst` inside this backend.
    ///
    /// Defined as copy-then-remove-source: when the copy phase fails the
    /// source is left untouched and the result is `false`. Best-effort.
    fn move_entity(&self, src: &Path, dst: &Path) -> bool;

    /// Remove the file or directory tree at `path`. Best-effort: `false` on
    /// any failure, including a missing target.
    fn remove(&self, path: &Path) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filesystem_is_object_safe() {
        fn _check(_: &dyn FileSystem) {}
    }

    #[test]
    fn filesystem_objects_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn FileSystem>();
    }
}
