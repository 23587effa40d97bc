//! Fault types raised by backends and backend construction.

use std::path::PathBuf;

use crate::BackendKind;

/// Fault raised by a backend or during backend construction.
///
/// Routing failures are *not* represented here: per the two-tier reporting
/// contract, "no covering mount", "duplicate mount key" and failed best-effort
/// copy/move/remove steps surface as `false` or `Ok(None)` from
/// [`Volume`](crate::Volume) operations, with no further detail. `VfsError`
/// carries the named backend-level faults, each with the offending path or
/// backend kind attached.
///
/// # Examples
///
/// ```rust
/// use volumefs::VfsError;
/// use std::path::PathBuf;
///
/// let err = VfsError::EntityNotExist { path: PathBuf::from("/missing") };
/// assert!(err.to_string().contains("/missing"));
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    // Backend faults
    /// No entity exists at the backend-local path.
    #[error("entity does not exist: {path}")]
    EntityNotExist {
        /// The backend-local path that was not found.
        path: PathBuf,
    },

    /// A directory already exists at the backend-local path.
    #[error("directory already exists: {path}")]
    DirectoryExists {
        /// The backend-local path that is already a directory.
        path: PathBuf,
    },

    /// I/O fault during a file operation.
    #[error("{operation} failed for {path}: {source}")]
    FileOperation {
        /// The entity name the operation was addressing.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // Mount-time faults
    /// A backend constructor rejected its configuration.
    #[error("invalid {kind} backend configuration: {reason}")]
    InvalidConfiguration {
        /// The backend kind being constructed.
        kind: BackendKind,
        /// What was wrong with the options map.
        reason: String,
    },

    /// The backend kind is declared but has no implementation.
    #[error("unsupported backend kind: {kind}")]
    UnsupportedBackend {
        /// The backend kind requested at mount time.
        kind: BackendKind,
    },
}

impl VfsError {
    /// Wrap an I/O error as a [`VfsError::FileOperation`] fault.
    ///
    /// `path` is the entity name as the caller knows it (backend-local), not
    /// the storage-level path the backend resolved it to.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOperation {
            path: path.into(),
            operation,
            source,
        }
    }
}
