//! # volumefs
//!
//! A virtual filesystem volume that routes a single absolute-path namespace
//! across pluggable storage backends attached at mount points.
//!
//! A [`Volume`] owns a mount table. Each operation resolves its path to the
//! innermost covering mount, translates the path into that backend's local
//! coordinate space, and delegates through the [`FileSystem`] contract. When a
//! copy or move spans two different backend instances, the volume streams the
//! data itself through the [`Entity`] and [`File`] handle traits — chunk by
//! chunk for files, recursively for directory trees.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use volumefs::{BackendKind, Entity, File, MountOptions, Volume, ROOT_OPTION};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scratch = tempfile::tempdir()?;
//!
//! let volume = Volume::new();
//! let options = MountOptions::new().with(ROOT_OPTION, scratch.path().display().to_string());
//! assert!(volume.mount("/data", BackendKind::Native, &options));
//!
//! // Create a file and write through its handle.
//! let mut entity = volume.create("/data/hello.txt", false)?.ok_or("no mount")?;
//! let file = entity.as_file().ok_or("not a file")?;
//! file.write(b"hello volume", 0)?;
//!
//! // Reopen through the same virtual path and read it back.
//! let mut entity = volume.open("/data/hello.txt")?.ok_or("no mount")?;
//! let file = entity.as_file().ok_or("not a file")?;
//! let mut buf = [0u8; 12];
//! let n = file.read(&mut buf, 0)?;
//! assert_eq!(&buf[..n], b"hello volume");
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Volume`] | Mount table plus path routing — the client-facing namespace |
//! | [`FileSystem`] | Backend contract: open, create, copy, move, remove |
//! | [`Entity`] | Handle to a file or directory inside one backend |
//! | [`File`] | Entity refinement with positional I/O and streaming copy |
//! | [`BackendKind`] | Tag selecting a backend implementation at mount time |
//! | [`MountOptions`] | String key/value configuration passed to the factory |
//! | [`VfsError`] | Typed backend fault raised by `open` and `create` |
//!
//! ---
//!
//! ## Mount Resolution
//!
//! Mount keys match whole path segments, never character prefixes, and the
//! innermost mount wins. With backends at `/a` and `/a/b`:
//!
//! | Virtual path | Resolved mount | Backend-local path |
//! |--------------|----------------|--------------------|
//! | `/a/x` | `/a` | `/x` |
//! | `/a/b` | `/a/b` | `/` |
//! | `/a/b/c/d` | `/a/b` | `/c/d` |
//! | `/ab` | none | — |
//!
//! ---
//!
//! ## Error Handling
//!
//! Outcomes are reported on two tiers. Routing failures — no covering mount,
//! duplicate mount key, a copy step that did not complete — come back as
//! `false` or `Ok(None)` and carry no detail. Backend faults are typed
//! [`VfsError`] values and propagate out of [`Volume::open`] and
//! [`Volume::create`] unchanged:
//!
//! ```rust
//! use volumefs::{VfsError, Volume};
//! use std::path::PathBuf;
//!
//! let volume = Volume::new();
//!
//! // Nothing mounted: a routing failure, not a fault.
//! assert!(matches!(volume.open("/nope"), Ok(None)));
//!
//! // Faults carry the backend-local path that caused them.
//! let err = VfsError::EntityNotExist { path: PathBuf::from("/missing.txt") };
//! assert_eq!(err.to_string(), "entity does not exist: /missing.txt");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! [`Volume`] is `Send + Sync`: every operation runs inside one coarse
//! critical section around the mount table, so the table can never change
//! under a running operation. [`Entity`] handles are `Send` and mutate
//! through `&mut self` — move one into a worker, don't share it.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`BackendKind`], [`MountOptions`], [`MountInfo`] |
//!
//! ---
//!
//! ## Crate Organization
//!
//! - [`Volume`] — mount table, resolution, and the cross-backend copy engine
//! - [`FileSystem`], [`Entity`], [`File`] — the contract every backend implements
//! - [`NativeFileSystem`] — backend over a host directory subtree
//! - [`create_filesystem`] — kind-dispatched backend factory used by `Volume::mount`

// Private modules
mod error;
mod factory;
mod native;
mod traits;
mod types;
mod volume;

// Public re-exports - error types
pub use error::VfsError;
pub use types::UnknownBackendKind;

// Public re-exports - core types
pub use types::{BackendKind, MountInfo, MountOptions};

// Public re-exports - backend contract
pub use traits::{COPY_CHUNK_SIZE, Entity, File, FileSystem};

// Public re-exports - backends and factory
pub use factory::create_filesystem;
pub use native::{NativeFileSystem, ROOT_OPTION};

// Public re-exports - the volume router
pub use volume::Volume;
