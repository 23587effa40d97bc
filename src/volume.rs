//! The volume router: mount table, path resolution, cross-backend operations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::factory::create_filesystem;
use crate::{BackendKind, Entity, FileSystem, MountInfo, MountOptions, VfsError};

/// One mount-table row: the backend plus the kind tag it was mounted as.
struct MountEntry {
    kind: BackendKind,
    fs: Arc<dyn FileSystem>,
}

type MountTable = BTreeMap<PathBuf, MountEntry>;

/// A unified path namespace over backends attached at mount points.
///
/// Clients address entities by absolute virtual paths. Each operation resolves
/// its path to the innermost covering mount (longest segment-wise prefix),
/// translates it into that backend's local coordinate space, and delegates.
/// Copy and move detect when source and destination live on different backend
/// instances and switch to a streaming transfer driven through the
/// [`Entity`]/[`File`](crate::File) contract, recursing over directory trees.
///
/// All operations run inside one coarse critical section around the mount
/// table, for their full duration: a large cross-backend copy serializes every
/// other operation on the same volume. That is deliberate — the table cannot
/// change under a running operation, so a mount can never disappear mid-copy.
///
/// # Examples
///
/// ```rust
/// use volumefs::{BackendKind, Entity, File, MountOptions, Volume, ROOT_OPTION};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let scratch = tempfile::tempdir()?;
/// let volume = Volume::new();
/// let options = MountOptions::new().with(ROOT_OPTION, scratch.path().display().to_string());
/// assert!(volume.mount("/data", BackendKind::Native, &options));
///
/// let mut entity = volume.create("/data/note.txt", false)?.ok_or("no mount")?;
/// let file = entity.as_file().ok_or("not a file")?;
/// file.write(b"hello", 0)?;
/// # Ok(())
/// # }
/// ```
pub struct Volume {
    mounts: Mutex<MountTable>,
}

impl Volume {
    /// Create a volume with an empty mount table.
    pub fn new() -> Self {
        Self {
            mounts: Mutex::new(BTreeMap::new()),
        }
    }

    /// Attach a backend built by the factory from `(kind, options)` at `path`.
    ///
    /// Returns `false` if `path` is not absolute, is already a mount key, or
    /// if backend construction fails (unsupported kind, invalid
    /// configuration). Construction faults are logged at `warn` level; per the
    /// routing contract the return value carries no further detail.
    pub fn mount(&self, path: impl AsRef<Path>, kind: BackendKind, options: &MountOptions) -> bool {
        let path = path.as_ref();
        match create_filesystem(kind, options) {
            Ok(fs) => self.attach(path, kind, fs),
            Err(error) => {
                tracing::warn!(path = %path.display(), %kind, %error, "backend construction failed");
                false
            }
        }
    }

    /// Attach an already-constructed backend at `path`.
    ///
    /// The seam for backend implementations the built-in factory does not know
    /// about; `kind` is recorded for [`mounts`](Volume::mounts) listings. Key
    /// rules are the same as for [`mount`](Volume::mount).
    pub fn mount_backend(
        &self,
        path: impl AsRef<Path>,
        kind: BackendKind,
        fs: Arc<dyn FileSystem>,
    ) -> bool {
        self.attach(path.as_ref(), kind, fs)
    }

    fn attach(&self, path: &Path, kind: BackendKind, fs: Arc<dyn FileSystem>) -> bool {
        if !path.is_absolute() {
            tracing::warn!(path = %path.display(), "mount path must be absolute");
            return false;
        }
        let mut mounts = self.mounts.lock();
        if mounts.contains_key(path) {
            tracing::debug!(path = %path.display(), "mount key already in use");
            return false;
        }
        mounts.insert(path.to_path_buf(), MountEntry { kind, fs });
        tracing::debug!(path = %path.display(), %kind, "mounted");
        true
    }

    /// Detach the backend mounted exactly at `path`.
    ///
    /// Only an exact mount key counts: a path that merely resolves to some
    /// deeper mount, or is a prefix of one, returns `false`. Entity handles
    /// obtained before the unmount stay usable — they address backing storage
    /// directly, and the critical section guarantees no operation is
    /// mid-flight when the entry is removed.
    pub fn unmount(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let removed = self.mounts.lock().remove(path).is_some();
        if removed {
            tracing::debug!(path = %path.display(), "unmounted");
        }
        removed
    }

    /// Open the entity at `path`.
    ///
    /// `Ok(None)` when no mount covers `path` (a routing failure, carrying no
    /// detail by contract); `Ok(Some(_))` with the backend's entity handle
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Backend faults propagate unchanged, [`VfsError::EntityNotExist`] in
    /// particular.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Option<Box<dyn Entity>>, VfsError> {
        let path = path.as_ref();
        let mounts = self.mounts.lock();
        let Some((mount, entry)) = resolve(&mounts, path) else {
            return Ok(None);
        };
        entry.fs.open(&to_local(mount, path)).map(Some)
    }

    /// Create a file handle or directory at `path`.
    ///
    /// `Ok(None)` when no mount covers `path`. Directory creation requires an
    /// existing parent; file creation produces a handle whose content appears
    /// in backing storage on first write.
    ///
    /// # Errors
    ///
    /// Backend faults propagate unchanged, [`VfsError::DirectoryExists`] in
    /// particular.
    pub fn create(
        &self,
        path: impl AsRef<Path>,
        directory: bool,
    ) -> Result<Option<Box<dyn Entity>>, VfsError> {
        let path = path.as_ref();
        let mounts = self.mounts.lock();
        let Some((mount, entry)) = resolve(&mounts, path) else {
            return Ok(None);
        };
        entry.fs.create(&to_local(mount, path), directory).map(Some)
    }

    /// Copy `src` to `dst`.
    ///
    /// When both paths resolve to the same backend instance the copy is
    /// delegated to that backend's native fast path. Otherwise the source is
    /// opened and streamed over: files chunk-by-chunk, directories by
    /// recursing through the virtual namespace so nested mounts on either
    /// side take effect. Best-effort: any failed step makes the whole
    /// operation `false`, and partially copied destination entries are not
    /// rolled back.
    pub fn copy(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> bool {
        let mounts = self.mounts.lock();
        copy_locked(&mounts, src.as_ref(), dst.as_ref())
    }

    /// Move `src` to `dst`: a [`copy`](Volume::copy) followed by removal of
    /// the source. When both paths resolve to the same backend instance the
    /// whole move is delegated to that backend's native move instead.
    ///
    /// The removal runs only after the copy phase succeeded, so a failed copy
    /// leaves the source untouched. A failed removal does not undo the copy;
    /// the operation then reports `false` with the destination in place.
    pub fn move_entity(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> bool {
        let src = src.as_ref();
        let dst = dst.as_ref();
        let mounts = self.mounts.lock();
        let Some((src_mount, src_entry)) = resolve(&mounts, src) else {
            return false;
        };
        let Some((dst_mount, dst_entry)) = resolve(&mounts, dst) else {
            return false;
        };
        if Arc::ptr_eq(&src_entry.fs, &dst_entry.fs) {
            return src_entry
                .fs
                .move_entity(&to_local(src_mount, src), &to_local(dst_mount, dst));
        }
        copy_locked(&mounts, src, dst) && src_entry.fs.remove(&to_local(src_mount, src))
    }

    /// Remove the entity at `path`. Best-effort: `false` when no mount covers
    /// the path or the backend reports failure.
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let mounts = self.mounts.lock();
        let Some((mount, entry)) = resolve(&mounts, path) else {
            return false;
        };
        entry.fs.remove(&to_local(mount, path))
    }

    /// Snapshot of the mount table, ordered by mount path.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.mounts
            .lock()
            .iter()
            .map(|(path, entry)| MountInfo {
                path: path.clone(),
                kind: entry.kind,
            })
            .collect()
    }

    /// Returns `true` if `path` is an exact mount key.
    pub fn is_mounted(&self, path: impl AsRef<Path>) -> bool {
        self.mounts.lock().contains_key(path.as_ref())
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment distance from `mount` to `path`: the number of path components
/// left after the mount key, or `None` when the key is not a segment-wise
/// prefix. `/ab` is not a prefix of `/a/b`, and neither is `/a` of `/ab`.
fn segment_distance(mount: &Path, path: &Path) -> Option<usize> {
    path.strip_prefix(mount)
        .ok()
        .map(|rest| rest.components().count())
}

/// The innermost mount covering `path`: among entries whose key is a valid
/// segment-wise prefix, the one with the minimum remaining distance.
fn resolve<'t>(mounts: &'t MountTable, path: &Path) -> Option<(&'t Path, &'t MountEntry)> {
    let mut best: Option<(usize, &Path, &MountEntry)> = None;
    for (mount, entry) in mounts {
        let Some(distance) = segment_distance(mount, path) else {
            continue;
        };
        if best.as_ref().is_none_or(|(min, _, _)| distance < *min) {
            best = Some((distance, mount.as_path(), entry));
        }
    }
    best.map(|(_, mount, entry)| (mount, entry))
}

/// Strip the mount key from `path`, yielding the backend-local path. A path
/// equal to its mount key becomes the backend-local root `/`.
fn to_local(mount: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(mount) {
        Ok(rest) => Path::new("/").join(rest),
        Err(_) => PathBuf::from("/"),
    }
}

/// The copy engine. Runs entirely under the mount-table lock held by the
/// public entry points and never re-acquires it, including through recursion.
fn copy_locked(mounts: &MountTable, src: &Path, dst: &Path) -> bool {
    let Some((src_mount, src_entry)) = resolve(mounts, src) else {
        return false;
    };
    let Some((dst_mount, dst_entry)) = resolve(mounts, dst) else {
        return false;
    };
    let src_local = to_local(src_mount, src);
    let dst_local = to_local(dst_mount, dst);

    if Arc::ptr_eq(&src_entry.fs, &dst_entry.fs) {
        return src_entry.fs.copy(&src_local, &dst_local);
    }

    let mut source = match src_entry.fs.open(&src_local) {
        Ok(entity) => entity,
        Err(error) => {
            tracing::debug!(path = %src.display(), %error, "copy: source open failed");
            return false;
        }
    };

    if source.is_dir() {
        if let Err(error) = dst_entry.fs.create(&dst_local, true) {
            tracing::debug!(path = %dst.display(), %error, "copy: destination create failed");
            return false;
        }
        for child in source.children() {
            let Some(name) = child.file_name() else {
                return false;
            };
            // Children re-enter through the virtual namespace so nested
            // mounts on either side take effect during recursion.
            if !copy_locked(mounts, &src.join(name), &dst.join(name)) {
                return false;
            }
        }
        true
    } else {
        let mut created = match dst_entry.fs.create(&dst_local, false) {
            Ok(entity) => entity,
            Err(error) => {
                tracing::debug!(path = %dst.display(), %error, "copy: destination create failed");
                return false;
            }
        };
        let (Some(to), Some(from)) = (created.as_file(), source.as_file()) else {
            return false;
        };
        match to.copy_from(from) {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(src = %src.display(), dst = %dst.display(), %error, "copy: stream failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ROOT_OPTION;

    fn native_options(root: &Path) -> MountOptions {
        MountOptions::new().with(ROOT_OPTION, root.display().to_string())
    }

    #[test]
    fn segment_distance_requires_segment_boundaries() {
        assert_eq!(segment_distance(Path::new("/a"), Path::new("/a")), Some(0));
        assert_eq!(segment_distance(Path::new("/a"), Path::new("/a/b")), Some(1));
        assert_eq!(
            segment_distance(Path::new("/a"), Path::new("/a/b/c/d")),
            Some(3)
        );
        assert_eq!(segment_distance(Path::new("/a"), Path::new("/ab")), None);
        assert_eq!(segment_distance(Path::new("/ab"), Path::new("/a/b")), None);
        assert_eq!(segment_distance(Path::new("/a/b"), Path::new("/a")), None);
    }

    #[test]
    fn to_local_strips_mount_key() {
        assert_eq!(
            to_local(Path::new("/a"), Path::new("/a/b/c")),
            PathBuf::from("/b/c")
        );
        assert_eq!(to_local(Path::new("/a"), Path::new("/a")), PathBuf::from("/"));
        assert_eq!(to_local(Path::new("/"), Path::new("/x")), PathBuf::from("/x"));
    }

    #[test]
    fn mount_rejects_duplicate_key() {
        let dir = tempfile::tempdir().unwrap();
        let volume = Volume::new();
        assert!(volume.mount("/m", BackendKind::Native, &native_options(dir.path())));
        assert!(!volume.mount("/m", BackendKind::Native, &native_options(dir.path())));

        // The original backend is still reachable.
        std::fs::write(dir.path().join("still.txt"), b"here").unwrap();
        assert!(volume.open("/m/still.txt").unwrap().is_some());
    }

    #[test]
    fn mount_rejects_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let volume = Volume::new();
        assert!(!volume.mount("data", BackendKind::Native, &native_options(dir.path())));
        assert!(volume.mounts().is_empty());
    }

    #[test]
    fn mount_unsupported_kind_fails_cleanly() {
        let volume = Volume::new();
        assert!(!volume.mount("/mem", BackendKind::Memory, &MountOptions::new()));
        assert!(!volume.is_mounted("/mem"));
    }

    #[test]
    fn mount_invalid_configuration_fails_cleanly() {
        let volume = Volume::new();
        assert!(!volume.mount("/m", BackendKind::Native, &MountOptions::new()));
        assert!(volume.mounts().is_empty());
    }

    #[test]
    fn unmount_requires_exact_key() {
        let dir = tempfile::tempdir().unwrap();
        let volume = Volume::new();
        assert!(volume.mount("/data", BackendKind::Native, &native_options(dir.path())));

        assert!(!volume.unmount("/data/sub"));
        assert!(!volume.unmount("/da"));
        assert!(!volume.unmount("/never"));
        assert!(volume.unmount("/data"));
        assert!(!volume.unmount("/data"));
    }

    #[test]
    fn resolution_prefers_deepest_mount() {
        let outer = tempfile::tempdir().unwrap();
        let inner = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("x"), b"outer file").unwrap();
        std::fs::create_dir(inner.path().join("c")).unwrap();
        std::fs::write(inner.path().join("c/d"), b"inner file").unwrap();

        let volume = Volume::new();
        assert!(volume.mount("/a", BackendKind::Native, &native_options(outer.path())));
        assert!(volume.mount("/a/b", BackendKind::Native, &native_options(inner.path())));

        // /a/b/c/d selects /a/b and translates to /c/d.
        let mut entity = volume.open("/a/b/c/d").unwrap().unwrap();
        assert_eq!(entity.name(), Path::new("/c/d"));
        let file = entity.as_file().unwrap();
        let mut buf = [0u8; 10];
        let n = file.read(&mut buf, 0).unwrap();
        assert_eq!(&buf[..n], b"inner file");

        // /a/x selects /a and translates to /x.
        let entity = volume.open("/a/x").unwrap().unwrap();
        assert_eq!(entity.name(), Path::new("/x"));
    }

    #[test]
    fn character_prefix_mount_does_not_capture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file"), b"x").unwrap();

        let volume = Volume::new();
        assert!(volume.mount("/ab", BackendKind::Native, &native_options(dir.path())));
        assert!(volume.open("/a/file").unwrap().is_none());
        assert!(volume.open("/ab/file").unwrap().is_some());
    }

    #[test]
    fn root_mount_covers_everything() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), b"root backend").unwrap();

        let volume = Volume::new();
        assert!(volume.mount("/", BackendKind::Native, &native_options(dir.path())));
        let entity = volume.open("/f").unwrap().unwrap();
        assert_eq!(entity.name(), Path::new("/f"));
    }

    #[test]
    fn operations_without_covering_mount_fail_flat() {
        let volume = Volume::new();
        assert!(volume.open("/nowhere").unwrap().is_none());
        assert!(volume.create("/nowhere", true).unwrap().is_none());
        assert!(!volume.copy("/nowhere/a", "/nowhere/b"));
        assert!(!volume.move_entity("/nowhere/a", "/nowhere/b"));
        assert!(!volume.remove("/nowhere"));
    }

    #[test]
    fn open_missing_entity_is_a_backend_fault() {
        let dir = tempfile::tempdir().unwrap();
        let volume = Volume::new();
        assert!(volume.mount("/m", BackendKind::Native, &native_options(dir.path())));

        assert!(matches!(
            volume.open("/m/absent"),
            Err(VfsError::EntityNotExist { path }) if path == Path::new("/absent")
        ));
    }

    #[test]
    fn create_existing_directory_is_a_backend_fault() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("taken")).unwrap();
        let volume = Volume::new();
        assert!(volume.mount("/m", BackendKind::Native, &native_options(dir.path())));

        assert!(matches!(
            volume.create("/m/taken", true),
            Err(VfsError::DirectoryExists { .. })
        ));
    }

    #[test]
    fn create_write_reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let volume = Volume::new();
        assert!(volume.mount("/m", BackendKind::Native, &native_options(dir.path())));

        assert!(volume.create("/m/dir", true).unwrap().is_some());
        let mut entity = volume.create("/m/dir/f.bin", false).unwrap().unwrap();
        entity.as_file().unwrap().write(b"payload", 0).unwrap();

        let mut entity = volume.open("/m/dir/f.bin").unwrap().unwrap();
        let file = entity.as_file().unwrap();
        let mut buf = [0u8; 7];
        assert_eq!(file.read(&mut buf, 0).unwrap(), 7);
        assert_eq!(&buf, b"payload");
    }

    #[test]
    fn same_backend_copy_delegates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"same backend").unwrap();
        let volume = Volume::new();
        assert!(volume.mount("/m", BackendKind::Native, &native_options(dir.path())));

        assert!(volume.copy("/m/a.txt", "/m/b.txt"));
        assert_eq!(std::fs::read(dir.path().join("b.txt")).unwrap(), b"same backend");
    }

    #[test]
    fn cross_backend_file_copy_streams_bytes() {
        let left = tempfile::tempdir().unwrap();
        let right = tempfile::tempdir().unwrap();
        std::fs::write(left.path().join("a.bin"), b"across the gap").unwrap();

        let volume = Volume::new();
        assert!(volume.mount("/x", BackendKind::Native, &native_options(left.path())));
        assert!(volume.mount("/y", BackendKind::Native, &native_options(right.path())));

        assert!(volume.copy("/x/a.bin", "/y/b.bin"));
        assert_eq!(
            std::fs::read(right.path().join("b.bin")).unwrap(),
            b"across the gap"
        );
        assert!(left.path().join("a.bin").exists());
    }

    #[test]
    fn same_backend_move_delegates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"movable").unwrap();
        let volume = Volume::new();
        assert!(volume.mount("/m", BackendKind::Native, &native_options(dir.path())));

        assert!(volume.move_entity("/m/a.txt", "/m/b.txt"));
        assert!(!dir.path().join("a.txt").exists());
        assert_eq!(std::fs::read(dir.path().join("b.txt")).unwrap(), b"movable");
    }

    #[test]
    fn copy_with_unresolved_destination_leaves_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a"), b"stay").unwrap();
        let volume = Volume::new();
        assert!(volume.mount("/x", BackendKind::Native, &native_options(dir.path())));

        assert!(!volume.copy("/x/a", "/unmounted/a"));
        assert!(dir.path().join("a").exists());
    }

    #[test]
    fn mounts_listing_is_sorted_and_tagged() {
        let one = tempfile::tempdir().unwrap();
        let two = tempfile::tempdir().unwrap();
        let volume = Volume::new();
        assert!(volume.mount("/zeta", BackendKind::Native, &native_options(one.path())));
        assert!(volume.mount("/alpha", BackendKind::Native, &native_options(two.path())));

        let listing = volume.mounts();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].path, PathBuf::from("/alpha"));
        assert_eq!(listing[1].path, PathBuf::from("/zeta"));
        assert!(listing.iter().all(|m| m.kind == BackendKind::Native));

        assert!(volume.is_mounted("/alpha"));
        assert!(!volume.is_mounted("/alp"));
    }

    #[test]
    fn default_volume_has_no_mounts() {
        assert!(Volume::default().mounts().is_empty());
    }
}
