//! Disk-backed backend rooted at a real directory.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use crate::{BackendKind, Entity, File, FileSystem, MountOptions, VfsError};

/// Options key naming the directory a native backend is rooted at.
pub const ROOT_OPTION: &str = "root";

/// Backend exposing a subtree of the local disk through the contract.
///
/// Every backend-local path resolves strictly under the configured root; the
/// backend-local root `/` maps to the root directory itself, and `..`
/// components never climb above it.
#[derive(Debug)]
pub struct NativeFileSystem {
    root: PathBuf,
}

impl NativeFileSystem {
    /// Construct a backend rooted at the directory named by [`ROOT_OPTION`]
    /// in `options`.
    ///
    /// # Errors
    ///
    /// [`VfsError::InvalidConfiguration`] if the key is missing or its value
    /// is not an existing directory.
    pub fn new(options: &MountOptions) -> Result<Self, VfsError> {
        let root = options
            .get(ROOT_OPTION)
            .ok_or_else(|| VfsError::InvalidConfiguration {
                kind: BackendKind::Native,
                reason: format!("missing required option `{ROOT_OPTION}`"),
            })?;
        let root = PathBuf::from(root);
        if !root.is_dir() {
            return Err(VfsError::InvalidConfiguration {
                kind: BackendKind::Native,
                reason: format!("root is not a directory: {}", root.display()),
            });
        }
        Ok(Self { root })
    }

    /// The directory backend-local paths resolve under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a backend-local path to its on-disk location. `..` is contained at
    /// the backend root rather than escaping it.
    fn resolve(&self, path: &Path) -> PathBuf {
        let mut real = self.root.clone();
        for component in path.components() {
            match component {
                Component::Normal(part) => real.push(part),
                Component::ParentDir => {
                    if real != self.root {
                        real.pop();
                    }
                }
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        real
    }
}

impl FileSystem for NativeFileSystem {
    fn open(&self, path: &Path) -> Result<Box<dyn Entity>, VfsError> {
        Ok(Box::new(NativeEntity::open(path, self.resolve(path))?))
    }

    fn create(&self, path: &Path, directory: bool) -> Result<Box<dyn Entity>, VfsError> {
        Ok(Box::new(NativeEntity::create(
            path,
            self.resolve(path),
            directory,
        )?))
    }

    fn copy(&self, src: &Path, dst: &Path) -> bool {
        let from = self.resolve(src);
        let to = self.resolve(dst);
        let result = if from.is_dir() {
            copy_tree(&from, &to)
        } else {
            fs::copy(&from, &to).map(|_| ())
        };
        match result {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(src = %src.display(), dst = %dst.display(), %error, "native copy failed");
                false
            }
        }
    }

    fn move_entity(&self, src: &Path, dst: &Path) -> bool {
        let from = self.resolve(src);
        let to = self.resolve(dst);
        if fs::rename(&from, &to).is_ok() {
            return true;
        }
        // Copy-then-remove keeps the source intact when the copy phase fails.
        self.copy(src, dst) && self.remove(src)
    }

    fn remove(&self, path: &Path) -> bool {
        let real = self.resolve(path);
        let result = if real.is_dir() {
            fs::remove_dir_all(&real)
        } else {
            fs::remove_file(&real)
        };
        match result {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "native remove failed");
                false
            }
        }
    }
}

/// Copy a directory tree below `from` into `to`, merging into a `to` that
/// already exists as a directory.
fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    if !to.is_dir() {
        fs::create_dir(to)?;
    }
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Handle to one on-disk entity.
///
/// File I/O is positional and per-operation: each `read` opens the file
/// read-only, each `write` opens it write-with-create, and no OS handle
/// outlives the call. A created file therefore has no on-disk entry until the
/// first write, and a read-only source can be streamed from without write
/// permission.
struct NativeEntity {
    name: PathBuf,
    real: PathBuf,
    directory: bool,
    children: Vec<PathBuf>,
    pos: u64,
}

impl NativeEntity {
    fn open(name: &Path, real: PathBuf) -> Result<Self, VfsError> {
        if !real.exists() {
            return Err(VfsError::EntityNotExist {
                path: name.to_path_buf(),
            });
        }
        let directory = real.is_dir();
        let mut children = Vec::new();
        if directory {
            let entries =
                fs::read_dir(&real).map_err(|e| VfsError::io("read_dir", name, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| VfsError::io("read_dir", name, e))?;
                children.push(name.join(entry.file_name()));
            }
            children.sort();
        }
        Ok(Self {
            name: name.to_path_buf(),
            real,
            directory,
            children,
            pos: 0,
        })
    }

    fn create(name: &Path, real: PathBuf, directory: bool) -> Result<Self, VfsError> {
        if directory {
            if real.is_dir() {
                return Err(VfsError::DirectoryExists {
                    path: name.to_path_buf(),
                });
            }
            fs::create_dir(&real).map_err(|e| VfsError::io("create_dir", name, e))?;
        } else {
            // A freshly created file handle starts empty: any previous entry
            // at the path is discarded, so nothing stale survives a rewrite.
            match fs::remove_file(&real) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(VfsError::io("create", name, e)),
            }
        }
        Ok(Self {
            name: name.to_path_buf(),
            real,
            directory,
            children: Vec::new(),
            pos: 0,
        })
    }
}

impl Entity for NativeEntity {
    fn is_dir(&self) -> bool {
        self.directory
    }

    fn name(&self) -> &Path {
        &self.name
    }

    fn children(&self) -> &[PathBuf] {
        &self.children
    }

    fn empty(&self) -> bool {
        if self.directory {
            self.children.is_empty()
        } else {
            self.size().map_or(true, |size| size == 0)
        }
    }

    fn as_file(&mut self) -> Option<&mut dyn File> {
        if self.directory { None } else { Some(self) }
    }
}

impl File for NativeEntity {
    fn size(&self) -> Result<u64, VfsError> {
        match fs::metadata(&self.real) {
            Ok(meta) => Ok(meta.len()),
            // Content that was never written reads as empty.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(VfsError::io("size", &self.name, e)),
        }
    }

    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, VfsError> {
        let mut file = match fs::File::open(&self.real) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(VfsError::io("read", &self.name, e)),
        };
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| VfsError::io("read", &self.name, e))?;
        let n = file
            .read(buf)
            .map_err(|e| VfsError::io("read", &self.name, e))?;
        self.pos = offset + n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8], offset: u64) -> Result<usize, VfsError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.real)
            .map_err(|e| VfsError::io("write", &self.name, e))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| VfsError::io("write", &self.name, e))?;
        file.write_all(buf)
            .map_err(|e| VfsError::io("write", &self.name, e))?;
        self.pos = offset + buf.len() as u64;
        Ok(buf.len())
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, VfsError> {
        let size = self.size()?;
        let target = match pos {
            SeekFrom::Start(n) => i128::from(n),
            SeekFrom::End(delta) => i128::from(size) + i128::from(delta),
            SeekFrom::Current(delta) => i128::from(self.pos) + i128::from(delta),
        };
        self.pos = u64::try_from(target).map_err(|_| {
            VfsError::io(
                "seek",
                &self.name,
                io::Error::new(io::ErrorKind::InvalidInput, "seek to an invalid position"),
            )
        })?;
        Ok(self.pos)
    }
}
