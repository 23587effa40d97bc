//! Mount-time configuration types.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Backend kind selected at mount time.
///
/// Only [`Native`](BackendKind::Native) has an implementation; the other kinds
/// are declared extension points and cause `mount` to fail cleanly until a
/// backend exists for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BackendKind {
    /// Disk-backed backend rooted at a real directory.
    Native,
    /// In-memory backend (declared, not implemented).
    Memory,
    /// Archive-backed backend (declared, not implemented).
    Archive,
}

impl BackendKind {
    /// The kind's canonical lowercase name.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Native => "native",
            BackendKind::Memory => "memory",
            BackendKind::Archive => "archive",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = UnknownBackendKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(BackendKind::Native),
            "memory" => Ok(BackendKind::Memory),
            "archive" => Ok(BackendKind::Archive),
            other => Err(UnknownBackendKind(other.to_string())),
        }
    }
}

/// Error parsing a [`BackendKind`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend kind: {0}")]
pub struct UnknownBackendKind(
    /// The string that did not name a kind.
    pub String,
);

/// Flat string-keyed configuration map consumed by backend constructors.
///
/// Recognized keys are backend-specific; unrecognized keys are ignored. The
/// native backend requires [`ROOT_OPTION`](crate::ROOT_OPTION) to name its
/// root directory. Options are used only while the backend is constructed and
/// are not retained afterwards.
///
/// # Examples
///
/// ```rust
/// use volumefs::{MountOptions, ROOT_OPTION};
///
/// let options = MountOptions::new().with(ROOT_OPTION, "/srv/data");
/// assert_eq!(options.get(ROOT_OPTION), Some("/srv/data"));
/// assert_eq!(options.get("unset"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MountOptions(HashMap<String, String>);

impl MountOptions {
    /// Create an empty options map.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Insert a key/value pair, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` if no options are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of options set.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<HashMap<String, String>> for MountOptions {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for MountOptions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of [`Volume::mounts`](crate::Volume::mounts) output.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountInfo {
    /// The virtual mount path (the mount-table key).
    pub path: PathBuf,
    /// Kind of the backend mounted there.
    pub kind: BackendKind,
}
