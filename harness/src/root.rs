//! Path roots: the owned (or wrapped) filesystem subtrees a workspace hands
//! out to its file manager. Stored in a plain slab rather than behind
//! individually reference-counted handles, so there is exactly one owner
//! per root and closing the workspace is the only way a root dies.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use harness_vfs::{repository::ContainerRoot, MemFs};

use crate::error::Error;

/// An index into a workspace's root slab. Never reused after a workspace
/// closes — the slab itself goes away with the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootId(pub(crate) usize);

impl std::fmt::Display for RootId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "root#{}", self.0)
    }
}

/// How a workspace should back a freshly created root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStrategy {
    TempDisk,
    Memory,
}

impl RootStrategy {
    /// Reads `HARNESS_ROOT_STRATEGY` (`ramdisk` | `tempdir`), defaulting to
    /// [`RootStrategy::TempDisk`] if unset or unrecognized.
    pub fn from_env() -> Self {
        match std::env::var("HARNESS_ROOT_STRATEGY").as_deref() {
            Ok("ramdisk") => Self::Memory,
            Ok("tempdir") => Self::TempDisk,
            _ => Self::TempDisk,
        }
    }
}

#[derive(Debug)]
pub(crate) enum PathRootEntry {
    /// A non-owning view of an externally supplied path. Never deleted on
    /// close.
    Wrapping(PathBuf),
    TempDisk(tempfile::TempDir),
    InMemory(Arc<MemFs>),
}

fn looks_like_archive(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("jar") | Some("zip"))
}

impl PathRootEntry {
    pub(crate) fn to_container_root(&self, writable: bool) -> ContainerRoot {
        match self {
            Self::Wrapping(path) if looks_like_archive(path) => ContainerRoot::Archive { path: path.clone() },
            Self::Wrapping(path) => ContainerRoot::Disk { path: path.clone(), writable },
            Self::TempDisk(dir) => ContainerRoot::Disk { path: dir.path().to_path_buf(), writable },
            Self::InMemory(fs) => ContainerRoot::Memory { fs: fs.clone(), writable },
        }
    }

    pub(crate) fn base_path(&self) -> Option<PathBuf> {
        match self {
            Self::Wrapping(path) => Some(path.clone()),
            Self::TempDisk(dir) => Some(dir.path().to_path_buf()),
            Self::InMemory(_) => None,
        }
    }

    pub(crate) fn mem_fs(&self) -> Option<&Arc<MemFs>> {
        match self {
            Self::InMemory(fs) => Some(fs),
            _ => None,
        }
    }

    /// Explicitly releases the root, rather than relying on `Drop`, so a
    /// `TempDisk` cleanup failure can be observed and aggregated instead of
    /// silently swallowed.
    pub(crate) fn release(self) -> Result<(), Error> {
        match self {
            Self::Wrapping(_) => Ok(()),
            Self::TempDisk(dir) => {
                let path = dir.path().to_path_buf();
                dir.close().map_err(|e| Error::Vfs(harness_vfs::Error::io(e, path)))
            }
            Self::InMemory(_) => Ok(()),
        }
    }
}

pub(crate) fn validate_directory_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::IllegalRootName { name: name.to_string(), reason: "name is empty" });
    }
    if name.contains(std::path::MAIN_SEPARATOR) || name.contains('/') {
        return Err(Error::IllegalRootName {
            name: name.to_string(),
            reason: "name must not contain path separators",
        });
    }
    if name == ".." || name == "." {
        return Err(Error::IllegalRootName { name: name.to_string(), reason: "name must not be '.' or '..'" });
    }
    Ok(())
}
