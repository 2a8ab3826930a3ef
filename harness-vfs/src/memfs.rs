//! A minimal in-memory file system used as the "RAM-disk" path root variant.
//!
//! Entries are keyed by their path relative to the instance's root; there is
//! no notion of a working directory or symlinks. This is deliberately a
//! much smaller surface than a real file system — just enough to back a
//! directory container: create directories, write/read/remove files, and
//! list children.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::SystemTime,
};

use parking_lot::Mutex;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
enum MemEntry {
    File { contents: Vec<u8>, modified: SystemTime },
    Dir,
}

/// An isolated, in-memory directory tree. Each instance gets a unique id so
/// that file objects backed by it can produce a stable `memfs:<id>/...` URI,
/// distinguishable from every other in-memory root in the same process.
#[derive(Debug)]
pub struct MemFs {
    id: u64,
    entries: Mutex<HashMap<PathBuf, MemEntry>>,
}

impl MemFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            entries: Mutex::new(HashMap::from([(PathBuf::new(), MemEntry::Dir)])),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    fn ancestors_of(path: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            out.push(current.clone());
        }
        out.pop(); // exclude the path itself, only ancestors
        out
    }

    pub fn create_dir_all(&self, rel: &Path) -> io::Result<()> {
        let mut entries = self.entries.lock();
        for ancestor in Self::ancestors_of(rel).into_iter().chain(std::iter::once(rel.to_path_buf()))
        {
            match entries.get(&ancestor) {
                Some(MemEntry::Dir) => {}
                Some(MemEntry::File { .. }) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} exists and is not a directory", ancestor.display()),
                    ));
                }
                None => {
                    entries.insert(ancestor, MemEntry::Dir);
                }
            }
        }
        Ok(())
    }

    pub fn write(&self, rel: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(parent) = rel.parent() {
            self.create_dir_all(parent)?;
        }
        self.entries.lock().insert(
            rel.to_path_buf(),
            MemEntry::File { contents: contents.to_vec(), modified: SystemTime::now() },
        );
        Ok(())
    }

    pub fn read(&self, rel: &Path) -> io::Result<Vec<u8>> {
        match self.entries.lock().get(rel) {
            Some(MemEntry::File { contents, .. }) => Ok(contents.clone()),
            Some(MemEntry::Dir) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", rel.display()),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", rel.display()),
            )),
        }
    }

    pub fn exists(&self, rel: &Path) -> bool {
        self.entries.lock().contains_key(rel)
    }

    pub fn is_dir(&self, rel: &Path) -> bool {
        matches!(self.entries.lock().get(rel), Some(MemEntry::Dir))
    }

    pub fn is_file(&self, rel: &Path) -> bool {
        matches!(self.entries.lock().get(rel), Some(MemEntry::File { .. }))
    }

    /// Best-effort removal; returns whether an entry existed and was
    /// removed. IO-shaped errors here are the caller's problem to swallow,
    /// matching the file object's `delete()` contract.
    pub fn remove(&self, rel: &Path) -> bool {
        self.entries.lock().remove(rel).is_some()
    }

    pub fn last_modified(&self, rel: &Path) -> Option<SystemTime> {
        match self.entries.lock().get(rel) {
            Some(MemEntry::File { modified, .. }) => Some(*modified),
            _ => None,
        }
    }

    /// Lists file entries rooted at `rel`. `recurse = false` restricts to
    /// direct children; `recurse = true` walks the whole subtree.
    pub fn list_files(&self, rel: &Path, recurse: bool) -> Vec<PathBuf> {
        let entries = self.entries.lock();
        entries
            .iter()
            .filter_map(|(path, entry)| {
                if !matches!(entry, MemEntry::File { .. }) {
                    return None;
                }
                let relative_to_dir = path.strip_prefix(rel).ok()?;
                if relative_to_dir.as_os_str().is_empty() {
                    return None;
                }
                if !recurse && relative_to_dir.components().count() > 1 {
                    return None;
                }
                Some(path.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let fs = MemFs::new();
        fs.write(Path::new("pkg/Hello.java"), b"class Hello {}").unwrap();
        assert_eq!(fs.read(Path::new("pkg/Hello.java")).unwrap(), b"class Hello {}");
        assert!(fs.is_dir(Path::new("pkg")));
    }

    #[test]
    fn list_files_respects_recurse_flag() {
        let fs = MemFs::new();
        fs.write(Path::new("a/One.class"), b"1").unwrap();
        fs.write(Path::new("a/b/Two.class"), b"2").unwrap();

        let shallow = fs.list_files(Path::new("a"), false);
        assert_eq!(shallow, vec![PathBuf::from("a/One.class")]);

        let mut deep = fs.list_files(Path::new("a"), true);
        deep.sort();
        assert_eq!(deep, vec![PathBuf::from("a/One.class"), PathBuf::from("a/b/Two.class")]);
    }

    #[test]
    fn remove_is_best_effort() {
        let fs = MemFs::new();
        assert!(!fs.remove(Path::new("nope")));
        fs.write(Path::new("x"), b"y").unwrap();
        assert!(fs.remove(Path::new("x")));
        assert!(!fs.exists(Path::new("x")));
    }

    #[test]
    fn distinct_instances_get_distinct_ids() {
        let a = MemFs::new();
        let b = MemFs::new();
        assert_ne!(a.id(), b.id());
    }
}
