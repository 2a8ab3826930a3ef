use std::{path::Path, path::PathBuf, sync::Arc};

use walkdir::WalkDir;

use crate::{
    error::Error,
    file_object::{FileBacking, PathFileObject},
    memfs::MemFs,
    support,
};

/// Where a directory container's files actually live.
#[derive(Debug, Clone)]
pub enum DirRoot {
    Disk(PathBuf),
    Memory(Arc<MemFs>),
}

/// A container rooted at a real or in-memory directory tree.
#[derive(Debug)]
pub struct DirectoryContainer {
    root: DirRoot,
    writable: bool,
}

impl DirectoryContainer {
    pub fn new(root: DirRoot, writable: bool) -> Self {
        Self { root, writable }
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn root_url(&self) -> Option<String> {
        match &self.root {
            DirRoot::Disk(path) => Some(format!("file://{}/", path.display())),
            DirRoot::Memory(fs) => Some(format!("memfs://{}/", fs.id())),
        }
    }

    fn make_file_object(&self, relative: PathBuf, kind_hint: Option<&str>) -> PathFileObject {
        let _ = kind_hint;
        let binary_name = support::path_to_binary_name(
            &relative,
            crate::kind::FileKind::from_path(&relative),
        );
        match &self.root {
            DirRoot::Disk(root) => PathFileObject::new(
                relative.clone(),
                binary_name,
                FileBacking::Disk { absolute: root.join(&relative) },
                self.writable,
            ),
            DirRoot::Memory(fs) => PathFileObject::new(
                relative.clone(),
                binary_name,
                FileBacking::Memory { fs: fs.clone(), relative: relative.clone() },
                self.writable,
            ),
        }
    }

    /// Looks up a single relative path. For writable roots, a file that
    /// doesn't exist yet but is a legal name is still returned — this is how
    /// callers obtain a handle to write output into a file that doesn't
    /// exist until `open_write` is called.
    pub fn find(&self, relative_path: &Path) -> Result<Option<PathFileObject>, Error> {
        support::validate_relative_name(&relative_path.to_string_lossy())?;
        let exists = match &self.root {
            DirRoot::Disk(root) => root.join(relative_path).is_file(),
            DirRoot::Memory(fs) => fs.is_file(relative_path),
        };
        if !exists && !self.writable {
            return Ok(None);
        }
        Ok(Some(self.make_file_object(relative_path.to_path_buf(), None)))
    }

    pub fn list(&self, package_path: &Path, recurse: bool) -> Result<Vec<PathFileObject>, Error> {
        let relatives: Vec<PathBuf> = match &self.root {
            DirRoot::Disk(root) => {
                let dir = root.join(package_path);
                if !dir.is_dir() {
                    return Ok(Vec::new());
                }
                let max_depth = if recurse { usize::MAX } else { 1 };
                WalkDir::new(&dir)
                    .min_depth(1)
                    .max_depth(max_depth)
                    .follow_links(recurse)
                    .into_iter()
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_file())
                    .filter_map(|entry| {
                        entry.path().strip_prefix(root).ok().map(|p| p.to_path_buf())
                    })
                    .collect()
            }
            DirRoot::Memory(fs) => fs.list_files(package_path, recurse),
        };
        Ok(relatives.into_iter().map(|rel| self.make_file_object(rel, None)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn disk_container_lists_and_reads() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg/Hello.java"), b"class Hello {}").unwrap();

        let container = DirectoryContainer::new(DirRoot::Disk(dir.path().to_path_buf()), false);
        let found = container.find(Path::new("pkg/Hello.java")).unwrap().unwrap();
        assert_eq!(found.read_to_string().unwrap(), "class Hello {}");
        assert_eq!(found.binary_name(), Some("pkg.Hello"));

        let listed = container.list(Path::new("pkg"), false).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn memory_container_returns_placeholder_for_missing_writable_file() {
        let fs = MemFs::new();
        let container = DirectoryContainer::new(DirRoot::Memory(fs), true);
        let handle = container.find(Path::new("out/Hello.class")).unwrap().unwrap();
        assert!(handle.is_writable());
        handle.write_bytes(b"\xCA\xFE").unwrap();
        assert_eq!(handle.read_bytes().unwrap(), vec![0xCA, 0xFE]);
    }

    #[test]
    fn find_rejects_escaping_names() {
        let fs = MemFs::new();
        let container = DirectoryContainer::new(DirRoot::Memory(fs), true);
        assert!(container.find(Path::new("../evil")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn recursive_listing_follows_symlinked_subtrees() {
        let real = tempfile::tempdir().unwrap();
        fs::create_dir_all(real.path().join("pkg")).unwrap();
        fs::write(real.path().join("pkg/Hello.java"), b"class Hello {}").unwrap();

        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(real.path().join("pkg"), root.path().join("linked")).unwrap();

        let container = DirectoryContainer::new(DirRoot::Disk(root.path().to_path_buf()), false);
        let recursive = container.list(Path::new(""), true).unwrap();
        assert_eq!(recursive.len(), 1);

        let shallow = container.list(Path::new(""), false).unwrap();
        assert!(shallow.is_empty());
    }
}
