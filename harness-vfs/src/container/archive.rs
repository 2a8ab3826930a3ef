use std::{
    collections::HashMap,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{error::Error, file_object::{FileBacking, PathFileObject}, kind::FileKind, support};

/// A read-only container backed by a jar/zip file. Entries are decompressed
/// once, at construction time, rather than re-reading the archive on every
/// `find`/`list` call — a real jar is small enough for a test fixture that
/// this trades a little memory for much simpler container code.
#[derive(Debug)]
pub struct ArchiveContainer {
    source: PathBuf,
    entries: HashMap<PathBuf, Arc<[u8]>>,
}

impl ArchiveContainer {
    pub fn open(source: impl Into<PathBuf>) -> Result<Self, Error> {
        let source = source.into();
        let file = std::fs::File::open(&source).map_err(|e| Error::io(e, source.clone()))?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| {
            Error::io(std::io::Error::new(std::io::ErrorKind::InvalidData, e), source.clone())
        })?;

        let mut entries = HashMap::new();
        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| Error::io(std::io::Error::new(std::io::ErrorKind::InvalidData, e), source.clone()))?;
            if entry.is_dir() {
                continue;
            }
            let name = PathBuf::from(entry.name());
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes).map_err(|e| Error::io(e, source.clone()))?;
            entries.insert(name, Arc::from(bytes));
        }

        Ok(Self { source, entries })
    }

    pub fn source_url(&self) -> String {
        format!("jar:file://{}!/", self.source.display())
    }

    pub fn find(&self, relative_path: &Path) -> Option<PathFileObject> {
        let bytes = self.entries.get(relative_path)?.clone();
        let binary_name =
            support::path_to_binary_name(relative_path, FileKind::from_path(relative_path));
        Some(PathFileObject::new(
            relative_path.to_path_buf(),
            binary_name,
            FileBacking::Archive { bytes },
            false,
        ))
    }

    pub fn list(&self, package_path: &Path, recurse: bool) -> Vec<PathFileObject> {
        self.entries
            .iter()
            .filter_map(|(path, bytes)| {
                let relative_to_dir = path.strip_prefix(package_path).ok()?;
                if relative_to_dir.as_os_str().is_empty() {
                    return None;
                }
                if !recurse && relative_to_dir.components().count() > 1 {
                    return None;
                }
                let binary_name = support::path_to_binary_name(path, FileKind::from_path(path));
                Some(PathFileObject::new(
                    path.clone(),
                    binary_name,
                    FileBacking::Archive { bytes: bytes.clone() },
                    false,
                ))
            })
            .collect()
    }
}
