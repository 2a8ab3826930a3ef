//! [`PathFileObject`], the harness's analogue of a `JavaFileObject`: a single
//! readable (and sometimes writable) file, backed by real disk, the
//! in-memory file system, or bytes pulled out of an archive at scan time.

use std::{
    fmt,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::{error::Error, kind::FileKind, memfs::MemFs};

const PATH_SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'?').add(b'#').add(b'%');

/// Where a file object's bytes actually live.
#[derive(Clone)]
pub(crate) enum FileBacking {
    Disk { absolute: PathBuf },
    Memory { fs: Arc<MemFs>, relative: PathBuf },
    /// Bytes pulled out of an archive entry when the container was scanned.
    /// Archive containers are always read-only, so this variant never
    /// accepts writes.
    Archive { bytes: Arc<[u8]> },
}

impl fmt::Debug for FileBacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disk { absolute } => f.debug_struct("Disk").field("absolute", absolute).finish(),
            Self::Memory { relative, .. } => {
                f.debug_struct("Memory").field("relative", relative).finish()
            }
            Self::Archive { bytes } => {
                f.debug_struct("Archive").field("len", &bytes.len()).finish()
            }
        }
    }
}

/// A single file reachable through the harness, with enough identity
/// (relative path, inferred binary name, kind) to answer the file-manager
/// queries a compiler provider makes without reaching back into its
/// container.
#[derive(Debug, Clone)]
pub struct PathFileObject {
    relative_path: PathBuf,
    binary_name: Option<String>,
    kind: FileKind,
    backing: FileBacking,
    writable: bool,
}

impl PathFileObject {
    pub(crate) fn new(
        relative_path: PathBuf,
        binary_name: Option<String>,
        backing: FileBacking,
        writable: bool,
    ) -> Self {
        let kind = FileKind::from_path(&relative_path);
        Self { relative_path, binary_name, kind, backing, writable }
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn binary_name(&self) -> Option<&str> {
        self.binary_name.as_deref()
    }

    pub fn is_writable(&self) -> bool {
        self.writable && !matches!(self.backing, FileBacking::Archive { .. })
    }

    /// A simple-name/kind compatibility check, mirroring the rule that a
    /// requested `Foo` of kind `Source` only matches `Foo.java`, not
    /// `FooBar.java` or `Foo.class`.
    pub fn is_name_compatible(&self, simple_name: &str, kind: FileKind) -> bool {
        if self.kind != kind {
            return false;
        }
        self.relative_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|stem| stem == simple_name)
            .unwrap_or(false)
    }

    /// A stable, scheme-qualified identifier for this file, suitable for
    /// diagnostics and logging. Disk files get a `file:` URI, in-memory
    /// files a synthetic `memfs:` one keyed by the backing instance, and
    /// archive entries an opaque `jar:entry:` tag since they have no
    /// independent location on disk.
    pub fn uri(&self) -> String {
        match &self.backing {
            FileBacking::Disk { absolute } => format!("file://{}", absolute.display()),
            FileBacking::Memory { fs, relative } => {
                format!("memfs://{}/{}", fs.id(), encode_path(relative))
            }
            FileBacking::Archive { .. } => format!("jar:entry:{}", self.relative_path.display()),
        }
    }

    pub fn open_read(&self) -> Result<Box<dyn Read + Send>, Error> {
        match &self.backing {
            FileBacking::Disk { absolute } => {
                let file = std::fs::File::open(absolute)
                    .map_err(|e| Error::io(e, absolute.clone()))?;
                Ok(Box::new(file))
            }
            FileBacking::Memory { fs, relative } => {
                let bytes = fs
                    .read(relative)
                    .map_err(|e| Error::io(e, self.relative_path.clone()))?;
                Ok(Box::new(io::Cursor::new(bytes)))
            }
            FileBacking::Archive { bytes } => Ok(Box::new(io::Cursor::new(bytes.clone()))),
        }
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        self.open_read()?.read_to_end(&mut buf).map_err(|e| Error::io(e, self.relative_path.clone()))?;
        Ok(buf)
    }

    /// Strict UTF-8 decode: any malformed byte is reported as an error.
    /// Equivalent to `read_to_string_lossy(false)`.
    pub fn read_to_string(&self) -> Result<String, Error> {
        self.read_to_string_lossy(false)
    }

    /// Decodes this file's bytes as UTF-8 text. With `ignore_errors` set,
    /// malformed sequences are silently replaced with U+FFFD rather than
    /// reported, mirroring `javax.tools`'s ignore-encoding-errors flag on a
    /// compiler task.
    pub fn read_to_string_lossy(&self, ignore_errors: bool) -> Result<String, Error> {
        let bytes = self.read_bytes()?;
        if ignore_errors {
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }
        String::from_utf8(bytes).map_err(|e| {
            Error::io(
                io::Error::new(io::ErrorKind::InvalidData, e),
                self.relative_path.clone(),
            )
        })
    }

    /// Opens a streaming writer. Buffers in memory and commits on
    /// [`Write::flush`]/drop, matching the "content becomes visible once the
    /// writer is closed" contract compiler providers expect from
    /// `JavaFileObject.openOutputStream()`.
    pub fn open_write(&self) -> Result<Box<dyn Write + Send>, Error> {
        if !self.is_writable() {
            return Err(Error::WriteDenied { path: self.relative_path.clone() });
        }
        match &self.backing {
            FileBacking::Disk { absolute } => {
                if let Some(parent) = absolute.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| Error::io(e, parent.to_path_buf()))?;
                }
                let file = std::fs::File::create(absolute)
                    .map_err(|e| Error::io(e, absolute.clone()))?;
                Ok(Box::new(file))
            }
            FileBacking::Memory { fs, relative } => {
                Ok(Box::new(MemFileWriter { fs: fs.clone(), relative: relative.clone(), buf: Vec::new() }))
            }
            FileBacking::Archive { .. } => unreachable!("is_writable() excludes archive backings"),
        }
    }

    pub fn write_bytes(&self, contents: &[u8]) -> Result<(), Error> {
        let mut writer = self.open_write()?;
        writer.write_all(contents).map_err(|e| Error::io(e, self.relative_path.clone()))?;
        writer.flush().map_err(|e| Error::io(e, self.relative_path.clone()))
    }

    pub fn write_str(&self, contents: &str) -> Result<(), Error> {
        self.write_bytes(contents.as_bytes())
    }

    /// Best-effort delete; non-existence is not an error. Returns whether
    /// something was actually removed.
    pub fn delete(&self) -> Result<bool, Error> {
        match &self.backing {
            FileBacking::Disk { absolute } => match std::fs::remove_file(absolute) {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(Error::io(e, absolute.clone())),
            },
            FileBacking::Memory { fs, relative } => Ok(fs.remove(relative)),
            FileBacking::Archive { .. } => {
                Err(Error::WriteDenied { path: self.relative_path.clone() })
            }
        }
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        match &self.backing {
            FileBacking::Disk { absolute } => {
                std::fs::metadata(absolute).and_then(|m| m.modified()).ok()
            }
            FileBacking::Memory { fs, relative } => fs.last_modified(relative),
            FileBacking::Archive { .. } => None,
        }
    }
}

fn encode_path(path: &Path) -> String {
    path.components()
        .map(|c| utf8_percent_encode(&c.as_os_str().to_string_lossy(), PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

struct MemFileWriter {
    fs: Arc<MemFs>,
    relative: PathBuf,
    buf: Vec<u8>,
}

impl Write for MemFileWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.fs.write(&self.relative, &self.buf)
    }
}

impl Drop for MemFileWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip_via_open_write_and_open_read() {
        let fs = MemFs::new();
        let file = PathFileObject::new(
            PathBuf::from("pkg/Hello.java"),
            Some("pkg.Hello".to_string()),
            FileBacking::Memory { fs: fs.clone(), relative: PathBuf::from("pkg/Hello.java") },
            true,
        );
        file.write_str("class Hello {}").unwrap();
        assert_eq!(file.read_to_string().unwrap(), "class Hello {}");
        assert!(file.uri().starts_with("memfs://"));
    }

    #[test]
    fn archive_backed_file_rejects_writes() {
        let file = PathFileObject::new(
            PathBuf::from("pkg/Hello.class"),
            Some("pkg.Hello".to_string()),
            FileBacking::Archive { bytes: Arc::from(vec![0xCA, 0xFE]) },
            true,
        );
        assert!(!file.is_writable());
        assert!(file.open_write().is_err());
        assert_eq!(file.read_bytes().unwrap(), vec![0xCA, 0xFE]);
    }

    #[test]
    fn malformed_utf8_errors_by_default_but_substitutes_when_ignored() {
        let fs = MemFs::new();
        let file = PathFileObject::new(
            PathBuf::from("pkg/Bad.java"),
            Some("pkg.Bad".to_string()),
            FileBacking::Memory { fs: fs.clone(), relative: PathBuf::from("pkg/Bad.java") },
            true,
        );
        file.write_bytes(b"class Bad { /* \xFF */ }").unwrap();

        assert!(file.read_to_string().is_err());
        assert!(file.read_to_string_lossy(true).unwrap().contains('\u{FFFD}'));
    }

    #[test]
    fn name_compatibility_checks_stem_and_kind() {
        let file = PathFileObject::new(
            PathBuf::from("pkg/Hello.java"),
            None,
            FileBacking::Disk { absolute: PathBuf::from("/tmp/pkg/Hello.java") },
            false,
        );
        assert!(file.is_name_compatible("Hello", FileKind::Source));
        assert!(!file.is_name_compatible("Hello", FileKind::Class));
        assert!(!file.is_name_compatible("World", FileKind::Source));
    }
}
