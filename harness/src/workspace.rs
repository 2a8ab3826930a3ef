//! The workspace: owns every path root a test creates and the file manager
//! built on top of them, and is the single thing a test closes when it's
//! done.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use harness_diagnostics::{DiagnosticListener, SharedListener, TracingDiagnosticListener};
use harness_vfs::{FileManager, JavaFileManager, Location, Repository};

use crate::{
    error::Error,
    root::{validate_directory_name, PathRootEntry, RootId, RootStrategy},
};

/// Lifecycle container for everything a compile needs: path roots, the
/// repository/file manager built on top of them, and the diagnostic
/// listener every compile reports into.
pub struct Workspace {
    roots: Vec<Option<PathRootEntry>>,
    file_manager: Arc<FileManager>,
    diagnostics: SharedListener,
    default_strategy: RootStrategy,
    closed: AtomicBool,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_strategy(RootStrategy::TempDisk)
    }

    /// Like [`Workspace::new`], but the default root strategy comes from
    /// `HARNESS_ROOT_STRATEGY` rather than always being temp-disk. Kept
    /// separate so a test that wants full hermeticity never accidentally
    /// picks it up.
    pub fn from_env() -> Self {
        Self::with_strategy(RootStrategy::from_env())
    }

    pub fn with_strategy(default_strategy: RootStrategy) -> Self {
        Self {
            roots: Vec::new(),
            file_manager: Arc::new(FileManager::new(Repository::new())),
            diagnostics: Arc::new(TracingDiagnosticListener::new()),
            default_strategy,
            closed: AtomicBool::new(false),
        }
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::Acquire) {
            Err(Error::WorkspaceClosed)
        } else {
            Ok(())
        }
    }

    fn allocate_root(&mut self, strategy: RootStrategy) -> Result<RootId, Error> {
        let entry = match strategy {
            RootStrategy::TempDisk => {
                let dir = tempfile::tempdir().map_err(|e| Error::Vfs(harness_vfs::Error::io(e, PathBuf::new())))?;
                PathRootEntry::TempDisk(dir)
            }
            RootStrategy::Memory => PathRootEntry::InMemory(harness_vfs::MemFs::new()),
        };
        let id = RootId(self.roots.len());
        self.roots.push(Some(entry));
        Ok(id)
    }

    fn entry(&self, id: RootId) -> Result<&PathRootEntry, Error> {
        self.roots.get(id.0).and_then(|slot| slot.as_ref()).ok_or(Error::WorkspaceClosed)
    }

    /// Creates a new managed directory root and attaches it to `location`.
    pub fn create_package(&mut self, location: Location) -> Result<RootId, Error> {
        self.check_open()?;
        let id = self.allocate_root(self.default_strategy)?;
        self.file_manager.add_path(location, self.entry(id)?.to_container_root(true))?;
        Ok(id)
    }

    /// Like [`create_package`](Self::create_package), attached instead to
    /// `(location, module_name)`.
    pub fn create_module(&mut self, location: Location, module_name: &str) -> Result<RootId, Error> {
        self.check_open()?;
        let id = self.allocate_root(self.default_strategy)?;
        self.file_manager.add_module_path(location, module_name, self.entry(id)?.to_container_root(true))?;
        Ok(id)
    }

    /// Attaches an externally owned path (a real directory or a `.jar`) to
    /// `location`. The path is never deleted when the workspace closes.
    pub fn add_path(&mut self, location: Location, external_path: impl Into<PathBuf>) -> Result<RootId, Error> {
        self.check_open()?;
        let entry = PathRootEntry::Wrapping(external_path.into());
        let container_root = entry.to_container_root(false);
        let id = RootId(self.roots.len());
        self.roots.push(Some(entry));
        self.file_manager.add_path(location, container_root)?;
        Ok(id)
    }

    /// Creates and attaches the single writable root backing an output
    /// location, defaulting to the workspace's root strategy.
    pub fn set_output(&mut self, location: Location, strategy: Option<RootStrategy>) -> Result<RootId, Error> {
        self.check_open()?;
        let id = self.allocate_root(strategy.unwrap_or(self.default_strategy))?;
        self.file_manager.set_output(location, self.entry(id)?.to_container_root(true))?;
        Ok(id)
    }

    /// Creates a subdirectory inside `root_id` — a no-op if it already
    /// exists.
    pub fn create_directory(&self, root_id: RootId, relative: &Path) -> Result<(), Error> {
        self.check_open()?;
        let name = relative.to_string_lossy();
        for segment in relative.components().filter_map(|c| c.as_os_str().to_str()) {
            validate_directory_name(segment)?;
        }
        let entry = self.entry(root_id)?;
        match entry.mem_fs() {
            Some(fs) => fs.create_dir_all(relative).map_err(|e| Error::Vfs(harness_vfs::Error::io(e, relative.to_path_buf())))?,
            None => {
                let base = entry.base_path().expect("non-memory root has a base path");
                std::fs::create_dir_all(base.join(relative))
                    .map_err(|e| Error::Vfs(harness_vfs::Error::io(e, relative.to_path_buf())))?;
            }
        }
        log::debug!(target: "workspace", "created directory {name} under {root_id}");
        Ok(())
    }

    /// Writes `contents` to `relative` inside `root_id`, creating parent
    /// directories as needed.
    pub fn create_file(&self, root_id: RootId, relative: &Path, contents: &[u8]) -> Result<(), Error> {
        self.check_open()?;
        let entry = self.entry(root_id)?;
        match entry.mem_fs() {
            Some(fs) => fs.write(relative, contents).map_err(|e| Error::Vfs(harness_vfs::Error::io(e, relative.to_path_buf())))?,
            None => {
                let base = entry.base_path().expect("non-memory root has a base path");
                let absolute = base.join(relative);
                if let Some(parent) = absolute.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| Error::Vfs(harness_vfs::Error::io(e, parent.to_path_buf())))?;
                }
                std::fs::write(&absolute, contents).map_err(|e| Error::Vfs(harness_vfs::Error::io(e, absolute)))?;
            }
        }
        Ok(())
    }

    /// Recursively copies every file under `source_dir` into `root_id`,
    /// preserving relative structure. Returns the number of files copied.
    pub fn copy_tree_from(&self, root_id: RootId, source_dir: &Path) -> Result<usize, Error> {
        self.check_open()?;
        let mut count = 0;
        for entry in walkdir::WalkDir::new(source_dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(source_dir).expect("walkdir yields paths under its root");
            let contents = std::fs::read(entry.path()).map_err(|e| Error::Vfs(harness_vfs::Error::io(e, entry.path().to_path_buf())))?;
            self.create_file(root_id, relative, &contents)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn file_manager(&self) -> Arc<FileManager> {
        self.file_manager.clone()
    }

    pub fn file_manager_handle(&self) -> Arc<dyn JavaFileManager> {
        self.file_manager.clone()
    }

    pub fn diagnostics(&self) -> SharedListener {
        self.diagnostics.clone()
    }

    pub(crate) fn diagnostics_handle(&self) -> Arc<dyn DiagnosticListener> {
        self.diagnostics.clone()
    }

    /// Closes every owned root in reverse insertion order, aggregating any
    /// release failures rather than stopping at the first one. Idempotent:
    /// closing twice is a no-op on the second call.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.file_manager.close()?;

        let roots = std::mem::take(&mut self.roots);
        let mut causes = Vec::new();
        for (index, slot) in roots.into_iter().enumerate().rev() {
            let Some(entry) = slot else { continue };
            let id = RootId(index);
            log::debug!(target: "workspace", "releasing {id}");
            if let Err(e) = entry.release() {
                log::warn!(target: "workspace", "failed to release {id}: {e}");
                causes.push((id, e));
            }
        }

        if causes.is_empty() {
            Ok(())
        } else {
            Err(Error::WorkspaceCloseFailed { causes })
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::Acquire) {
            if let Err(e) = self.close() {
                log::warn!(target: "workspace", "workspace dropped without a clean close: {e}");
            }
        }
    }
}
