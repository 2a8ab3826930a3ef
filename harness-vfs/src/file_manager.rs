//! The file manager: the query surface a compiler provider actually talks
//! to. Everything here is a thin dispatch onto a [`Repository`], plus the
//! open/closed state machine — once closed, every query fails fast with
//! [`Error::FileManagerClosed`] rather than returning stale or empty results
//! silently.

use std::{
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{
    error::Error,
    file_object::PathFileObject,
    group::ClassLoaderHandle,
    kind::FileKind,
    location::{Location, ModuleRef},
    repository::{ContainerRoot, Repository},
    support,
};

/// The query surface a compiler provider talks to, mirroring
/// `javax.tools.JavaFileManager`. Kept as a trait, not just an inherent impl
/// on [`FileManager`], so a provider can be handed an `Arc<dyn
/// JavaFileManager>` without depending on the concrete repository-backed
/// type.
pub trait JavaFileManager: Send + Sync + std::fmt::Debug {
    fn has_location(&self, location: &Location) -> bool;

    fn get_file_for_input(
        &self,
        location: &Location,
        relative_name: &str,
    ) -> Result<Option<PathFileObject>, Error>;

    fn get_file_for_output(
        &self,
        location: &Location,
        relative_name: &str,
    ) -> Result<PathFileObject, Error>;

    fn get_java_file_for_input(
        &self,
        location: &Location,
        binary_name: &str,
        kind: FileKind,
    ) -> Result<Option<PathFileObject>, Error>;

    fn get_java_file_for_output(
        &self,
        location: &Location,
        binary_name: &str,
        kind: FileKind,
    ) -> Result<PathFileObject, Error>;

    /// Like [`get_file_for_output`](Self::get_file_for_output), but the
    /// write targets a specific module of an output location — `module`'s
    /// location must be an output location. Spawns that module's inner
    /// partition of the output on first use.
    fn get_file_for_output_in_module(&self, module: &ModuleRef, relative_name: &str) -> Result<PathFileObject, Error>;

    /// Like [`get_file_for_output_in_module`](Self::get_file_for_output_in_module),
    /// addressed by binary name and kind rather than a raw relative path.
    fn get_java_file_for_output_in_module(
        &self,
        module: &ModuleRef,
        binary_name: &str,
        kind: FileKind,
    ) -> Result<PathFileObject, Error>;

    fn list(
        &self,
        location: &Location,
        package_name: &str,
        kinds: &[FileKind],
        recurse: bool,
    ) -> Result<Vec<PathFileObject>, Error>;

    /// Like [`list`](Self::list), scoped to a single module of a
    /// module-oriented location. Returns an empty list for a module that
    /// isn't registered rather than an error, since "no sources for this
    /// module yet" isn't exceptional.
    fn list_in_module(
        &self,
        module: &ModuleRef,
        package_name: &str,
        kinds: &[FileKind],
        recurse: bool,
    ) -> Result<Vec<PathFileObject>, Error>;

    fn infer_binary_name(&self, location: &Location, file: &PathFileObject) -> Option<String>;

    fn is_same_file(&self, a: &PathFileObject, b: &PathFileObject) -> bool;

    fn contains(&self, location: &Location, file: &PathFileObject) -> Result<bool, Error>;

    fn get_class_loader(&self, location: &Location) -> Option<ClassLoaderHandle>;

    fn list_location_for_modules(&self, location: &Location) -> Result<Vec<ModuleRef>, Error>;

    fn close(&self) -> Result<(), Error>;
}

/// The repository-backed [`JavaFileManager`] implementation every workspace
/// actually constructs. Mutation (`add_path` and friends) takes `&self`,
/// forwarding straight to the repository's own interior-mutable bookkeeping,
/// so a workspace can hand out `Arc<FileManager>` once and keep configuring
/// it right up until it's sealed for a compile.
#[derive(Debug)]
pub struct FileManager {
    repository: Repository,
    closed: AtomicBool,
}

impl FileManager {
    pub fn new(repository: Repository) -> Self {
        Self { repository, closed: AtomicBool::new(false) }
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::Acquire) {
            Err(Error::FileManagerClosed)
        } else {
            Ok(())
        }
    }

    pub fn add_path(&self, location: Location, root: ContainerRoot) -> Result<(), Error> {
        self.check_open()?;
        self.repository.add_path(location, root)
    }

    pub fn set_output(&self, location: Location, root: ContainerRoot) -> Result<(), Error> {
        self.check_open()?;
        self.repository.set_output(location, root)
    }

    pub fn add_module_path(
        &self,
        location: Location,
        module_name: &str,
        root: ContainerRoot,
    ) -> Result<(), Error> {
        self.check_open()?;
        self.repository.add_module_path(location, module_name, root)
    }

    /// Prevents any further registration of containers. Queries remain
    /// valid; only `add_path`/`set_output`/`add_module_path` start failing.
    pub fn seal(&self) {
        self.repository.seal();
    }
}

impl JavaFileManager for FileManager {
    fn has_location(&self, location: &Location) -> bool {
        self.repository.has_location(location)
    }

    fn get_file_for_input(
        &self,
        location: &Location,
        relative_name: &str,
    ) -> Result<Option<PathFileObject>, Error> {
        self.check_open()?;
        support::validate_relative_name(relative_name)?;
        match self.repository.with_package_group(location, |group| group.find(Path::new(relative_name))) {
            Some(result) => result,
            None => Ok(None),
        }
    }

    fn get_file_for_output(
        &self,
        location: &Location,
        relative_name: &str,
    ) -> Result<PathFileObject, Error> {
        self.check_open()?;
        support::validate_relative_name(relative_name)?;
        let path = Path::new(relative_name);
        if let Some(result) = self.repository.with_output_group(location, |group| group.get_or_create(path)) {
            return result;
        }
        match self.repository.with_package_group(location, |group| group.find_for_write(path)) {
            Some(result) => result?.ok_or_else(|| Error::WriteDenied { path: path.to_path_buf() }),
            None => Err(Error::IllegalOperation {
                location: location.clone(),
                operation: "get_file_for_output on a location with no registered group",
            }),
        }
    }

    fn get_java_file_for_input(
        &self,
        location: &Location,
        binary_name: &str,
        kind: FileKind,
    ) -> Result<Option<PathFileObject>, Error> {
        self.check_open()?;
        support::validate_binary_name(binary_name)?;
        let relative = support::binary_name_to_path(binary_name, kind);
        match self.repository.with_package_group(location, |group| group.find(&relative)) {
            Some(result) => result,
            None => Ok(None),
        }
    }

    fn get_java_file_for_output(
        &self,
        location: &Location,
        binary_name: &str,
        kind: FileKind,
    ) -> Result<PathFileObject, Error> {
        self.check_open()?;
        support::validate_binary_name(binary_name)?;
        let relative = support::binary_name_to_path(binary_name, kind);
        self.get_file_for_output(location, &relative.to_string_lossy())
    }

    fn list(
        &self,
        location: &Location,
        package_name: &str,
        kinds: &[FileKind],
        recurse: bool,
    ) -> Result<Vec<PathFileObject>, Error> {
        self.check_open()?;
        let package_path = support::binary_name_to_path(package_name, FileKind::Other);
        let candidates = match self.repository.with_package_group(location, |group| group.list(&package_path, recurse)) {
            Some(result) => result?,
            None => match self.repository.with_output_group(location, |group| group.list(&package_path, recurse)) {
                Some(result) => result?,
                None => Vec::new(),
            },
        };
        Ok(candidates.into_iter().filter(|file| kinds.is_empty() || kinds.contains(&file.kind())).collect())
    }

    fn list_in_module(
        &self,
        module: &ModuleRef,
        package_name: &str,
        kinds: &[FileKind],
        recurse: bool,
    ) -> Result<Vec<PathFileObject>, Error> {
        self.check_open()?;
        let package_path = support::binary_name_to_path(package_name, FileKind::Other);
        let from_module_group = self
            .repository
            .with_module_group(&module.location, |modules| {
                modules.module(&module.name).map(|pkg| pkg.list(&package_path, recurse))
            })
            .flatten()
            .transpose()?;
        let candidates = match from_module_group {
            Some(found) => found,
            None => self
                .repository
                .with_output_group(&module.location, |group| group.list_in_module(&module.name, &package_path, recurse))
                .transpose()?
                .unwrap_or_default(),
        };
        Ok(candidates.into_iter().filter(|file| kinds.is_empty() || kinds.contains(&file.kind())).collect())
    }

    fn get_file_for_output_in_module(&self, module: &ModuleRef, relative_name: &str) -> Result<PathFileObject, Error> {
        self.check_open()?;
        support::validate_relative_name(relative_name)?;
        let path = Path::new(relative_name);
        self.repository
            .with_output_group(&module.location, |group| group.get_or_create_in_module(&module.name, path))
            .unwrap_or_else(|| {
                Err(Error::IllegalOperation {
                    location: module.location.clone(),
                    operation: "get_file_for_output_in_module on a non-output location",
                })
            })
    }

    fn get_java_file_for_output_in_module(
        &self,
        module: &ModuleRef,
        binary_name: &str,
        kind: FileKind,
    ) -> Result<PathFileObject, Error> {
        self.check_open()?;
        support::validate_binary_name(binary_name)?;
        let relative = support::binary_name_to_path(binary_name, kind);
        self.get_file_for_output_in_module(module, &relative.to_string_lossy())
    }

    fn infer_binary_name(&self, location: &Location, file: &PathFileObject) -> Option<String> {
        let _ = location;
        file.binary_name().map(str::to_string)
    }

    fn is_same_file(&self, a: &PathFileObject, b: &PathFileObject) -> bool {
        a.uri() == b.uri()
    }

    fn contains(&self, location: &Location, file: &PathFileObject) -> Result<bool, Error> {
        self.check_open()?;
        let found = self.get_file_for_input(location, &file.relative_path().to_string_lossy())?;
        Ok(found.map(|f| self.is_same_file(&f, file)).unwrap_or(false))
    }

    fn get_class_loader(&self, location: &Location) -> Option<ClassLoaderHandle> {
        self.repository.with_package_group(location, |group| group.class_loader().clone())
    }

    fn list_location_for_modules(&self, location: &Location) -> Result<Vec<ModuleRef>, Error> {
        self.check_open()?;
        if let Some(names) = self.repository.with_output_group(location, |group| group.module_names()) {
            return Ok(names.into_iter().map(|name| ModuleRef::new(location.clone(), name)).collect());
        }
        if !location.is_module_oriented() {
            return Err(Error::IllegalOperation {
                location: location.clone(),
                operation: "list_location_for_modules on a non-module-oriented location",
            });
        }
        Ok(self
            .repository
            .with_module_group(location, |modules| {
                modules.module_names().map(|name| ModuleRef::new(location.clone(), name)).collect()
            })
            .unwrap_or_default())
    }

    fn close(&self) -> Result<(), Error> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.repository.close()
    }
}
