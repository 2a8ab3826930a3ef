use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::{container::Container, error::Error, file_object::PathFileObject, location::Location};

/// An output location backed by exactly one writable container. Unlike
/// [`super::package::PackageGroup`], there's no search-path precedence to
/// reason about — there is only ever one place compiled output goes.
///
/// Behaves as a flat, package-shaped output until the first write that
/// names a module: that write lands under a `<module>/`-prefixed
/// subdirectory of the same container, and the module name is remembered so
/// the same location can also be queried as a set of per-module outputs.
#[derive(Debug)]
pub struct OutputGroup {
    location: Location,
    container: Container,
    module_names: Mutex<Vec<String>>,
}

impl OutputGroup {
    pub fn new(location: Location, container: Container) -> Self {
        debug_assert!(
            container.is_writable(),
            "output group for {location:?} must wrap a writable container"
        );
        Self { location, container, module_names: Mutex::new(Vec::new()) }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn get_or_create(&self, relative_path: &Path) -> Result<PathFileObject, Error> {
        self.container.find(relative_path)?.ok_or_else(|| Error::IllegalOperation {
            location: self.location.clone(),
            operation: "get_or_create on a container that refused the name",
        })
    }

    pub fn list(&self, package_path: &Path, recurse: bool) -> Result<Vec<PathFileObject>, Error> {
        self.container.list(package_path, recurse)
    }

    /// Writes (or re-opens) a file under `module_name`'s subdirectory of
    /// this output, spawning that module's inner partition on first use.
    pub fn get_or_create_in_module(&self, module_name: &str, relative_path: &Path) -> Result<PathFileObject, Error> {
        self.record_module(module_name);
        self.get_or_create(&module_relative(module_name, relative_path))
    }

    /// Lists files under `module_name`'s subdirectory of this output,
    /// whether or not that module has been written to yet.
    pub fn list_in_module(
        &self,
        module_name: &str,
        package_path: &Path,
        recurse: bool,
    ) -> Result<Vec<PathFileObject>, Error> {
        self.list(&module_relative(module_name, package_path), recurse)
    }

    /// The modules this output has been written to, in first-write order.
    pub fn module_names(&self) -> Vec<String> {
        self.module_names.lock().clone()
    }

    fn record_module(&self, module_name: &str) {
        let mut names = self.module_names.lock();
        if !names.iter().any(|name| name == module_name) {
            names.push(module_name.to_string());
        }
    }

    pub fn close(&self) -> Result<(), Error> {
        self.container.close()
    }
}

fn module_relative(module_name: &str, relative_path: &Path) -> PathBuf {
    Path::new(module_name).join(relative_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{DirRoot, DirectoryContainer};
    use crate::memfs::MemFs;

    #[test]
    fn get_or_create_returns_a_writable_handle() {
        let fs = MemFs::new();
        let container = Container::Directory(DirectoryContainer::new(DirRoot::Memory(fs), true));
        let group = OutputGroup::new(Location::ClassOutput, container);

        let handle = group.get_or_create(Path::new("pkg/Hello.class")).unwrap();
        handle.write_bytes(b"\xCA\xFE").unwrap();
        assert_eq!(handle.read_bytes().unwrap(), vec![0xCA, 0xFE]);
    }

    #[test]
    fn first_module_write_spawns_an_inner_module_partition() {
        let fs = MemFs::new();
        let container = Container::Directory(DirectoryContainer::new(DirRoot::Memory(fs), true));
        let group = OutputGroup::new(Location::ClassOutput, container);

        group.get_or_create_in_module("m", Path::new("module-info.class")).unwrap().write_bytes(b"\xCA").unwrap();
        group.get_or_create_in_module("m", Path::new("p/C.class")).unwrap().write_bytes(b"\xFE").unwrap();

        assert_eq!(group.module_names(), vec!["m"]);
        let listed = group.list_in_module("m", Path::new(""), true).unwrap();
        assert_eq!(listed.len(), 2);

        let flat = group.get_or_create(Path::new("m/p/C.class")).unwrap();
        assert_eq!(flat.read_bytes().unwrap(), vec![0xFE]);
    }
}
