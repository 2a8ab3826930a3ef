use std::{path::Path, sync::OnceLock};

use crate::{
    container::Container,
    error::Error,
    file_object::PathFileObject,
    location::Location,
};

/// The class loader a `PackageGroup` would hand back to a compiler provider:
/// just the ordered list of container root URLs a real `URLClassLoader`
/// would have been constructed from. Built lazily and memoized — a caller
/// that never asks for a class loader never pays even that cost.
#[derive(Debug, Clone)]
pub struct ClassLoaderHandle {
    pub urls: Vec<String>,
}

/// An ordered search path of containers backing a single non-module
/// location (e.g. the class path). Lookups search containers in order and
/// return the first match, mirroring classpath precedence.
///
/// When `target_release` is set, lookups first probe each container's
/// `META-INF/versions/<release>/<path>` overlay before falling back to the
/// plain path, the same precedence a multi-release jar's class loader
/// gives its version-specific entries. Unset, this is a no-op.
#[derive(Debug)]
pub struct PackageGroup {
    location: Location,
    containers: Vec<Container>,
    class_loader: OnceLock<ClassLoaderHandle>,
    target_release: Option<u16>,
}

impl PackageGroup {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            containers: Vec::new(),
            class_loader: OnceLock::new(),
            target_release: None,
        }
    }

    pub fn with_target_release(mut self, target_release: Option<u16>) -> Self {
        self.target_release = target_release;
        self
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn add_container(&mut self, container: Container) {
        self.containers.push(container);
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn find(&self, relative_path: &Path) -> Result<Option<PathFileObject>, Error> {
        if let Some(release) = self.target_release {
            let overlay = Path::new("META-INF")
                .join("versions")
                .join(release.to_string())
                .join(relative_path);
            for container in &self.containers {
                if let Some(found) = container.find(&overlay)? {
                    return Ok(Some(found));
                }
            }
        }
        for container in &self.containers {
            if let Some(found) = container.find(relative_path)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Like [`find`](Self::find), but only ever returns a handle from a
    /// writable container — the first one registered, matching "output
    /// locations write to their primary root".
    pub fn find_for_write(&self, relative_path: &Path) -> Result<Option<PathFileObject>, Error> {
        for container in &self.containers {
            if !container.is_writable() {
                continue;
            }
            if let Some(found) = container.find(relative_path)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    pub fn list(&self, package_path: &Path, recurse: bool) -> Result<Vec<PathFileObject>, Error> {
        let mut out = Vec::new();
        for container in &self.containers {
            out.extend(container.list(package_path, recurse)?);
        }
        Ok(out)
    }

    pub fn get_class_bytes(&self, binary_name: &str) -> Result<Vec<u8>, Error> {
        let relative = crate::support::binary_name_to_path(binary_name, crate::kind::FileKind::Class);
        match self.find(&relative)? {
            Some(file) => file.read_bytes(),
            None => Err(Error::ClassMissing {
                binary_name: binary_name.to_string(),
                location: self.location.clone(),
            }),
        }
    }

    /// Builds (once) and returns this group's class loader handle.
    pub fn class_loader(&self) -> &ClassLoaderHandle {
        self.class_loader.get_or_init(|| ClassLoaderHandle {
            urls: self.containers.iter().filter_map(|c| c.root_url()).collect(),
        })
    }

    pub fn close(&self) -> Result<(), Error> {
        let causes: Vec<(Location, Error)> = self
            .containers
            .iter()
            .filter_map(|c| c.close().err().map(|e| (self.location.clone(), e)))
            .collect();
        if causes.is_empty() {
            Ok(())
        } else {
            Err(Error::GroupCloseFailed { causes })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{DirRoot, DirectoryContainer};
    use crate::memfs::MemFs;

    #[test]
    fn earlier_containers_shadow_later_ones() {
        let mut group = PackageGroup::new(Location::ClassPath);

        let first = MemFs::new();
        first.write(Path::new("pkg/Hello.class"), b"first").unwrap();
        group.add_container(Container::Directory(DirectoryContainer::new(
            DirRoot::Memory(first),
            false,
        )));

        let second = MemFs::new();
        second.write(Path::new("pkg/Hello.class"), b"second").unwrap();
        group.add_container(Container::Directory(DirectoryContainer::new(
            DirRoot::Memory(second),
            false,
        )));

        let bytes = group.get_class_bytes("pkg.Hello").unwrap();
        assert_eq!(bytes, b"first");
    }

    #[test]
    fn class_loader_is_memoized_and_reflects_containers() {
        let mut group = PackageGroup::new(Location::ClassPath);
        let fs = MemFs::new();
        group.add_container(Container::Directory(DirectoryContainer::new(DirRoot::Memory(fs), false)));

        let first = group.class_loader();
        let second = group.class_loader();
        assert_eq!(first.urls, second.urls);
        assert_eq!(first.urls.len(), 1);
    }

    #[test]
    fn missing_class_is_an_error_not_a_panic() {
        let group = PackageGroup::new(Location::ClassPath);
        assert!(matches!(
            group.get_class_bytes("nope.Nothing"),
            Err(Error::ClassMissing { .. })
        ));
    }

    #[test]
    fn target_release_overlay_shadows_the_base_entry() {
        let fs = MemFs::new();
        fs.write(Path::new("pkg/Hello.class"), b"base").unwrap();
        fs.write(Path::new("META-INF/versions/17/pkg/Hello.class"), b"java17").unwrap();

        let mut group = PackageGroup::new(Location::ClassPath).with_target_release(Some(17));
        group.add_container(Container::Directory(DirectoryContainer::new(DirRoot::Memory(fs), false)));

        assert_eq!(group.get_class_bytes("pkg.Hello").unwrap(), b"java17");
    }

    #[test]
    fn no_target_release_means_overlay_is_ignored() {
        let fs = MemFs::new();
        fs.write(Path::new("pkg/Hello.class"), b"base").unwrap();
        fs.write(Path::new("META-INF/versions/17/pkg/Hello.class"), b"java17").unwrap();

        let mut group = PackageGroup::new(Location::ClassPath);
        group.add_container(Container::Directory(DirectoryContainer::new(DirRoot::Memory(fs), false)));

        assert_eq!(group.get_class_bytes("pkg.Hello").unwrap(), b"base");
    }
}
