//! The repository maps each [`Location`] to the container group backing it,
//! and is the thing a file manager actually queries.
//!
//! Mutation goes through a `RwLock`, not `&mut self`: once a workspace hands
//! its file manager to a compiler provider, the provider may be asked to
//! resolve locations from worker threads of its own, so every query here
//! has to be callable concurrently through a shared reference. A `sealed`
//! flag, checked at the top of every mutating method, enforces "no more
//! registering containers once the compile has started" without needing an
//! `&mut self` the provider could never have gotten anyway.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{
    container::{ArchiveContainer, Container, DirRoot, DirectoryContainer},
    error::Error,
    group::{ContainerGroup, ModuleGroup, OutputGroup, PackageGroup},
    location::Location,
    memfs::MemFs,
    module_discoverer,
};

/// `Location -> ContainerGroup`, but remembering insertion order so `close()`
/// can release containers in the order they were registered — the same
/// `Vec` + index pattern [`ModuleGroup`] uses for its own per-module entries,
/// applied one level up.
#[derive(Debug, Default)]
struct OrderedGroups {
    order: Vec<Location>,
    entries: FxHashMap<Location, ContainerGroup>,
}

impl OrderedGroups {
    fn get_or_insert_with(&mut self, location: Location, make: impl FnOnce() -> ContainerGroup) -> &mut ContainerGroup {
        if !self.entries.contains_key(&location) {
            self.order.push(location.clone());
            self.entries.insert(location.clone(), make());
        }
        self.entries.get_mut(&location).expect("just inserted above")
    }

    fn insert(&mut self, location: Location, group: ContainerGroup) {
        if !self.entries.contains_key(&location) {
            self.order.push(location.clone());
        }
        self.entries.insert(location, group);
    }

    fn get(&self, location: &Location) -> Option<&ContainerGroup> {
        self.entries.get(location)
    }

    fn locations(&self) -> impl Iterator<Item = &Location> {
        self.order.iter()
    }

    fn values_in_order(&self) -> impl Iterator<Item = &ContainerGroup> {
        self.order.iter().filter_map(move |loc| self.entries.get(loc))
    }
}

/// Where a container's bytes should come from when it's added to a
/// repository. This is the harness-vfs-local notion of a "root"; a
/// workspace that owns a slab of path roots translates its own root
/// handles into these before calling [`Repository::add_path`].
#[derive(Debug, Clone)]
pub enum ContainerRoot {
    Disk { path: std::path::PathBuf, writable: bool },
    Memory { fs: Arc<MemFs>, writable: bool },
    Archive { path: std::path::PathBuf },
}

#[derive(Debug)]
pub struct Repository {
    groups: RwLock<OrderedGroups>,
    target_release: RwLock<Option<u16>>,
    sealed: AtomicBool,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(OrderedGroups::default()),
            target_release: RwLock::new(None),
            sealed: AtomicBool::new(false),
        }
    }

    /// Sets the multi-release overlay release number applied to every
    /// package group added from here on. Does not retroactively affect
    /// groups created earlier.
    pub fn set_target_release(&self, target_release: Option<u16>) -> Result<(), Error> {
        self.check_unsealed("set_target_release")?;
        *self.target_release.write() = target_release;
        Ok(())
    }

    /// Prevents any further registration. Reads remain unaffected; this is
    /// called once, by the compilation façade, right before a provider is
    /// invoked.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    fn check_unsealed(&self, operation: &'static str) -> Result<(), Error> {
        if self.is_sealed() {
            Err(Error::IllegalOperation { location: Location::custom("<repository>", false, false), operation })
        } else {
            Ok(())
        }
    }

    fn container_from_root(root: ContainerRoot) -> Result<Container, Error> {
        Ok(match root {
            ContainerRoot::Disk { path, writable } => {
                Container::Directory(DirectoryContainer::new(DirRoot::Disk(path), writable))
            }
            ContainerRoot::Memory { fs, writable } => {
                Container::Directory(DirectoryContainer::new(DirRoot::Memory(fs), writable))
            }
            ContainerRoot::Archive { path } => Container::Archive(ArchiveContainer::open(path)?),
        })
    }

    /// Adds a root to a package-oriented location, creating the group on
    /// first use. A module-oriented location instead runs the module
    /// discoverer over the root and files each discovered module into its
    /// own inner package group — output locations have their own entry
    /// point since their group doesn't simply accumulate containers.
    pub fn add_path(&self, location: Location, root: ContainerRoot) -> Result<(), Error> {
        self.check_unsealed("add_path")?;
        debug_assert!(!location.is_output());
        if location.is_module_oriented() {
            return self.add_discovered_path(location, root);
        }
        let container = Self::container_from_root(root)?;
        let target_release = *self.target_release.read();
        let mut groups = self.groups.write();
        let group = groups.get_or_insert_with(location.clone(), || {
            ContainerGroup::Package(PackageGroup::new(location.clone()).with_target_release(target_release))
        });
        match group {
            ContainerGroup::Package(pkg) => pkg.add_container(container),
            _ => unreachable!("location {location:?} already registered as a non-package group"),
        }
        log::debug!(target: "vfs", "registered container for {location}");
        Ok(())
    }

    /// `addPath` on a module-oriented location with no module name of its
    /// own: scans `root` with the module discoverer and registers one inner
    /// package group per module found, e.g. attaching a JDK
    /// `SystemModules` directory to [`Location::SystemModules`]. Only a
    /// disk-backed root can be scanned this way — the discoverer walks a
    /// real directory tree, so an in-memory or archive root has nothing for
    /// it to walk.
    fn add_discovered_path(&self, location: Location, root: ContainerRoot) -> Result<(), Error> {
        let (disk_root, writable) = match root {
            ContainerRoot::Disk { path, writable } => (path, writable),
            ContainerRoot::Memory { .. } => {
                return Err(Error::IllegalOperation {
                    location,
                    operation: "add_path on a module-oriented location requires a disk-backed root",
                })
            }
            ContainerRoot::Archive { .. } => {
                return Err(Error::IllegalOperation {
                    location,
                    operation: "add_path on a module-oriented location does not support archive roots",
                })
            }
        };
        let discovered = module_discoverer::discover_modules(&disk_root);
        let mut groups = self.groups.write();
        let group = groups
            .get_or_insert_with(location.clone(), || ContainerGroup::Module(ModuleGroup::new(location.clone())));
        match group {
            ContainerGroup::Module(modules) => {
                for module in &discovered {
                    let container = Container::Directory(DirectoryContainer::new(
                        DirRoot::Disk(module.root.clone()),
                        writable,
                    ));
                    modules.module_mut(&module.name).add_container(container);
                }
            }
            _ => unreachable!("location already registered as a non-module group"),
        }
        log::debug!(target: "vfs", "discovered {} module(s) under {location}", discovered.len());
        Ok(())
    }

    /// Registers the single writable container backing an output location.
    /// Calling this twice for the same location replaces the prior
    /// container rather than accumulating, since output locations have
    /// exactly one backing root.
    pub fn set_output(&self, location: Location, root: ContainerRoot) -> Result<(), Error> {
        self.check_unsealed("set_output")?;
        debug_assert!(location.is_output());
        let container = Self::container_from_root(root)?;
        self.groups.write().insert(location.clone(), ContainerGroup::Output(OutputGroup::new(location.clone(), container)));
        log::debug!(target: "vfs", "registered output container for {location}");
        Ok(())
    }

    pub fn add_module_path(
        &self,
        location: Location,
        module_name: &str,
        root: ContainerRoot,
    ) -> Result<(), Error> {
        self.check_unsealed("add_module_path")?;
        debug_assert!(location.is_module_oriented());
        let container = Self::container_from_root(root)?;
        let mut groups = self.groups.write();
        let group = groups
            .get_or_insert_with(location.clone(), || ContainerGroup::Module(ModuleGroup::new(location.clone())));
        match group {
            ContainerGroup::Module(modules) => modules.module_mut(module_name).add_container(container),
            _ => unreachable!("location already registered as a non-module group"),
        }
        log::debug!(target: "vfs", "registered module {module_name} under {location}");
        Ok(())
    }

    /// Runs `f` against the package group backing `location`, if any.
    /// Read access is scoped to the closure so the lock is never held
    /// longer than a single query needs.
    pub fn with_package_group<R>(
        &self,
        location: &Location,
        f: impl FnOnce(&PackageGroup) -> R,
    ) -> Option<R> {
        match self.groups.read().get(location)? {
            ContainerGroup::Package(g) => Some(f(g)),
            _ => None,
        }
    }

    pub fn with_module_group<R>(&self, location: &Location, f: impl FnOnce(&ModuleGroup) -> R) -> Option<R> {
        match self.groups.read().get(location)? {
            ContainerGroup::Module(g) => Some(f(g)),
            _ => None,
        }
    }

    pub fn with_output_group<R>(&self, location: &Location, f: impl FnOnce(&OutputGroup) -> R) -> Option<R> {
        match self.groups.read().get(location)? {
            ContainerGroup::Output(g) => Some(f(g)),
            _ => None,
        }
    }

    pub fn has_location(&self, location: &Location) -> bool {
        match self.groups.read().get(location) {
            Some(ContainerGroup::Package(g)) => !g.is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    pub fn locations(&self) -> Vec<Location> {
        self.groups.read().locations().cloned().collect()
    }

    /// Closes every registered group in insertion order, aggregating
    /// failures rather than stopping at the first one.
    pub fn close(&self) -> Result<(), Error> {
        let causes: Vec<(Location, Error)> = self
            .groups
            .read()
            .values_in_order()
            .filter_map(|group| group.close().err().map(|e| (group.location().clone(), e)))
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

    #[test]
    fn add_path_accumulates_into_one_package_group() {
        let repo = Repository::new();
        let fs1 = MemFs::new();
        let fs2 = MemFs::new();
        repo.add_path(Location::ClassPath, ContainerRoot::Memory { fs: fs1, writable: false }).unwrap();
        repo.add_path(Location::ClassPath, ContainerRoot::Memory { fs: fs2, writable: false }).unwrap();
        assert!(repo.has_location(&Location::ClassPath));
    }

    #[test]
    fn module_paths_are_isolated_per_module_name() {
        let repo = Repository::new();
        let fs = MemFs::new();
        repo.add_module_path(Location::ModulePath, "com.example", ContainerRoot::Memory { fs, writable: false })
            .unwrap();
        let names = repo.with_module_group(&Location::ModulePath, |m| m.module_names().map(str::to_string).collect::<Vec<_>>()).unwrap();
        assert_eq!(names, vec!["com.example"]);
    }

    #[test]
    fn empty_package_group_reports_no_location() {
        let repo = Repository::new();
        assert!(!repo.has_location(&Location::ClassPath));
    }

    #[test]
    fn sealing_rejects_further_mutation() {
        let repo = Repository::new();
        repo.seal();
        let fs = MemFs::new();
        assert!(repo.add_path(Location::ClassPath, ContainerRoot::Memory { fs, writable: false }).is_err());
    }

    #[test]
    fn add_path_on_a_module_oriented_location_runs_the_discoverer() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("alpha")).unwrap();
        std::fs::write(dir.path().join("alpha/module-info.java"), "module alpha.mod {}\n").unwrap();

        let repo = Repository::new();
        repo.add_path(Location::SystemModules, ContainerRoot::Disk { path: dir.path().to_path_buf(), writable: false })
            .unwrap();

        let names = repo
            .with_module_group(&Location::SystemModules, |m| m.module_names().map(str::to_string).collect::<Vec<_>>())
            .unwrap();
        assert_eq!(names, vec!["alpha.mod"]);
    }

    #[test]
    fn add_path_on_a_module_oriented_location_rejects_memory_roots() {
        let repo = Repository::new();
        let fs = MemFs::new();
        assert!(repo.add_path(Location::SystemModules, ContainerRoot::Memory { fs, writable: false }).is_err());
    }

    #[test]
    fn close_releases_groups_in_insertion_order() {
        let repo = Repository::new();
        repo.add_path(Location::ClassPath, ContainerRoot::Memory { fs: MemFs::new(), writable: false }).unwrap();
        repo.add_path(Location::SourcePath, ContainerRoot::Memory { fs: MemFs::new(), writable: false }).unwrap();
        repo.add_path(Location::AnnotationProcessorPath, ContainerRoot::Memory { fs: MemFs::new(), writable: false })
            .unwrap();
        assert_eq!(
            repo.locations(),
            vec![Location::ClassPath, Location::SourcePath, Location::AnnotationProcessorPath]
        );
        assert!(repo.close().is_ok());
    }
}
