use rustc_hash::FxHashMap;

use crate::{error::Error, group::package::PackageGroup, location::Location};

/// A module-oriented location's set of per-module package groups, in
/// discovery/insertion order (so `list_location_for_modules` iterates
/// modules in the order they were added, not hash order) with an O(1)
/// name-to-index lookup alongside it.
#[derive(Debug)]
pub struct ModuleGroup {
    location: Location,
    modules: Vec<(String, PackageGroup)>,
    index: FxHashMap<String, usize>,
}

impl ModuleGroup {
    pub fn new(location: Location) -> Self {
        Self { location, modules: Vec::new(), index: FxHashMap::default() }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Inserts a fresh, empty package group for `module_name` if one
    /// doesn't already exist, and returns a mutable reference to it either
    /// way.
    pub fn module_mut(&mut self, module_name: &str) -> &mut PackageGroup {
        if let Some(&idx) = self.index.get(module_name) {
            return &mut self.modules[idx].1;
        }
        let idx = self.modules.len();
        self.modules.push((module_name.to_string(), PackageGroup::new(self.location.clone())));
        self.index.insert(module_name.to_string(), idx);
        &mut self.modules[idx].1
    }

    pub fn module(&self, module_name: &str) -> Option<&PackageGroup> {
        self.index.get(module_name).map(|&idx| &self.modules[idx].1)
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PackageGroup)> {
        self.modules.iter().map(|(name, group)| (name.as_str(), group))
    }

    pub fn close(&self) -> Result<(), Error> {
        let causes: Vec<(Location, Error)> = self
            .modules
            .iter()
            .filter_map(|(_, group)| group.close().err().map(|e| (self.location.clone(), e)))
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
    fn modules_preserve_insertion_order() {
        let mut group = ModuleGroup::new(Location::ModulePath);
        group.module_mut("com.b");
        group.module_mut("com.a");
        group.module_mut("com.c");
        let names: Vec<&str> = group.module_names().collect();
        assert_eq!(names, vec!["com.b", "com.a", "com.c"]);
    }

    #[test]
    fn module_mut_is_idempotent_by_name() {
        let mut group = ModuleGroup::new(Location::ModulePath);
        group.module_mut("com.a");
        group.module_mut("com.a");
        assert_eq!(group.module_names().count(), 1);
    }
}
