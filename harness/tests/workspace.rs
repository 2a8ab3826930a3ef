//! Workspace lifecycle and path-root scenarios.

use std::path::Path;

use harness::{FileKind, JavaFileManager, Location, RootStrategy, Workspace};

#[test]
fn a_package_root_created_on_disk_is_removed_when_the_workspace_closes() {
    let mut ws = Workspace::with_strategy(RootStrategy::TempDisk);
    ws.create_package(Location::ClassPath).unwrap();
    ws.close().unwrap();
}

#[test]
fn wrapped_external_paths_survive_workspace_close() {
    let external = tempfile::tempdir().unwrap();
    std::fs::write(external.path().join("Marker.class"), b"\xCA\xFE").unwrap();

    let mut ws = Workspace::with_strategy(RootStrategy::Memory);
    ws.add_path(Location::ClassPath, external.path().to_path_buf()).unwrap();
    ws.close().unwrap();

    assert!(external.path().join("Marker.class").exists());
}

#[test]
fn module_paths_are_queried_per_module_name() {
    let mut ws = Workspace::with_strategy(RootStrategy::Memory);
    let a = ws.create_module(Location::ModuleSourcePath, "com.a").unwrap();
    let b = ws.create_module(Location::ModuleSourcePath, "com.b").unwrap();
    ws.create_file(a, Path::new("com/a/A.java"), b"package com.a; class A {}").unwrap();
    ws.create_file(b, Path::new("com/b/B.java"), b"package com.b; class B {}").unwrap();

    let fm = ws.file_manager_handle();
    let modules = fm.list_location_for_modules(&Location::ModuleSourcePath).unwrap();
    assert_eq!(modules.len(), 2);

    let a_ref = modules.iter().find(|m| m.name == "com.a").unwrap();
    let a_sources = fm.list_in_module(a_ref, "", &[FileKind::Source], true).unwrap();
    assert_eq!(a_sources.len(), 1);
    assert_eq!(a_sources[0].binary_name(), Some("com.a.A"));
}

#[test]
fn create_directory_rejects_path_traversal_segments() {
    let ws = Workspace::with_strategy(RootStrategy::Memory);
    let mut ws = ws;
    let root = ws.create_package(Location::ClassPath).unwrap();
    assert!(ws.create_directory(root, Path::new("../escape")).is_err());
}
