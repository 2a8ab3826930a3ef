//! Cross-module scenarios: a file manager wired up with a class path, a
//! module path, and an output location together, the way a real compile
//! would configure one.

use std::path::Path;

use harness_vfs::{
    repository::ContainerRoot, FileKind, FileManager, JavaFileManager, Location, MemFs, ModuleRef, Repository,
};

fn writable_memory_root() -> ContainerRoot {
    ContainerRoot::Memory { fs: MemFs::new(), writable: true }
}

#[test]
fn a_compile_shaped_file_manager_resolves_across_locations() {
    let repo = Repository::new();

    let class_path_fs = MemFs::new();
    class_path_fs.write(Path::new("com/lib/Util.class"), b"\xCA\xFE\xBA\xBE").unwrap();
    repo.add_path(Location::ClassPath, ContainerRoot::Memory { fs: class_path_fs, writable: false }).unwrap();

    let module_fs = MemFs::new();
    module_fs.write(Path::new("com/example/Api.java"), b"package com.example; interface Api {}").unwrap();
    repo.add_module_path(
        Location::ModuleSourcePath,
        "com.example",
        ContainerRoot::Memory { fs: module_fs, writable: false },
    )
    .unwrap();

    repo.set_output(Location::ClassOutput, writable_memory_root()).unwrap();

    let manager = FileManager::new(repo);

    let class_file = manager
        .get_java_file_for_input(&Location::ClassPath, "com.lib.Util", FileKind::Class)
        .unwrap()
        .expect("class-path entry resolves");
    assert_eq!(class_file.read_bytes().unwrap(), vec![0xCA, 0xFE, 0xBA, 0xBE]);

    let modules = manager.list_location_for_modules(&Location::ModuleSourcePath).unwrap();
    assert_eq!(modules, vec![ModuleRef::new(Location::ModuleSourcePath, "com.example")]);

    let sources = manager.list_in_module(&modules[0], "", &[FileKind::Source], true).unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].binary_name(), Some("com.example.Api"));

    let out = manager.get_java_file_for_output(&Location::ClassOutput, "com.example.Api", FileKind::Class).unwrap();
    out.write_bytes(b"\xCA\xFE").unwrap();
    assert!(manager.contains(&Location::ClassOutput, &out).unwrap());
}

#[test]
fn sealing_the_file_manager_blocks_new_registration_but_not_existing_queries() {
    let repo = Repository::new();
    repo.set_output(Location::ClassOutput, writable_memory_root()).unwrap();
    let manager = FileManager::new(repo);

    manager.seal();

    assert!(manager.add_path(Location::ClassPath, writable_memory_root()).is_err());
    let out = manager.get_java_file_for_output(&Location::ClassOutput, "pkg.Hello", FileKind::Class);
    assert!(out.is_ok());
}

#[test]
fn closing_the_file_manager_fails_every_subsequent_query() {
    let repo = Repository::new();
    repo.add_path(Location::ClassPath, writable_memory_root()).unwrap();
    let manager = FileManager::new(repo);

    manager.close().unwrap();
    assert!(manager.get_file_for_input(&Location::ClassPath, "pkg/Hello.class").is_err());
    assert!(manager.close().is_ok(), "closing twice is a no-op, not an error");
}
