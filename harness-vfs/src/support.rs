//! Small, pure helpers shared across containers, groups, and the file
//! manager: binary-name/relative-path conversion, name validation, and a
//! pretty tree printer for showing a container's contents to a human.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{error::Error, kind::FileKind};

/// Converts a fully-qualified binary name (`java.lang.String`) into the
/// relative path a file of the given kind would occupy (`java/lang/String.java`).
///
/// This and [`path_to_binary_name`] are inverses of each other for any
/// binary name that doesn't contain a path separator or `.` segment of
/// `.`/`..` — enforced by [`validate_binary_name`].
pub fn binary_name_to_path(binary_name: &str, kind: FileKind) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in binary_name.split('.') {
        path.push(segment);
    }
    path.set_extension(kind.extension());
    path
}

/// Recovers a binary name from a relative path and its kind, stripping the
/// kind's canonical extension. Returns `None` for paths whose extension
/// doesn't match the kind (e.g. asking for the binary name of a `.html`
/// file), matching the "only source and class files have binary names"
/// rule.
pub fn path_to_binary_name(path: &Path, kind: FileKind) -> Option<String> {
    if kind.extension().is_empty() {
        return None;
    }
    if path.extension().and_then(|e| e.to_str()) != Some(kind.extension()) {
        return None;
    }
    let stem_path = path.with_extension("");
    let segments: Vec<&str> = stem_path.components().filter_map(|c| c.as_os_str().to_str()).collect();
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("."))
}

/// Rejects names that would escape a container (`..`, absolute paths,
/// empty segments) before they ever reach the file system.
pub fn validate_relative_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::IllegalName { name: name.to_string(), reason: "name is empty" });
    }
    let path = Path::new(name);
    if path.is_absolute() {
        return Err(Error::IllegalName { name: name.to_string(), reason: "name must be relative" });
    }
    for component in path.components() {
        match component {
            std::path::Component::Normal(_) => {}
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                return Err(Error::IllegalName {
                    name: name.to_string(),
                    reason: "name must not contain '..'",
                });
            }
            _ => {
                return Err(Error::IllegalName {
                    name: name.to_string(),
                    reason: "name must be a simple relative path",
                });
            }
        }
    }
    Ok(())
}

/// As [`validate_relative_name`] but for binary names: dot-separated
/// identifiers only, no empty segments.
pub fn validate_binary_name(binary_name: &str) -> Result<(), Error> {
    if binary_name.is_empty() {
        return Err(Error::IllegalName {
            name: binary_name.to_string(),
            reason: "binary name is empty",
        });
    }
    if binary_name.split('.').any(|segment| segment.is_empty()) {
        return Err(Error::IllegalName {
            name: binary_name.to_string(),
            reason: "binary name must not contain empty segments",
        });
    }
    Ok(())
}

#[derive(Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
}

/// Renders a set of relative paths as an indented tree, grouping entries
/// under their shared directory prefixes rather than repeating the prefix
/// on every line. Order among siblings is lexicographic, not insertion
/// order, since this is for a human to read, not for a caller to diff.
pub fn print_tree<'a>(paths: impl IntoIterator<Item = &'a Path>) -> String {
    let mut root = TreeNode::default();
    for path in paths {
        let mut node = &mut root;
        for component in path.components() {
            let segment = component.as_os_str().to_string_lossy().into_owned();
            node = node.children.entry(segment).or_default();
        }
    }
    let mut out = String::new();
    render_tree(&root, "", &mut out);
    out
}

fn render_tree(node: &TreeNode, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if is_last { "└── " } else { "├── " });
        out.push_str(name);
        out.push('\n');
        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        render_tree(child, &child_prefix, out);
    }
}
