//! Discovers module declarations under a module-source-path root: either a
//! `module-info.java`/`module-info.class` at the root itself (single-module
//! layout) or one inside each immediate subdirectory (multi-module layout).

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A discovered module: its name (parsed out of a `module-info` source or
/// compiled descriptor) and the directory it was found under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredModule {
    pub name: String,
    pub root: PathBuf,
}

const MODULE_INFO_SOURCE: &str = "module-info.java";
const MODULE_INFO_CLASS: &str = "module-info.class";

/// Parses a `module <name>` declaration out of `module-info.java` source.
/// Returns `None` (logged, not an error) on anything that doesn't look like
/// a module declaration — malformed module-info files are skipped rather
/// than aborting discovery for every other module.
fn parse_module_name(source: &str) -> Option<String> {
    let without_comments = strip_comments(source);
    let keyword_idx = without_comments.find("module")?;
    let rest = &without_comments[keyword_idx + "module".len()..];
    let rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }
    let end = rest.find(['{', ' ', '\n', '\t', '\r']).unwrap_or(rest.len());
    let name = rest[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Strips `//` and `/* */` comments with a single linear pass. Not a real
/// tokenizer — good enough for locating the `module` keyword, not for
/// general Java parsing.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'/') {
            for c in chars.by_ref() {
                if c == '\n' {
                    break;
                }
            }
            out.push('\n');
        } else if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut prev = '\0';
            for c in chars.by_ref() {
                if prev == '*' && c == '/' {
                    break;
                }
                prev = c;
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Source descriptors take precedence over a compiled one in the same
/// directory, matching a `module-info.java` always being the one a compiler
/// would actually read.
fn try_discover_at(dir: &Path) -> Option<DiscoveredModule> {
    let source_path = dir.join(MODULE_INFO_SOURCE);
    if let Ok(source) = std::fs::read_to_string(&source_path) {
        return match parse_module_name(&source) {
            Some(name) => Some(DiscoveredModule { name, root: dir.to_path_buf() }),
            None => {
                log::warn!(target: "harness_vfs::module_discoverer", "{} did not contain a parseable module declaration", source_path.display());
                None
            }
        };
    }

    let class_path = dir.join(MODULE_INFO_CLASS);
    let bytes = std::fs::read(&class_path).ok()?;
    match parse_module_name_from_class(&bytes) {
        Some(name) => Some(DiscoveredModule { name, root: dir.to_path_buf() }),
        None => {
            log::warn!(target: "harness_vfs::module_discoverer", "{} did not contain a parseable Module attribute", class_path.display());
            None
        }
    }
}

/// Extracts the module name out of a compiled `module-info.class`'s
/// `Module` attribute. A minimal classfile reader, not a general bytecode
/// parser: it walks just enough of the constant pool and attribute table to
/// find `Module.module_name_index`, then follows that back to the
/// `CONSTANT_Module_info`'s own name.
fn parse_module_name_from_class(bytes: &[u8]) -> Option<String> {
    let mut r = ClassReader::new(bytes);
    if r.read_u32()? != 0xCAFE_BABE {
        return None;
    }
    r.skip(4)?; // minor_version, major_version

    let mut utf8 = rustc_hash::FxHashMap::default();
    let mut module_name_index_of = rustc_hash::FxHashMap::default();
    let constant_pool_count = r.read_u16()?;
    let mut index = 1u16;
    while index < constant_pool_count {
        match r.read_u8()? {
            1 => {
                let len = r.read_u16()?;
                let raw = r.read_bytes(len as usize)?;
                utf8.insert(index, String::from_utf8_lossy(raw).into_owned());
            }
            19 => {
                module_name_index_of.insert(index, r.read_u16()?);
            }
            7 | 8 | 16 | 20 => {
                r.read_u16()?;
            }
            15 => {
                r.read_u8()?;
                r.read_u16()?;
            }
            9 | 10 | 11 | 12 | 17 | 18 => {
                r.read_u16()?;
                r.read_u16()?;
            }
            3 | 4 => {
                r.read_u32()?;
            }
            5 | 6 => {
                r.read_u32()?;
                r.read_u32()?;
                index += 1; // long/double occupy two constant pool slots
            }
            _ => return None,
        }
        index += 1;
    }

    r.skip(6)?; // access_flags, this_class, super_class
    let interfaces_count = r.read_u16()?;
    r.skip(2 * interfaces_count as usize)?;
    for _ in 0..r.read_u16()? {
        skip_member(&mut r)?;
    }
    for _ in 0..r.read_u16()? {
        skip_member(&mut r)?;
    }

    for _ in 0..r.read_u16()? {
        let name_index = r.read_u16()?;
        let length = r.read_u32()?;
        if utf8.get(&name_index).map(String::as_str) == Some("Module") {
            let module_name_index = r.read_u16()?;
            let cp_index = module_name_index_of.get(&module_name_index)?;
            return utf8.get(cp_index).cloned();
        }
        r.skip(length as usize)?;
    }
    None
}

/// A `field_info`/`method_info` entry: `access_flags`, `name_index`,
/// `descriptor_index`, then an attribute table, none of whose contents
/// matter here.
fn skip_member(r: &mut ClassReader<'_>) -> Option<()> {
    r.skip(6)?; // access_flags, name_index, descriptor_index
    for _ in 0..r.read_u16()? {
        r.skip(2)?; // attribute_name_index
        let length = r.read_u32()?;
        r.skip(length as usize)?;
    }
    Some(())
}

struct ClassReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let slice = self.bytes.get(self.pos..self.pos + len)?;
        self.pos += len;
        Some(slice)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.read_bytes(1)?[0])
    }

    fn read_u16(&mut self) -> Option<u16> {
        let slice = self.read_bytes(2)?;
        Some(u16::from_be_bytes([slice[0], slice[1]]))
    }

    fn read_u32(&mut self) -> Option<u32> {
        let slice = self.read_bytes(4)?;
        Some(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    fn skip(&mut self, len: usize) -> Option<()> {
        self.read_bytes(len).map(|_| ())
    }
}

/// Discovers modules under `root`. If `root` itself has a `module-info.java`,
/// that's the only module found (single-module layout). Otherwise, each
/// immediate subdirectory with a `module-info.java` contributes one module
/// (multi-module layout); subdirectories without one are silently not
/// modules.
pub fn discover_modules(root: &Path) -> Vec<DiscoveredModule> {
    if let Some(module) = try_discover_at(root) {
        return vec![module];
    }

    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| try_discover_at(entry.path()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_module_declaration() {
        let source = "module com.example.foo {\n    requires java.base;\n}\n";
        assert_eq!(parse_module_name(source).as_deref(), Some("com.example.foo"));
    }

    #[test]
    fn ignores_module_keyword_inside_comments() {
        let source = "// module fake.one\n/* module fake.two */\nmodule real.three {\n}\n";
        assert_eq!(parse_module_name(source).as_deref(), Some("real.three"));
    }

    #[test]
    fn single_module_layout_detected_at_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("module-info.java"), "module root.mod {}\n").unwrap();

        let modules = discover_modules(dir.path());
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "root.mod");
    }

    #[test]
    fn multi_module_layout_detected_one_level_deep() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("alpha")).unwrap();
        std::fs::write(dir.path().join("alpha/module-info.java"), "module alpha.mod {}\n").unwrap();
        std::fs::create_dir_all(dir.path().join("beta")).unwrap();
        std::fs::write(dir.path().join("beta/module-info.java"), "module beta.mod {}\n").unwrap();
        std::fs::create_dir_all(dir.path().join("not_a_module")).unwrap();

        let mut modules = discover_modules(dir.path());
        modules.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(modules.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(), vec!["alpha.mod", "beta.mod"]);
    }

    /// Builds just enough of a classfile to carry a `Module` attribute:
    /// a three-entry constant pool (the attribute name, the module name,
    /// and the `CONSTANT_Module_info` tying them together) and one
    /// class-level attribute.
    fn build_module_info_class(module_name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // minor_version
        out.extend_from_slice(&53u16.to_be_bytes()); // major_version
        out.extend_from_slice(&4u16.to_be_bytes()); // constant_pool_count (3 entries)

        out.push(1); // Utf8 #1: "Module"
        out.extend_from_slice(&6u16.to_be_bytes());
        out.extend_from_slice(b"Module");

        out.push(1); // Utf8 #2: the module name
        out.extend_from_slice(&(module_name.len() as u16).to_be_bytes());
        out.extend_from_slice(module_name.as_bytes());

        out.push(19); // CONSTANT_Module_info #3 -> name_index 2
        out.extend_from_slice(&2u16.to_be_bytes());

        out.extend_from_slice(&0u16.to_be_bytes()); // access_flags
        out.extend_from_slice(&0u16.to_be_bytes()); // this_class
        out.extend_from_slice(&0u16.to_be_bytes()); // super_class
        out.extend_from_slice(&0u16.to_be_bytes()); // interfaces_count
        out.extend_from_slice(&0u16.to_be_bytes()); // fields_count
        out.extend_from_slice(&0u16.to_be_bytes()); // methods_count

        out.extend_from_slice(&1u16.to_be_bytes()); // attributes_count
        out.extend_from_slice(&1u16.to_be_bytes()); // attribute_name_index -> "Module"
        out.extend_from_slice(&2u32.to_be_bytes()); // attribute_length (unused once matched)
        out.extend_from_slice(&3u16.to_be_bytes()); // module_name_index -> CONSTANT_Module_info #3
        out
    }

    #[test]
    fn parses_module_name_out_of_a_compiled_descriptor() {
        let bytes = build_module_info_class("com.example.compiled");
        assert_eq!(parse_module_name_from_class(&bytes).as_deref(), Some("com.example.compiled"));
    }

    #[test]
    fn compiled_descriptor_is_accepted_when_no_source_descriptor_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("module-info.class"), build_module_info_class("root.compiled")).unwrap();

        let modules = discover_modules(dir.path());
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "root.compiled");
    }

    #[test]
    fn source_descriptor_takes_precedence_over_a_compiled_one() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("module-info.java"), "module root.source {}\n").unwrap();
        std::fs::write(dir.path().join("module-info.class"), build_module_info_class("root.compiled")).unwrap();

        let modules = discover_modules(dir.path());
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "root.source");
    }
}
