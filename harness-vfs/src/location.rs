use std::{fmt, sync::Arc};

/// A symbolic role in the compiler's view of the world, e.g. the class-path
/// or the directory the compiler writes `.class` files into.
///
/// Each location has two orthogonal traits, queried via
/// [`Location::is_module_oriented`] and [`Location::is_output`]. The
/// well-known variants cover every standard location a JSR 199-shaped
/// compiler service defines; [`Location::Custom`] is the escape hatch for
/// annotation-processor-defined locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    ClassPath,
    SourcePath,
    ClassOutput,
    SourceOutput,
    NativeHeaderOutput,
    AnnotationProcessorPath,
    AnnotationProcessorModulePath,
    PlatformClassPath,
    ModulePath,
    ModuleSourcePath,
    UpgradeModulePath,
    SystemModules,
    PatchModulePath,
    Custom { name: Arc<str>, module_oriented: bool, output: bool },
}

impl Location {
    pub fn custom(name: impl Into<Arc<str>>, module_oriented: bool, output: bool) -> Self {
        Self::Custom { name: name.into(), module_oriented, output }
    }

    pub fn is_module_oriented(&self) -> bool {
        matches!(
            self,
            Self::ModulePath
                | Self::ModuleSourcePath
                | Self::UpgradeModulePath
                | Self::SystemModules
                | Self::AnnotationProcessorModulePath
                | Self::PatchModulePath
        ) || matches!(self, Self::Custom { module_oriented: true, .. })
    }

    pub fn is_output(&self) -> bool {
        matches!(self, Self::ClassOutput | Self::SourceOutput | Self::NativeHeaderOutput)
            || matches!(self, Self::Custom { output: true, .. })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ClassPath => "CLASS_PATH",
            Self::SourcePath => "SOURCE_PATH",
            Self::ClassOutput => "CLASS_OUTPUT",
            Self::SourceOutput => "SOURCE_OUTPUT",
            Self::NativeHeaderOutput => "NATIVE_HEADER_OUTPUT",
            Self::AnnotationProcessorPath => "ANNOTATION_PROCESSOR_PATH",
            Self::AnnotationProcessorModulePath => "ANNOTATION_PROCESSOR_MODULE_PATH",
            Self::PlatformClassPath => "PLATFORM_CLASS_PATH",
            Self::ModulePath => "MODULE_PATH",
            Self::ModuleSourcePath => "MODULE_SOURCE_PATH",
            Self::UpgradeModulePath => "UPGRADE_MODULE_PATH",
            Self::SystemModules => "SYSTEM_MODULES",
            Self::PatchModulePath => "PATCH_MODULE_PATH",
            Self::Custom { name, .. } => name,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `(module-oriented-location, module-name)` pair.
///
/// Module references are values, not handles: two `ModuleRef`s that name the
/// same location and module name are the same reference, even if built
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRef {
    pub location: Location,
    pub name: String,
}

impl ModuleRef {
    /// Builds a module reference. `location` must be module-oriented, or an
    /// output location (whose group can spawn an inner module partition on
    /// its first module-targeted write) — this is a programmer error, not a
    /// runtime condition a test could trigger accidentally, so it's checked
    /// with `debug_assert!` rather than a fallible constructor.
    pub fn new(location: Location, name: impl Into<String>) -> Self {
        debug_assert!(
            location.is_module_oriented() || location.is_output(),
            "ModuleRef parent location {location:?} must be module-oriented or an output location"
        );
        Self { location, name: name.into() }
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.location, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_locations_have_expected_traits() {
        assert!(Location::ModuleSourcePath.is_module_oriented());
        assert!(!Location::ModuleSourcePath.is_output());
        assert!(Location::ClassOutput.is_output());
        assert!(!Location::ClassOutput.is_module_oriented());
        assert!(!Location::ClassPath.is_module_oriented());
        assert!(!Location::ClassPath.is_output());
    }

    #[test]
    fn custom_location_traits_follow_flags() {
        let loc = Location::custom("MY_LOC", true, true);
        assert!(loc.is_module_oriented());
        assert!(loc.is_output());
    }
}
