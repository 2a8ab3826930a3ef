//! Container groups: the per-location search paths and output slots a
//! repository hands file manager queries off to.

mod module;
mod output;
mod package;

pub use module::ModuleGroup;
pub use output::OutputGroup;
pub use package::{ClassLoaderHandle, PackageGroup};

use crate::{error::Error, location::Location};

/// A location's backing group. Package locations (class path, source path,
/// ...) get [`PackageGroup`], module-oriented locations get [`ModuleGroup`],
/// and output locations get [`OutputGroup`] — matching the well-known
/// location set's own three-way split.
#[derive(Debug)]
pub enum ContainerGroup {
    Package(PackageGroup),
    Module(ModuleGroup),
    Output(OutputGroup),
}

impl ContainerGroup {
    pub fn location(&self) -> &Location {
        match self {
            Self::Package(g) => g.location(),
            Self::Module(g) => g.location(),
            Self::Output(g) => g.location(),
        }
    }

    pub fn close(&self) -> Result<(), Error> {
        match self {
            Self::Package(g) => g.close(),
            Self::Module(g) => g.close(),
            Self::Output(g) => g.close(),
        }
    }
}
