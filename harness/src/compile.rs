//! The compilation façade: the one call a test actually makes once its
//! workspace is populated, wiring a [`CompilerProvider`] up to a
//! [`Workspace`] and packaging whatever comes back.

use std::sync::Arc;

use harness_diagnostics::TracedDiagnostic;
use harness_vfs::{FileKind, FileManager, JavaFileManager, Location, PathFileObject};

use crate::{
    error::Error,
    provider::{CompilerProvider, FileManagerSeed, Locale},
    workspace::Workspace,
};

const OUTPUT_LOCATIONS: [Location; 3] = [Location::ClassOutput, Location::SourceOutput, Location::NativeHeaderOutput];

/// Everything a compile produced: whether it succeeded, what it printed,
/// the units it was asked to compile, and a snapshot of every diagnostic
/// reported along the way.
#[derive(Debug)]
pub struct CompilationRecord {
    pub success: bool,
    pub fail_on_warnings: bool,
    pub output_transcript: String,
    pub units: Vec<Arc<PathFileObject>>,
    pub diagnostics: Vec<TracedDiagnostic>,
    pub file_manager: Arc<FileManager>,
}

impl CompilationRecord {
    /// A diagnostic-aware success: when `fail_on_warnings` was requested,
    /// any warning-or-worse diagnostic counts as failure even if the
    /// provider itself reported success.
    pub fn passed(&self) -> bool {
        if !self.success {
            return false;
        }
        if self.fail_on_warnings {
            return !self.diagnostics.iter().any(|d| d.diagnostic.kind.is_error() || d.diagnostic.kind.is_warning());
        }
        true
    }
}

/// Options controlling a single compile, independent of the provider.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub flags: Vec<String>,
    pub class_names: Vec<String>,
    pub locale: Option<Locale>,
    pub fail_on_warnings: bool,
}

/// Runs a compile against `workspace` using `provider`, following the same
/// five steps every call makes: make sure the output locations exist,
/// fold in whatever file-manager configuration the provider and host
/// classpath need, gather compilation units, run the provider, and package
/// the result.
pub fn compile<P: CompilerProvider>(
    workspace: &mut Workspace,
    provider: &P,
    options: CompileOptions,
) -> Result<CompilationRecord, Error> {
    ensure_output_locations_exist(workspace)?;

    let listener = workspace.diagnostics_handle();
    let charset = encoding_rs::UTF_8;
    let seed = provider
        .create_file_manager_seed(listener.clone(), options.locale, charset)
        .map_err(|e| Error::CompileFailed { cause: Box::new(e) })?;
    apply_seed(workspace, &seed)?;

    let units = gather_compilation_units(workspace)?;

    let fm = workspace.file_manager();
    fm.seal();
    let fm_handle: Arc<dyn JavaFileManager> = fm.clone();

    let mut transcript = Vec::new();
    let task = provider
        .get_task(&mut transcript, fm_handle, listener, &options.flags, &options.class_names, units.clone())
        .map_err(|e| Error::CompileFailed { cause: Box::new(e) })?;
    let success = task.call();

    Ok(CompilationRecord {
        success,
        fail_on_warnings: options.fail_on_warnings,
        output_transcript: String::from_utf8_lossy(&transcript).into_owned(),
        units,
        diagnostics: workspace.diagnostics().snapshot(),
        file_manager: fm,
    })
}

fn ensure_output_locations_exist(workspace: &mut Workspace) -> Result<(), Error> {
    let fm = workspace.file_manager();
    for location in OUTPUT_LOCATIONS {
        if !fm.has_location(&location) {
            workspace.set_output(location, None)?;
        }
    }
    Ok(())
}

fn apply_seed(workspace: &mut Workspace, seed: &FileManagerSeed) -> Result<(), Error> {
    for path in &seed.extra_class_path {
        workspace.add_path(Location::ClassPath, path.clone())?;
    }
    if seed.inherit_host_class_path {
        if let Ok(raw) = std::env::var("CLASSPATH") {
            for path in std::env::split_paths(&raw) {
                workspace.add_path(Location::ClassPath, path)?;
            }
        }
    }
    Ok(())
}

fn gather_compilation_units(workspace: &Workspace) -> Result<Vec<Arc<PathFileObject>>, Error> {
    let fm = workspace.file_manager();
    let mut units = Vec::new();

    if fm.has_location(&Location::SourcePath) {
        units.extend(fm.list(&Location::SourcePath, "", &[FileKind::Source], true)?);
    }

    if fm.has_location(&Location::ModuleSourcePath) {
        for module in fm.list_location_for_modules(&Location::ModuleSourcePath)? {
            units.extend(fm.list_in_module(&module, "", &[FileKind::Source], true)?);
        }
    }

    log::debug!(target: "workspace", "gathered {} compilation unit(s)", units.len());
    Ok(units.into_iter().map(Arc::new).collect())
}
