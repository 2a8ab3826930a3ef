//! The seam between the harness and an actual Java compiler: everything the
//! compilation façade needs from a provider, and nothing about how that
//! provider actually turns source into bytecode.

use std::{path::PathBuf, sync::Arc};

use harness_diagnostics::DiagnosticListener;
use harness_vfs::{JavaFileManager, PathFileObject};

/// A BCP-47-shaped locale tag. The harness never does locale-sensitive
/// message formatting itself — this exists purely to pass a provider's own
/// preference through, the way `javax.tools` plumbs a `Locale` to
/// `getTask` without interpreting it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Locale(pub &'static str);

/// Extra paths a provider wants merged into the file manager before the
/// compile starts — e.g. its own runtime classes. Left at its `Default`,
/// this is a no-op: the façade only inherits the host classpath when asked
/// to.
#[derive(Debug, Clone, Default)]
pub struct FileManagerSeed {
    pub extra_class_path: Vec<PathBuf>,
    pub inherit_host_class_path: bool,
}

/// A single, already-configured compilation run, analogous to
/// `javax.tools.JavaCompiler.CompilationTask`. Consumed exactly once.
pub trait CompilationTask {
    /// Runs the compilation and reports whether it succeeded. Takes `self`
    /// by value (boxed) since a `CompilationTask` is single-shot, same as
    /// the interface it mirrors.
    fn call(self: Box<Self>) -> bool;
}

/// The seam a test wires up to exercise a real (or fake) Java compiler.
/// The façade never parses or emits bytecode itself — it only shepherds
/// units and options to whatever implements this trait.
pub trait CompilerProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lets the provider declare any extra file-manager configuration it
    /// needs (e.g. its own bundled runtime) before compilation units are
    /// gathered.
    fn create_file_manager_seed(
        &self,
        listener: Arc<dyn DiagnosticListener>,
        locale: Option<Locale>,
        charset: &'static encoding_rs::Encoding,
    ) -> Result<FileManagerSeed, Self::Error>;

    /// Builds the compilation task itself. `units` are the source file
    /// objects gathered from the configured source/module-source
    /// locations; `class_names` is the opaque list of classes to process
    /// (used for annotation-processing-only or update runs where there are
    /// no fresh compilation units).
    fn get_task(
        &self,
        out_sink: &mut dyn std::io::Write,
        file_manager: Arc<dyn JavaFileManager>,
        listener: Arc<dyn DiagnosticListener>,
        options: &[String],
        class_names: &[String],
        units: Vec<Arc<PathFileObject>>,
    ) -> Result<Box<dyn CompilationTask>, Self::Error>;

    /// Release identifiers (e.g. `"17"`, `"21"`) this provider accepts for
    /// `--release`-style flags. Purely informational to the façade; it's
    /// the provider's job to reject an unsupported one from `options`.
    fn supported_release_strings(&self) -> &[&str];
}
