//! A test harness for exercising Java-source compiler toolchains from Rust
//! tests, without ever needing the toolchain itself on the host.
//!
//! A [`Workspace`] owns a set of path roots (directories, in-memory file
//! systems, or wrapped external paths) and the [`harness_vfs::FileManager`]
//! built on top of them. A test populates it with source, compiles it
//! through a [`CompilerProvider`], and reads back whatever the provider
//! wrote plus whatever diagnostics it reported.

mod compile;
mod error;
mod provider;
mod root;
mod workspace;

pub use compile::{compile, CompilationRecord, CompileOptions};
pub use error::Error;
pub use provider::{CompilationTask, CompilerProvider, FileManagerSeed, Locale};
pub use root::{RootId, RootStrategy};
pub use workspace::Workspace;

pub use harness_diagnostics::{
    DiagnosticKind, DiagnosticListener, DiagnosticSource, Position, ReportedDiagnostic, SharedListener,
    TracedDiagnostic, TracingDiagnosticListener,
};
pub use harness_vfs::{FileKind, JavaFileManager, Location, ModuleRef, PathFileObject};
