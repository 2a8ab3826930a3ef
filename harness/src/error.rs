use miette::Diagnostic;
use thiserror::Error;

use crate::root::RootId;

/// Errors raised by the workspace and compilation façade. Wraps
/// `harness_vfs::Error` for everything that happens once a query reaches
/// the file manager, and adds the workspace-lifecycle and compile-specific
/// variants on top.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Vfs(#[from] harness_vfs::Error),

    #[error("workspace is closed")]
    WorkspaceClosed,

    #[error("illegal root name {name:?}: {reason}")]
    IllegalRootName { name: String, reason: &'static str },

    #[error("one or more path roots failed to release: {}", format_causes(.causes))]
    WorkspaceCloseFailed { causes: Vec<(RootId, Error)> },

    #[error("compiler provider failed")]
    CompileFailed {
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

fn format_causes(causes: &[(RootId, Error)]) -> String {
    causes.iter().map(|(id, err)| format!("[{id}: {err}]")).collect::<Vec<_>>().join(", ")
}
