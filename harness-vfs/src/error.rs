use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::location::Location;

/// Errors raised by the file manager, container, and container-group layers.
///
/// Structural-programmer errors (illegal names, wrong location kind) and IO
/// errors are both represented here, but policy differs: callers should
/// treat the structural variants as "this test/provider is misusing the
/// API" and IO variants as "the filesystem said no". Scoped-release
/// failures (`GroupCloseFailed`) aggregate rather than reporting just the
/// first cause, so a flaky cleanup never hides its siblings.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("illegal name {name:?}: {reason}")]
    IllegalName { name: String, reason: &'static str },

    #[error("{path} is not a regular file")]
    NotARegularFile { path: PathBuf },

    #[error("write denied for {path} (container is read-only)")]
    WriteDenied { path: PathBuf },

    #[error("container's path root cannot produce a URL suitable for class loading")]
    UnsupportedPathForClassLoader,

    #[error("class {binary_name} not found in location {location}")]
    ClassMissing { binary_name: String, location: Location },

    #[error("failed to load class {binary_name} from location {location}")]
    ClassLoadingFailed {
        binary_name: String,
        location: Location,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("illegal operation {operation} on location {location}")]
    IllegalOperation { location: Location, operation: &'static str },

    #[error("file manager is closed")]
    FileManagerClosed,

    #[error("one or more containers failed to close: {}", format_causes(.causes))]
    GroupCloseFailed { causes: Vec<(Location, Error)> },

    #[error("io error on {path}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

impl Error {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io { source, path: path.into() }
    }
}

fn format_causes(causes: &[(Location, Error)]) -> String {
    causes.iter().map(|(loc, err)| format!("[{loc}: {err}]")).collect::<Vec<_>>().join(", ")
}
