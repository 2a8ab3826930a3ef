use std::sync::Arc;

use crate::{kind::DiagnosticKind, position::Position};

/// A minimal, decoupled description of the file object a diagnostic points
/// at. `harness-diagnostics` has no dependency on the file manager crate, so
/// callers hand over just enough to report and compare provenance: a stable
/// URI and the human-readable name the compiler service would print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticSource {
    pub uri: Arc<str>,
    pub display_name: Arc<str>,
}

impl DiagnosticSource {
    pub fn new(uri: impl Into<Arc<str>>, display_name: impl Into<Arc<str>>) -> Self {
        Self { uri: uri.into(), display_name: display_name.into() }
    }
}

/// A diagnostic as handed to [`crate::listener::TracingDiagnosticListener::report`]
/// by the wrapped compiler service, before timestamp/thread/stack enrichment.
#[derive(Debug, Clone)]
pub struct ReportedDiagnostic {
    pub kind: DiagnosticKind,
    pub code: Option<String>,
    pub source: Option<DiagnosticSource>,
    pub position: Position,
    pub message: String,
}

impl ReportedDiagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            source: None,
            position: Position::NONE,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_source(mut self, source: DiagnosticSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}
