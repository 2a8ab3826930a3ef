//! Tracing diagnostic listener for the compiler test harness.
//!
//! This crate has no knowledge of the file manager or workspace layers; it
//! only knows how to enrich and store whatever diagnostics a wrapped
//! compiler service reports, in insertion order, safely from multiple
//! threads.

mod diagnostic;
mod kind;
mod listener;
mod position;
mod stack;

pub use self::{
    diagnostic::{DiagnosticSource, ReportedDiagnostic},
    kind::DiagnosticKind,
    listener::{DiagnosticListener, SharedListener, TracedDiagnostic, TracingDiagnosticListener},
    position::{Position, NOPOS},
};
