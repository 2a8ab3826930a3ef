use std::{
    sync::Arc,
    thread::{self, ThreadId},
    time::SystemTime,
};

use parking_lot::Mutex;

use crate::{diagnostic::ReportedDiagnostic, stack};

/// A diagnostic enriched with the provenance the spec requires: when it was
/// reported, which thread reported it, and (bounded) where in that thread's
/// call stack the report happened.
#[derive(Debug, Clone)]
pub struct TracedDiagnostic {
    pub diagnostic: ReportedDiagnostic,
    pub timestamp: SystemTime,
    pub thread_id: ThreadId,
    pub thread_name: Option<String>,
    pub frames: Vec<String>,
}

/// Receives diagnostics from the wrapped compiler service. Implementations
/// must be safe to call concurrently from whatever worker threads the
/// compiler provider chooses to report from.
pub trait DiagnosticListener: Send + Sync {
    fn report(&self, diagnostic: ReportedDiagnostic);
}

/// Multi-producer, single-consumer-at-snapshot queue of traced diagnostics.
///
/// A plain mutex-protected `Vec` is the deliberate choice here (see the
/// crate's design notes): append only ever holds the lock for a single
/// `push`, and `snapshot` clones out from under a short critical section, so
/// contention between compiler worker threads stays negligible without
/// reaching for a lock-free MPSC structure.
#[derive(Default)]
struct DiagnosticQueue {
    entries: Mutex<Vec<TracedDiagnostic>>,
}

impl DiagnosticQueue {
    fn push(&self, entry: TracedDiagnostic) {
        self.entries.lock().push(entry);
    }

    fn snapshot(&self) -> Vec<TracedDiagnostic> {
        self.entries.lock().clone()
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Wraps each diagnostic reported by the compiler with timestamp, thread
/// identity, and a bounded call stack, storing them in insertion order.
///
/// The queue itself is never exposed directly — only [`snapshot`] copies —
/// so callers can't observe a partially-appended state or race a concurrent
/// `report`.
pub struct TracingDiagnosticListener {
    queue: DiagnosticQueue,
    log_on_report: bool,
    max_frames: usize,
}

impl Default for TracingDiagnosticListener {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingDiagnosticListener {
    pub fn new() -> Self {
        Self { queue: DiagnosticQueue::default(), log_on_report: true, max_frames: 32 }
    }

    /// Disables the optional `log::` emission on each report. The queue
    /// itself is unaffected; this only controls the side-channel logging.
    pub fn without_logging(mut self) -> Self {
        self.log_on_report = false;
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn snapshot(&self) -> Vec<TracedDiagnostic> {
        self.queue.snapshot()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticListener for TracingDiagnosticListener {
    fn report(&self, diagnostic: ReportedDiagnostic) {
        let current = thread::current();
        let traced = TracedDiagnostic {
            thread_id: current.id(),
            thread_name: current.name().map(str::to_owned),
            frames: stack::capture(self.max_frames),
            timestamp: SystemTime::now(),
            diagnostic,
        };

        if self.log_on_report {
            log::log!(
                target: "diagnostics",
                traced.diagnostic.kind.log_level(),
                "{}: {}",
                traced.diagnostic.kind,
                traced.diagnostic.message,
            );
        }

        self.queue.push(traced);
    }
}

/// Convenience for sharing one listener across a file manager, a compiler
/// provider, and the compilation record that ultimately snapshots it.
pub type SharedListener = Arc<TracingDiagnosticListener>;
