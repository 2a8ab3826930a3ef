//! Bounded-depth capture of the reporting thread's call stack.
//!
//! The depth is implementation-defined per the spec; we cap it rather than
//! capture an unbounded backtrace so that a compiler emitting thousands of
//! diagnostics (S6) doesn't turn tracing into the dominant cost of a test.

use std::backtrace::Backtrace;

const DEFAULT_MAX_FRAMES: usize = 32;

/// Captures up to `max_frames` lines of the current thread's backtrace.
///
/// Frames are rendered via `Backtrace::force_capture`, which always
/// collects symbols regardless of `RUST_BACKTRACE`, since a tracing
/// listener that silently no-ops unless an env var happens to be set would
/// violate the "every diagnostic carries provenance" contract.
pub fn capture(max_frames: usize) -> Vec<String> {
    let backtrace = Backtrace::force_capture();
    format!("{backtrace:?}")
        .lines()
        .filter(|line| line.trim_start().starts_with(|c: char| c.is_ascii_digit()))
        .take(max_frames.max(1))
        .map(str::to_owned)
        .collect()
}

pub fn capture_default() -> Vec<String> {
    capture(DEFAULT_MAX_FRAMES)
}
