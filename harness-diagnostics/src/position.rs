/// Sentinel used by the compiler service to mean "no position available",
/// matching `javax.tools.Diagnostic.NOPOS`.
pub const NOPOS: i64 = -1;

/// A source position, or the absence of one.
///
/// All four fields use [`NOPOS`] uniformly to mean "unknown" rather than
/// `Option`, since that's the shape the wrapped compiler callback hands us
/// and re-deriving an `Option` at this layer would just move the sentinel
/// check one level up without adding anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub start: i64,
    pub end: i64,
    pub line: i64,
    pub column: i64,
}

impl Position {
    pub const NONE: Position = Position { start: NOPOS, end: NOPOS, line: NOPOS, column: NOPOS };

    pub fn new(start: i64, end: i64, line: i64, column: i64) -> Self {
        Self { start, end, line, column }
    }

    pub fn has_position(&self) -> bool {
        self.start != NOPOS
    }
}
