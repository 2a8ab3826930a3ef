/// Mirrors the compiler service's notion of a diagnostic's severity.
///
/// Ordering follows severity, most severe first, so a `Vec<DiagnosticKind>`
/// can be sorted to put errors ahead of notes without a custom comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    Error,
    Warning,
    MandatoryWarning,
    Note,
    Other,
}

impl DiagnosticKind {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning | Self::MandatoryWarning)
    }

    /// The `log` crate severity this diagnostic kind is emitted at, when the
    /// listener is configured to log.
    pub fn log_level(&self) -> log::Level {
        match self {
            Self::Error => log::Level::Error,
            Self::Warning | Self::MandatoryWarning => log::Level::Warn,
            Self::Note => log::Level::Info,
            Self::Other => log::Level::Debug,
        }
    }
}

impl core::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::MandatoryWarning => "mandatory warning",
            Self::Note => "note",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}
