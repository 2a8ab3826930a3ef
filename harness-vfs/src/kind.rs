use std::path::Path;

/// The kind of a file object, derived purely from its path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Source,
    Class,
    Html,
    Other,
}

impl FileKind {
    /// The extension (without leading dot) a file of this kind is expected
    /// to have. `Other` has no canonical extension since it's a catch-all.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Source => "java",
            Self::Class => "class",
            Self::Html => "html",
            Self::Other => "",
        }
    }

    /// Derives the kind from a path's extension. Pure and infallible: any
    /// extension this harness doesn't specifically recognize is `Other`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("java") => Self::Source,
            Some("class") => Self::Class,
            Some("html") | Some("htm") => Self::Html,
            _ => Self::Other,
        }
    }
}
