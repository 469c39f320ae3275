//! Error types for the chapter catalog

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A chapter was defined without slides
    #[error("chapter {chapter} has no slides")]
    NoSlides { chapter: u32 },

    /// A quiz needs at least two options to be a choice
    #[error("quiz needs at least two options, found {found}")]
    TooFewOptions { found: usize },

    /// The correct answer does not point at an option
    #[error("correct option {index} is out of range for {options} options")]
    CorrectIndexOutOfRange { index: usize, options: usize },

    /// A chapter's quiz failed validation
    #[error("chapter {chapter} has an invalid quiz: {source}")]
    InvalidQuiz {
        chapter: u32,
        #[source]
        source: Box<CatalogError>,
    },

    /// Two modules share an id
    #[error("duplicate module id {0}")]
    DuplicateModule(u32),

    /// Two chapters in one module share an id
    #[error("duplicate chapter id {chapter} in module {module}")]
    DuplicateChapter { module: u32, chapter: u32 },

    /// Catalog file could not be read
    #[error("failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid JSON or fails validation
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}
