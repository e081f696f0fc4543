//! Error types for splitting presentations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, trimming or writing presentations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read an input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The source presentation could not be read.
    #[error("Failed to read source '{name}': {source}")]
    SourceRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Temporary storage could not be allocated or written.
    #[error("Failed to write temporary file '{}': {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or rewriting error.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// The archive is a ZIP file but not a usable presentation package.
    #[error("Invalid presentation package: {0}")]
    InvalidPackage(String),

    /// No strategy could determine a mimetype for the source.
    #[error("Cannot determine a mimetype: {0}")]
    MimetypeNotFound(String),

    /// A slide position outside of the presentation was requested.
    #[error("Slide position {position} is out of range (presentation has {count} slides)")]
    SlideOutOfRange { position: usize, count: usize },

    /// Processing a single slide failed.
    #[error("Failed to extract slide {} into '{}': {source}", index + 1, path.display())]
    Slide {
        /// 0-based index of the slide in the source presentation.
        index: usize,
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// The operation exists but is deliberately unsupported.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source is not a readable presentation, or its mimetype is unknown.
    Read,
    /// Temporary storage failed.
    Io,
    /// An unsupported operation was invoked.
    NotImplemented,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IoError(_) | Error::Storage { .. } => ErrorKind::Io,
            Error::SourceRead { .. }
            | Error::ZipError(_)
            | Error::XmlError(_)
            | Error::InvalidPackage(_)
            | Error::MimetypeNotFound(_)
            | Error::SlideOutOfRange { .. } => ErrorKind::Read,
            Error::Slide { source, .. } => source.kind(),
            Error::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }

    /// Attach slide context to an error raised while processing one slide.
    pub fn for_slide(self, index: usize, path: impl Into<PathBuf>) -> Self {
        Error::Slide {
            index,
            path: path.into(),
            source: Box::new(self),
        }
    }
}
