//! Error types for office document translation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, translating, or saving a document.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read, or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// The input could not be resolved (missing file, no candidates, bad argument).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A part required by the document format is absent from the package.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or serialization error.
    #[error("XML error: {0}")]
    XmlError(String),

    /// The persisted translation cache could not be read or written.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// The translation endpoint failed or returned an unusable response.
    #[error("Oracle error: {0}")]
    OracleError(String),
}
