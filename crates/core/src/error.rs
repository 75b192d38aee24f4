//! Error types for slide deck rendering.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// The request is not valid JSON or lacks the `contentSlides` shape.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// `chartData.type` does not name a known chart kind.
    #[error("Unsupported chart kind: {0}")]
    UnsupportedChartKind(String),

    /// An image could not be retrieved.
    #[error("Failed to fetch image '{url}': {reason}")]
    ImageFetch { url: String, reason: String },

    /// The HTTP client used for image retrieval could not be set up.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// A picture, table or chart could not be built.
    #[error("Shape construction error: {0}")]
    ShapeConstruction(String),

    /// The finished document could not be written to bytes.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A presentation package could not be read back.
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than by
    /// the renderer or one of its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MalformedRequest(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedRequest(err.to_string())
    }
}
