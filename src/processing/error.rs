use thiserror::Error;

/// Errors produced by the processing engine.
///
/// All variants are unrecoverable at the point of batch execution: the
/// orchestrator neither retries nor skips, so a single failing item aborts
/// the whole run and no partial archive is emitted.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The source bytes could not be decoded into a bitmap.
    #[error("failed to decode '{name}'")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// The encoder rejected the requested format or bitmap.
    #[error("failed to encode {format} output")]
    Encode {
        format: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An internal resize of a valid bitmap failed.
    #[error("failed to resize image buffer")]
    Resize(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The output archive could not be assembled.
    #[error("failed to build output archive")]
    Archive(#[from] zip::result::ZipError),

    /// A run was requested with an invalid configuration, detected before
    /// any source is opened.
    #[error("{0}")]
    Precondition(String),
}
