/// Error types for the application
///
/// Nothing in the carousel itself can fail; these errors come from the
/// edges (config file, photo feed, image loading) and are logged and
/// absorbed by the caller.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered, but not with something usable
    #[error("photo feed returned {status}: {message}")]
    Feed { status: u16, message: String },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("could not decode image reference: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
