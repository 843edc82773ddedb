//! Error types for EPUB build operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building an EPUB package.
///
/// Every variant is fatal to the build that raised it. By the time an
/// error reaches the caller the build workspace has already been removed
/// and no archive exists at the destination path.
#[derive(Error, Debug)]
pub enum Error {
    /// The temporary workspace could not be created, populated or removed.
    #[error("environment error: {context}: {source}")]
    Environment {
        context: String,
        #[source]
        source: io::Error,
    },

    /// A page image could not be decoded or re-encoded.
    #[error("cannot process image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The cover could not be composed (font, shaping, SVG or raster failure).
    #[error("render error: {0}")]
    Render(String),

    /// The archive could not be written or moved into place.
    #[error("archive error: {0}")]
    Archive(String),

    /// The request cannot be built (missing or empty source, bad options).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn environment(context: impl Into<String>, source: io::Error) -> Self {
        Error::Environment {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Error::ImageDecode {
            path: path.into(),
            source,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Archive(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
