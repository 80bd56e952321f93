//! Stapel error handling

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Error types within Stapel
#[derive(std::fmt::Debug)]
pub enum StapelError {
    /// A requested directory does not exist or is not a directory
    DirectoryNotFound(PathBuf),
    /// No recognized image files in the scanned directories
    EmptyDirectory,
    /// A file matched by extension but its content did not decode
    DecodeFailure(Arc<image::error::ImageError>),
    /// Errors interacting with I/O
    IoError(std::io::Error),
}

/// Result type for `StapelError`
pub type StapelResult<T> = Result<T, StapelError>;

impl fmt::Display for StapelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            StapelError::DirectoryNotFound(path) => {
                write!(f, "Directory not found: {}", path.display())
            }
            StapelError::EmptyDirectory => {
                write!(f, "No image files found in the given directories")
            }
            StapelError::DecodeFailure(err) => write!(f, "Failed to decode image: {}", err),
            StapelError::IoError(err) => write!(f, "{}", err),
        }
    }
}

impl Error for StapelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StapelError::DirectoryNotFound(_) => None,
            StapelError::EmptyDirectory => None,
            StapelError::DecodeFailure(err) => Some(err.as_ref()),
            StapelError::IoError(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StapelError {
    fn from(err: std::io::Error) -> Self {
        StapelError::IoError(err)
    }
}

impl From<image::error::ImageError> for StapelError {
    fn from(err: image::error::ImageError) -> Self {
        StapelError::DecodeFailure(Arc::new(err))
    }
}
