//! # Viewer Error Types
//!
//! Everything the viewer reports to its host.

use thiserror::Error;

/// Errors returned synchronously by viewer operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    /// A required argument was missing or out of range.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Configuration failed to parse or validate.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("cannot read configuration {path}: {reason}")]
    ConfigIo {
        /// File path.
        path: String,
        /// Underlying I/O error.
        reason: String,
    },
}

impl ViewerError {
    /// Shorthand for [`ViewerError::InvalidArgument`].
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for viewer operations.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Failure settlement of a camera operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraError {
    /// The camera canceled the flight before it finished.
    #[error("camera flight canceled")]
    FlightCanceled,

    /// The target produced no usable bounding volume.
    #[error("target has no resolvable bounding volume")]
    Unresolvable,

    /// The viewer was torn down before the operation settled.
    #[error("camera operation abandoned")]
    Abandoned,
}

/// A frame that failed inside the render boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("frame {frame} failed: {message}")]
pub struct RenderFailure {
    /// Frame number that failed.
    pub frame: u64,
    /// Error or panic message.
    pub message: String,
}

/// Error returned by scene collaborators.
pub type SceneError = Box<dyn std::error::Error + Send + Sync>;
