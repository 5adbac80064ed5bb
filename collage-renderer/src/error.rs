//! Renderer error types.

use collage_core::CollageError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while decoding, installing fonts or exporting.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An image source could not be read or decoded.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// A font payload contained no usable face.
    #[error("Font error: {0}")]
    Font(String),

    /// Rasterization or encoding failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl From<RenderError> for CollageError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Resource(msg) => CollageError::Decode(msg),
            RenderError::Font(msg) => CollageError::FontLoad(msg),
            RenderError::Export(msg) => CollageError::Render(msg),
        }
    }
}
