//! Error types for collage operations.

use thiserror::Error;

/// Result type for collage operations.
pub type CollageResult<T> = Result<T, CollageError>;

/// Errors that can occur in collage operations.
///
/// None of these are fatal to a session. An operation that fails leaves the
/// layer stack, font registry and rendering surface exactly as they were.
#[derive(Debug, Error)]
pub enum CollageError {
    /// Entity not found in the layer stack.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// An entity with this ID is already in the layer stack.
    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    /// The operation is not defined for this kind of entity.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// No sticker at this catalog index.
    #[error("Sticker not found: #{0}")]
    StickerNotFound(usize),

    /// An image source could not be decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// A font payload could not be read or registered.
    #[error("Failed to load font: {0}")]
    FontLoad(String),

    /// A base colour string was not `#rrggbb`.
    #[error("Invalid colour: {0}")]
    InvalidColor(String),

    /// The rendering surface failed.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
