//! Drawable entities - the images and text placed on the canvas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entity.
///
/// Stable for the lifetime of the session; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Create a new unique entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an image entity's pixels come from: a file path or a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(String);

impl SourceRef {
    /// Wrap a path or URI.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// The raw source string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this source is an inline `data:` URI.
    #[must_use]
    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-left position in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Pixels from the left edge.
    pub x: f32,
    /// Pixels from the top edge.
    pub y: f32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// This position moved by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// The type of content an entity draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EntityKind {
    /// A sticker or uploaded bitmap.
    Image {
        /// Retained so thumbnails can be regenerated without asking the surface.
        source: SourceRef,
        /// Natural size reported by the decoder.
        size: ImageSize,
    },

    /// Editable text.
    Text {
        /// Text content.
        content: String,
        /// Registered font name or a built-in family.
        font_family: String,
        /// Font size in pixels.
        font_size: f32,
        /// Fill colour as hex.
        color: String,
        /// Whether the text can be edited in place on the canvas.
        editable_in_place: bool,
    },
}

/// A drawable entity with content and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawableEntity {
    /// Unique identifier.
    pub id: EntityId,
    /// Content type.
    pub kind: EntityKind,
    /// Top-left position.
    pub position: Position,
    /// Whether the user can select and transform this entity.
    pub selectable: bool,
}

impl DrawableEntity {
    /// Create a selectable entity with a fresh ID.
    #[must_use]
    pub fn new(kind: EntityKind, position: Position) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            position,
            selectable: true,
        }
    }

    /// Whether this is an image entity.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self.kind, EntityKind::Image { .. })
    }

    /// Whether this is a text entity.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, EntityKind::Text { .. })
    }

    /// Short kind name for logs and diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            EntityKind::Image { .. } => "image",
            EntityKind::Text { .. } => "text",
        }
    }

    /// The image source, if this is an image entity.
    #[must_use]
    pub fn source(&self) -> Option<&SourceRef> {
        match &self.kind {
            EntityKind::Image { source, .. } => Some(source),
            EntityKind::Text { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_position_offset() {
        let moved = Position::new(10.0, 20.0).offset(10.0, 10.0);
        assert_eq!(moved, Position::new(20.0, 30.0));
    }

    #[test]
    fn test_source_ref_data_uri() {
        assert!(SourceRef::new("data:image/png;base64,AAAA").is_data_uri());
        assert!(!SourceRef::new("stickers/cat.png").is_data_uri());
    }

    #[test]
    fn test_entity_serialization_tags_kind() {
        let entity = DrawableEntity::new(
            EntityKind::Text {
                content: "hi".to_string(),
                font_family: "Arial".to_string(),
                font_size: 30.0,
                color: "#000000".to_string(),
                editable_in_place: true,
            },
            Position::new(50.0, 50.0),
        );
        let json = serde_json::to_value(&entity).expect("serialize");
        assert_eq!(json["kind"]["type"], "Text");
        assert_eq!(json["selectable"], true);
        assert_eq!(entity.kind_name(), "text");
        assert!(entity.source().is_none());
    }
}
