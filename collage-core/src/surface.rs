//! The rendering surface contract.
//!
//! The surface is the rendering authority: it decodes images, paints entities,
//! owns the active selection and rasterizes the final image. The editor keeps
//! the [`LayerStack`](crate::LayerStack) in sync with it and only mirrors the
//! selection.

use crate::{BackgroundColor, CollageResult, DrawableEntity, EntityId, FontAsset, ImageSize, SourceRef};

/// Operations the editor needs from a rendering surface.
pub trait RenderSurface {
    /// Decode an image source and report its natural size.
    ///
    /// Must complete (or fail) before the caller creates an entity for it.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::Decode`](crate::CollageError::Decode) if the
    /// source cannot be read or decoded.
    fn decode_image(&mut self, source: &SourceRef) -> CollageResult<ImageSize>;

    /// Make an uploaded font usable by text entities under `font.name`.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::FontLoad`](crate::CollageError::FontLoad) if the
    /// payload contains no usable face.
    fn register_font(&mut self, font: &FontAsset) -> CollageResult<()>;

    /// Add an entity on top of everything already painted.
    fn add(&mut self, entity: &DrawableEntity);

    /// Remove an entity. Absent IDs are ignored.
    fn remove(&mut self, id: EntityId);

    /// Replace a painted entity with an updated copy, keeping its place.
    fn update(&mut self, entity: &DrawableEntity);

    /// Remove every entity. The background is kept.
    fn clear(&mut self);

    /// Entity IDs in paint order, bottom first.
    fn painted(&self) -> Vec<EntityId>;

    /// The active selection, if any.
    fn active(&self) -> Option<EntityId>;

    /// Set or clear the active selection.
    fn set_active(&mut self, id: Option<EntityId>);

    /// Current background.
    fn background(&self) -> BackgroundColor;

    /// Replace the background.
    fn set_background(&mut self, background: BackgroundColor);

    /// Flatten the current state into PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::Render`](crate::CollageError::Render) if
    /// rasterization or encoding fails.
    fn rasterize(&mut self) -> CollageResult<Vec<u8>>;
}
