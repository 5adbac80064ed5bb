//! Object factory: builds entities with default placement and affordances.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{CanvasConfig, CollageResult, DrawableEntity, EntityKind, Position, RenderSurface, SourceRef};

/// Room kept between a new sticker's origin and the right/bottom edges.
pub const PLACEMENT_MARGIN: f32 = 100.0;

/// Where new text lands.
pub const TEXT_POSITION: Position = Position { x: 50.0, y: 50.0 };

/// Font size for new text.
pub const DEFAULT_FONT_SIZE: f32 = 30.0;

/// Font family when none is selected.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Fill colour for new text.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Creates image and text entities for a canvas of a given size.
#[derive(Debug)]
pub struct ObjectFactory {
    width: f32,
    height: f32,
    rng: StdRng,
}

impl ObjectFactory {
    /// A factory placing entities on `config`'s canvas.
    #[must_use]
    pub fn new(config: &CanvasConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// A factory with reproducible placement.
    #[must_use]
    pub fn with_seed(config: &CanvasConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    #[allow(clippy::cast_precision_loss)]
    fn with_rng(config: &CanvasConfig, rng: StdRng) -> Self {
        Self {
            width: config.width() as f32,
            height: config.height() as f32,
            rng,
        }
    }

    /// Random origin in `[0, width - 100] × [0, height - 100]`.
    pub fn random_position(&mut self) -> Position {
        let max_x = (self.width - PLACEMENT_MARGIN).max(0.0);
        let max_y = (self.height - PLACEMENT_MARGIN).max(0.0);
        Position::new(self.rng.gen_range(0.0..=max_x), self.rng.gen_range(0.0..=max_y))
    }

    /// Decode `source` on the surface and build an image entity for it.
    ///
    /// # Errors
    ///
    /// Returns the surface's decode error; no entity is created in that case.
    pub fn create_image_entity<S: RenderSurface + ?Sized>(
        &mut self,
        source: SourceRef,
        surface: &mut S,
    ) -> CollageResult<DrawableEntity> {
        let size = surface.decode_image(&source)?;
        let position = self.random_position();
        Ok(DrawableEntity::new(EntityKind::Image { source, size }, position))
    }

    /// Build an editable text entity.
    ///
    /// Returns `None` for empty or whitespace-only content. Without a font the
    /// family defaults to [`DEFAULT_FONT_FAMILY`].
    #[must_use]
    pub fn create_text_entity(&self, content: &str, font_family: Option<&str>) -> Option<DrawableEntity> {
        if content.trim().is_empty() {
            return None;
        }

        Some(DrawableEntity::new(
            EntityKind::Text {
                content: content.to_string(),
                font_family: font_family.unwrap_or(DEFAULT_FONT_FAMILY).to_string(),
                font_size: DEFAULT_FONT_SIZE,
                color: DEFAULT_TEXT_COLOR.to_string(),
                editable_in_place: true,
            },
            TEXT_POSITION,
        ))
    }
}
