//! The editor surface: composition root of the canvas stage.
//!
//! Owns the layer stack, font registry, object factory, drawer flags and
//! diagnostics, and keeps the rendering surface in step with the stack after
//! every mutation. The active selection belongs to the surface; the editor
//! only reads and writes it through [`RenderSurface::active`] and
//! [`RenderSurface::set_active`].

use crate::diagnostic::Diagnostics;
use crate::{
    BackgroundColor, CanvasConfig, CollageError, CollageResult, DrawableEntity, EntityId,
    EntityKind, FontAsset, FontRegistry, LayerChange, LayerStack, ObjectFactory, RenderSurface,
    ShortcutAction, ShortcutMap, SourceRef, StickerCatalog, SubscriptionId,
};

/// File name offered for the exported image.
pub const EXPORT_FILE_NAME: &str = "canvas_export.png";

/// The slide-out drawers of the canvas stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drawer {
    /// Sticker thumbnails.
    Stickers,
    /// Layer list with reorder buttons.
    Layers,
    /// Font upload and picker.
    Fonts,
}

/// Open/closed state of each drawer. All start closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drawers {
    stickers: bool,
    layers: bool,
    fonts: bool,
}

impl Drawers {
    /// Whether a drawer is open.
    #[must_use]
    pub fn is_open(&self, drawer: Drawer) -> bool {
        match drawer {
            Drawer::Stickers => self.stickers,
            Drawer::Layers => self.layers,
            Drawer::Fonts => self.fonts,
        }
    }

    /// Flip a drawer and return its new state.
    pub fn toggle(&mut self, drawer: Drawer) -> bool {
        let flag = match drawer {
            Drawer::Stickers => &mut self.stickers,
            Drawer::Layers => &mut self.layers,
            Drawer::Fonts => &mut self.fonts,
        };
        *flag = !*flag;
        *flag
    }
}

/// What the layer panel shows for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerPreview {
    /// Thumbnail regenerated from the retained source.
    Image(SourceRef),
    /// The text content.
    Text(String),
}

/// One row of the layer panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPanelItem {
    /// Entity shown in this row.
    pub id: EntityId,
    /// Stack index, 0 = bottom.
    pub index: usize,
    /// Preview content.
    pub preview: LayerPreview,
    /// Whether this is the active selection.
    pub selected: bool,
}

/// A flattened image ready to hand to the user.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    /// Suggested file name.
    pub file_name: &'static str,
    /// PNG bytes.
    pub bytes: Vec<u8>,
}

/// The canvas-stage editor.
#[derive(Debug)]
pub struct Editor<S: RenderSurface> {
    config: CanvasConfig,
    surface: S,
    layers: LayerStack,
    fonts: FontRegistry,
    factory: ObjectFactory,
    stickers: StickerCatalog,
    drawers: Drawers,
    selected_font: Option<String>,
    diagnostics: Diagnostics,
}

impl<S: RenderSurface> Editor<S> {
    /// Build the editor for an accepted configuration.
    pub fn new(config: CanvasConfig, surface: S, stickers: StickerCatalog) -> Self {
        let factory = ObjectFactory::new(&config);
        Self::with_factory(config, surface, stickers, factory)
    }

    /// Build the editor with a specific object factory.
    pub fn with_factory(
        config: CanvasConfig,
        mut surface: S,
        stickers: StickerCatalog,
        factory: ObjectFactory,
    ) -> Self {
        surface.clear();
        surface.set_active(None);
        surface.set_background(config.background());
        tracing::debug!(
            "Editor mounted: {}x{}, {} stickers",
            config.width(),
            config.height(),
            stickers.len()
        );

        Self {
            config,
            surface,
            layers: LayerStack::new(),
            fonts: FontRegistry::new(),
            factory,
            stickers,
            drawers: Drawers::default(),
            selected_font: None,
            diagnostics: Diagnostics::default(),
        }
    }

    /// The configuration the editor was built from.
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// The layer stack.
    #[must_use]
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// The font registry.
    #[must_use]
    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// The sticker catalog.
    #[must_use]
    pub fn stickers(&self) -> &StickerCatalog {
        &self.stickers
    }

    /// The rendering surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Reported failures.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Font used for new text, if one has been picked.
    #[must_use]
    pub fn selected_font(&self) -> Option<&str> {
        self.selected_font.as_deref()
    }

    /// Drawer flags.
    #[must_use]
    pub fn drawers(&self) -> Drawers {
        self.drawers
    }

    /// Open or close a drawer; returns the new state.
    pub fn toggle_drawer(&mut self, drawer: Drawer) -> bool {
        let open = self.drawers.toggle(drawer);
        tracing::debug!("{drawer:?} drawer {}", if open { "opened" } else { "closed" });
        open
    }

    /// Subscribe to layer stack changes (the layer panel redraws on these).
    pub fn subscribe_layers(&mut self, listener: impl FnMut(&LayerChange) + 'static) -> SubscriptionId {
        self.layers.subscribe(listener)
    }

    /// Drop a layer stack subscription.
    pub fn unsubscribe_layers(&mut self, id: SubscriptionId) -> bool {
        self.layers.unsubscribe(id)
    }

    /// The active selection, as reported by the surface.
    #[must_use]
    pub fn selection(&self) -> Option<EntityId> {
        self.surface.active().filter(|id| self.layers.contains(*id))
    }

    /// Select an entity, or clear the selection with `None`.
    ///
    /// Returns `false` and leaves the selection alone if the entity is absent
    /// or not selectable.
    pub fn select(&mut self, id: Option<EntityId>) -> bool {
        match id {
            None => {
                self.surface.set_active(None);
                true
            }
            Some(id) if self.layers.get(id).is_some_and(|e| e.selectable) => {
                self.surface.set_active(Some(id));
                true
            }
            Some(_) => false,
        }
    }

    /// Add the catalog sticker at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::StickerNotFound`] or the decode error.
    pub fn add_catalog_sticker(&mut self, index: usize) -> CollageResult<EntityId> {
        let Some(source) = self.stickers.get(index).cloned() else {
            let err = CollageError::StickerNotFound(index);
            self.diagnostics.warn(err.to_string());
            return Err(err);
        };
        self.add_image(source)
    }

    /// Decode `source` and add it as a new top-most image entity.
    ///
    /// The entity is only created once decoding has finished.
    ///
    /// # Errors
    ///
    /// Returns the decode error; the stack and surface are unchanged.
    pub fn add_image(&mut self, source: SourceRef) -> CollageResult<EntityId> {
        let entity = match self.factory.create_image_entity(source.clone(), &mut self.surface) {
            Ok(entity) => entity,
            Err(err) => {
                self.diagnostics
                    .error(format!("Failed to load image {source}: {err}"));
                return Err(err);
            }
        };

        let id = self.layers.append(entity)?;
        self.paint(id);
        Ok(id)
    }

    /// Add editable text using the selected font and select it.
    ///
    /// Blank content is ignored and returns `None`.
    pub fn add_text(&mut self, content: &str) -> Option<EntityId> {
        let entity = self
            .factory
            .create_text_entity(content, self.selected_font.as_deref())?;

        let id = self.layers.append(entity).ok()?;
        self.paint(id);
        self.surface.set_active(Some(id));
        Some(id)
    }

    fn paint(&mut self, id: EntityId) {
        if let Some(entity) = self.layers.get(id) {
            self.surface.add(entity);
        }
    }

    /// Remove an entity. Absent IDs are a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<DrawableEntity> {
        let entity = self.layers.remove(id)?;
        if self.surface.active() == Some(id) {
            self.surface.set_active(None);
        }
        self.surface.remove(id);
        Some(entity)
    }

    /// Remove the active selection, if any, and clear the selection.
    pub fn delete_selection(&mut self) -> Option<DrawableEntity> {
        let id = self.selection()?;
        self.remove(id)
    }

    /// Duplicate an image entity directly above itself and select the copy.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::UnsupportedOperation`] for text entities and
    /// [`CollageError::EntityNotFound`] for absent IDs; both are also
    /// recorded as warnings.
    pub fn duplicate(&mut self, id: EntityId) -> CollageResult<EntityId> {
        match self.layers.duplicate(id) {
            Ok(copy) => {
                self.rebuild_surface();
                self.surface.set_active(Some(copy));
                Ok(copy)
            }
            Err(err) => {
                self.diagnostics.warn(err.to_string());
                Err(err)
            }
        }
    }

    /// Duplicate the active selection. Without a selection this is a no-op.
    pub fn duplicate_selection(&mut self) -> Option<EntityId> {
        let id = self.selection()?;
        self.duplicate(id).ok()
    }

    /// Swap an entity with the one above it. No-op at the top.
    pub fn move_forward(&mut self, id: EntityId) -> bool {
        let moved = self.layers.move_forward(id);
        if moved {
            self.rebuild_surface();
        }
        moved
    }

    /// Swap an entity with the one below it. No-op at the bottom.
    pub fn move_backward(&mut self, id: EntityId) -> bool {
        let moved = self.layers.move_backward(id);
        if moved {
            self.rebuild_surface();
        }
        moved
    }

    /// Clear the surface and re-add every entity in stack order.
    fn rebuild_surface(&mut self) {
        let active = self.surface.active();
        self.surface.clear();
        for entity in self.layers.render_order() {
            self.surface.add(entity);
        }
        self.surface.set_active(active);
        tracing::trace!("Surface rebuilt with {} entities", self.layers.len());
    }

    /// Register an uploaded font file with the surface and the registry.
    ///
    /// Only `.otf` files are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::FontLoad`] for a wrong extension, a
    /// non-OpenType payload or a surface that cannot use it. Nothing is
    /// registered in that case.
    pub fn upload_font(&mut self, file_name: &str, data: Vec<u8>) -> CollageResult<FontAsset> {
        if !crate::fonts::accepts_file_name(file_name) {
            let err = CollageError::FontLoad(format!("{file_name} is not an .otf file"));
            self.diagnostics.warn(err.to_string());
            return Err(err);
        }

        let surface = &mut self.surface;
        match self.fonts.register_with(data, |asset| surface.register_font(asset)) {
            Ok(asset) => Ok(asset),
            Err(err) => {
                self.diagnostics
                    .error(format!("Failed to load font {file_name}: {err}"));
                Err(err)
            }
        }
    }

    /// Pick a font in the font drawer.
    ///
    /// It becomes the font for new text and is applied to the selection if the
    /// selection is text. Returns `false` for unknown names.
    pub fn choose_font(&mut self, name: &str) -> bool {
        if self.fonts.get(name).is_none() {
            return false;
        }
        self.selected_font = Some(name.to_string());
        if let Some(id) = self.selection() {
            self.apply_font(id, name);
        }
        true
    }

    /// Set the font of a text entity.
    ///
    /// No-op (returns `false`) unless `id` is the active selection, it is a
    /// text entity and `font_name` is registered.
    pub fn apply_font(&mut self, id: EntityId, font_name: &str) -> bool {
        if self.selection() != Some(id) || self.fonts.get(font_name).is_none() {
            return false;
        }
        if !self.layers.get(id).is_some_and(DrawableEntity::is_text) {
            return false;
        }

        self.layers.update(id, |entity| {
            if let EntityKind::Text { font_family, .. } = &mut entity.kind {
                font_family.clear();
                font_family.push_str(font_name);
            }
        });
        if let Some(entity) = self.layers.get(id) {
            self.surface.update(entity);
        }
        true
    }

    /// Make the background fully transparent. Entities are untouched.
    pub fn clear_background(&mut self) {
        self.surface.set_background(BackgroundColor::TRANSPARENT);
        tracing::debug!("Background cleared");
    }

    /// Current background of the surface.
    #[must_use]
    pub fn background(&self) -> BackgroundColor {
        self.surface.background()
    }

    /// Rasterize exactly what is on the surface now.
    ///
    /// # Errors
    ///
    /// Returns the surface's render error, also recorded as a diagnostic.
    pub fn export_raster(&mut self) -> CollageResult<ExportedImage> {
        match self.surface.rasterize() {
            Ok(bytes) => {
                tracing::info!("Exported {EXPORT_FILE_NAME} ({} bytes)", bytes.len());
                Ok(ExportedImage {
                    file_name: EXPORT_FILE_NAME,
                    bytes,
                })
            }
            Err(err) => {
                self.diagnostics.error(format!("Export failed: {err}"));
                Err(err)
            }
        }
    }

    /// Handle a key press. Returns the action run, if the key is bound.
    pub fn handle_key(&mut self, key: &str) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key)?;
        match action {
            ShortcutAction::Delete => {
                self.delete_selection();
            }
            ShortcutAction::Duplicate => {
                self.duplicate_selection();
            }
        }
        Some(action)
    }

    /// Rows of the layer panel, top-most entity first.
    #[must_use]
    pub fn layer_panel(&self) -> Vec<LayerPanelItem> {
        let active = self.selection();
        let top = self.layers.len();
        self.layers
            .panel_order()
            .enumerate()
            .map(|(row, entity)| LayerPanelItem {
                id: entity.id,
                index: top - 1 - row,
                preview: match &entity.kind {
                    EntityKind::Image { source, .. } => LayerPreview::Image(source.clone()),
                    EntityKind::Text { content, .. } => LayerPreview::Text(content.clone()),
                },
                selected: active == Some(entity.id),
            })
            .collect()
    }
}
