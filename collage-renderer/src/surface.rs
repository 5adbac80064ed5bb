//! In-memory software rendering surface.
//!
//! [`RasterSurface`] is the rendering authority for the editor. It caches
//! decoded stickers while an entity uses them, holds the painted entities and
//! the active selection, installs uploaded faces under their generated names
//! and rasterizes on demand.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use collage_core::{
    BackgroundColor, CanvasConfig, CollageError, CollageResult, DrawableEntity, EntityId, FontAsset,
    ImageSize, RenderSurface, SourceRef,
};
use usvg::fontdb;

use crate::error::RenderError;
use crate::export::{CollageExporter, Composition, ExportConfig};
use crate::image::{load_source, to_png_data_uri};

/// Options for building a [`RasterSurface`].
#[derive(Debug, Clone)]
pub struct SurfaceOptions {
    /// Directory relative sticker paths are resolved against.
    pub base_dir: Option<PathBuf>,
    /// Whether to load the system's installed fonts for built-in families.
    pub load_system_fonts: bool,
    /// Export scale factor.
    pub scale: f32,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            load_system_fonts: true,
            scale: 1.0,
        }
    }
}

/// Software surface that rasterizes with resvg.
pub struct RasterSurface {
    width: u32,
    height: u32,
    background: BackgroundColor,
    painted: Vec<DrawableEntity>,
    active: Option<EntityId>,
    sizes: HashMap<SourceRef, ImageSize>,
    data_uris: HashMap<SourceRef, String>,
    fontdb: Arc<fontdb::Database>,
    base_dir: Option<PathBuf>,
    exporter: CollageExporter,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("background", &self.background)
            .field("painted", &self.painted.len())
            .field("active", &self.active)
            .field("images", &self.sizes.len())
            .field("faces", &self.fontdb.len())
            .finish_non_exhaustive()
    }
}

impl RasterSurface {
    /// A surface sized for `config`.
    #[must_use]
    pub fn new(config: &CanvasConfig, options: SurfaceOptions) -> Self {
        let mut db = fontdb::Database::new();
        if options.load_system_fonts {
            db.load_system_fonts();
            tracing::debug!("Loaded {} system font faces", db.len());
        }

        Self {
            width: config.width(),
            height: config.height(),
            background: config.background(),
            painted: Vec::new(),
            active: None,
            sizes: HashMap::new(),
            data_uris: HashMap::new(),
            fontdb: Arc::new(db),
            base_dir: options.base_dir,
            exporter: CollageExporter::new(ExportConfig {
                scale: options.scale,
            }),
        }
    }

    /// Whether text can name `family` and get a face from this surface.
    #[must_use]
    pub fn has_font(&self, family: &str) -> bool {
        self.fontdb
            .query(&fontdb::Query {
                families: &[fontdb::Family::Name(family)],
                ..fontdb::Query::default()
            })
            .is_some()
    }

    /// Number of decoded image sources held.
    #[must_use]
    pub fn cached_images(&self) -> usize {
        self.sizes.len()
    }

    /// Render the current state to SVG.
    #[must_use]
    pub fn to_svg(&self) -> String {
        self.exporter.render_to_svg(&self.composition())
    }

    fn composition(&self) -> Composition<'_> {
        Composition {
            width: self.width,
            height: self.height,
            background: self.background,
            entities: &self.painted,
            images: &self.data_uris,
        }
    }

    /// Drop decoded pixels no painted entity refers to any more.
    fn evict_unused(&mut self, source: &SourceRef) {
        if self.painted.iter().any(|e| e.source() == Some(source)) {
            return;
        }
        if self.sizes.remove(source).is_some() {
            self.data_uris.remove(source);
            tracing::trace!("Evicted decoded {source}");
        }
    }
}

impl RenderSurface for RasterSurface {
    fn decode_image(&mut self, source: &SourceRef) -> CollageResult<ImageSize> {
        if let Some(size) = self.sizes.get(source) {
            return Ok(*size);
        }

        let texture = load_source(source, self.base_dir.as_deref())?;
        let data_uri = to_png_data_uri(&texture).map_err(|e| CollageError::Decode(e.to_string()))?;
        let size = texture.size();
        tracing::debug!("Decoded {source}: {}x{}", size.width, size.height);

        self.sizes.insert(source.clone(), size);
        self.data_uris.insert(source.clone(), data_uri);
        Ok(size)
    }

    fn register_font(&mut self, font: &FontAsset) -> CollageResult<()> {
        let data: Arc<dyn AsRef<[u8]> + Send + Sync> = font.data.clone();
        let db = Arc::make_mut(&mut self.fontdb);
        let loaded = db.load_font_source(fontdb::Source::Binary(data));
        if loaded.is_empty() {
            return Err(RenderError::Font(format!("{} contains no usable face", font.name)).into());
        }

        // Faces answer only to the generated name, so uploads sharing an
        // intrinsic family stay distinct.
        let mut installed = 0;
        for id in loaded {
            let Some(mut info) = db.face(id).cloned() else {
                continue;
            };
            db.remove_face(id);
            info.families = vec![(font.name.clone(), fontdb::Language::English_UnitedStates)];
            db.push_face_info(info);
            installed += 1;
        }

        tracing::debug!("Font {} installed ({installed} faces)", font.name);
        Ok(())
    }

    fn add(&mut self, entity: &DrawableEntity) {
        self.painted.retain(|e| e.id != entity.id);
        self.painted.push(entity.clone());
    }

    fn remove(&mut self, id: EntityId) {
        let Some(index) = self.painted.iter().position(|e| e.id == id) else {
            return;
        };
        let removed = self.painted.remove(index);
        if self.active == Some(id) {
            self.active = None;
        }
        if let Some(source) = removed.source() {
            self.evict_unused(source);
        }
    }

    fn update(&mut self, entity: &DrawableEntity) {
        if let Some(slot) = self.painted.iter_mut().find(|e| e.id == entity.id) {
            *slot = entity.clone();
        }
    }

    fn clear(&mut self) {
        self.painted.clear();
        self.active = None;
    }

    fn painted(&self) -> Vec<EntityId> {
        self.painted.iter().map(|e| e.id).collect()
    }

    fn active(&self) -> Option<EntityId> {
        self.active
    }

    fn set_active(&mut self, id: Option<EntityId>) {
        self.active = id.filter(|id| self.painted.iter().any(|e| e.id == *id));
    }

    fn background(&self) -> BackgroundColor {
        self.background
    }

    fn set_background(&mut self, background: BackgroundColor) {
        self.background = background;
    }

    fn rasterize(&mut self) -> CollageResult<Vec<u8>> {
        let png = self
            .exporter
            .render_to_png(&self.composition(), &self.fontdb)?;
        tracing::debug!(
            "Rasterized {} entities to {} bytes",
            self.painted.len(),
            png.len()
        );
        Ok(png)
    }
}
