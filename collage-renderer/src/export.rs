//! Layer stack export to PNG.
//!
//! Builds an SVG document of the background and every entity in stack order,
//! then rasterizes it with resvg/tiny-skia. Text families are looked up in the
//! font database handed to [`CollageExporter::render_to_png`]; uploaded fonts
//! are installed there under their generated names.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use collage_core::{BackgroundColor, DrawableEntity, EntityKind, SourceRef};
use usvg::fontdb;

use crate::error::{RenderError, RenderResult};

/// Family appended after every requested font.
const FALLBACK_FAMILY: &str = "sans-serif";

/// Configuration for export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Scale factor (e.g. 2.0 for retina). Default 1.0.
    pub scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Copy)]
pub struct Composition<'a> {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Background painted under every entity.
    pub background: BackgroundColor,
    /// Entities bottom to top.
    pub entities: &'a [DrawableEntity],
    /// PNG data URI for each decoded image source.
    pub images: &'a HashMap<SourceRef, String>,
}

/// Flattens a [`Composition`] to SVG or PNG.
#[derive(Debug, Default)]
pub struct CollageExporter {
    config: ExportConfig,
}

impl CollageExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Export the composition to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(
        &self,
        composition: &Composition<'_>,
        fonts: &Arc<fontdb::Database>,
    ) -> RenderResult<Vec<u8>> {
        let svg = self.render_to_svg(composition);
        let pixmap = Self::rasterize_svg(&svg, fonts)?;

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the composition to an SVG string.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn render_to_svg(&self, composition: &Composition<'_>) -> String {
        let scale = self.config.scale;
        let view_w = composition.width.max(1);
        let view_h = composition.height.max(1);
        let out_w = ((view_w as f32 * scale) as u32).max(1);
        let out_h = ((view_h as f32 * scale) as u32).max(1);

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );

        let bg = composition.background;
        if !bg.is_transparent() {
            let _ = write!(
                svg,
                "<rect width=\"100%\" height=\"100%\" fill=\"rgb({},{},{})\" fill-opacity=\"{}\"/>",
                bg.r,
                bg.g,
                bg.b,
                bg.alpha.clamp(0.0, 1.0),
            );
        }

        for entity in composition.entities {
            render_entity_svg(&mut svg, entity, composition);
        }

        svg.push_str("</svg>");
        svg
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(svg: &str, fonts: &Arc<fontdb::Database>) -> RenderResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(fonts);

        let tree = usvg::Tree::from_str(svg, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let px_w = tree.size().width() as u32;
        let px_h = tree.size().height() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

/// Render a single entity to SVG.
fn render_entity_svg(svg: &mut String, entity: &DrawableEntity, composition: &Composition<'_>) {
    let pos = entity.position;

    match &entity.kind {
        EntityKind::Image { source, size } => {
            let Some(href) = composition.images.get(source) else {
                tracing::warn!("No decoded pixels for {source}; skipping entity {}", entity.id);
                return;
            };
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"none\" href=\"{href}\"/>",
                pos.x, pos.y, size.width, size.height,
            );
        }

        EntityKind::Text {
            content,
            font_family,
            font_size,
            color,
            ..
        } => {
            let escaped = escape_xml(content);
            let escaped_family = escape_xml(font_family);
            let escaped_color = escape_xml(color);
            // SVG text is positioned by baseline; entity positions are top-left.
            let baseline = pos.y + font_size;
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{baseline}\" font-size=\"{font_size}\" font-family=\"{escaped_family}, {FALLBACK_FAMILY}\" fill=\"{escaped_color}\" xml:space=\"preserve\">{escaped}</text>",
                pos.x,
            );
        }
    }

    tracing::trace!(
        "Render {} {} at ({}, {})",
        entity.kind_name(),
        entity.id,
        pos.x,
        pos.y
    );
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
