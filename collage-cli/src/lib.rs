//! # Collage CLI
//!
//! Headless host for the collage editor. Runs the selector stage from
//! command-line arguments, replays a JSON session script against the editor
//! and writes `canvas_export.png`.
//!
//! ## Usage
//!
//! ```bash
//! collage --width 800 --height 600 --color "#ffeedd" \
//!     --stickers ./stickers --script session.json --output ./out
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `SessionConfig` - Selector inputs, sticker directory and output location
//! - [`script`] - Session script commands and their replay

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod script;

use std::path::{Path, PathBuf};

use clap::Parser;
use collage_core::{
    Axis, CollageError, DimensionInput, Editor, Selector, SourceRef, StickerCatalog,
    EXPORT_FILE_NAME,
};
use collage_renderer::{RasterSurface, SurfaceOptions};
use thiserror::Error;

pub use script::{Command, Script, SessionReport};

/// Command-line arguments for collage.
#[derive(Debug, Clone, Parser)]
#[command(name = "collage")]
#[command(about = "Sticker collage editor: replay a session and export a PNG")]
#[command(version)]
pub struct CliArgs {
    /// Canvas width in pixels (100-3000; non-numeric input keeps the default)
    #[arg(long, env = "COLLAGE_WIDTH", default_value = "600")]
    pub width: String,

    /// Canvas height in pixels (100-3000; non-numeric input keeps the default)
    #[arg(long, env = "COLLAGE_HEIGHT", default_value = "400")]
    pub height: String,

    /// Background base colour as #rrggbb
    #[arg(long, env = "COLLAGE_COLOR", default_value = "#ffffff")]
    pub color: String,

    /// Background opacity percentage (0 = fully transparent)
    #[arg(long, env = "COLLAGE_TRANSPARENCY", default_value = "100")]
    pub transparency: i64,

    /// Directory whose *.png files form the sticker drawer
    #[arg(long, env = "COLLAGE_STICKERS_DIR")]
    pub stickers: Option<PathBuf>,

    /// JSON session script to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Directory the export is written to
    #[arg(long, env = "COLLAGE_OUTPUT_DIR", default_value = ".")]
    pub output: PathBuf,

    /// Skip loading installed system fonts
    #[arg(long)]
    pub no_system_fonts: bool,
}

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Raw width field text.
    pub width: String,
    /// Raw height field text.
    pub height: String,
    /// Background base colour.
    pub color: String,
    /// Background opacity percentage.
    pub transparency: i64,
    /// Sticker directory.
    pub stickers_dir: Option<PathBuf>,
    /// Script to replay.
    pub script: Option<PathBuf>,
    /// Export directory.
    pub output_dir: PathBuf,
    /// Whether to load system fonts into the surface.
    pub system_fonts: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// Create a new session configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: "600".to_string(),
            height: "400".to_string(),
            color: "#ffffff".to_string(),
            transparency: 100,
            stickers_dir: None,
            script: None,
            output_dir: PathBuf::from("."),
            system_fonts: true,
        }
    }
}

impl From<CliArgs> for SessionConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            color: args.color,
            transparency: args.transparency,
            stickers_dir: args.stickers,
            script: args.script,
            output_dir: args.output,
            system_fonts: !args.no_system_fonts,
        }
    }
}

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum CliError {
    /// Filesystem access failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being accessed.
        context: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The session script is not valid JSON for a script.
    #[error("Invalid session script {path}: {source}")]
    Script {
        /// Script location.
        path: PathBuf,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The editor rejected an operation that cannot be skipped.
    #[error(transparent)]
    Collage(#[from] CollageError),
}

impl CliError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Run the selector stage with the configured inputs.
///
/// # Errors
///
/// Returns [`CollageError::InvalidColor`] if the colour is not `#rrggbb`.
pub fn build_selector(config: &SessionConfig) -> Result<Selector, CollageError> {
    let mut selector = Selector::new();
    for (axis, raw) in [(Axis::Width, &config.width), (Axis::Height, &config.height)] {
        if selector.set_dimension_input(axis, raw) == DimensionInput::Ignored {
            tracing::warn!("Ignoring {axis:?} {raw:?}; keeping the default");
        }
    }
    selector.set_base_color(&config.color)?;
    selector.set_transparency(config.transparency);
    Ok(selector)
}

/// List the `*.png` files in `dir`, sorted by file name.
///
/// Sources are file names relative to `dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn load_sticker_catalog(dir: &Path) -> Result<StickerCatalog, CliError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| CliError::io(format!("Failed to read {}", dir.display()), e))?;

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| {
            Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect();
    names.sort();

    tracing::debug!("Found {} stickers in {}", names.len(), dir.display());
    Ok(StickerCatalog::from_sources(names.into_iter().map(SourceRef::new)))
}

/// Run a whole session and write the export.
///
/// Individual script commands that fail are reported and skipped; the
/// export is written regardless.
///
/// # Errors
///
/// Returns an error for an invalid colour, an unreadable sticker directory or
/// script, a failed export or an unwritable output directory.
pub fn run(config: &SessionConfig) -> Result<SessionReport, CliError> {
    let canvas = build_selector(config)?.accept();

    let stickers = match &config.stickers_dir {
        Some(dir) => load_sticker_catalog(dir)?,
        None => StickerCatalog::new(),
    };
    let surface = RasterSurface::new(
        &canvas,
        SurfaceOptions {
            base_dir: config.stickers_dir.clone(),
            load_system_fonts: config.system_fonts,
            ..SurfaceOptions::default()
        },
    );
    let mut editor = Editor::new(canvas, surface, stickers);

    let mut report = match &config.script {
        Some(path) => {
            let script = Script::load(path)?;
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            script::replay(&mut editor, &script, base)
        }
        None => SessionReport::default(),
    };

    let exported = editor.export_raster()?;
    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        CliError::io(
            format!("Failed to create {}", config.output_dir.display()),
            e,
        )
    })?;
    let path = config.output_dir.join(EXPORT_FILE_NAME);
    std::fs::write(&path, &exported.bytes)
        .map_err(|e| CliError::io(format!("Failed to write {}", path.display()), e))?;

    tracing::info!(
        "Wrote {} ({} layers, {} bytes)",
        path.display(),
        editor.layers().len(),
        exported.bytes.len()
    );
    report.layers = editor.layers().len();
    report.diagnostics = editor.diagnostics().iter().map(|d| d.message.clone()).collect();
    report.output = Some(path);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::parse_from(["collage"]);
        let config = SessionConfig::from(args);
        assert_eq!(config.width, "600");
        assert_eq!(config.height, "400");
        assert_eq!(config.transparency, 100);
        assert!(config.system_fonts);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_selector_clamps_and_ignores() {
        let config = SessionConfig {
            width: "5000".to_string(),
            height: "abc".to_string(),
            transparency: 150,
            ..SessionConfig::new()
        };
        let selector = build_selector(&config).expect("selector");
        assert_eq!(selector.width(), 3000);
        assert_eq!(selector.height(), 400);
        assert_eq!(selector.transparency(), 100);
    }

    #[test]
    fn test_bad_colour_rejected() {
        let config = SessionConfig {
            color: "red".to_string(),
            ..SessionConfig::new()
        };
        assert!(matches!(
            build_selector(&config),
            Err(CollageError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_sticker_catalog_sorted_png_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.png", "a.PNG", "notes.txt", "c.jpg"] {
            std::fs::write(dir.path().join(name), b"x").expect("write");
        }
        std::fs::create_dir(dir.path().join("d.png")).expect("dir");

        let catalog = load_sticker_catalog(dir.path()).expect("catalog");
        let names: Vec<&str> = catalog.sources().iter().map(SourceRef::as_str).collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
    }
}
