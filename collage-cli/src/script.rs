//! Session scripts.
//!
//! A script is a JSON document listing editor commands in order:
//!
//! ```json
//! {
//!   "commands": [
//!     { "op": "add_sticker", "index": 0 },
//!     { "op": "add_text", "content": "Hello" },
//!     { "op": "upload_font", "path": "fonts/Lobster.otf" },
//!     { "op": "choose_font", "index": 0 },
//!     { "op": "select", "layer": 0 },
//!     { "op": "key", "key": "d" },
//!     { "op": "move_forward", "layer": 1 },
//!     { "op": "clear_background" }
//!   ]
//! }
//! ```
//!
//! Layers are addressed by stack index, 0 being the bottom. Paths are
//! relative to the script's directory.

use std::path::{Path, PathBuf};

use collage_core::{Drawer, Editor, EntityId, RenderSurface, SourceRef};
use serde::Deserialize;

use crate::CliError;

/// A drawer name as written in scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawerName {
    /// Sticker drawer.
    Stickers,
    /// Layer drawer.
    Layers,
    /// Font drawer.
    Fonts,
}

impl From<DrawerName> for Drawer {
    fn from(name: DrawerName) -> Self {
        match name {
            DrawerName::Stickers => Drawer::Stickers,
            DrawerName::Layers => Drawer::Layers,
            DrawerName::Fonts => Drawer::Fonts,
        }
    }
}

/// One editor command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Add the catalog sticker at `index`.
    AddSticker {
        /// Position in the sticker drawer.
        index: usize,
    },
    /// Add an image file or data URI.
    AddImage {
        /// File path or `data:` URI.
        path: String,
    },
    /// Add text with the selected font.
    AddText {
        /// Text content.
        content: String,
    },
    /// Upload an `.otf` font file.
    UploadFont {
        /// Font file path.
        path: PathBuf,
    },
    /// Pick the `index`-th uploaded font.
    ChooseFont {
        /// Upload order, 0 = first.
        index: usize,
    },
    /// Select a layer, or clear the selection when `layer` is absent.
    Select {
        /// Stack index.
        #[serde(default)]
        layer: Option<usize>,
    },
    /// Press a key.
    Key {
        /// Key name, e.g. `Delete` or `d`.
        key: String,
    },
    /// Swap a layer with the one above.
    MoveForward {
        /// Stack index.
        layer: usize,
    },
    /// Swap a layer with the one below.
    MoveBackward {
        /// Stack index.
        layer: usize,
    },
    /// Make the background transparent.
    ClearBackground,
    /// Open or close a drawer.
    ToggleDrawer {
        /// Which drawer.
        drawer: DrawerName,
    },
}

/// A parsed session script.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Script {
    /// Commands in replay order.
    pub commands: Vec<Command>,
}

impl Script {
    /// Parse a script from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text is not a valid script.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] or [`CliError::Script`].
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("Failed to read {}", path.display()), e))?;
        Self::from_json(&json).map_err(|source| CliError::Script {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Outcome of a session.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    /// Commands that took effect.
    pub applied: usize,
    /// Commands that were refused or failed.
    pub skipped: usize,
    /// Layers on the canvas at export time.
    pub layers: usize,
    /// Diagnostics the editor recorded.
    pub diagnostics: Vec<String>,
    /// Where the export was written.
    pub output: Option<PathBuf>,
}

/// Replay every command against `editor`.
///
/// A command that fails is logged and counted; replay continues.
pub fn replay<S: RenderSurface>(editor: &mut Editor<S>, script: &Script, base: &Path) -> SessionReport {
    let mut report = SessionReport::default();

    for (step, command) in script.commands.iter().enumerate() {
        match apply(editor, command, base) {
            Ok(true) => report.applied += 1,
            Ok(false) => {
                tracing::warn!("Step {step}: {command:?} had no effect");
                report.skipped += 1;
            }
            Err(reason) => {
                tracing::warn!("Step {step}: {command:?} failed: {reason}");
                report.skipped += 1;
            }
        }
    }

    tracing::debug!(
        "Replayed {} commands ({} skipped)",
        script.commands.len(),
        report.skipped
    );
    report
}

fn layer<S: RenderSurface>(editor: &Editor<S>, index: usize) -> Result<EntityId, String> {
    editor
        .layers()
        .at(index)
        .map(|entity| entity.id)
        .ok_or_else(|| format!("no layer at index {index}"))
}

/// Script-relative paths become absolute so the surface never re-roots them
/// under its sticker directory.
fn resolve(base: &Path, path: &str) -> Result<SourceRef, String> {
    if path.starts_with("data:") || Path::new(path).is_absolute() {
        return Ok(SourceRef::new(path));
    }
    let full = std::path::absolute(base.join(path)).map_err(|e| format!("{path}: {e}"))?;
    Ok(SourceRef::new(full.to_string_lossy()))
}

/// Apply one command. `Ok(false)` means the editor ignored it.
fn apply<S: RenderSurface>(
    editor: &mut Editor<S>,
    command: &Command,
    base: &Path,
) -> Result<bool, String> {
    match command {
        Command::AddSticker { index } => editor
            .add_catalog_sticker(*index)
            .map(|_| true)
            .map_err(|e| e.to_string()),
        Command::AddImage { path } => editor
            .add_image(resolve(base, path)?)
            .map(|_| true)
            .map_err(|e| e.to_string()),
        Command::AddText { content } => Ok(editor.add_text(content).is_some()),
        Command::UploadFont { path } => {
            let full = base.join(path);
            let data = std::fs::read(&full).map_err(|e| format!("{}: {e}", full.display()))?;
            let file_name = full
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            editor
                .upload_font(&file_name, data)
                .map(|font| {
                    tracing::info!("Uploaded {file_name} as {}", font.name);
                    true
                })
                .map_err(|e| e.to_string())
        }
        Command::ChooseFont { index } => {
            let name = editor
                .fonts()
                .fonts()
                .get(*index)
                .map(|font| font.name.clone())
                .ok_or_else(|| format!("no uploaded font at index {index}"))?;
            Ok(editor.choose_font(&name))
        }
        Command::Select { layer: None } => Ok(editor.select(None)),
        Command::Select { layer: Some(index) } => {
            let id = layer(editor, *index)?;
            Ok(editor.select(Some(id)))
        }
        Command::Key { key } => Ok(editor.handle_key(key).is_some()),
        Command::MoveForward { layer: index } => {
            let id = layer(editor, *index)?;
            Ok(editor.move_forward(id))
        }
        Command::MoveBackward { layer: index } => {
            let id = layer(editor, *index)?;
            Ok(editor.move_backward(id))
        }
        Command::ClearBackground => {
            editor.clear_background();
            Ok(true)
        }
        Command::ToggleDrawer { drawer } => {
            editor.toggle_drawer((*drawer).into());
            Ok(true)
        }
    }
}
