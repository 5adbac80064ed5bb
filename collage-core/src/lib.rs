//! # Collage Core
//!
//! Model and editor logic for a sticker collage editor. Rendering is
//! delegated to a [`RenderSurface`] implementation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 collage-core                │
//! ├─────────────────────────────────────────────┤
//! │  Selector          │  Editor                │
//! │  - Dimensions      │  - Shortcuts           │
//! │  - Background      │  - Drawers             │
//! │                    │  - Layer panel         │
//! ├─────────────────────────────────────────────┤
//! │  Layer Stack       │  Object Factory        │
//! │  - Z-order swaps   │  Font Registry         │
//! │  - Change feed     │  Sticker Catalog       │
//! └─────────────────────────────────────────────┘
//!                       │
//!                 RenderSurface
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod diagnostic;
pub mod editor;
pub mod element;
pub mod error;
pub mod factory;
pub mod fonts;
pub mod layers;
pub mod shortcut;
pub mod sticker;
pub mod surface;

pub use config::{
    clamp_dimension, Axis, BackgroundColor, CanvasConfig, DimensionInput, Selector, MAX_DIMENSION,
    MIN_DIMENSION,
};
pub use diagnostic::{Diagnostic, DiagnosticLevel, Diagnostics};
pub use editor::{
    Drawer, Drawers, Editor, ExportedImage, LayerPanelItem, LayerPreview, EXPORT_FILE_NAME,
};
pub use element::{DrawableEntity, EntityId, EntityKind, ImageSize, Position, SourceRef};
pub use error::{CollageError, CollageResult};
pub use factory::ObjectFactory;
pub use fonts::{FontAsset, FontRegistry};
pub use layers::{LayerChange, LayerStack, SubscriptionId, DUPLICATE_OFFSET};
pub use shortcut::{ShortcutAction, ShortcutMap};
pub use sticker::StickerCatalog;
pub use surface::RenderSurface;

/// Collage core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
