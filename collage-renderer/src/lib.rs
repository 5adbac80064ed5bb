//! # Collage Renderer
//!
//! Software rendering surface for the collage editor, built on resvg and
//! tiny-skia. No GPU or window is required.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Layer stack  │──▶│ SVG document │──▶│ tiny-skia    │──▶ PNG
//! │ + background │   │ + fontdb     │   │ Pixmap       │
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;
pub mod surface;

pub use error::{RenderError, RenderResult};
pub use export::{CollageExporter, Composition, ExportConfig};
pub use crate::image::{layer_thumbnail, load_source, TextureData, THUMBNAIL_SIZE};
pub use surface::{RasterSurface, SurfaceOptions};
