//! Canvas configuration and the dimension/background selector.
//!
//! The selector is the first stage of a session. It collects a width, a
//! height and a background colour, and `accept` turns it into the immutable
//! [`CanvasConfig`] the editor is built from.

use serde::{Deserialize, Serialize};

use crate::{CollageError, CollageResult};

/// Smallest accepted canvas dimension in pixels.
pub const MIN_DIMENSION: u32 = 100;

/// Largest accepted canvas dimension in pixels.
pub const MAX_DIMENSION: u32 = 3000;

/// Default canvas width.
pub const DEFAULT_WIDTH: u32 = 600;

/// Default canvas height.
pub const DEFAULT_HEIGHT: u32 = 400;

/// Clamp a dimension into `[MIN_DIMENSION, MAX_DIMENSION]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_dimension(value: i64) -> u32 {
    value.clamp(i64::from(MIN_DIMENSION), i64::from(MAX_DIMENSION)) as u32
}

/// Which canvas dimension an input targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Canvas width.
    Width,
    /// Canvas height.
    Height,
}

/// Outcome of feeding raw text into a dimension field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionInput {
    /// The input parsed and this clamped value was stored.
    Stored(u32),
    /// The input was not a number; the previous value is kept.
    Ignored,
}

/// An RGB colour with an alpha channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity, 0.0 (transparent) to 1.0 (opaque).
    pub alpha: f32,
}

impl BackgroundColor {
    /// Fully transparent background.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        alpha: 0.0,
    };

    /// Opaque white, the default background.
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        alpha: 1.0,
    };

    /// Build from base channels and a transparency percentage.
    ///
    /// The percentage is clamped to `[0, 100]` and divided by 100.
    #[must_use]
    pub fn from_percent(rgb: [u8; 3], transparency_percent: u8) -> Self {
        Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            alpha: f32::from(transparency_percent.min(100)) / 100.0,
        }
    }

    /// Whether nothing of the background is visible.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.alpha <= 0.0
    }

    /// RGBA bytes with the alpha scaled to `0..=255`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgba8(&self) -> [u8; 4] {
        let a = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.r, self.g, self.b, a]
    }
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl std::fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.alpha)
    }
}

/// Parse a `#rrggbb` colour (the leading `#` is optional).
///
/// # Errors
///
/// Returns [`CollageError::InvalidColor`] unless the input is six hex digits.
pub fn parse_hex_rgb(hex: &str) -> CollageResult<[u8; 3]> {
    let clean = hex.trim().trim_start_matches('#');
    if clean.len() != 6 || !clean.is_ascii() {
        return Err(CollageError::InvalidColor(hex.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&clean[range], 16).map_err(|_| CollageError::InvalidColor(hex.to_string()))
    };

    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// The canvas configuration handed from the selector to the editor.
///
/// Fields are private: once accepted the configuration cannot change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasConfig {
    width: u32,
    height: u32,
    background: BackgroundColor,
}

impl CanvasConfig {
    /// Canvas width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Initial background.
    #[must_use]
    pub fn background(&self) -> BackgroundColor {
        self.background
    }
}

/// Interactive selector for canvas size and background.
#[derive(Debug, Clone)]
pub struct Selector {
    width: u32,
    height: u32,
    base_color: [u8; 3],
    transparency: u8,
}

impl Default for Selector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector {
    /// A selector at 600×400, opaque white.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            base_color: [255, 255, 255],
            transparency: 100,
        }
    }

    /// Current width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current transparency percentage.
    #[must_use]
    pub fn transparency(&self) -> u8 {
        self.transparency
    }

    /// Store a dimension, silently clamped to `[100, 3000]`.
    pub fn set_dimension(&mut self, axis: Axis, value: i64) -> u32 {
        let clamped = clamp_dimension(value);
        if i64::from(clamped) != value {
            tracing::debug!("Clamped {axis:?} from {value} to {clamped}");
        }
        match axis {
            Axis::Width => self.width = clamped,
            Axis::Height => self.height = clamped,
        }
        clamped
    }

    /// Feed raw field text into a dimension.
    ///
    /// Integers are clamped; fractional numbers are truncated toward zero then
    /// clamped. Anything else (empty, non-numeric, NaN) is ignored and the
    /// previous value stays.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_dimension_input(&mut self, axis: Axis, raw: &str) -> DimensionInput {
        let trimmed = raw.trim();
        let parsed = trimmed.parse::<i64>().ok().or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v.trunc() as i64)
        });

        match parsed {
            Some(value) => DimensionInput::Stored(self.set_dimension(axis, value)),
            None => {
                tracing::debug!("Ignoring non-numeric {axis:?} input {raw:?}");
                DimensionInput::Ignored
            }
        }
    }

    /// Commit the final size of an interactive preview resize.
    ///
    /// Fractional pixels are truncated, then clamped like typed input.
    #[allow(clippy::cast_possible_truncation)]
    pub fn resize_preview(&mut self, width: f64, height: f64) {
        self.set_dimension(Axis::Width, width.trunc() as i64);
        self.set_dimension(Axis::Height, height.trunc() as i64);
    }

    /// Set the base colour from `#rrggbb`.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::InvalidColor`] and keeps the old colour if the
    /// string does not parse.
    pub fn set_base_color(&mut self, hex: &str) -> CollageResult<()> {
        self.base_color = parse_hex_rgb(hex)?;
        Ok(())
    }

    /// Set the transparency percentage, clamped to `[0, 100]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_transparency(&mut self, percent: i64) {
        self.transparency = percent.clamp(0, 100) as u8;
    }

    /// Background shown in the preview box; identical to what `accept` commits.
    #[must_use]
    pub fn preview_background(&self) -> BackgroundColor {
        BackgroundColor::from_percent(self.base_color, self.transparency)
    }

    /// Finish the selector stage.
    ///
    /// Consumes the selector, so the transition to the editor happens once.
    #[must_use]
    pub fn accept(self) -> CanvasConfig {
        let config = CanvasConfig {
            width: self.width,
            height: self.height,
            background: self.preview_background(),
        };
        tracing::info!(
            "Canvas accepted: {}x{} background {}",
            config.width,
            config.height,
            config.background
        );
        config
    }
}
