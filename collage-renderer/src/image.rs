//! Image loading utilities.
//!
//! Stickers come from files on disk or from base64/percent-encoded data URIs.
//! Decoded pixels are kept as RGBA and re-encoded as PNG for embedding in the
//! export document.

use std::path::Path;

use base64::Engine;
use collage_core::{ImageSize, SourceRef};
use image::ImageEncoder;

use crate::error::{RenderError, RenderResult};

/// Largest edge of a layer panel thumbnail.
pub const THUMBNAIL_SIZE: u32 = 50;

/// Decoded RGBA pixels.
#[derive(Debug, Clone)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
}

impl TextureData {
    /// Pixel dimensions.
    #[must_use]
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Load an image from raw bytes.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn load_image_from_bytes(data: &[u8]) -> RenderResult<TextureData> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(TextureData {
        width,
        height,
        data: rgba.into_raw(),
    })
}

/// Load an image from a data URI.
///
/// Supports `data:image/png;base64,iVBORw0KGgo...` as well as
/// percent-encoded payloads.
///
/// # Errors
///
/// Returns an error if the data URI is malformed or the image cannot be decoded.
pub fn load_image_from_data_uri(uri: &str) -> RenderResult<TextureData> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    let (metadata, encoded_data) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    let bytes = if metadata.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data)
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?
    } else {
        percent_decode(encoded_data)?
    };

    load_image_from_bytes(&bytes)
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

/// Load the pixels behind a source reference.
///
/// Relative paths are resolved against `base_dir` when given.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the file cannot be read or decoded.
pub fn load_source(source: &SourceRef, base_dir: Option<&Path>) -> RenderResult<TextureData> {
    if source.is_data_uri() {
        return load_image_from_data_uri(source.as_str());
    }

    let path = Path::new(source.as_str());
    let path = match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    };

    let bytes = std::fs::read(&path)
        .map_err(|e| RenderError::Resource(format!("Failed to read {}: {e}", path.display())))?;
    load_image_from_bytes(&bytes)
}

/// Encode texture data as PNG.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
pub fn encode_png(texture: &TextureData) -> RenderResult<Vec<u8>> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            &texture.data,
            texture.width,
            texture.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Encode texture data as a `data:image/png;base64,` URI.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
pub fn to_png_data_uri(texture: &TextureData) -> RenderResult<String> {
    let png = encode_png(texture)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}

/// Generate a thumbnail from texture data, preserving aspect ratio.
///
/// Images already within `max_size` keep their size.
///
/// # Errors
///
/// Returns an error if the thumbnail cannot be generated.
pub fn generate_thumbnail(texture: &TextureData, max_size: u32) -> RenderResult<TextureData> {
    let img = image::RgbaImage::from_raw(texture.width, texture.height, texture.data.clone())
        .ok_or_else(|| RenderError::Resource("Invalid texture data".to_string()))?;

    let longest = texture.width.max(texture.height).max(1);
    let scale = (f64::from(max_size) / f64::from(longest)).min(1.0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let new_width = ((f64::from(texture.width) * scale) as u32).max(1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let new_height = ((f64::from(texture.height) * scale) as u32).max(1);

    let thumbnail = image::imageops::thumbnail(&img, new_width, new_height);
    let (w, h) = thumbnail.dimensions();

    Ok(TextureData {
        width: w,
        height: h,
        data: thumbnail.into_raw(),
    })
}

/// Layer panel thumbnail for a source, decoded from the source itself.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded.
pub fn layer_thumbnail(source: &SourceRef, base_dir: Option<&Path>) -> RenderResult<TextureData> {
    let texture = load_source(source, base_dir)?;
    generate_thumbnail(&texture, THUMBNAIL_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 PNG
    const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> TextureData {
        TextureData {
            width,
            height,
            data: rgba.repeat((width * height) as usize),
        }
    }

    #[test]
    fn test_data_uri_parsing() {
        let data_uri = format!("data:image/png;base64,{PNG_BASE64}");
        let texture = load_image_from_data_uri(&data_uri).expect("valid data URI");
        assert_eq!(texture.size(), ImageSize { width: 1, height: 1 });
        assert_eq!(texture.data.len(), 4);
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(load_image_from_data_uri("not a data uri").is_err());
        assert!(load_image_from_data_uri("data:image/png").is_err());
        assert!(load_image_from_data_uri("data:image/png;base64,!!!").is_err());
        assert!(load_image_from_data_uri("data:image/png,%zz").is_err());
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a%20b").expect("decode"), b"a b");
        assert!(percent_decode("%4").is_err());
    }

    #[test]
    fn test_png_data_uri_roundtrip_keeps_pixels() {
        let texture = solid(3, 2, [0, 0, 255, 255]);
        let uri = to_png_data_uri(&texture).expect("encode");
        let decoded = load_image_from_data_uri(&uri).expect("decode");
        assert_eq!(decoded.size(), texture.size());
        assert_eq!(decoded.data, texture.data);
    }

    #[test]
    fn test_thumbnail_fits_panel() {
        let texture = solid(200, 100, [10, 20, 30, 255]);
        let thumb = generate_thumbnail(&texture, THUMBNAIL_SIZE).expect("thumbnail");
        assert_eq!(thumb.width, 50);
        assert_eq!(thumb.height, 25);
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let err = load_source(&SourceRef::new("does/not/exist.png"), None)
            .expect_err("missing file");
        assert!(matches!(err, RenderError::Resource(_)));
    }
}
