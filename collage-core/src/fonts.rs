//! Font registry for user-uploaded OpenType fonts.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{CollageError, CollageResult};

/// Prefix of every generated font name.
pub const FONT_NAME_PREFIX: &str = "CustomFont";

/// An uploaded font available for text entities.
#[derive(Clone)]
pub struct FontAsset {
    /// Generated, session-unique family name.
    pub name: String,
    /// Raw font file.
    pub data: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FontAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAsset")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Whether a file name has the accepted `.otf` extension.
#[must_use]
pub fn accepts_file_name(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("otf"))
}

/// Whether a payload starts with an sfnt/OpenType signature.
#[must_use]
pub fn is_opentype(data: &[u8]) -> bool {
    const SIGNATURES: [&[u8; 4]; 4] = [b"\x00\x01\x00\x00", b"OTTO", b"true", b"ttcf"];
    SIGNATURES.iter().any(|sig| data.starts_with(*sig))
}

/// Session-lifetime list of uploaded fonts.
///
/// Fonts are never removed and identical uploads are not deduplicated.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: Vec<FontAsset>,
    last_stamp: u64,
}

impl FontRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the epoch, bumped so it never repeats.
    fn next_stamp(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self.last_stamp = now.max(self.last_stamp + 1);
        self.last_stamp
    }

    /// Register a font payload under a fresh name.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::FontLoad`] if the payload is not OpenType.
    pub fn register(&mut self, data: Vec<u8>) -> CollageResult<FontAsset> {
        self.register_with(data, |_| Ok(()))
    }

    /// Register a font payload, running `install` before it is listed.
    ///
    /// `install` makes the font usable elsewhere (the rendering surface). If it
    /// fails the registry is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::FontLoad`] for a non-OpenType payload, or
    /// whatever `install` returns.
    pub fn register_with(
        &mut self,
        data: Vec<u8>,
        install: impl FnOnce(&FontAsset) -> CollageResult<()>,
    ) -> CollageResult<FontAsset> {
        if !is_opentype(&data) {
            return Err(CollageError::FontLoad(format!(
                "payload of {} bytes is not an OpenType font",
                data.len()
            )));
        }

        let stamp = self.next_stamp();
        let asset = FontAsset {
            name: format!("{FONT_NAME_PREFIX}{stamp}"),
            data: Arc::new(data),
        };

        install(&asset)?;
        tracing::info!("Registered font {} ({} bytes)", asset.name, asset.data.len());
        self.fonts.push(asset.clone());
        Ok(asset)
    }

    /// Look up a font by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FontAsset> {
        self.fonts.iter().find(|f| f.name == name)
    }

    /// All fonts in upload order.
    #[must_use]
    pub fn fonts(&self) -> &[FontAsset] {
        &self.fonts
    }

    /// Names in upload order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|f| f.name.as_str())
    }

    /// Number of registered fonts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no fonts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn otf_bytes() -> Vec<u8> {
        let mut data = b"OTTO".to_vec();
        data.extend_from_slice(&[0u8; 60]);
        data
    }

    #[test]
    fn test_identical_uploads_get_distinct_names() {
        let mut registry = FontRegistry::new();
        let first = registry.register(otf_bytes()).expect("first font");
        let second = registry.register(otf_bytes()).expect("second font");

        assert_ne!(first.name, second.name);
        assert!(first.name.starts_with(FONT_NAME_PREFIX));
        assert_eq!(registry.len(), 2);
        assert!(registry.get(&second.name).is_some());
    }

    #[test]
    fn test_non_opentype_payload_rejected() {
        let mut registry = FontRegistry::new();
        let err = registry
            .register(b"not a font".to_vec())
            .expect_err("should reject");
        assert!(matches!(err, CollageError::FontLoad(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_install_leaves_registry_unchanged() {
        let mut registry = FontRegistry::new();
        let result = registry.register_with(otf_bytes(), |_| {
            Err(CollageError::FontLoad("no faces".to_string()))
        });
        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_signatures() {
        assert!(is_opentype(&[0x00, 0x01, 0x00, 0x00, 0x00]));
        assert!(is_opentype(b"OTTO...."));
        assert!(is_opentype(b"ttcf...."));
        assert!(!is_opentype(b"OT"));
        assert!(!is_opentype(b"\x89PNG"));
    }

    #[test]
    fn test_file_name_filter() {
        assert!(accepts_file_name("Lobster.otf"));
        assert!(accepts_file_name("fonts/UPPER.OTF"));
        assert!(!accepts_file_name("Lobster.ttf"));
        assert!(!accepts_file_name("otf"));
    }
}
