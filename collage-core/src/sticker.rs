//! Read-only catalog of sticker sources offered in the sticker drawer.

use crate::SourceRef;

/// The sticker list, fixed when the editor is built.
#[derive(Debug, Clone, Default)]
pub struct StickerCatalog {
    sources: Vec<SourceRef>,
}

impl StickerCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog listing `sources` in the given order.
    #[must_use]
    pub fn from_sources(sources: impl IntoIterator<Item = SourceRef>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
        }
    }

    /// Sticker at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SourceRef> {
        self.sources.get(index)
    }

    /// All stickers in drawer order.
    #[must_use]
    pub fn sources(&self) -> &[SourceRef] {
        &self.sources
    }

    /// Number of stickers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
