//! Integration tests for editor sessions against a recording surface.
//!
//! The surface here logs every call so tests can check that it stays in step
//! with the layer stack.

use std::cell::RefCell;
use std::rc::Rc;

use collage_core::{
    Axis, BackgroundColor, CollageError, CollageResult, DiagnosticLevel, DrawableEntity, Editor,
    EntityId, FontAsset, ImageSize, LayerChange, ObjectFactory, RenderSurface, Selector,
    SourceRef, StickerCatalog,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Add(EntityId),
    Remove(EntityId),
    Update(EntityId),
    Clear,
    Font(String),
}

#[derive(Debug, Default)]
struct RecordingSurface {
    calls: Vec<Call>,
    painted: Vec<EntityId>,
    active: Option<EntityId>,
    background: BackgroundColor,
    reject_fonts: bool,
}

impl RenderSurface for RecordingSurface {
    fn decode_image(&mut self, source: &SourceRef) -> CollageResult<ImageSize> {
        if source.as_str().contains("broken") {
            return Err(CollageError::Decode(source.to_string()));
        }
        Ok(ImageSize {
            width: 80,
            height: 80,
        })
    }

    fn register_font(&mut self, font: &FontAsset) -> CollageResult<()> {
        if self.reject_fonts {
            return Err(CollageError::FontLoad(font.name.clone()));
        }
        self.calls.push(Call::Font(font.name.clone()));
        Ok(())
    }

    fn add(&mut self, entity: &DrawableEntity) {
        self.calls.push(Call::Add(entity.id));
        self.painted.push(entity.id);
    }

    fn remove(&mut self, id: EntityId) {
        self.calls.push(Call::Remove(id));
        self.painted.retain(|p| *p != id);
    }

    fn update(&mut self, entity: &DrawableEntity) {
        self.calls.push(Call::Update(entity.id));
    }

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
        self.painted.clear();
        self.active = None;
    }

    fn painted(&self) -> Vec<EntityId> {
        self.painted.clone()
    }

    fn active(&self) -> Option<EntityId> {
        self.active
    }

    fn set_active(&mut self, id: Option<EntityId>) {
        self.active = id;
    }

    fn background(&self) -> BackgroundColor {
        self.background
    }

    fn set_background(&mut self, background: BackgroundColor) {
        self.background = background;
    }

    fn rasterize(&mut self) -> CollageResult<Vec<u8>> {
        Ok(self.painted.iter().map(|_| 1).collect())
    }
}

fn editor_with(surface: RecordingSurface) -> Editor<RecordingSurface> {
    let mut selector = Selector::new();
    selector.set_dimension(Axis::Width, 5000);
    selector.set_dimension(Axis::Height, 50);
    let config = selector.accept();
    assert_eq!((config.width(), config.height()), (3000, 100));

    let factory = ObjectFactory::with_seed(&config, 1234);
    let stickers = StickerCatalog::from_sources([
        SourceRef::new("stickers/star.png"),
        SourceRef::new("stickers/broken.png"),
    ]);
    Editor::with_factory(config, surface, stickers, factory)
}

fn editor() -> Editor<RecordingSurface> {
    editor_with(RecordingSurface::default())
}

fn otf_bytes() -> Vec<u8> {
    let mut data = b"OTTO".to_vec();
    data.resize(32, 7);
    data
}

// ==========================================================================
// Stack order and surface sync
// ==========================================================================

#[test]
fn test_reorder_scenario_keeps_surface_in_step() {
    let mut editor = editor();
    let a = editor.add_catalog_sticker(0).expect("A");
    let b = editor.add_text("B").expect("B");
    let c = editor.add_catalog_sticker(0).expect("C");

    assert!(editor.move_forward(a));
    assert_eq!(editor.layers().ids(), vec![b, a, c]);
    assert_eq!(editor.surface().painted(), vec![b, a, c]);

    assert!(editor.move_backward(c));
    assert_eq!(editor.layers().ids(), vec![b, c, a]);
    assert_eq!(editor.surface().painted(), vec![b, c, a]);
}

#[test]
fn test_reorder_is_a_full_rebuild() {
    let mut editor = editor();
    let a = editor.add_catalog_sticker(0).expect("A");
    let b = editor.add_catalog_sticker(0).expect("B");
    let before = editor.surface().calls.len();

    assert!(editor.move_forward(a));
    assert_eq!(
        editor.surface().calls[before..],
        [Call::Clear, Call::Add(b), Call::Add(a)]
    );
}

#[test]
fn test_boundary_moves_touch_nothing() {
    let mut editor = editor();
    let a = editor.add_catalog_sticker(0).expect("A");
    let b = editor.add_catalog_sticker(0).expect("B");
    let before = editor.surface().calls.len();

    assert!(!editor.move_forward(b));
    assert!(!editor.move_backward(a));
    assert!(!editor.move_forward(EntityId::new()));
    assert_eq!(editor.surface().calls.len(), before);
    assert_eq!(editor.layers().ids(), vec![a, b]);
}

#[test]
fn test_panel_redraws_on_every_mutation() {
    let mut editor = editor();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let subscription = editor.subscribe_layers(move |change| sink.borrow_mut().push(*change));

    let a = editor.add_catalog_sticker(0).expect("A");
    let copy = editor.duplicate(a).expect("copy");
    editor.move_backward(copy);
    editor.remove(a);

    assert_eq!(
        *changes.borrow(),
        vec![
            LayerChange::Added { id: a, index: 0 },
            LayerChange::Added { id: copy, index: 1 },
            LayerChange::Reordered {
                id: copy,
                from: 1,
                to: 0
            },
            LayerChange::Removed { id: a, index: 1 },
        ]
    );

    assert!(editor.unsubscribe_layers(subscription));
    editor.add_text("quiet");
    assert_eq!(changes.borrow().len(), 4);
}

// ==========================================================================
// Failure paths leave state untouched
// ==========================================================================

#[test]
fn test_decode_failure_never_reaches_surface() {
    let mut editor = editor();
    editor.add_catalog_sticker(0).expect("ok");
    let calls = editor.surface().calls.clone();

    assert!(editor.add_catalog_sticker(1).is_err());
    assert_eq!(editor.surface().calls, calls);
    assert_eq!(editor.layers().len(), 1);

    let diag = editor.diagnostics().last().expect("diagnostic");
    assert_eq!(diag.level, DiagnosticLevel::Error);
}

#[test]
fn test_blank_text_is_ignored() {
    let mut editor = editor();
    assert_eq!(editor.add_text(""), None);
    assert_eq!(editor.add_text(" \t\n"), None);
    assert!(editor.layers().is_empty());
    assert!(editor.diagnostics().is_empty());
}

#[test]
fn test_duplicate_text_is_refused() {
    let mut editor = editor();
    let text = editor.add_text("solo").expect("text");
    assert!(matches!(
        editor.duplicate(text),
        Err(CollageError::UnsupportedOperation(_))
    ));
    assert_eq!(editor.layers().ids(), vec![text]);
    assert_eq!(
        editor.diagnostics().last().map(|d| d.level),
        Some(DiagnosticLevel::Warning)
    );
}

#[test]
fn test_rejected_font_is_not_registered() {
    let mut editor = editor_with(RecordingSurface {
        reject_fonts: true,
        ..RecordingSurface::default()
    });
    assert!(editor.upload_font("Fancy.otf", otf_bytes()).is_err());
    assert!(editor.fonts().is_empty());
    assert!(!editor.choose_font("CustomFont0"));
}

// ==========================================================================
// Fonts
// ==========================================================================

#[test]
fn test_identical_uploads_are_distinct_fonts() {
    let mut editor = editor();
    let first = editor.upload_font("Same.otf", otf_bytes()).expect("first");
    let second = editor.upload_font("Same.otf", otf_bytes()).expect("second");

    assert_ne!(first.name, second.name);
    assert_eq!(editor.fonts().len(), 2);
    assert!(editor
        .surface()
        .calls
        .ends_with(&[Call::Font(first.name), Call::Font(second.name)]));
}

#[test]
fn test_choose_font_updates_selected_text_on_surface() {
    let mut editor = editor();
    let text = editor.add_text("styled").expect("text");
    let font = editor.upload_font("Script.otf", otf_bytes()).expect("font");

    assert!(editor.choose_font(&font.name));
    assert_eq!(editor.selected_font(), Some(font.name.as_str()));
    assert_eq!(editor.surface().calls.last(), Some(&Call::Update(text)));
}

// ==========================================================================
// Selection and shortcuts
// ==========================================================================

#[test]
fn test_shortcuts_without_selection_are_noops() {
    let mut editor = editor();
    let a = editor.add_catalog_sticker(0).expect("A");
    assert_eq!(editor.selection(), None);

    editor.handle_key("Delete");
    editor.handle_key("d");
    assert_eq!(editor.layers().ids(), vec![a]);

    assert_eq!(editor.handle_key("x"), None);
    assert_eq!(editor.handle_key("D"), None);
}

#[test]
fn test_duplicate_shortcut_selects_offset_copy() {
    let mut editor = editor();
    let a = editor.add_catalog_sticker(0).expect("A");
    assert!(editor.select(Some(a)));
    editor.handle_key("d");

    let copy = editor.selection().expect("copy");
    let original = editor.layers().get(a).expect("A");
    let duplicated = editor.layers().get(copy).expect("copy");
    assert_eq!(duplicated.source(), original.source());
    assert!((duplicated.position.x - original.position.x - 10.0).abs() < 1e-3);
    assert!((duplicated.position.y - original.position.y - 10.0).abs() < 1e-3);
}

#[test]
fn test_export_reflects_current_state() {
    let mut editor = editor();
    assert!(editor.export_raster().expect("empty").bytes.is_empty());
    editor.add_catalog_sticker(0).expect("A");
    assert_eq!(editor.export_raster().expect("one").bytes.len(), 1);
}
