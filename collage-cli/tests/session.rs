//! Integration tests for whole sessions run through the CLI library.

use std::path::{Path, PathBuf};

use collage_cli::{run, CliError, SessionConfig};

fn write_sticker(dir: &Path, name: &str, rgba: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(150, 150, image::Rgba(rgba));
    img.save(dir.join(name)).expect("write sticker");
}

fn config(root: &Path) -> SessionConfig {
    let stickers = root.join("stickers");
    std::fs::create_dir_all(&stickers).expect("stickers dir");
    write_sticker(&stickers, "a_red.png", [255, 0, 0, 255]);
    write_sticker(&stickers, "b_blue.png", [0, 0, 255, 255]);

    SessionConfig {
        width: "150".to_string(),
        height: "150".to_string(),
        stickers_dir: Some(stickers),
        output_dir: root.join("out"),
        system_fonts: false,
        ..SessionConfig::new()
    }
}

fn write_script(root: &Path, json: &str) -> PathBuf {
    let path = root.join("session.json");
    std::fs::write(&path, json).expect("write script");
    path
}

/// `target` spelled relative to the working directory.
fn relative_to_cwd(target: &Path) -> PathBuf {
    let cwd = std::env::current_dir()
        .and_then(|dir| dir.canonicalize())
        .expect("cwd");
    let target = target.canonicalize().expect("target");
    let mut relative = PathBuf::new();
    for _ in cwd.components().skip(1) {
        relative.push("..");
    }
    relative.extend(target.components().skip(1));
    relative
}

#[test]
fn test_session_without_script_exports_background() {
    let root = tempfile::tempdir().expect("tempdir");
    let report = run(&config(root.path())).expect("session");

    let output = report.output.expect("output path");
    assert_eq!(output, root.path().join("out").join("canvas_export.png"));
    let img = image::open(&output).expect("png").to_rgba8();
    assert_eq!(img.dimensions(), (150, 150));
    assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
    assert_eq!(report.layers, 0);
}

#[test]
fn test_script_reorders_stickers() {
    let root = tempfile::tempdir().expect("tempdir");
    let mut config = config(root.path());
    config.script = Some(write_script(
        root.path(),
        r#"{"commands": [
            {"op": "add_sticker", "index": 0},
            {"op": "add_sticker", "index": 1},
            {"op": "move_backward", "layer": 1}
        ]}"#,
    ));

    let report = run(&config).expect("session");
    assert_eq!(report.applied, 3);
    assert_eq!(report.layers, 2);

    // 150 px stickers on a 150 px canvas always cover (149, 149).
    let img = image::open(report.output.expect("output")).expect("png").to_rgba8();
    assert_eq!(img.get_pixel(149, 149).0, [255, 0, 0, 255]);
}

#[test]
fn test_failed_commands_are_skipped() {
    let root = tempfile::tempdir().expect("tempdir");
    let mut config = config(root.path());
    std::fs::write(root.path().join("font.ttf"), b"\x00\x01\x00\x00").expect("font");
    config.script = Some(write_script(
        root.path(),
        r#"{"commands": [
            {"op": "add_sticker", "index": 5},
            {"op": "upload_font", "path": "font.ttf"},
            {"op": "move_forward", "layer": 3},
            {"op": "add_text", "content": "hello"},
            {"op": "key", "key": "Delete"},
            {"op": "clear_background"}
        ]}"#,
    ));

    let report = run(&config).expect("session");
    assert_eq!(report.applied, 3);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.layers, 0);
    assert_eq!(report.diagnostics.len(), 2);

    let img = image::open(report.output.expect("output")).expect("png").to_rgba8();
    assert_eq!(img.get_pixel(10, 10).0[3], 0);
}

#[test]
fn test_invalid_script_fails_session() {
    let root = tempfile::tempdir().expect("tempdir");
    let mut config = config(root.path());
    config.script = Some(write_script(root.path(), "{\"commands\": 3}"));

    assert!(matches!(run(&config), Err(CliError::Script { .. })));
    assert!(!root.path().join("out").exists());
}

#[test]
fn test_missing_sticker_dir_fails_session() {
    let root = tempfile::tempdir().expect("tempdir");
    let config = SessionConfig {
        stickers_dir: Some(root.path().join("nope")),
        output_dir: root.path().join("out"),
        system_fonts: false,
        ..SessionConfig::new()
    };
    assert!(matches!(run(&config), Err(CliError::Io { .. })));
}

#[test]
fn test_relative_script_finds_images_beside_it() {
    let root = tempfile::tempdir().expect("tempdir");
    let mut config = config(root.path());
    write_sticker(root.path(), "own.png", [0, 255, 0, 255]);
    let script = write_script(root.path(), r#"{"commands": [{"op": "add_image", "path": "own.png"}]}"#);
    let script = relative_to_cwd(&script);
    assert!(script.is_relative());
    config.script = Some(script);

    let report = run(&config).expect("session");
    assert_eq!(report.applied, 1);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.layers, 1);

    let img = image::open(report.output.expect("output")).expect("png").to_rgba8();
    assert_eq!(img.get_pixel(149, 149).0, [0, 255, 0, 255]);
}
