use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn fonts_dir() -> Option<PathBuf> {
    if let Ok(env_override) = env::var("FONTSEARCH_TEST_FONTS") {
        let path = PathBuf::from(env_override);
        if let Ok(dir) = path.canonicalize() {
            return Some(dir);
        }
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join("../core/fontsearch-core/tests/fixtures");
    candidate.canonicalize().ok()
}

fn fontsearch(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fontsearch"))
        .args(args)
        .env_remove("FONTSEARCH_FONT_DIRS")
        .env_remove("FONTSEARCH_TRANSLATIONS_DIR")
        .env("RUST_LOG", "off")
        .output()
        .expect("run fontsearch")
}

#[test]
fn empty_font_dir_lists_nothing_and_succeeds() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("notes.txt"), b"not a font").unwrap();
    let dir = tmp.path().to_str().unwrap();

    let output = fontsearch(&["--font-dir", dir]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.stdout.is_empty());

    let output = fontsearch(&["--font-dir", dir, "--count"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0\n");
}

#[test]
fn corrupt_fonts_are_skipped() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("broken.ttf"), b"garbage").unwrap();

    let output = fontsearch(&["--font-dir", tmp.path().to_str().unwrap(), "--json"]);
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(parsed.as_array().map(Vec::len), Some(0));
}

#[test]
fn conflicting_modes_are_rejected() {
    let output = fontsearch(&["--gui", "--gui-advanced"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn preview_of_unknown_font_fails_cleanly() {
    let tmp = tempdir().expect("tempdir");
    let output = fontsearch(&[
        "--font-dir",
        tmp.path().to_str().unwrap(),
        "--preview",
        "Nope Sans",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error:"));
}

#[test]
fn missing_font_dir_is_skipped() {
    let Some(fonts) = fonts_dir() else {
        return;
    };
    let output = fontsearch(&[
        "--font-dir",
        "/nonexistent/fontsearch",
        "--font-dir",
        fonts.to_str().unwrap(),
        "--count",
    ]);

    assert!(output.status.success());
    assert_ne!(String::from_utf8_lossy(&output.stdout), "0\n");
}

#[test]
fn warnings_reach_stderr_when_logging_is_on() {
    let tmp = tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_fontsearch"))
        .args(["--font-dir", tmp.path().to_str().unwrap()])
        .env("RUST_LOG", "warn")
        .output()
        .expect("run fontsearch");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no fonts found"));
}

#[test]
fn help_lists_every_mode() {
    let output = fontsearch(&["--help"]);
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--gui", "--gui-advanced", "--gui-i18n", "--list", "--preview"] {
        assert!(help.contains(flag), "help is missing {flag}");
    }
}

#[test]
fn fixture_fonts_list_sorted_and_unique() {
    let fonts = fonts_dir().expect("fixture fonts ship with fontsearch-core");

    let output = fontsearch(&["--font-dir", fonts.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> = stdout.lines().collect();
    assert!(!names.is_empty(), "expected fixture fonts to be listed");

    let mut unique = names.clone();
    unique.dedup();
    assert_eq!(unique.len(), names.len());
    for pair in names.windows(2) {
        assert!(pair[0].to_lowercase() <= pair[1].to_lowercase());
    }
}

#[cfg(feature = "raster")]
#[test]
fn fixture_font_renders_png_preview() {
    let fonts = match fonts_dir() {
        Some(dir) => dir,
        None => return, // skip when fixtures are unavailable
    };
    let listing = fontsearch(&["--font-dir", fonts.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&listing.stdout);
    let Some(first) = stdout.lines().next() else {
        return;
    };

    let tmp = tempdir().expect("tempdir");
    let png = tmp.path().join("preview.png");
    let output = fontsearch(&[
        "--font-dir",
        fonts.to_str().unwrap(),
        "--preview",
        first,
        "--text",
        "fi of",
        "--output",
        png.to_str().unwrap(),
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let bytes = fs::read(&png).expect("png written");
    assert!(bytes.starts_with(b"\x89PNG"));
}
