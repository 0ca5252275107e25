use std::fs;
use std::path::Path;

use fontsearch_core::i18n::{available_languages, Translator, DEFAULT_LANGUAGE};
use tempfile::tempdir;

fn write(dir: &Path, code: &str, body: &str) {
    fs::write(dir.join(format!("{code}.json")), body).expect("write table");
}

#[test]
fn spanish_template_substitutes_count() {
    let mut tr = Translator::default();
    assert!(tr.set_language("es"));
    assert_eq!(
        tr.translate("fonts_found", &[("count", 42.to_string())]),
        "42 fuentes encontradas"
    );
}

#[test]
fn every_language_translates_the_title() {
    let mut tr = Translator::default();
    for (code, _) in available_languages() {
        assert!(tr.set_language(code));
        assert_ne!(tr.t("app_title"), "app_title", "{code}");
    }
}

#[test]
fn unsupported_language_keeps_previous_one() {
    let mut tr = Translator::default();
    assert!(tr.set_language("fr"));
    assert!(!tr.set_language("tlh"));
    assert_eq!(tr.language(), "fr");
}

#[test]
fn present_key_uses_active_language() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "en", r#"{"greeting": "Hello {who}"}"#);
    write(dir.path(), "de", r#"{"greeting": "Hallo {who}"}"#);

    let mut tr = Translator::new(Some(dir.path().to_path_buf()));
    tr.set_language("de");

    assert_eq!(tr.translate("greeting", &[("who", "Welt".into())]), "Hallo Welt");
}

#[test]
fn missing_key_falls_back_to_default_language() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "en", r#"{"only_english": "English only"}"#);
    write(dir.path(), "ja", r#"{"other": "その他"}"#);

    let mut tr = Translator::new(Some(dir.path().to_path_buf()));
    tr.set_language("ja");

    assert_eq!(tr.t("only_english"), "English only");
}

#[test]
fn key_missing_everywhere_comes_back_verbatim() {
    let mut tr = Translator::default();
    tr.set_language("zh");
    assert_eq!(tr.t("non_existent_key"), "non_existent_key");
    assert_eq!(
        tr.translate("non_existent_key", &[("count", "1".into())]),
        "non_existent_key"
    );
}

#[test]
fn invalid_file_falls_back_to_default_table() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "en", r#"{"title": "Fonts"}"#);
    write(dir.path(), "ru", "{ not json");

    let mut tr = Translator::new(Some(dir.path().to_path_buf()));
    assert!(tr.set_language("ru"));
    assert_eq!(tr.t("title"), "Fonts");
}

#[test]
fn missing_file_uses_bundled_table() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "en", r#"{"app_title": "Custom"}"#);

    let mut tr = Translator::new(Some(dir.path().to_path_buf()));
    assert_eq!(tr.t("app_title"), "Custom");

    tr.set_language("es");
    assert_eq!(
        tr.translate("page_info", &[("current", "3".into()), ("total", "10".into())]),
        "Página 3 de 10"
    );
}

#[test]
fn tables_are_read_once() {
    let dir = tempdir().expect("tempdir");
    write(dir.path(), "en", r#"{"k": "v1"}"#);

    let tr = Translator::new(Some(dir.path().to_path_buf()));
    write(dir.path(), "en", r#"{"k": "v2"}"#);

    assert_eq!(tr.language(), DEFAULT_LANGUAGE);
    assert_eq!(tr.t("k"), "v1");
}
