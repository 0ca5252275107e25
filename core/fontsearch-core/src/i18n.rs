//! Interface translations (made by FontLab https://www.fontlab.com/)
//!
//! Each language is a flat JSON object mapping message keys to templates
//! such as `"{count} fonts found"`. A [`Translator`] owns the loaded tables
//! and the active language; components that show text borrow it instead of
//! reaching for a global.
//!
//! Lookups never fail. A key missing from the active language falls back to
//! English, and a key missing there comes back verbatim.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Language used when nothing else matches, and the lookup fallback.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Environment variable pointing at a directory of `<code>.json` files.
pub const TRANSLATIONS_DIR_ENV: &str = "FONTSEARCH_TRANSLATIONS_DIR";

/// Environment variable forcing the interface language.
pub const LANGUAGE_ENV: &str = "FONTSEARCH_LANG";

const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Español"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("pt", "Português"),
    ("ru", "Русский"),
    ("zh", "中文"),
    ("ja", "日本語"),
];

type Table = HashMap<String, String>;

/// Supported `(code, display name)` pairs.
pub fn available_languages() -> &'static [(&'static str, &'static str)] {
    SUPPORTED_LANGUAGES
}

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}

/// Display name for a language code, if supported.
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

fn bundled_table(code: &str) -> Option<&'static str> {
    let raw = match code {
        "en" => include_str!("../translations/en.json"),
        "es" => include_str!("../translations/es.json"),
        "fr" => include_str!("../translations/fr.json"),
        "de" => include_str!("../translations/de.json"),
        "pt" => include_str!("../translations/pt.json"),
        "ru" => include_str!("../translations/ru.json"),
        "zh" => include_str!("../translations/zh.json"),
        "ja" => include_str!("../translations/ja.json"),
        _ => return None,
    };
    Some(raw)
}

/// Parse a translation file body into a table.
pub fn parse_table(raw: &str) -> Result<HashMap<String, String>> {
    serde_json::from_str(raw).context("translation file is not a flat JSON object of strings")
}

/// Substitute `{name}` placeholders in one pass over `template`.
/// Placeholders without a value stay as written; substituted values are
/// never scanned again.
pub fn interpolate(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        if name.contains('{') {
            out.push('{');
            rest = after;
            continue;
        }
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Loaded translation tables plus the active language.
#[derive(Debug, Clone)]
pub struct Translator {
    dir: Option<PathBuf>,
    tables: HashMap<String, Table>,
    active: String,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Translator {
    /// Create a translator reading from `dir`, or from the bundled tables
    /// when `dir` is `None`. The default language is loaded immediately.
    pub fn new(dir: Option<PathBuf>) -> Self {
        let mut translator = Self {
            dir,
            tables: HashMap::new(),
            active: DEFAULT_LANGUAGE.to_string(),
        };
        translator.ensure_loaded(DEFAULT_LANGUAGE);
        translator
    }

    /// Honour `FONTSEARCH_TRANSLATIONS_DIR` when set.
    pub fn from_env() -> Self {
        let dir = env::var_os(TRANSLATIONS_DIR_ENV).map(PathBuf::from);
        Self::new(dir)
    }

    pub fn language(&self) -> &str {
        &self.active
    }

    /// Switch the active language. Unsupported codes leave it unchanged.
    pub fn set_language(&mut self, code: &str) -> bool {
        if !is_supported(code) {
            log::debug!("ignoring unsupported language {code:?}");
            return false;
        }
        self.ensure_loaded(code);
        self.active = code.to_string();
        true
    }

    /// Look up `key` in the active language, then English, then give back the key.
    pub fn translate(&self, key: &str, vars: &[(&str, String)]) -> String {
        let template = self
            .lookup(&self.active, key)
            .or_else(|| self.lookup(DEFAULT_LANGUAGE, key));

        match template {
            Some(template) => interpolate(template, vars),
            None => key.to_string(),
        }
    }

    /// Shorthand for [`translate`](Self::translate) without placeholders.
    pub fn t(&self, key: &str) -> String {
        self.translate(key, &[])
    }

    fn lookup(&self, code: &str, key: &str) -> Option<&str> {
        self.tables.get(code)?.get(key).map(String::as_str)
    }

    fn ensure_loaded(&mut self, code: &str) {
        if self.tables.contains_key(code) {
            return;
        }
        let table = self.load_table(code);
        log::debug!("loaded {} messages for {code}", table.len());
        self.tables.insert(code.to_string(), table);
    }

    fn load_table(&self, code: &str) -> Table {
        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{code}.json"));
            if path.exists() {
                return match read_table(&path) {
                    Ok(table) => table,
                    Err(err) => {
                        log::warn!("{err:#}; falling back to {DEFAULT_LANGUAGE}");
                        Table::new()
                    }
                };
            }
            log::debug!("{} not found, using bundled table", path.display());
        }

        match bundled_table(code).map(parse_table) {
            Some(Ok(table)) => table,
            Some(Err(err)) => {
                log::warn!("bundled {code} table is invalid: {err:#}");
                Table::new()
            }
            None => Table::new(),
        }
    }
}

fn read_table(path: &Path) -> Result<Table> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading translations {}", path.display()))?;
    parse_table(&raw).with_context(|| format!("parsing translations {}", path.display()))
}

/// Best supported language for the host locale, or [`DEFAULT_LANGUAGE`].
pub fn detect_system_language() -> String {
    detect_language_with(|name| env::var(name).ok())
}

/// [`detect_system_language`] with the environment supplied by the caller.
pub fn detect_language_with(lookup: impl Fn(&str) -> Option<String>) -> String {
    for var in [LANGUAGE_ENV, "LC_ALL", "LC_MESSAGES", "LANG"] {
        let Some(value) = lookup(var) else {
            continue;
        };
        // LANGUAGE-style lists: "pt_BR:pt:en"
        for candidate in value.split(':') {
            if let Some(code) = parse_language_tag(candidate) {
                return code.to_string();
            }
        }
    }
    DEFAULT_LANGUAGE.to_string()
}

fn parse_language_tag(raw: &str) -> Option<&'static str> {
    let mut normalized = raw.trim().replace('_', "-").to_ascii_lowercase();

    if let Some(idx) = normalized.find('@') {
        normalized.truncate(idx);
    }
    if let Some(idx) = normalized.find('.') {
        normalized.truncate(idx);
    }

    if normalized.is_empty() || normalized == "c" || normalized == "posix" {
        return None;
    }

    let primary = normalized.split('-').next()?;
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, _)| *code == primary)
        .map(|(code, _)| *code)
}
