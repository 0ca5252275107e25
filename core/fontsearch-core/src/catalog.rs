//! Font catalog: name extraction, dedup and ordering (made by FontLab https://www.fontlab.com/)

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use read_fonts::tables::name::NameId;
use read_fonts::{FontRef, TableProvider};
use serde::{Deserialize, Serialize};

use crate::discovery::{system_font_roots, PathDiscovery};
use crate::filter::filter_indices;

/// One selectable font face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontEntry {
    pub display_name: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttc_index: Option<u32>,
}

impl FontEntry {
    pub fn new(display_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            path: path.into(),
            ttc_index: None,
        }
    }

    /// Render the path, appending `#<index>` for TTC/OTC collections.
    pub fn path_with_index(&self) -> String {
        if let Some(idx) = self.ttc_index {
            format!("{}#{idx}", self.path.display())
        } else {
            self.path.display().to_string()
        }
    }
}

/// Which name record becomes the display name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NameStyle {
    /// Full face name, e.g. "Arial Bold".
    #[default]
    Full,
    /// Family name, e.g. "Arial"; faces of one family collapse into one entry.
    Family,
}

/// Anything that can enumerate installed fonts.
pub trait FontSource {
    fn fonts(&self) -> Result<Vec<FontEntry>>;
}

/// Fonts found by walking the platform font directories.
#[derive(Debug, Clone, Default)]
pub struct SystemFontSource {
    roots: Option<Vec<PathBuf>>,
    name_style: NameStyle,
    follow_symlinks: bool,
    jobs: Option<usize>,
}

impl SystemFontSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the platform directories with explicit roots.
    pub fn with_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots = Some(roots.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_name_style(mut self, style: NameStyle) -> Self {
        self.name_style = style;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Cap the number of threads used to read name tables.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    fn roots(&self) -> Vec<PathBuf> {
        match &self.roots {
            Some(roots) => roots.clone(),
            None => system_font_roots(),
        }
    }
}

impl FontSource for SystemFontSource {
    fn fonts(&self) -> Result<Vec<FontEntry>> {
        let roots = self.roots();
        log::debug!("scanning font directories: {roots:?}");

        let candidates = PathDiscovery::new(roots)
            .follow_symlinks(self.follow_symlinks)
            .discover()?;
        let style = self.name_style;

        let read_all = || -> Vec<FontEntry> {
            candidates
                .par_iter()
                .map(|path| match read_entries(path, style) {
                    Ok(entries) => entries,
                    Err(err) => {
                        log::debug!("skipping {}: {err:#}", path.display());
                        Vec::new()
                    }
                })
                .flatten()
                .collect()
        };

        match self.jobs {
            Some(jobs) => {
                let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
                Ok(pool.install(read_all))
            }
            None => Ok(read_all()),
        }
    }
}

/// A fixed list of fonts; stands in for the OS in tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticFontSource {
    entries: Vec<FontEntry>,
}

impl StaticFontSource {
    pub fn new(entries: Vec<FontEntry>) -> Self {
        Self { entries }
    }

    /// Entries whose path is a made-up `<name>.ttf`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                FontEntry::new(name, format!("/fonts/{name}.ttf"))
            })
            .collect();
        Self { entries }
    }
}

impl FontSource for StaticFontSource {
    fn fonts(&self) -> Result<Vec<FontEntry>> {
        Ok(self.entries.clone())
    }
}

/// Immutable, sorted snapshot of installed fonts with unique display names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<FontEntry>,
}

impl Catalog {
    /// Query `source` and build a snapshot. Never fails: a source error or
    /// an empty result produces an empty catalog.
    pub fn load(source: &dyn FontSource) -> Self {
        match source.fonts() {
            Ok(entries) => {
                let catalog = Self::from_entries(entries);
                if catalog.is_empty() {
                    log::warn!("no fonts found");
                } else {
                    log::info!("catalog holds {} fonts", catalog.len());
                }
                catalog
            }
            Err(err) => {
                log::warn!("font enumeration failed: {err:#}");
                Self::default()
            }
        }
    }

    /// Dedupe by display name (first occurrence wins) and sort case-insensitively.
    pub fn from_entries(entries: Vec<FontEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut entries: Vec<FontEntry> = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.display_name.clone()))
            .collect();

        entries.sort_by(|a, b| compare_names(&a.display_name, &b.display_name));
        Self { entries }
    }

    pub fn entries(&self) -> &[FontEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.display_name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look a font up by its exact display name.
    pub fn get(&self, name: &str) -> Option<&FontEntry> {
        self.entries.iter().find(|e| e.display_name == name)
    }

    /// Entries whose display name contains `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<&FontEntry> {
        let names = self.names();
        filter_indices(&names, query)
            .into_iter()
            .map(|idx| &self.entries[idx])
            .collect()
    }
}

/// Read the bytes of `entry`'s font file, checking that its face parses and
/// carries the tables a glyph renderer needs (`head`, `hhea`, `maxp`, `cmap`).
pub fn read_face_data(entry: &FontEntry) -> Result<Vec<u8>> {
    let data = fs::read(&entry.path)
        .with_context(|| format!("reading font {}", entry.path.display()))?;
    let font = FontRef::from_index(&data, entry.ttc_index.unwrap_or(0))
        .with_context(|| format!("parsing font {}", entry.path_with_index()))?;

    let required = [
        font.head().is_ok(),
        font.hhea().is_ok(),
        font.maxp().is_ok(),
        font.cmap().is_ok(),
    ];
    if required.contains(&false) {
        return Err(anyhow!("{} lacks required tables", entry.path_with_index()));
    }

    Ok(data)
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn read_entries(path: &Path, style: NameStyle) -> Result<Vec<FontEntry>> {
    let data = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    let mut entries = Vec::new();

    for font in FontRef::fonts(&data) {
        let font = font.with_context(|| format!("parsing font {}", path.display()))?;
        let display_name = pick_name(&font, style).unwrap_or_else(|| file_stem(path));

        entries.push(FontEntry {
            display_name,
            path: path.to_path_buf(),
            ttc_index: font.ttc_index(),
        });
    }

    Ok(entries)
}

fn pick_name(font: &FontRef, style: NameStyle) -> Option<String> {
    let wanted: &[NameId] = match style {
        NameStyle::Full => &[
            NameId::FULL_NAME,
            NameId::TYPOGRAPHIC_FAMILY_NAME,
            NameId::FAMILY_NAME,
        ],
        NameStyle::Family => &[NameId::TYPOGRAPHIC_FAMILY_NAME, NameId::FAMILY_NAME],
    };

    let name_table = font.name().ok()?;
    let data = name_table.string_data();

    for id in wanted {
        let mut fallback = None;
        for record in name_table.name_record() {
            if !record.is_unicode() || record.name_id() != *id {
                continue;
            }
            let Ok(entry) = record.string(data) else {
                continue;
            };
            let rendered = entry.to_string().trim().to_string();
            if rendered.is_empty() {
                continue;
            }
            // 0x0409 is Windows en-US, 0 is Mac English.
            if matches!(record.language_id(), 0x0409 | 0) {
                return Some(rendered);
            }
            fallback.get_or_insert(rendered);
        }
        if fallback.is_some() {
            return fallback;
        }
    }

    None
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
