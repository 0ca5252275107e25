//! fontsearch CLI (made by FontLab https://www.fontlab.com/)

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, ArgGroup, Parser, ValueHint};

use fontsearch_core::catalog::{Catalog, FontEntry, FontSource, NameStyle, SystemFontSource};
use fontsearch_core::i18n::{self, Translator};
use fontsearch_core::output::{write_json_pretty, write_names, write_ndjson, write_paths};
use fontsearch_core::render::{self, RenderOptions};

#[cfg(feature = "gui")]
mod gui;

/// CLI entrypoint for fontsearch.
#[derive(Debug, Parser)]
#[command(
    name = "fontsearch",
    version,
    about = "Browse, filter and preview installed fonts (made by FontLab https://www.fontlab.com/)",
    group(ArgGroup::new("mode").args(["gui", "gui_advanced", "gui_i18n", "list", "preview"])),
    group(ArgGroup::new("format").args(["json", "ndjson", "paths", "count"]))
)]
pub struct Cli {
    /// Open the basic font browser window
    #[arg(long = "gui", action = ArgAction::SetTrue)]
    gui: bool,

    /// Open the browser with sample text, size, ligature and bitmap preview controls
    #[arg(long = "gui-advanced", action = ArgAction::SetTrue)]
    gui_advanced: bool,

    /// Open the advanced browser with a language picker
    #[arg(long = "gui-i18n", action = ArgAction::SetTrue)]
    gui_i18n: bool,

    /// Print installed fonts (the default mode)
    #[arg(long = "list", action = ArgAction::SetTrue)]
    list: bool,

    /// Render sample text with the named font into a PNG
    #[arg(long = "preview", value_name = "NAME")]
    preview: Option<String>,

    /// Only list fonts whose name contains this text (case-insensitive)
    #[arg(short = 'f', long = "filter", value_name = "QUERY")]
    filter: Option<String>,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Print font file paths instead of names
    #[arg(long = "paths", action = ArgAction::SetTrue)]
    paths: bool,

    /// Print only the number of matching fonts
    #[arg(long = "count", action = ArgAction::SetTrue)]
    count: bool,

    /// Name fonts by family ("Arial") instead of full face name ("Arial Bold")
    #[arg(long = "family-names", action = ArgAction::SetTrue)]
    family_names: bool,

    /// Scan these directories instead of the system font directories
    #[arg(long = "font-dir", value_name = "DIR", value_hint = ValueHint::DirPath)]
    font_dirs: Vec<PathBuf>,

    /// Follow symlinks while walking font directories
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue)]
    follow_symlinks: bool,

    /// Number of threads used to read font names
    #[arg(short = 'j', long = "jobs", value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    jobs: Option<u16>,

    /// Interface language code (en, es, fr, de, pt, ru, zh, ja)
    #[arg(long = "lang", value_name = "CODE")]
    lang: Option<String>,

    /// Directory holding <code>.json translation files
    #[arg(long = "translations-dir", value_name = "DIR", value_hint = ValueHint::DirPath)]
    translations_dir: Option<PathBuf>,

    /// Sample text for previews
    #[arg(short = 't', long = "text")]
    text: Option<String>,

    /// Preview size in points
    #[arg(short = 's', long = "size", default_value_t = 36.0)]
    size: f32,

    /// Shape previews without liga/clig/calt
    #[arg(long = "no-ligatures", action = ArgAction::SetTrue)]
    no_ligatures: bool,

    /// PNG file written by --preview
    #[arg(short = 'o', long = "output", value_name = "FILE", value_hint = ValueHint::FilePath, requires = "preview")]
    output: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,
}

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    List,
    Preview(String),
    Gui(GuiMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuiMode {
    Basic,
    Advanced,
    I18n,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.gui {
            Mode::Gui(GuiMode::Basic)
        } else if self.gui_advanced {
            Mode::Gui(GuiMode::Advanced)
        } else if self.gui_i18n {
            Mode::Gui(GuiMode::I18n)
        } else if let Some(name) = &self.preview {
            Mode::Preview(name.clone())
        } else {
            Mode::List
        }
    }

    fn font_source(&self) -> SystemFontSource {
        let style = if self.family_names {
            NameStyle::Family
        } else {
            NameStyle::Full
        };
        let mut source = SystemFontSource::new()
            .with_name_style(style)
            .follow_symlinks(self.follow_symlinks)
            .with_jobs(self.jobs.map(usize::from));
        if !self.font_dirs.is_empty() {
            source = source.with_roots(self.font_dirs.iter().cloned());
        }
        source
    }

    fn translator(&self, detect: bool) -> Translator {
        let dir = self
            .translations_dir
            .clone()
            .or_else(|| std::env::var_os(i18n::TRANSLATIONS_DIR_ENV).map(PathBuf::from));
        let mut translator = Translator::new(dir);

        let wanted = match &self.lang {
            Some(code) => Some(code.clone()),
            None if detect => Some(i18n::detect_system_language()),
            None => None,
        };
        if let Some(code) = wanted {
            if !translator.set_language(&code) {
                log::warn!("unsupported language {code:?}, keeping {}", translator.language());
            }
        }
        translator
    }
}

/// Parse CLI args and execute the selected mode.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.mode() {
        Mode::List => {
            let source = cli.font_source();
            run_list(&cli, &source, &mut handle)
        }
        Mode::Preview(name) => {
            let source = cli.font_source();
            run_preview(&cli, &name, &source, &mut handle)
        }
        Mode::Gui(mode) => {
            let selection = run_gui(&cli, mode)?;
            write_selection(selection.as_deref(), &mut handle)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .try_init();
}

fn run_list(cli: &Cli, source: &dyn FontSource, mut w: impl Write) -> Result<()> {
    let catalog = Catalog::load(source);
    let query = cli.filter.as_deref().unwrap_or("");
    let matches = catalog.filter(query);

    if cli.count {
        writeln!(w, "{}", matches.len())?;
    } else if cli.ndjson {
        write_ndjson(&matches, &mut w)?;
    } else if cli.json {
        write_json_pretty(&matches, &mut w)?;
    } else if cli.paths {
        write_paths(matches.iter().copied(), &mut w)?;
    } else {
        write_names(matches.iter().copied(), &mut w)?;
    }

    Ok(())
}

/// Exactly one line when something was chosen, nothing otherwise.
fn write_selection(selection: Option<&str>, mut w: impl Write) -> Result<()> {
    if let Some(name) = selection {
        writeln!(w, "{name}")?;
    }
    Ok(())
}

/// Exact display name first, then a unique case-insensitive match.
fn find_font<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a FontEntry> {
    if let Some(entry) = catalog.get(name) {
        return Ok(entry);
    }

    let lowered = name.to_lowercase();
    let mut candidates = catalog
        .entries()
        .iter()
        .filter(|e| e.display_name.to_lowercase() == lowered);

    match (candidates.next(), candidates.next()) {
        (Some(entry), None) => Ok(entry),
        (Some(_), Some(_)) => Err(anyhow!("font name {name:?} is ambiguous; use the exact name")),
        _ => Err(anyhow!("no installed font is named {name:?}")),
    }
}

fn run_preview(cli: &Cli, name: &str, source: &dyn FontSource, mut w: impl Write) -> Result<()> {
    let rasterizer = render::default_rasterizer()
        .ok_or_else(|| anyhow!("fontsearch was built without bitmap preview support"))?;

    let catalog = Catalog::load(source);
    let entry = find_font(&catalog, name)?;

    let text = match &cli.text {
        Some(text) => text.clone(),
        None => cli.translator(false).t("ligature_demo_text"),
    };
    let opts = RenderOptions {
        ligatures: !cli.no_ligatures,
    };

    let bitmap = rasterizer
        .rasterize(&entry.path, entry.ttc_index, &text, cli.size, &opts)
        .with_context(|| format!("rendering preview with {}", entry.display_name))?;

    match &cli.output {
        Some(path) => {
            save_bitmap(&bitmap, path)?;
            writeln!(w, "{}", path.display())?;
        }
        None => writeln!(
            w,
            "{}: {}x{} px",
            entry.display_name, bitmap.width, bitmap.height
        )?,
    }
    Ok(())
}

#[cfg(feature = "raster")]
fn save_bitmap(bitmap: &render::Bitmap, path: &std::path::Path) -> Result<()> {
    bitmap.save_png(path)
}

#[cfg(not(feature = "raster"))]
fn save_bitmap(_bitmap: &render::Bitmap, _path: &std::path::Path) -> Result<()> {
    Err(anyhow!("fontsearch was built without PNG output support"))
}

#[cfg(feature = "gui")]
fn run_gui(cli: &Cli, mode: GuiMode) -> Result<Option<String>> {
    let translator = cli.translator(mode == GuiMode::I18n);
    gui::run(gui::GuiConfig {
        mode,
        source: cli.font_source(),
        translator,
        sample_text: cli.text.clone(),
        size_pt: cli.size,
        ligatures: !cli.no_ligatures,
    })
}

#[cfg(not(feature = "gui"))]
fn run_gui(_cli: &Cli, _mode: GuiMode) -> Result<Option<String>> {
    Err(anyhow!("fontsearch was built without GUI support"))
}
