/// fontsearch-core: find a font by name and see what it looks like
///
/// Everything here is plain, synchronous plumbing that a front end (the
/// `fontsearch` CLI or its egui window) drives from its event handlers.
///
/// ## Pieces
///
/// - [`catalog`]: enumerates installed fonts through a [`FontSource`],
///   reads each face's name table, drops duplicate names and sorts the
///   rest case-insensitively into an immutable [`Catalog`].
/// - [`filter`]: case-insensitive substring matching that keeps catalog
///   order. No ranking, no fuzziness.
/// - [`browser`]: query, paging and selection on top of a catalog.
/// - [`i18n`]: JSON message tables with an English fallback and `{name}`
///   placeholders, owned by a [`Translator`] rather than a global.
/// - [`render`]: the [`TextRasterizer`] seam and, with the `raster`
///   feature, a shaping rasterizer that honours ligatures.
/// - [`output`]: listing writers (names, paths, JSON, NDJSON).
///
/// ## Example
///
/// ```rust,no_run
/// use fontsearch_core::catalog::{Catalog, SystemFontSource};
/// use fontsearch_core::i18n::Translator;
///
/// let catalog = Catalog::load(&SystemFontSource::new());
/// let hits = catalog.filter("mono");
///
/// let mut tr = Translator::default();
/// tr.set_language("es");
/// println!("{}", tr.translate("fonts_found", &[("count", hits.len().to_string())]));
/// for font in hits {
///     println!("  {}", font.display_name);
/// }
/// ```
///
/// ---
///
/// Crafted with care at FontLab https://www.fontlab.com/

pub mod browser;
pub mod catalog;
pub mod discovery;
pub mod filter;
pub mod i18n;
pub mod output;
pub mod render;

pub use browser::{FilterState, FontBrowser};
pub use catalog::{Catalog, FontEntry, FontSource, NameStyle, StaticFontSource, SystemFontSource};
pub use i18n::Translator;
pub use render::{Bitmap, PreviewOutcome, RenderOptions, TextRasterizer};
