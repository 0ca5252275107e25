//! Sample-text previews (made by FontLab https://www.fontlab.com/)
//!
//! The [`TextRasterizer`] seam keeps the GUI independent of the imaging
//! stack. With the `raster` feature the crate ships [`GlyphRasterizer`],
//! which shapes text with rustybuzz (so ligatures are substituted) and
//! draws the glyph outlines with ab_glyph. Without it,
//! [`default_rasterizer`] returns `None` and callers fall back to plain text.

use std::path::Path;

use anyhow::Result;

/// Screen resolution used to turn point sizes into pixels.
pub const DPI: f32 = 96.0;

pub fn pt_to_px(size_pt: f32) -> f32 {
    size_pt * DPI / 72.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Apply `liga`, `clig` and `calt` while shaping.
    pub ligatures: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { ligatures: true }
    }
}

/// 8-bit coverage raster, row-major, one byte per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn coverage(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// True when no pixel has any ink.
    pub fn is_empty(&self) -> bool {
        self.pixels.iter().all(|&c| c == 0)
    }

    /// Unpremultiplied RGBA with `color` as ink and coverage as alpha.
    pub fn to_rgba(&self, color: [u8; 3]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &alpha in &self.pixels {
            out.extend_from_slice(&[color[0], color[1], color[2], alpha]);
        }
        out
    }

    /// Shrink with an integer box filter until neither side exceeds `max_side`.
    ///
    /// GPU backends reject textures past their size limit, so previews go
    /// through this before upload.
    pub fn fit_within(self, max_side: u32) -> Bitmap {
        let max_side = max_side.max(1);
        let longest = self.width.max(self.height);
        if longest <= max_side {
            return self;
        }

        let factor = longest.div_ceil(max_side);
        let width = self.width.div_ceil(factor);
        let height = self.height.div_ceil(factor);
        let stride = self.width as usize;
        let mut pixels = Vec::with_capacity(width as usize * height as usize);

        for y in 0..height {
            let rows = y * factor..((y + 1) * factor).min(self.height);
            for x in 0..width {
                let cols = x * factor..((x + 1) * factor).min(self.width);
                let mut sum = 0u32;
                let mut count = 0u32;
                for sy in rows.clone() {
                    for sx in cols.clone() {
                        sum += u32::from(self.pixels[sy as usize * stride + sx as usize]);
                        count += 1;
                    }
                }
                pixels.push((sum / count.max(1)) as u8);
            }
        }

        Bitmap {
            width,
            height,
            pixels,
        }
    }

    /// Write dark-on-light grayscale PNG.
    #[cfg(feature = "raster")]
    pub fn save_png(&self, path: &Path) -> Result<()> {
        use anyhow::{anyhow, Context};

        let inverted: Vec<u8> = self.pixels.iter().map(|c| 255 - c).collect();
        let image = image::GrayImage::from_raw(self.width, self.height, inverted)
            .ok_or_else(|| anyhow!("bitmap buffer does not match {}x{}", self.width, self.height))?;
        image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("writing {}", path.display()))
    }

    #[cfg(feature = "raster")]
    fn blend(&mut self, x: i64, y: i64, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
        self.pixels[idx] = self.pixels[idx].saturating_add(value);
    }
}

/// Turns text into pixels using a font file.
pub trait TextRasterizer {
    /// Render `text` with the face at `path` (collection face `ttc_index`).
    ///
    /// Errors mean the font could not be loaded or shaped; callers show a
    /// placeholder rather than abort.
    fn rasterize(
        &self,
        path: &Path,
        ttc_index: Option<u32>,
        text: &str,
        size_pt: f32,
        opts: &RenderOptions,
    ) -> Result<Bitmap>;
}

/// Rasterizer that never draws anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRasterizer;

impl TextRasterizer for NoopRasterizer {
    fn rasterize(
        &self,
        _path: &Path,
        _ttc_index: Option<u32>,
        text: &str,
        size_pt: f32,
        _opts: &RenderOptions,
    ) -> Result<Bitmap> {
        let line = pt_to_px(size_pt).ceil().max(1.0) as u32;
        let columns = text.chars().count().max(1) as u32;
        Ok(Bitmap::blank(columns * line / 2, line))
    }
}

/// What a front end should show for one preview request.
#[derive(Debug)]
pub enum PreviewOutcome {
    Rendered(Bitmap),
    /// The font could not be rendered; show a placeholder.
    Placeholder,
    /// No rasterizer in this session; use the toolkit's own text rendering.
    Native,
}

/// Render a preview if a rasterizer is available, absorbing failures.
pub fn render_preview(
    rasterizer: Option<&dyn TextRasterizer>,
    path: &Path,
    ttc_index: Option<u32>,
    text: &str,
    size_pt: f32,
    opts: &RenderOptions,
) -> PreviewOutcome {
    let Some(rasterizer) = rasterizer else {
        return PreviewOutcome::Native;
    };
    match rasterizer.rasterize(path, ttc_index, text, size_pt, opts) {
        Ok(bitmap) => PreviewOutcome::Rendered(bitmap),
        Err(err) => {
            log::warn!("preview of {} failed: {err:#}", path.display());
            PreviewOutcome::Placeholder
        }
    }
}

/// The rasterizer compiled into this build, if any.
pub fn default_rasterizer() -> Option<Box<dyn TextRasterizer>> {
    #[cfg(feature = "raster")]
    {
        Some(Box::new(GlyphRasterizer::default()))
    }
    #[cfg(not(feature = "raster"))]
    {
        log::info!("built without the raster feature; previews use native text");
        None
    }
}

#[cfg(feature = "raster")]
pub use glyph::GlyphRasterizer;

#[cfg(feature = "raster")]
mod glyph {
    use std::fs;
    use std::path::Path;

    use ab_glyph::{point, Font, FontRef, Glyph, GlyphId, PxScale};
    use anyhow::{anyhow, Context, Result};
    use rustybuzz::ttf_parser::Tag;
    use rustybuzz::{Face, Feature, UnicodeBuffer};

    use super::{pt_to_px, Bitmap, RenderOptions, TextRasterizer};

    const LIGATURE_FEATURES: [&[u8; 4]; 3] = [b"liga", b"clig", b"calt"];

    /// rustybuzz shaping plus ab_glyph outline rasterization.
    #[derive(Debug, Clone, Copy)]
    pub struct GlyphRasterizer {
        /// Blank margin around the text, in pixels.
        pub padding: u32,
    }

    impl Default for GlyphRasterizer {
        fn default() -> Self {
            Self { padding: 4 }
        }
    }

    struct PlacedGlyph {
        id: u16,
        x: f32,
        y: f32,
    }

    impl TextRasterizer for GlyphRasterizer {
        fn rasterize(
            &self,
            path: &Path,
            ttc_index: Option<u32>,
            text: &str,
            size_pt: f32,
            opts: &RenderOptions,
        ) -> Result<Bitmap> {
            let data = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
            let index = ttc_index.unwrap_or(0);

            let face = Face::from_slice(&data, index)
                .ok_or_else(|| anyhow!("cannot shape with {}", path.display()))?;
            let font = FontRef::try_from_slice_and_index(&data, index)
                .with_context(|| format!("cannot outline glyphs of {}", path.display()))?;

            let units_per_em = font.units_per_em().unwrap_or(1000.0);
            let px_per_em = pt_to_px(size_pt.max(1.0));
            let px_per_unit = px_per_em / units_per_em;
            let line_px = px_per_em * font.height_unscaled() / units_per_em;
            let scale = PxScale::from(line_px);

            if text.is_empty() {
                return Ok(Bitmap::blank(1, line_px.ceil().max(1.0) as u32));
            }

            let ascent = font.ascent_unscaled() * px_per_unit;
            let descent = font.descent_unscaled() * px_per_unit;
            let line_gap = font.line_gap_unscaled() * px_per_unit;
            let line_height = ascent - descent;
            let features = shaping_features(opts);
            let pad = self.padding as f32;

            let mut placed = Vec::new();
            let mut widest: f32 = 0.0;
            let mut lines = 0usize;

            for (line_no, line) in text.split('\n').enumerate() {
                lines += 1;
                let baseline = pad + ascent + line_no as f32 * (line_height + line_gap);

                let mut buffer = UnicodeBuffer::new();
                buffer.push_str(line);
                buffer.guess_segment_properties();
                let shaped = rustybuzz::shape(&face, &features, buffer);

                let mut pen = 0.0f32;
                for (info, pos) in shaped.glyph_infos().iter().zip(shaped.glyph_positions()) {
                    placed.push(PlacedGlyph {
                        id: info.glyph_id as u16,
                        x: pad + (pen + pos.x_offset as f32) * px_per_unit,
                        y: baseline - pos.y_offset as f32 * px_per_unit,
                    });
                    pen += pos.x_advance as f32;
                }
                widest = widest.max(pen * px_per_unit);
            }

            let width = (widest + 2.0 * pad).ceil().max(1.0) as u32;
            let height = (lines as f32 * line_height
                + lines.saturating_sub(1) as f32 * line_gap
                + 2.0 * pad)
                .ceil()
                .max(1.0) as u32;
            let mut bitmap = Bitmap::blank(width, height);

            for glyph in placed {
                let outline = font.outline_glyph(Glyph {
                    id: GlyphId(glyph.id),
                    scale,
                    position: point(glyph.x, glyph.y),
                });
                let Some(outline) = outline else {
                    continue;
                };
                let bounds = outline.px_bounds();
                outline.draw(|x, y, coverage| {
                    bitmap.blend(
                        bounds.min.x as i64 + x as i64,
                        bounds.min.y as i64 + y as i64,
                        coverage,
                    );
                });
            }

            Ok(bitmap)
        }
    }

    fn shaping_features(opts: &RenderOptions) -> Vec<Feature> {
        if opts.ligatures {
            return Vec::new();
        }
        LIGATURE_FEATURES
            .iter()
            .map(|tag| Feature::new(Tag::from_bytes(tag), 0, ..))
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use std::path::PathBuf;

        use super::*;

        #[test]
        fn disabling_ligatures_turns_features_off() {
            let features = shaping_features(&RenderOptions { ligatures: false });
            assert_eq!(features.len(), 3);
            assert!(features.iter().all(|f| f.value == 0));
            assert!(shaping_features(&RenderOptions::default()).is_empty());
        }

        #[test]
        fn corrupt_font_is_an_error() {
            let tmp = tempfile::tempdir().expect("tempdir");
            let path = tmp.path().join("broken.ttf");
            fs::write(&path, b"definitely not sfnt").expect("write");

            let result = GlyphRasterizer::default().rasterize(
                &path,
                None,
                "fi",
                12.0,
                &RenderOptions::default(),
            );
            assert!(result.is_err());
        }

        fn fixture(name: &str) -> PathBuf {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("tests/fixtures")
                .join(name)
        }

        fn render(path: &Path, ttc_index: Option<u32>, text: &str, ligatures: bool) -> Bitmap {
            GlyphRasterizer::default()
                .rasterize(path, ttc_index, text, 36.0, &RenderOptions { ligatures })
                .expect("fixture renders")
        }

        #[test]
        fn fixture_font_draws_ink() {
            let bitmap = render(&fixture("FixtureSans-Regular.ttf"), None, "fi of", true);
            assert!(!bitmap.is_empty());
            assert!(bitmap.width > 8 && bitmap.height > 8);
        }

        #[test]
        fn ligatures_change_the_shaped_width() {
            let path = fixture("FixtureSans-Regular.ttf");
            let joined = render(&path, None, "fi", true);
            let split = render(&path, None, "fi", false);

            // f_i advances 500 units, f + i advance 700
            assert!(joined.width < split.width);
            assert!(split.width - joined.width >= 8);
            assert_ne!(joined.pixels, split.pixels);
        }

        #[test]
        fn collection_faces_render_by_index() {
            let path = fixture("FixtureCollection.ttc");
            assert!(!render(&path, Some(0), "o", true).is_empty());
            assert!(!render(&path, Some(1), "o", true).is_empty());
            assert!(GlyphRasterizer::default()
                .rasterize(&path, Some(2), "o", 36.0, &RenderOptions::default())
                .is_err());
        }

        #[test]
        fn empty_text_is_a_blank_line() {
            let bitmap = render(&fixture("FixtureSans-Regular.ttf"), None, "", true);
            assert_eq!((bitmap.width, bitmap.height), (1, 48));
            assert!(bitmap.is_empty());
        }

        #[test]
        fn missing_font_is_an_error() {
            let result = GlyphRasterizer::default().rasterize(
                Path::new("/nonexistent/font.ttf"),
                None,
                "fi",
                12.0,
                &RenderOptions::default(),
            );
            assert!(result.is_err());
        }
    }
}
