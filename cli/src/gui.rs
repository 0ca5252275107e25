//! Font browser window on eframe/egui (made by FontLab https://www.fontlab.com/)
//!
//! The window is a thin shell over [`FontBrowser`]: the catalog is loaded
//! before the first frame, every widget event calls straight into the core,
//! and the chosen display name is handed back once the window closes.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use eframe::egui::{
    self, Color32, ColorImage, ComboBox, FontData, FontDefinitions, FontFamily, FontId, Key,
    RichText, ScrollArea, TextureHandle, TextureOptions, ViewportCommand,
};

use fontsearch_core::browser::{FontBrowser, DEFAULT_PAGE_SIZE};
use fontsearch_core::catalog::{read_face_data, FontEntry, SystemFontSource};
use fontsearch_core::i18n::{self, Translator};
use fontsearch_core::render::{self, Bitmap, PreviewOutcome, RenderOptions, TextRasterizer};

use crate::GuiMode;

const ROW_SAMPLE_PT: f32 = 18.0;
const WINDOW_SIZE: [f32; 2] = [960.0, 680.0];
const INK: [u8; 3] = [20, 20, 20];
/// Installed fonts tried, in order, for CJK interface labels.
const CJK_FALLBACK_FONTS: &[&str] = &[
    "Noto Sans CJK SC",
    "Noto Sans SC",
    "Source Han Sans",
    "PingFang SC",
    "Hiragino Sans",
    "Microsoft YaHei",
    "Yu Gothic UI",
    "MS Gothic",
    "WenQuanYi",
];

pub struct GuiConfig {
    pub mode: GuiMode,
    pub source: SystemFontSource,
    pub translator: Translator,
    pub sample_text: Option<String>,
    pub size_pt: f32,
    pub ligatures: bool,
}

/// Open the window and block until it closes. Returns the chosen font name.
pub fn run(config: GuiConfig) -> Result<Option<String>> {
    let choice = Rc::new(RefCell::new(None));
    let app_choice = Rc::clone(&choice);

    let title = config.translator.t("app_title");
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(title.clone())
            .with_inner_size(WINDOW_SIZE),
        ..Default::default()
    };

    // Load fonts up front so the first frame already shows them.
    let browser = FontBrowser::load(&config.source, DEFAULT_PAGE_SIZE);
    log::debug!("{} fonts ready for the {:?} window", browser.catalog().len(), config.mode);

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(FontViewerApp::new(config, browser, app_choice)))),
    )
    .map_err(|err| anyhow!("font browser window failed: {err}"))?;

    let selected = choice.borrow_mut().take();
    Ok(selected)
}

struct Preview {
    key: PreviewKey,
    texture: Option<TextureHandle>,
    error: Option<String>,
}

#[derive(Clone, PartialEq)]
struct PreviewKey {
    font: String,
    text: String,
    size_pt: u32,
    ligatures: bool,
}

struct FontViewerApp {
    mode: GuiMode,
    source: SystemFontSource,
    browser: FontBrowser,
    tr: Translator,
    rasterizer: Option<Box<dyn TextRasterizer>>,
    query: String,
    sample_text: String,
    size_pt: f32,
    ligatures: bool,
    preview: Option<Preview>,
    /// Families usable in this frame.
    fonts_ready: HashSet<String>,
    /// Families handed to egui, usable from the next frame.
    fonts_requested: HashSet<String>,
    fonts_pending: bool,
    fonts_initialized: bool,
    failed_fonts: HashSet<String>,
    ui_fallback: Option<FontEntry>,
    choice: Rc<RefCell<Option<String>>>,
}

impl FontViewerApp {
    fn new(config: GuiConfig, browser: FontBrowser, choice: Rc<RefCell<Option<String>>>) -> Self {
        let rasterizer = if config.mode == GuiMode::Basic {
            None
        } else {
            render::default_rasterizer()
        };
        let sample_text = config
            .sample_text
            .unwrap_or_else(|| config.translator.t("sample_text_default"));
        let ui_fallback = find_ui_fallback(&browser);

        Self {
            mode: config.mode,
            source: config.source,
            browser,
            tr: config.translator,
            rasterizer,
            query: String::new(),
            sample_text,
            size_pt: config.size_pt.clamp(8.0, 144.0),
            ligatures: config.ligatures,
            preview: None,
            fonts_ready: HashSet::new(),
            fonts_requested: HashSet::new(),
            fonts_pending: false,
            fonts_initialized: false,
            failed_fonts: HashSet::new(),
            ui_fallback,
            choice,
        }
    }

    fn advanced(&self) -> bool {
        self.mode != GuiMode::Basic
    }

    fn accept(&mut self, ctx: &egui::Context) {
        if let Some(entry) = self.browser.selected() {
            *self.choice.borrow_mut() = Some(entry.display_name.clone());
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }
    }

    fn cancel(&mut self, ctx: &egui::Context) {
        self.choice.borrow_mut().take();
        ctx.send_viewport_cmd(ViewportCommand::Close);
    }

    fn set_language(&mut self, code: &str) {
        let old_default = self.tr.t("sample_text_default");
        if self.tr.set_language(code) && self.sample_text == old_default {
            self.sample_text = self.tr.t("sample_text_default");
        }
    }

    /// Register the fonts of the visible page with egui.
    ///
    /// New definitions only apply from the next frame, so rows keep using
    /// `fonts_ready` until then.
    fn sync_fonts(&mut self, ctx: &egui::Context) {
        if self.fonts_pending {
            self.fonts_ready = self.fonts_requested.clone();
            self.fonts_pending = false;
        }

        let wanted: Vec<FontEntry> = self
            .browser
            .visible()
            .into_iter()
            .map(|(_, entry)| entry.clone())
            .filter(|entry| !self.failed_fonts.contains(&entry.display_name))
            .collect();
        if self.fonts_initialized
            && wanted
                .iter()
                .all(|entry| self.fonts_requested.contains(&entry.display_name))
        {
            return;
        }

        let mut defs = FontDefinitions::default();
        if let Some(entry) = &self.ui_fallback {
            add_ui_fallback(&mut defs, entry);
        }
        let fallback = defs
            .families
            .get(&FontFamily::Proportional)
            .cloned()
            .unwrap_or_default();
        let mut requested = HashSet::new();

        for entry in &wanted {
            let bytes = match read_face_data(entry) {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::warn!("{err:#}");
                    self.failed_fonts.insert(entry.display_name.clone());
                    continue;
                }
            };
            let key = format!("font:{}", entry.display_name);
            let mut data = FontData::from_owned(bytes);
            data.index = entry.ttc_index.unwrap_or(0);
            defs.font_data.insert(key.clone(), Arc::new(data));

            let mut stack = vec![key];
            stack.extend(fallback.iter().cloned());
            defs.families
                .insert(FontFamily::Name(entry.display_name.as_str().into()), stack);
            requested.insert(entry.display_name.clone());
        }

        ctx.set_fonts(defs);
        self.fonts_requested = requested;
        self.fonts_pending = true;
        self.fonts_initialized = true;
    }

    fn preview_key(&self) -> Option<PreviewKey> {
        let entry = self.browser.selected()?;
        Some(PreviewKey {
            font: entry.display_name.clone(),
            text: self.sample_text.clone(),
            size_pt: self.size_pt.round() as u32,
            ligatures: self.ligatures,
        })
    }

    /// Re-rasterize the selected font when its inputs changed.
    fn sync_preview(&mut self, ctx: &egui::Context) {
        if self.rasterizer.is_none() {
            return;
        }
        let Some(key) = self.preview_key() else {
            self.preview = None;
            return;
        };
        if self.preview.as_ref().is_some_and(|p| p.key == key) {
            return;
        }
        let Some(entry) = self.browser.selected() else {
            return;
        };

        let opts = RenderOptions {
            ligatures: key.ligatures,
        };
        let outcome = render::render_preview(
            self.rasterizer.as_deref(),
            &entry.path,
            entry.ttc_index,
            &key.text,
            key.size_pt as f32,
            &opts,
        );
        let preview = match outcome {
            PreviewOutcome::Rendered(bitmap) => {
                let image = preview_image(bitmap, ctx.input(|i| i.max_texture_side));
                Preview {
                    texture: Some(ctx.load_texture("preview", image, TextureOptions::LINEAR)),
                    error: None,
                    key,
                }
            }
            PreviewOutcome::Placeholder | PreviewOutcome::Native => Preview {
                texture: None,
                error: Some(self.tr.translate("font_load_failed", &[("name", key.font.clone())])),
                key,
            },
        };
        self.preview = Some(preview);
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        let typing = ctx.wants_keyboard_input();
        let action = ctx.input(|i| key_action(typing, |key| i.key_pressed(key)));
        let Some(action) = action else {
            return;
        };

        let len = self.browser.filtered_len();
        let current = self.browser.state().selected;
        match action {
            KeyAction::Cancel => self.cancel(ctx),
            KeyAction::Accept => self.accept(ctx),
            KeyAction::Next if len > 0 => {
                self.browser.select(current.map_or(0, |idx| (idx + 1).min(len - 1)));
            }
            KeyAction::Previous if len > 0 => {
                self.browser.select(current.map_or(0, |idx| idx.saturating_sub(1)));
            }
            KeyAction::Next | KeyAction::Previous => {}
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.tr.t("search_label"));
            let search = egui::TextEdit::singleline(&mut self.query)
                .hint_text(self.tr.t("search_placeholder"))
                .desired_width(280.0);
            if ui.add(search).changed() {
                self.browser.set_query(&self.query);
            }

            if ui.button(self.tr.t("refresh_button")).clicked() {
                self.browser.refresh(&self.source);
                self.failed_fonts.clear();
                self.fonts_initialized = false;
            }

            if self.mode == GuiMode::I18n {
                ui.separator();
                ui.label(self.tr.t("language_label"));
                let mut code = self.tr.language().to_string();
                let current = i18n::language_name(&code).unwrap_or("?");
                ComboBox::from_id_salt("language")
                    .selected_text(current)
                    .show_ui(ui, |ui| {
                        for (lang, name) in i18n::available_languages() {
                            ui.selectable_value(&mut code, lang.to_string(), *name);
                        }
                    });
                if code != self.tr.language() {
                    self.set_language(&code);
                }
            }
        });

        if !self.advanced() {
            return;
        }

        ui.horizontal(|ui| {
            ui.label(self.tr.t("sample_text_label"));
            ui.add(egui::TextEdit::singleline(&mut self.sample_text).desired_width(360.0));
            ui.label(self.tr.t("font_size_label"));
            ui.add(egui::Slider::new(&mut self.size_pt, 8.0..=144.0).suffix(" pt"));
            ui.checkbox(&mut self.ligatures, self.tr.t("ligatures_label"));
        });
    }

    fn draw_status(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            let count = self.browser.filtered_len().to_string();
            ui.label(self.tr.translate("fonts_found", &[("count", count)]));
            ui.separator();

            if ui.button(self.tr.t("previous_page")).clicked() {
                self.browser.prev_page();
            }
            let page = (self.browser.page() + 1).to_string();
            let total = self.browser.page_count().to_string();
            ui.label(self.tr.translate("page_info", &[("current", page), ("total", total)]));
            if ui.button(self.tr.t("next_page")).clicked() {
                self.browser.next_page();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(self.tr.t("cancel_button")).clicked() {
                    self.cancel(ctx);
                }
                let can_select = self.browser.selected().is_some();
                if ui
                    .add_enabled(can_select, egui::Button::new(self.tr.t("select_button")))
                    .clicked()
                {
                    self.accept(ctx);
                }
                if let Some(entry) = self.browser.selected() {
                    ui.label(
                        self.tr
                            .translate("selected_font", &[("name", entry.display_name.clone())]),
                    );
                }
            });
        });
    }

    fn draw_list(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let rows: Vec<(usize, FontEntry)> = self
            .browser
            .visible()
            .into_iter()
            .map(|(idx, entry)| (idx, entry.clone()))
            .collect();

        if rows.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(self.tr.t("no_fonts_found")).italics());
            });
            return;
        }

        let sample = if self.advanced() {
            self.sample_text.clone()
        } else {
            self.tr.t("sample_text_default")
        };
        let selected = self.browser.state().selected;
        let mut clicked = None;
        let mut activated = false;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (idx, entry) in &rows {
                    let resp = ui.selectable_label(selected == Some(*idx), entry.display_name.as_str());
                    if resp.clicked() {
                        clicked = Some(*idx);
                    }
                    if resp.double_clicked() {
                        clicked = Some(*idx);
                        activated = true;
                    }

                    if self.fonts_ready.contains(&entry.display_name) {
                        let family = FontFamily::Name(entry.display_name.as_str().into());
                        ui.label(RichText::new(&sample).font(FontId::new(ROW_SAMPLE_PT, family)));
                    } else if self.failed_fonts.contains(&entry.display_name) {
                        ui.label(
                            RichText::new(
                                self.tr
                                    .translate("font_load_failed", &[("name", entry.display_name.clone())]),
                            )
                            .color(Color32::GRAY),
                        );
                    } else {
                        ui.label(RichText::new(&sample).color(Color32::GRAY));
                    }
                    ui.separator();
                }
            });

        if let Some(idx) = clicked {
            self.browser.select(idx);
        }
        if activated {
            self.accept(ctx);
        }
    }

    fn draw_preview(&mut self, ui: &mut egui::Ui) {
        if self.rasterizer.is_none() {
            ui.label(RichText::new(self.tr.t("preview_unavailable")).italics());
            if let Some(entry) = self.browser.selected() {
                if self.fonts_ready.contains(&entry.display_name) {
                    let family = FontFamily::Name(entry.display_name.as_str().into());
                    ui.label(RichText::new(&self.sample_text).font(FontId::new(self.size_pt, family)));
                }
            }
            return;
        }

        match &self.preview {
            Some(Preview {
                texture: Some(texture),
                ..
            }) => {
                ScrollArea::both().show(ui, |ui| {
                    ui.image((texture.id(), texture.size_vec2()));
                });
            }
            Some(Preview {
                error: Some(message),
                ..
            }) => {
                ui.label(RichText::new(message).color(Color32::GRAY));
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Cancel,
    Accept,
    Next,
    Previous,
}

/// Escape always cancels; the other keys belong to a focused text field.
fn key_action(typing: bool, pressed: impl Fn(Key) -> bool) -> Option<KeyAction> {
    if pressed(Key::Escape) {
        return Some(KeyAction::Cancel);
    }
    if typing {
        return None;
    }
    if pressed(Key::Enter) {
        Some(KeyAction::Accept)
    } else if pressed(Key::ArrowDown) {
        Some(KeyAction::Next)
    } else if pressed(Key::ArrowUp) {
        Some(KeyAction::Previous)
    } else {
        None
    }
}

/// Texture for a rendered preview, shrunk to what the GPU accepts.
fn preview_image(bitmap: Bitmap, max_texture_side: usize) -> ColorImage {
    let max_side = u32::try_from(max_texture_side).unwrap_or(u32::MAX);
    let bitmap = bitmap.fit_within(max_side);
    ColorImage::from_rgba_unmultiplied(
        [bitmap.width as usize, bitmap.height as usize],
        &bitmap.to_rgba(INK),
    )
}

fn find_ui_fallback(browser: &FontBrowser) -> Option<FontEntry> {
    CJK_FALLBACK_FONTS.iter().find_map(|candidate| {
        browser
            .catalog()
            .filter(candidate)
            .into_iter()
            .find(|entry| read_face_data(entry).is_ok())
            .cloned()
    })
}

/// Append `entry` to egui's own stacks so translated labels have glyphs.
fn add_ui_fallback(defs: &mut FontDefinitions, entry: &FontEntry) {
    let bytes = match read_face_data(entry) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::debug!("interface fallback unavailable: {err:#}");
            return;
        }
    };
    let key = format!("fallback:{}", entry.display_name);
    let mut data = FontData::from_owned(bytes);
    data.index = entry.ttc_index.unwrap_or(0);
    defs.font_data.insert(key.clone(), Arc::new(data));

    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        defs.families.entry(family).or_default().push(key.clone());
    }
}

impl eframe::App for FontViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard(ctx);
        self.sync_fonts(ctx);
        if self.advanced() {
            self.sync_preview(ctx);
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            self.draw_controls(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.draw_status(ui, ctx);
        });

        if self.advanced() {
            egui::SidePanel::right("preview")
                .resizable(true)
                .default_width(380.0)
                .show(ctx, |ui| self.draw_preview(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| self.draw_list(ui, ctx));
    }
}
