//! Browsing state shared by every front end (made by FontLab https://www.fontlab.com/)

use crate::catalog::{Catalog, FontEntry, FontSource};
use crate::filter::filter_indices;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// The search box and the highlighted row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    /// Index into the filtered view, not into the catalog.
    pub selected: Option<usize>,
}

/// A catalog plus the user's current view of it.
#[derive(Debug, Clone)]
pub struct FontBrowser {
    catalog: Catalog,
    state: FilterState,
    matches: Vec<usize>,
    page: usize,
    page_size: usize,
}

impl FontBrowser {
    /// Load the catalog and compute the first view before returning, so a
    /// front end can draw populated rows on its first frame.
    pub fn load(source: &dyn FontSource, page_size: usize) -> Self {
        Self::from_catalog(Catalog::load(source), page_size)
    }

    pub fn from_catalog(catalog: Catalog, page_size: usize) -> Self {
        let mut browser = Self {
            catalog,
            state: FilterState::default(),
            matches: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
        };
        browser.apply_filter();
        browser
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.state.query
    }

    /// Replace the query; resets paging and selection.
    pub fn set_query(&mut self, query: &str) {
        if self.state.query == query {
            return;
        }
        self.state.query = query.to_string();
        self.state.selected = None;
        self.page = 0;
        self.apply_filter();
    }

    /// Rebuild the catalog from `source` and reapply the current query.
    pub fn refresh(&mut self, source: &dyn FontSource) {
        let selected_name = self.selected().map(|e| e.display_name.clone());
        self.catalog = Catalog::load(source);
        self.apply_filter();
        self.state.selected = selected_name.and_then(|name| {
            self.matches
                .iter()
                .position(|&idx| self.catalog.entries()[idx].display_name == name)
        });
        self.page = self.page.min(self.page_count() - 1);
    }

    pub fn filtered_len(&self) -> usize {
        self.matches.len()
    }

    /// All entries matching the query, in catalog order.
    pub fn filtered(&self) -> impl Iterator<Item = &FontEntry> + '_ {
        self.matches.iter().map(|&idx| &self.catalog.entries()[idx])
    }

    /// Entries on the current page together with their filtered index.
    pub fn visible(&self) -> Vec<(usize, &FontEntry)> {
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(self.matches.len());
        (start..end)
            .map(|pos| (pos, &self.catalog.entries()[self.matches[pos]]))
            .collect()
    }

    /// Zero-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages; an empty view still has one (empty) page.
    pub fn page_count(&self) -> usize {
        self.matches.len().div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self) -> bool {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Highlight the `index`-th filtered entry and move to its page.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.matches.len() {
            return false;
        }
        self.state.selected = Some(index);
        self.page = index / self.page_size;
        true
    }

    pub fn clear_selection(&mut self) {
        self.state.selected = None;
    }

    pub fn selected(&self) -> Option<&FontEntry> {
        let pos = self.state.selected?;
        self.matches
            .get(pos)
            .map(|&idx| &self.catalog.entries()[idx])
    }

    fn apply_filter(&mut self) {
        let names = self.catalog.names();
        self.matches = filter_indices(&names, &self.state.query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticFontSource;

    fn browser_with(count: usize, page_size: usize) -> FontBrowser {
        let names: Vec<String> = (0..count).map(|i| format!("Font {i:03}")).collect();
        FontBrowser::load(&StaticFontSource::from_names(&names), page_size)
    }

    #[test]
    fn first_view_is_ready_after_load() {
        let browser = browser_with(5, 2);
        assert_eq!(browser.filtered_len(), 5);
        assert_eq!(browser.page_count(), 3);
        assert_eq!(browser.visible().len(), 2);
    }

    #[test]
    fn paging_is_clamped() {
        let mut browser = browser_with(5, 2);
        assert!(!browser.prev_page());
        assert!(browser.next_page());
        assert!(browser.next_page());
        assert!(!browser.next_page());
        assert_eq!(browser.page(), 2);
        assert_eq!(browser.visible(), vec![(4, &browser.catalog().entries()[4])]);
    }

    #[test]
    fn query_resets_page_and_selection() {
        let mut browser = browser_with(30, 10);
        browser.select(25);
        assert_eq!(browser.page(), 2);

        browser.set_query("font 01");
        assert_eq!(browser.page(), 0);
        assert_eq!(browser.state().selected, None);
        assert_eq!(browser.filtered_len(), 10);
    }

    #[test]
    fn selection_indexes_filtered_view() {
        let mut browser =
            FontBrowser::load(&StaticFontSource::from_names(["Arial", "Calibri", "arial bold"]), 10);
        browser.set_query("arial");
        assert!(browser.select(1));
        assert_eq!(browser.selected().map(|e| e.display_name.as_str()), Some("arial bold"));
        assert!(!browser.select(2));
    }

    #[test]
    fn empty_catalog_has_one_empty_page() {
        let browser = FontBrowser::load(&StaticFontSource::default(), 10);
        assert_eq!(browser.page_count(), 1);
        assert!(browser.visible().is_empty());
        assert!(browser.selected().is_none());
    }

    #[test]
    fn refresh_keeps_query_and_selection_by_name() {
        let mut browser =
            FontBrowser::load(&StaticFontSource::from_names(["Inter", "Lato", "Lora"]), 10);
        browser.set_query("l");
        browser.select(1);
        assert_eq!(browser.selected().unwrap().display_name, "Lora");

        browser.refresh(&StaticFontSource::from_names(["Lora", "Inter", "Lobster", "Lato"]));

        assert_eq!(browser.query(), "l");
        assert_eq!(browser.filtered_len(), 3);
        assert_eq!(browser.selected().unwrap().display_name, "Lora");
    }
}
