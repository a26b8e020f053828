//! One browsing surface over a catalog
//!
//! A [`BrowseSession`] owns the query text, the page cursor and the filtered
//! result for one view. The ingredient selection is not owned here: it is read
//! from the shared [`SelectionStore`], so a toggle made through any other
//! handle shows up on the next [`BrowseSession::sync`].
//!
//! The filtered result is recomputed eagerly whenever the catalog, the text or
//! the selection changes, and every recomputation puts the cursor back on
//! page 1.

use crate::catalog::LoadState;
use crate::store::{SelectionStore, SelectionSubscription};
use pantry_core::filter::{filter_indices, FilterQuery};
use pantry_core::pagination::{PageInfo, Pager};
use pantry_core::recipe::{CatalogSnapshot, Recipe};
use pantry_core::selection::SelectionSet;
use std::sync::Arc;

/// The recipes visible on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a> {
    pub recipes: Vec<&'a Recipe>,
    pub info: PageInfo,
}

#[derive(Debug)]
pub struct BrowseSession {
    catalog: CatalogSnapshot,
    loading: bool,
    load_error: Option<String>,
    text: String,
    store: SelectionStore,
    subscription: SelectionSubscription,
    selection: Arc<SelectionSet>,
    results: Vec<usize>,
    pager: Pager,
    recomputations: usize,
}

impl BrowseSession {
    pub fn new(store: &SelectionStore, state: &LoadState, page_size: usize) -> Self {
        let mut subscription = store.subscribe();
        // Mark whatever is current as seen; it is read below.
        subscription.take_change();

        let mut session = Self {
            catalog: state.snapshot(),
            loading: state.is_loading(),
            load_error: state.error().map(String::from),
            text: String::new(),
            store: store.clone(),
            selection: subscription.current(),
            subscription,
            results: Vec::new(),
            pager: Pager::new(page_size),
            recomputations: 0,
        };
        session.recompute();
        session
    }

    /// Swap in a freshly loaded catalog
    pub fn set_catalog(&mut self, state: &LoadState) {
        let snapshot = state.snapshot();
        self.loading = state.is_loading();
        self.load_error = state.error().map(String::from);

        if !Arc::ptr_eq(&snapshot, &self.catalog) {
            self.catalog = snapshot;
            self.recompute();
        }
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.recompute();
        }
    }

    pub fn query(&self) -> &str {
        &self.text
    }

    pub fn toggle_ingredient(&mut self, name: &str) {
        self.store.toggle(name);
        self.sync();
    }

    pub fn clear_ingredients(&mut self) {
        self.store.clear();
        self.sync();
    }

    /// Pick up a selection published through any store handle.
    /// Returns whether the result was recomputed.
    pub fn sync(&mut self) -> bool {
        match self.subscription.take_change() {
            Some(selection) if !Arc::ptr_eq(&selection, &self.selection) => {
                self.selection = selection;
                self.recompute();
                true
            }
            _ => false,
        }
    }

    fn recompute(&mut self) {
        let query = FilterQuery::new(self.text.as_str(), (*self.selection).clone());
        self.results = filter_indices(&self.catalog, &query);
        self.pager.reset();
        self.recomputations += 1;

        log::debug!(
            "recomputation #{}: {} of {} recipe(s) (query {:?}, {} ingredient(s))",
            self.recomputations,
            self.results.len(),
            self.catalog.len(),
            self.text,
            self.selection.len()
        );
    }

    pub fn selection(&self) -> &Arc<SelectionSet> {
        &self.selection
    }

    /// True until the first load result arrives
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// The full filtered result, in catalog order
    pub fn results(&self) -> Vec<&Recipe> {
        self.results.iter().map(|&i| &self.catalog[i]).collect()
    }

    pub fn page(&self) -> PageView<'_> {
        let page = self.pager.page(&self.results);
        PageView {
            recipes: page.visible.iter().map(|&i| &self.catalog[i]).collect(),
            info: page.info,
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.pager.next(self.results.len())
    }

    pub fn previous_page(&mut self) -> bool {
        self.pager.previous()
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.pager.go_to(page, self.results.len());
    }

    /// The `position`th recipe (1-indexed) on the current page
    pub fn recipe_on_page(&self, position: usize) -> Option<&Recipe> {
        let index = position.checked_sub(1)?;
        self.page().recipes.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(recipes: Vec<Recipe>) -> LoadState {
        LoadState::Ready(Arc::from(recipes))
    }

    fn soups() -> LoadState {
        catalog(vec![
            Recipe::new("Tomato Soup", "", "tomato, salt", ""),
            Recipe::new("Pea Soup", "", "pea, salt", ""),
            Recipe::new("Peanut Cookies", "", "peanut butter, flour", ""),
        ])
    }

    fn numbered(count: usize) -> LoadState {
        catalog(
            (0..count)
                .map(|i| Recipe::new(format!("Recipe {i}"), "", "salt", ""))
                .collect(),
        )
    }

    fn titles(session: &BrowseSession) -> Vec<&str> {
        session.results().iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_unrestricted_shows_whole_catalog() {
        let store = SelectionStore::new();
        let session = BrowseSession::new(&store, &soups(), 20);

        assert_eq!(session.result_count(), 3);
        assert_eq!(session.page().info.label(), "Page 1 of 1");
    }

    #[test]
    fn test_query_and_selection_combine() {
        let store = SelectionStore::new();
        let mut session = BrowseSession::new(&store, &soups(), 20);

        session.set_query("soup");
        session.toggle_ingredient("Salt");
        assert_eq!(titles(&session), vec!["Tomato Soup", "Pea Soup"]);

        session.toggle_ingredient("pea");
        assert_eq!(titles(&session), vec!["Pea Soup"]);
    }

    #[test]
    fn test_substring_selection_matches_peanut() {
        let store = SelectionStore::new();
        let mut session = BrowseSession::new(&store, &soups(), 20);

        session.toggle_ingredient("pea");

        assert_eq!(titles(&session), vec!["Pea Soup", "Peanut Cookies"]);
    }

    #[test]
    fn test_any_change_resets_to_first_page() {
        let store = SelectionStore::new();
        let mut session = BrowseSession::new(&store, &numbered(45), 20);

        session.go_to_page(3);
        assert_eq!(session.page().info.current_page, 3);
        session.set_query("recipe");
        assert_eq!(session.page().info.current_page, 1);

        session.next_page();
        session.toggle_ingredient("salt");
        assert_eq!(session.page().info.current_page, 1);

        session.next_page();
        session.set_catalog(&numbered(45));
        assert_eq!(session.page().info.current_page, 1);
    }

    #[test]
    fn test_next_on_last_page_is_noop() {
        let store = SelectionStore::new();
        let mut session = BrowseSession::new(&store, &numbered(45), 20);

        session.go_to_page(3);
        assert!(!session.next_page());
        assert_eq!(session.page().info.current_page, 3);
        assert_eq!(session.page().recipes.len(), 5);
    }

    #[test]
    fn test_other_surface_toggle_seen_on_sync() {
        let store = SelectionStore::new();
        let mut session = BrowseSession::new(&store, &soups(), 20);
        let sidebar = store.clone();

        sidebar.toggle("tomato");
        assert_eq!(session.result_count(), 3);

        assert!(session.sync());
        assert_eq!(titles(&session), vec!["Tomato Soup"]);
        assert!(Arc::ptr_eq(session.selection(), &store.current()));
        assert!(!session.sync());
    }

    #[test]
    fn test_two_sessions_share_one_selection() {
        let store = SelectionStore::new();
        let mut results = BrowseSession::new(&store, &soups(), 20);
        let mut favorites = BrowseSession::new(&store, &numbered(3), 20);

        results.toggle_ingredient("salt");
        favorites.sync();

        assert!(Arc::ptr_eq(results.selection(), favorites.selection()));
    }

    #[test]
    fn test_unchanged_query_does_not_recompute() {
        let store = SelectionStore::new();
        let mut session = BrowseSession::new(&store, &soups(), 20);
        let before = session.recomputations;

        session.set_query("");
        session.set_catalog(&LoadState::Ready(session.catalog.clone()));

        assert_eq!(session.recomputations, before);
    }

    #[test]
    fn test_failed_load_filters_over_empty_catalog() {
        let store = SelectionStore::new();
        let mut session = BrowseSession::new(&store, &soups(), 20);

        session.set_catalog(&LoadState::Failed("boom".to_string()));

        assert_eq!(session.result_count(), 0);
        assert_eq!(session.load_error(), Some("boom"));
        assert_eq!(session.page().info.total_pages, 0);
    }

    #[test]
    fn test_starts_loading_until_catalog_arrives() {
        let store = SelectionStore::new();
        let mut session = BrowseSession::new(&store, &LoadState::Loading, 20);

        assert!(session.is_loading());
        assert_eq!(session.result_count(), 0);

        session.set_catalog(&soups());

        assert!(!session.is_loading());
        assert_eq!(session.result_count(), 3);
    }

    #[test]
    fn test_recipe_on_page_is_one_indexed() {
        let store = SelectionStore::new();
        let mut session = BrowseSession::new(&store, &numbered(25), 20);

        session.next_page();

        assert_eq!(session.recipe_on_page(1).unwrap().title, "Recipe 20");
        assert!(session.recipe_on_page(0).is_none());
        assert!(session.recipe_on_page(6).is_none());
    }
}
