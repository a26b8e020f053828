//! Recipe filter engine
//!
//! Pure selection of the recipes matching a free-text query and the selected
//! pantry ingredients. The result is always a stable subsequence of the
//! catalog: recipes are never re-ordered.
//!
//! Ingredient matching is plain substring containment over the ingredients
//! text, so a selected "pea" also matches "peanut". Callers that need exact
//! matching must tokenize the ingredient list themselves.

use crate::recipe::Recipe;
use crate::selection::SelectionSet;
use serde::Serialize;

/// Everything the filter engine needs besides the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterQuery {
    pub text: String,
    pub selected: SelectionSet,
}

impl FilterQuery {
    pub fn new(text: impl Into<String>, selected: SelectionSet) -> Self {
        Self {
            text: text.into(),
            selected,
        }
    }

    /// True when neither the text nor the selection restricts the catalog
    pub fn is_unrestricted(&self) -> bool {
        tokenize(&self.text).is_empty() && self.selected.is_empty()
    }
}

/// Lowercase `text` and split it on whitespace, dropping empty tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Every token must appear in the lowercased title or ingredients text
pub fn matches_text(recipe: &Recipe, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }

    let title = recipe.title.to_lowercase();
    let ingredients = recipe.ingredients_text.to_lowercase();

    tokens
        .iter()
        .all(|token| title.contains(token.as_str()) || ingredients.contains(token.as_str()))
}

/// Every selected ingredient must appear in the lowercased ingredients text
pub fn contains_selected(recipe: &Recipe, selected: &SelectionSet) -> bool {
    if selected.is_empty() {
        return true;
    }

    let ingredients = recipe.ingredients_text.to_lowercase();
    selected.keys().all(|name| ingredients.contains(name))
}

/// Catalog positions of the recipes satisfying `query`, in catalog order
pub fn filter_indices(catalog: &[Recipe], query: &FilterQuery) -> Vec<usize> {
    let tokens = tokenize(&query.text);

    catalog
        .iter()
        .enumerate()
        .filter(|(_, recipe)| {
            matches_text(recipe, &tokens) && contains_selected(recipe, &query.selected)
        })
        .map(|(index, _)| index)
        .collect()
}

/// Recipes satisfying `query`, in catalog order
pub fn filter_recipes<'a>(catalog: &'a [Recipe], query: &FilterQuery) -> Vec<&'a Recipe> {
    filter_indices(catalog, query)
        .into_iter()
        .map(|index| &catalog[index])
        .collect()
}
