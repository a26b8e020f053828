//! Static pantry reference data: ingredients grouped into categories.

use crate::recipe::CatalogError;
use crate::selection::SelectionSet;
use serde::{Deserialize, Serialize};

const BUNDLED_PANTRY: &str = include_str!("../data/ingredients.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(rename = "image", default)]
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientCategory {
    pub name: String,
    #[serde(rename = "image", default)]
    pub image_ref: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IngredientCatalog {
    pub categories: Vec<IngredientCategory>,
}

/// A category as shown by the ingredient picker, restricted to the
/// ingredients matching the current picker search.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView<'a> {
    pub name: &'a str,
    pub image_ref: &'a str,
    pub ingredients: Vec<&'a Ingredient>,
}

impl CategoryView<'_> {
    /// Number of visible ingredients that are currently selected
    pub fn selected_count(&self, selection: &SelectionSet) -> usize {
        self.ingredients
            .iter()
            .filter(|ingredient| selection.contains(&ingredient.name))
            .count()
    }
}

impl IngredientCatalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|e| CatalogError::InvalidJson(e.to_string()))
    }

    /// The pantry shipped with the crate
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_PANTRY)
    }

    pub fn ingredient_count(&self) -> usize {
        self.categories.iter().map(|c| c.ingredients.len()).sum()
    }

    /// Case-insensitive lookup by ingredient name
    pub fn find(&self, name: &str) -> Option<&Ingredient> {
        let needle = name.trim().to_lowercase();
        self.categories
            .iter()
            .flat_map(|c| c.ingredients.iter())
            .find(|ingredient| ingredient.name.to_lowercase() == needle)
    }

    /// Categories whose ingredients contain `query` (case-insensitive
    /// substring). Categories left with no ingredients are omitted; an empty
    /// query shows everything.
    pub fn search(&self, query: &str) -> Vec<CategoryView<'_>> {
        let needle = query.trim().to_lowercase();

        self.categories
            .iter()
            .filter_map(|category| {
                let ingredients: Vec<&Ingredient> = category
                    .ingredients
                    .iter()
                    .filter(|ingredient| ingredient.name.to_lowercase().contains(&needle))
                    .collect();

                if ingredients.is_empty() {
                    None
                } else {
                    Some(CategoryView {
                        name: &category.name,
                        image_ref: &category.image_ref,
                        ingredients,
                    })
                }
            })
            .collect()
    }
}
