use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const NO_TITLE: &str = "No Title Available";
pub const NO_INGREDIENTS: &str = "No Ingredients Available";
pub const NO_INSTRUCTIONS: &str = "No Instructions Available";
pub const DEFAULT_IMAGE: &str = "default-image.jpg";

/// Recipe record as shipped in the static bulk catalog (`recipes.json`)
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CatalogRecord {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Image_Name")]
    pub image_name: Option<String>,
    #[serde(rename = "Cleaned_Ingredients")]
    pub cleaned_ingredients: Option<String>,
    #[serde(rename = "Instructions")]
    pub instructions: Option<String>,
}

/// Recipe record as stored in a user's remote favorites collection
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct FavoriteRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Normalized recipe shared by every catalog source.
///
/// Missing source fields are kept as empty strings so the filter engine only
/// ever matches against text that was actually present. Placeholders are a
/// display concern and live in the `display_*` accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Recipe {
    pub title: String,
    pub image_ref: String,
    pub ingredients_text: String,
    pub instructions: String,
}

impl Recipe {
    pub fn new(
        title: impl Into<String>,
        image_ref: impl Into<String>,
        ingredients_text: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            image_ref: image_ref.into(),
            ingredients_text: ingredients_text.into(),
            instructions: instructions.into(),
        }
    }

    pub fn display_title(&self) -> &str {
        non_blank_or(&self.title, NO_TITLE)
    }

    pub fn display_ingredients(&self) -> &str {
        non_blank_or(&self.ingredients_text, NO_INGREDIENTS)
    }

    pub fn display_instructions(&self) -> &str {
        non_blank_or(&self.instructions, NO_INSTRUCTIONS)
    }

    pub fn display_image(&self) -> &str {
        non_blank_or(&self.image_ref, DEFAULT_IMAGE)
    }

    /// Individual ingredient lines extracted from `ingredients_text`
    pub fn ingredient_list(&self) -> Vec<String> {
        split_ingredients(&self.ingredients_text)
    }

    /// Build the payload the favorites store expects for this recipe
    pub fn to_favorite_record(&self) -> FavoriteRecord {
        FavoriteRecord {
            name: Some(self.title.clone()),
            image: Some(self.image_ref.clone()),
            ingredients: self.ingredient_list(),
            instructions: Some(self.instructions.clone()),
        }
    }
}

impl From<CatalogRecord> for Recipe {
    fn from(record: CatalogRecord) -> Self {
        Self {
            title: record.title.unwrap_or_default(),
            image_ref: record.image_name.unwrap_or_default(),
            ingredients_text: record.cleaned_ingredients.unwrap_or_default(),
            instructions: record.instructions.unwrap_or_default(),
        }
    }
}

impl From<FavoriteRecord> for Recipe {
    fn from(record: FavoriteRecord) -> Self {
        Self {
            title: record.name.unwrap_or_default(),
            image_ref: record.image.unwrap_or_default(),
            ingredients_text: record.ingredients.join(", "),
            instructions: record.instructions.unwrap_or_default(),
        }
    }
}

/// Immutable catalog snapshot. A reload produces a new snapshot, so identity
/// comparison tells consumers whether the catalog changed.
pub type CatalogSnapshot = Arc<[Recipe]>;

pub fn empty_catalog() -> CatalogSnapshot {
    Arc::from(Vec::new())
}

/// Error type for catalog payload decoding
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Catalog payload is not an array of recipes")]
    NotAnArray,
}

/// Normalize a static bulk catalog payload into a snapshot
///
/// Records with missing fields are kept. The payload itself must be a JSON
/// array, anything else is rejected.
pub fn parse_catalog(json: &str) -> Result<CatalogSnapshot, CatalogError> {
    let records: Vec<CatalogRecord> = parse_array(json)?;
    Ok(records.into_iter().map(Recipe::from).collect())
}

/// Normalize a favorites collection payload into a snapshot
pub fn parse_favorites(json: &str) -> Result<CatalogSnapshot, CatalogError> {
    let records: Vec<FavoriteRecord> = parse_array(json)?;
    Ok(normalize_favorites(records))
}

pub fn normalize_favorites(records: Vec<FavoriteRecord>) -> CatalogSnapshot {
    records.into_iter().map(Recipe::from).collect()
}

fn parse_array<T: serde::de::DeserializeOwned>(json: &str) -> Result<Vec<T>, CatalogError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| CatalogError::InvalidJson(e.to_string()))?;

    if !value.is_array() {
        return Err(CatalogError::NotAnArray);
    }

    serde_json::from_value(value).map_err(|e| CatalogError::InvalidJson(e.to_string()))
}

/// Split free-form ingredient text into individual entries
///
/// Handles the bracketed, quote-delimited form (`['1 cup rice', '2 eggs']`)
/// as well as plain comma-separated text. Entries are trimmed and blanks are
/// dropped.
pub fn split_ingredients(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.contains('\'') {
        let quoted = Regex::new(r"'([^']*)'").unwrap();
        let entries: Vec<String> = quoted
            .captures_iter(trimmed)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if !entries.is_empty() {
            return entries;
        }
    }

    trimmed
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
