//! Core library for pantry
//!
//! This crate implements the **Functional Core** of the pantry recipe finder,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`pantry_core`** (this crate): pure transformation functions and value types, zero I/O
//! - **`pantry`**: catalog loading, the favorites remote, shared selection state and the CLI
//!
//! Everything here is deterministic and can be tested with fixture data alone.
//!
//! # Module Organization
//!
//! - [`recipe`]: the normalized [`Recipe`](recipe::Recipe) and the two catalog payload shapes
//! - [`ingredients`]: the static pantry, grouped into categories
//! - [`selection`]: the case-insensitive set of selected ingredients
//! - [`filter`]: the filter engine (text tokens AND selected ingredients)
//! - [`pagination`]: page slicing and the page cursor
//! - [`favorites`]: the favorite status state machine with optimistic transitions
//!
//! # Example Usage
//!
//! ```rust
//! use pantry_core::filter::{filter_recipes, FilterQuery};
//! use pantry_core::pagination::paginate;
//! use pantry_core::recipe::Recipe;
//! use pantry_core::selection::SelectionSet;
//!
//! let catalog = vec![
//!     Recipe::new("Tomato Soup", "", "tomato, salt", ""),
//!     Recipe::new("Pea Soup", "", "pea, salt", ""),
//! ];
//!
//! let query = FilterQuery::new("soup", SelectionSet::new().toggled("tomato"));
//! let results = filter_recipes(&catalog, &query);
//! let page = paginate(&results, 20, 1);
//!
//! assert_eq!(page.visible.len(), 1);
//! assert_eq!(page.visible[0].title, "Tomato Soup");
//! ```

pub mod favorites;
pub mod filter;
pub mod ingredients;
pub mod pagination;
pub mod recipe;
pub mod selection;
