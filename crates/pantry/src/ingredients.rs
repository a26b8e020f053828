use crate::prelude::{println, *};
use colored::Colorize;
use pantry_core::ingredients::{CategoryView, IngredientCatalog};
use pantry_core::selection::SelectionSet;
use serde::Serialize;

#[derive(Debug, clap::Parser)]
#[command(name = "ingredients")]
#[command(about = "Browse the pantry ingredient catalog")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List pantry ingredients by category
    #[clap(name = "list")]
    List(ListOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Only show ingredients whose name contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Mark an ingredient as selected (repeatable)
    #[arg(short, long = "ingredient", value_name = "NAME")]
    pub ingredients: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngredientEntry {
    pub name: String,
    pub image: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryOutput {
    pub name: String,
    pub image: String,
    pub selected: usize,
    pub total: usize,
    pub ingredients: Vec<IngredientEntry>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::List(options) => list(options, global),
    }
}

fn list(options: ListOptions, global: crate::Global) -> Result<()> {
    let catalog = IngredientCatalog::bundled()?;

    if global.verbose {
        println!(
            "Pantry has {} ingredient(s) in {} categories",
            catalog.ingredient_count(),
            catalog.categories.len()
        );
    }

    for name in &options.ingredients {
        if catalog.find(name).is_none() {
            log::warn!("\"{}\" is not in the pantry catalog", name);
        }
    }

    let selection = SelectionSet::from_iter(&options.ingredients);
    let output = list_data(&catalog, options.search.as_deref().unwrap_or(""), &selection);

    if options.json {
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        println!("{}", json);
    } else {
        print!("{}", format_list_text(&output));
    }

    Ok(())
}

/// The picker contents for `search`, with selection marks and counts
pub fn list_data(
    catalog: &IngredientCatalog,
    search: &str,
    selection: &SelectionSet,
) -> Vec<CategoryOutput> {
    catalog
        .search(search)
        .iter()
        .map(|view| category_output(view, selection))
        .collect()
}

fn category_output(view: &CategoryView<'_>, selection: &SelectionSet) -> CategoryOutput {
    CategoryOutput {
        name: view.name.to_string(),
        image: view.image_ref.to_string(),
        selected: view.selected_count(selection),
        total: view.ingredients.len(),
        ingredients: view
            .ingredients
            .iter()
            .map(|ingredient| IngredientEntry {
                name: ingredient.name.clone(),
                image: ingredient.image_ref.clone(),
                selected: selection.contains(&ingredient.name),
            })
            .collect(),
    }
}

fn format_list_text(categories: &[CategoryOutput]) -> String {
    if categories.is_empty() {
        return format!("{}\n", "No ingredients match.".yellow());
    }

    let mut table = new_table();
    table.set_titles(prettytable::row!["Category", "Selected", "Ingredients"]);

    for category in categories {
        let names: Vec<String> = category
            .ingredients
            .iter()
            .map(|ingredient| {
                if ingredient.selected {
                    format!("[x] {}", ingredient.name)
                } else {
                    format!("[ ] {}", ingredient.name)
                }
            })
            .collect();

        table.add_row(prettytable::row![
            category.name,
            format!("{} / {} Ingredients", category.selected, category.total),
            names.join("\n")
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_catalog() -> IngredientCatalog {
        IngredientCatalog::from_json(
            r#"{"categories": [
                {"name": "Vegetables", "image": "veg.png", "ingredients": [
                    {"name": "Tomato", "image": "tomato.png"},
                    {"name": "Pea"}
                ]},
                {"name": "Pantry Staples", "ingredients": [
                    {"name": "Salt"},
                    {"name": "Peanut Butter"}
                ]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_list_data_counts_selection() {
        let selection = SelectionSet::from_iter(["tomato", "salt", "pea"]);

        let output = list_data(&create_test_catalog(), "", &selection);

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].selected, 2);
        assert_eq!(output[0].total, 2);
        assert_eq!(output[1].selected, 1);
        assert!(output[1].ingredients[0].selected);
        assert!(!output[1].ingredients[1].selected);
    }

    #[test]
    fn test_list_data_search_hides_empty_categories() {
        let output = list_data(&create_test_catalog(), "PEA", &SelectionSet::new());

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].ingredients[0].name, "Pea");
        assert_eq!(output[1].ingredients[0].name, "Peanut Butter");

        let output = list_data(&create_test_catalog(), "salt", &SelectionSet::new());
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].name, "Pantry Staples");
    }

    #[test]
    fn test_format_list_text() {
        let selection = SelectionSet::from_iter(["Tomato"]);
        let output = list_data(&create_test_catalog(), "", &selection);

        let text = format_list_text(&output);

        assert!(text.contains("Vegetables"));
        assert!(text.contains("1 / 2 Ingredients"));
        assert!(text.contains("[x] Tomato"));
        assert!(text.contains("[ ] Pea"));
    }

    #[test]
    fn test_format_list_text_no_match() {
        let output = list_data(&create_test_catalog(), "saffron", &SelectionSet::new());
        assert!(format_list_text(&output).contains("No ingredients match."));
    }

    #[test]
    fn test_bundled_catalog_lists() {
        let catalog = IngredientCatalog::bundled().unwrap();
        let output = list_data(&catalog, "", &SelectionSet::new());
        assert_eq!(output.len(), catalog.categories.len());
    }
}
