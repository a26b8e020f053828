use crate::catalog::{self, CatalogSource, LoadState};
use crate::config::PantryConfig;
use crate::favorites::reconciler_from_config;
use crate::prelude::{eprintln, println, *};
use crate::session::BrowseSession;
use crate::store::SelectionStore;
use colored::Colorize;
use pantry_core::favorites::FavoriteStatus;
use pantry_core::pagination::{page_bounds, paginate};
use pantry_core::recipe::Recipe;
use pantry_core::selection::SelectionSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, clap::Parser)]
#[command(name = "recipes")]
#[command(about = "Search the recipe catalog")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Find recipes by title/ingredient text and pantry ingredients
    #[clap(name = "search")]
    Search(SearchOptions),
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Search(options) => search(options, global).await,
    }
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct SearchOptions {
    /// Words that must all appear in the title or ingredients
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Pantry ingredient the recipe must use (repeatable)
    #[arg(short, long = "ingredient", value_name = "NAME")]
    pub ingredients: Vec<String>,

    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Recipes per page [default: PANTRY_PAGE_SIZE or 20]
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Search your saved recipes instead of the catalog
    #[arg(long)]
    pub favorites: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchOptions {
    fn text(&self) -> String {
        self.query.join(" ")
    }

    /// The command line that shows `page` of this same search
    fn command_for_page(&self, page: usize, limit: usize) -> String {
        let mut parts = vec!["pantry recipes search".to_string()];
        parts.extend(self.query.iter().map(|word| quote_arg(word)));
        for name in &self.ingredients {
            parts.push(format!("-i {}", quote_arg(name)));
        }
        if self.favorites {
            parts.push("--favorites".to_string());
        }
        if self.limit.is_some() {
            parts.push(format!("--limit {limit}"));
        }
        parts.push(format!("--page {page}"));
        parts.join(" ")
    }
}

/// Quote `value` for a POSIX shell so the printed command can be pasted back
fn quote_arg(value: &str) -> String {
    shlex::try_quote(value)
        .map(|quoted| quoted.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// One recipe in a search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSummary {
    /// 1-indexed position in the whole filtered result
    pub position: usize,
    pub title: String,
    pub image: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<FavoriteStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub limit: usize,
    pub label: String,
    pub next_page_command: Option<String>,
    pub prev_page_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub ingredients: Vec<String>,
    pub catalog_size: usize,
    pub recipes: Vec<RecipeSummary>,
    pub pagination: SearchPagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn search(options: SearchOptions, global: crate::Global) -> Result<()> {
    let config = PantryConfig::resolve(&global)?;
    let limit = options.limit.unwrap_or(config.page_size);
    let reconciler = reconciler_from_config(&config);

    let source = if options.favorites {
        CatalogSource::Favorites
    } else {
        CatalogSource::Static(config.catalog_location())
    };

    if global.verbose {
        println!("Loading recipes from {:?}...", source);
    }

    let client = reqwest::Client::new();
    let state = catalog::load(&source, &client, reconciler.remote(), reconciler.auth()).await;

    let signed_in = reconciler.auth().is_signed_in();
    if signed_in {
        if let Err(err) = reconciler.sync().await {
            log::warn!("favorite markers unavailable: {}", err);
        }
    }

    let output = search_data(&state, &options, limit, |title| {
        signed_in.then(|| reconciler.status(title))
    })?;

    if let Some(message) = &output.error {
        eprintln!("{}: {}", "Could not load recipes".red().bold(), message);
    }

    if options.json {
        println!("{}", format_search_json(&output)?);
    } else {
        print!("{}", format_search_text(&output));
    }

    Ok(())
}

/// Filter and paginate `state` for `options`
///
/// `favorite` returns the heart marker for a title, or `None` when favorites
/// are not available.
pub fn search_data<F>(
    state: &LoadState,
    options: &SearchOptions,
    limit: usize,
    favorite: F,
) -> Result<SearchOutput>
where
    F: Fn(&str) -> Option<FavoriteStatus>,
{
    if limit == 0 {
        return Err(eyre!("--limit must be at least 1"));
    }

    let store = SelectionStore::new();
    store.replace(SelectionSet::from_iter(&options.ingredients));

    let mut session = BrowseSession::new(&store, state, limit);
    session.set_query(options.text());

    let results = session.results();
    let page = paginate(&results, limit, options.page);
    let first_position = page_bounds(results.len(), options.page, limit)
        .map(|(start, _)| start + 1)
        .unwrap_or_default();

    let recipes = page
        .visible
        .iter()
        .enumerate()
        .map(|(offset, recipe)| summarize(recipe, first_position + offset, &favorite))
        .collect();

    let info = page.info;
    Ok(SearchOutput {
        query: options.text(),
        ingredients: session
            .selection()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
        catalog_size: session.catalog_len(),
        recipes,
        pagination: SearchPagination {
            current_page: info.current_page,
            total_pages: info.total_pages,
            total_items: info.total_items,
            limit,
            label: info.label(),
            next_page_command: info
                .has_next
                .then(|| options.command_for_page(info.current_page + 1, limit)),
            prev_page_command: (info.has_previous && info.current_page <= info.total_pages)
                .then(|| options.command_for_page(info.current_page - 1, limit)),
        },
        error: session.load_error().map(String::from),
    })
}

fn summarize<F>(recipe: &Recipe, position: usize, favorite: &F) -> RecipeSummary
where
    F: Fn(&str) -> Option<FavoriteStatus>,
{
    RecipeSummary {
        position,
        title: recipe.display_title().to_string(),
        image: recipe.display_image().to_string(),
        ingredients: recipe.ingredient_list(),
        instructions: recipe.display_instructions().to_string(),
        favorite: favorite(&recipe.title),
    }
}

/// Heart marker for a favorite status
pub fn favorite_marker(status: FavoriteStatus) -> String {
    match status {
        FavoriteStatus::Favorited => "♥".red().bold().to_string(),
        FavoriteStatus::NotFavorited => "♡".bright_black().to_string(),
        FavoriteStatus::Unknown => "?".bright_black().to_string(),
    }
}

fn format_search_json(output: &SearchOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn format_search_text(output: &SearchOutput) -> String {
    let mut result = String::new();
    let pagination = &output.pagination;

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!("RECIPES ({})", pagination.label)
            .bright_cyan()
            .bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if !output.query.is_empty() || !output.ingredients.is_empty() {
        result.push_str(&format!(
            "{}: {} | {}: {}\n",
            "Query".green(),
            if output.query.is_empty() {
                "(none)".bright_black()
            } else {
                output.query.bright_white()
            },
            "Ingredients".green(),
            if output.ingredients.is_empty() {
                "(none)".bright_black()
            } else {
                output.ingredients.join(", ").bright_white()
            }
        ));
    }

    if output.recipes.is_empty() {
        result.push_str(&format!("\n{}\n", "No recipes found.".yellow()));
    }

    for recipe in &output.recipes {
        let marker = recipe
            .favorite
            .map(|status| format!(" {}", favorite_marker(status)))
            .unwrap_or_default();

        result.push_str(&format!(
            "\n{} {}{}\n",
            format!("[{}]", recipe.position).yellow().bold(),
            recipe.title.white().bold(),
            marker
        ));
        result.push_str(&format!(
            "    {}: {}\n",
            "Ingredients".green(),
            if recipe.ingredients.is_empty() {
                pantry_core::recipe::NO_INGREDIENTS.to_string()
            } else {
                recipe.ingredients.join(", ")
            }
        ));
        result.push_str(&format!(
            "    {}: {}\n",
            "Image".green(),
            recipe.image.bright_black()
        ));
    }

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_yellow()));
    result.push_str(&format!("{}\n", "NAVIGATION".bright_yellow().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_yellow()));

    result.push_str(&format!(
        "\n{} {} {} {} ({} {} {} {})\n",
        "Showing page".bright_white(),
        pagination.current_page.to_string().bright_cyan().bold(),
        "of".bright_white(),
        pagination.total_pages.to_string().bright_cyan().bold(),
        pagination.total_items.to_string().bright_cyan().bold(),
        "matching of".bright_white(),
        output.catalog_size.to_string().bright_cyan().bold(),
        "recipes".bright_white()
    ));

    if pagination.next_page_command.is_some() || pagination.prev_page_command.is_some() {
        result.push_str(&format!("\n{}:\n", "To navigate".bright_white().bold()));
    }
    if let Some(command) = &pagination.next_page_command {
        result.push_str(&format!("  {}: {}\n", "Next page".green(), command.cyan()));
    }
    if let Some(command) = &pagination.prev_page_command {
        result.push_str(&format!(
            "  {}: {}\n",
            "Previous page".green(),
            command.cyan()
        ));
    }

    result.push_str(&format!(
        "\n{}:\n",
        "To narrow by pantry ingredients".bright_white().bold()
    ));
    result.push_str(&format!(
        "  {}\n",
        "pantry recipes search <words> -i <ingredient> -i <ingredient>".cyan()
    ));

    result.push('\n');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn create_test_options(query: &[&str], ingredients: &[&str], page: usize) -> SearchOptions {
        SearchOptions {
            query: query.iter().map(|s| s.to_string()).collect(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            page,
            limit: None,
            favorites: false,
            json: false,
        }
    }

    fn create_test_state() -> LoadState {
        LoadState::Ready(Arc::from(vec![
            Recipe::new(
                "Tomato Soup",
                "tomato-soup",
                "['2 tomatoes', '1 tsp salt']",
                "Simmer.",
            ),
            Recipe::new("Pea Soup", "", "pea, salt", ""),
            Recipe::new("Chicken Curry", "", "chicken, curry paste", ""),
        ]))
    }

    fn numbered_state(count: usize) -> LoadState {
        LoadState::Ready(Arc::from(
            (0..count)
                .map(|i| Recipe::new(format!("Recipe {i}"), "", "salt", ""))
                .collect::<Vec<_>>(),
        ))
    }

    fn no_favorites(_: &str) -> Option<FavoriteStatus> {
        None
    }

    #[test]
    fn test_search_data_filters_by_text_and_ingredients() {
        let options = create_test_options(&["soup"], &["Salt"], 1);

        let output = search_data(&create_test_state(), &options, 20, no_favorites).unwrap();

        let titles: Vec<_> = output.recipes.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Tomato Soup", "Pea Soup"]);
        assert_eq!(output.ingredients, vec!["Salt"]);
        assert_eq!(output.catalog_size, 3);
    }

    #[test]
    fn test_search_data_extracts_ingredient_lists() {
        let options = create_test_options(&["tomato"], &[], 1);

        let output = search_data(&create_test_state(), &options, 20, no_favorites).unwrap();

        assert_eq!(
            output.recipes[0].ingredients,
            vec!["2 tomatoes", "1 tsp salt"]
        );
        assert_eq!(output.recipes[0].image, "tomato-soup");
    }

    #[test]
    fn test_search_data_pagination_commands() {
        let mut options = create_test_options(&["recipe"], &["salt"], 2);
        options.limit = Some(20);

        let output = search_data(&numbered_state(45), &options, 20, no_favorites).unwrap();

        assert_eq!(output.recipes.len(), 20);
        assert_eq!(output.recipes[0].position, 21);
        assert_eq!(output.pagination.label, "Page 2 of 3");
        assert_eq!(
            output.pagination.next_page_command.as_deref(),
            Some("pantry recipes search recipe -i salt --limit 20 --page 3")
        );
        assert_eq!(
            output.pagination.prev_page_command.as_deref(),
            Some("pantry recipes search recipe -i salt --limit 20 --page 1")
        );
    }

    #[test]
    fn test_search_data_page_past_end_is_empty() {
        let options = create_test_options(&[], &[], 9);

        let output = search_data(&numbered_state(45), &options, 20, no_favorites).unwrap();

        assert!(output.recipes.is_empty());
        assert!(output.pagination.next_page_command.is_none());
        assert!(output.pagination.prev_page_command.is_none());
    }

    #[test]
    fn test_search_data_huge_page_is_empty() {
        let options = create_test_options(&[], &[], usize::MAX);

        let output = search_data(&numbered_state(1), &options, 20, no_favorites).unwrap();

        assert!(output.recipes.is_empty());
        assert_eq!(output.pagination.current_page, usize::MAX);
        assert_eq!(output.pagination.total_pages, 1);
        assert!(output.pagination.next_page_command.is_none());
    }

    #[test]
    fn test_format_search_json_favorite_status() {
        let options = create_test_options(&["pea"], &[], 1);
        let output = search_data(&create_test_state(), &options, 20, |_| {
            Some(FavoriteStatus::NotFavorited)
        })
        .unwrap();

        let json = format_search_json(&output).unwrap();

        assert!(json.contains("\"favorite\": \"not-favorited\""));
    }

    #[test]
    fn test_search_data_rejects_zero_limit() {
        let options = create_test_options(&[], &[], 1);
        assert!(search_data(&numbered_state(3), &options, 0, no_favorites).is_err());
    }

    #[test]
    fn test_search_data_failed_load() {
        let options = create_test_options(&["soup"], &[], 1);
        let state = LoadState::Failed("HTTP 500".to_string());

        let output = search_data(&state, &options, 20, no_favorites).unwrap();

        assert!(output.recipes.is_empty());
        assert_eq!(output.error.as_deref(), Some("HTTP 500"));
        assert_eq!(output.pagination.total_items, 0);
    }

    #[test]
    fn test_search_data_favorite_markers() {
        let options = create_test_options(&["soup"], &[], 1);

        let output = search_data(&create_test_state(), &options, 20, |title| {
            Some(if title == "Pea Soup" {
                FavoriteStatus::Favorited
            } else {
                FavoriteStatus::NotFavorited
            })
        })
        .unwrap();

        assert_eq!(output.recipes[0].favorite, Some(FavoriteStatus::NotFavorited));
        assert_eq!(output.recipes[1].favorite, Some(FavoriteStatus::Favorited));
    }

    #[test]
    fn test_format_search_json_omits_markers_when_anonymous() {
        let options = create_test_options(&[], &[], 1);
        let output = search_data(&create_test_state(), &options, 20, no_favorites).unwrap();

        let json = format_search_json(&output).unwrap();

        assert!(json.contains("\"title\": \"Tomato Soup\""));
        assert!(json.contains("\"label\": \"Page 1 of 1\""));
        assert!(!json.contains("\"favorite\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_format_search_text() {
        let options = create_test_options(&["curry"], &[], 1);
        let output = search_data(&create_test_state(), &options, 20, no_favorites).unwrap();

        let text = format_search_text(&output);

        assert!(text.contains("RECIPES (Page 1 of 1)"));
        assert!(text.contains("[1]"));
        assert!(text.contains("Chicken Curry"));
        assert!(text.contains("chicken, curry paste"));
        assert!(!text.contains("Next page"));
    }

    #[test]
    fn test_format_search_text_empty() {
        let options = create_test_options(&["lasagna"], &[], 1);
        let output = search_data(&create_test_state(), &options, 20, no_favorites).unwrap();

        assert!(format_search_text(&output).contains("No recipes found."));
    }

    #[test]
    fn test_quote_arg() {
        assert_eq!(quote_arg("salt"), "salt");
        for value in ["peanut butter", "mom's \"best\" stew", "a$b"] {
            let quoted = quote_arg(value);
            assert_eq!(shlex::split(&quoted), Some(vec![value.to_string()]));
        }
    }
}
