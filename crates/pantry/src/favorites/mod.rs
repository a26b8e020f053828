use crate::catalog;
use crate::config::PantryConfig;
use crate::prelude::{println, *};
use colored::Colorize;
use pantry_core::recipe::{empty_catalog, Recipe};

pub mod reconciler;
pub mod remote;

pub use reconciler::{FavoritesReconciler, MutationOutcome};
pub use remote::{FavoritesRemote, HttpFavorites};

#[derive(Debug, clap::Parser)]
#[command(name = "favorites")]
#[command(about = "Manage your saved recipes")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List saved recipes
    #[clap(name = "list")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save a recipe from the catalog by its exact title
    #[clap(name = "add")]
    Add {
        #[arg(value_name = "TITLE")]
        title: String,
    },

    /// Remove a saved recipe by its exact title
    #[clap(name = "remove")]
    Remove {
        #[arg(value_name = "TITLE")]
        title: String,
    },
}

/// Build the reconciler for the configured backend and credential
pub fn reconciler_from_config(config: &PantryConfig) -> FavoritesReconciler<HttpFavorites> {
    let remote = HttpFavorites::new(reqwest::Client::new(), &config.api_base_url);
    FavoritesReconciler::new(remote, config.auth())
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = PantryConfig::resolve(&global)?;

    if global.verbose {
        println!("Favorites API Base: {}", config.api_base_url);
        println!();
    }

    let reconciler = reconciler_from_config(&config);
    if !reconciler.auth().is_signed_in() {
        return Err(Error::Unauthorized.into());
    }

    match app.command {
        Commands::List { json } => {
            let snapshot = reconciler.sync().await?.unwrap_or_else(empty_catalog);
            if json {
                println!("{}", format_favorites_json(&snapshot)?);
            } else {
                print!("{}", format_favorites_text(&snapshot));
            }
            Ok(())
        }
        Commands::Add { title } => {
            let client = reqwest::Client::new();
            let state = catalog::load_static(&client, &config.catalog_location()).await;
            if let Some(message) = state.error() {
                return Err(eyre!("{}", message));
            }
            let snapshot = state.snapshot();
            let recipe = snapshot
                .iter()
                .find(|recipe| recipe.title == title)
                .ok_or_eyre(format!("No recipe titled \"{}\" in {}", title, config.catalog))?;

            reconciler.sync().await?;
            report(reconciler.add(recipe).await, &title)
        }
        Commands::Remove { title } => {
            reconciler.sync().await?;
            let recipe = Recipe::new(title.as_str(), "", "", "");
            report(reconciler.remove(&recipe).await, &title)
        }
    }
}

fn report(outcome: MutationOutcome, title: &str) -> Result<()> {
    let message = outcome.message(title).unwrap_or_default();

    if outcome.is_error() {
        return Err(eyre!("{}", message));
    }

    println!("{}", message.green());
    Ok(())
}

fn format_favorites_json(snapshot: &[Recipe]) -> Result<String> {
    let records: Vec<_> = snapshot.iter().map(Recipe::to_favorite_record).collect();
    serde_json::to_string_pretty(&records).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn format_favorites_text(snapshot: &[Recipe]) -> String {
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{}\n",
        format!("MY FAVORITES ({})", snapshot.len()).bright_cyan().bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if snapshot.is_empty() {
        result.push_str(&format!("\n{}\n", "No favorites yet.".yellow()));
    }

    for (idx, recipe) in snapshot.iter().enumerate() {
        result.push_str(&format!(
            "\n{} {}\n",
            format!("[{}]", idx + 1).yellow().bold(),
            recipe.display_title().white().bold()
        ));
        result.push_str(&format!(
            "    {}: {}\n",
            "Image".green(),
            recipe.display_image().bright_black()
        ));
        result.push_str(&format!(
            "    {}: {}\n",
            "Ingredients".green(),
            recipe.display_ingredients()
        ));
        result.push_str(&format!(
            "    {}: {}\n",
            "Instructions".green(),
            recipe.display_instructions()
        ));
    }

    result.push('\n');
    result
}


#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::recipe::{DEFAULT_IMAGE, NO_TITLE};

    #[test]
    fn test_format_favorites_text_uses_placeholders() {
        let snapshot = vec![Recipe::new("", "", "pea, salt", "")];

        let text = format_favorites_text(&snapshot);

        assert!(text.contains("MY FAVORITES (1)"));
        assert!(text.contains(NO_TITLE));
        assert!(text.contains(DEFAULT_IMAGE));
        assert!(text.contains("pea, salt"));
    }

    #[test]
    fn test_format_favorites_text_empty() {
        let text = format_favorites_text(&[]);
        assert!(text.contains("No favorites yet."));
    }

    #[test]
    fn test_format_favorites_json_shape() {
        let snapshot = vec![Recipe::new("Pea Soup", "pea-soup", "pea, salt", "Boil.")];

        let json = format_favorites_json(&snapshot).unwrap();

        assert!(json.contains("\"name\": \"Pea Soup\""));
        assert!(json.contains("\"ingredients\""));
        assert!(json.contains("\"pea\""));
    }

    #[test]
    fn test_report_errors_on_rejection() {
        let outcome = MutationOutcome::Rejected {
            reason: "busy".to_string(),
        };
        assert!(report(outcome, "Soup").is_err());
    }
}
