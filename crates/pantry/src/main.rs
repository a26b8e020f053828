use crate::prelude::*;
use clap::Parser;

mod browse;
mod catalog;
mod config;
mod error;
mod favorites;
mod ingredients;
mod prelude;
mod recipes;
mod session;
mod store;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Find recipes you can cook with what is already in your pantry"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Favorites API base URL
    #[clap(long, env = "PANTRY_API_BASE_URL", global = true)]
    api_url: Option<String>,

    /// Access token for your favorites
    #[clap(long, env = "PANTRY_ACCESS_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Recipe catalog path or http(s) URL
    #[clap(long, env = "PANTRY_CATALOG", global = true)]
    catalog: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "PANTRY_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Search the recipe catalog
    Recipes(crate::recipes::App),

    /// Browse the pantry ingredient catalog
    Ingredients(crate::ingredients::App),

    /// Manage your saved recipes
    Favorites(crate::favorites::App),

    /// Interactive recipe browser
    Browse(crate::browse::BrowseOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Recipes(sub_app) => crate::recipes::run(sub_app, app.global).await,
        SubCommands::Ingredients(sub_app) => crate::ingredients::run(sub_app, app.global).await,
        SubCommands::Favorites(sub_app) => crate::favorites::run(sub_app, app.global).await,
        SubCommands::Browse(options) => crate::browse::run(options, app.global).await,
    }
}
