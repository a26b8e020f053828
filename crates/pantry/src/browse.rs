//! Interactive browsing over stdin
//!
//! Reads one command per line and re-renders the current page after each
//! change. Favorite toggles run as spawned tasks; their outcomes come back
//! over a channel and are printed whenever they arrive, so input keeps being
//! processed while a request is in flight.

use crate::catalog::{self, CatalogSource, LoadState};
use crate::config::PantryConfig;
use crate::favorites::{
    reconciler_from_config, FavoritesReconciler, FavoritesRemote, MutationOutcome,
};
use crate::prelude::{println, *};
use crate::recipes::favorite_marker;
use crate::session::BrowseSession;
use crate::store::SelectionStore;
use colored::Colorize;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

#[derive(Debug, clap::Args, Clone)]
pub struct BrowseOptions {
    /// Browse your saved recipes instead of the catalog
    #[arg(long)]
    pub favorites: bool,
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Toggle(String),
    Clear,
    Next,
    Previous,
    Page(usize),
    Favorite(usize),
    Show(usize),
    Reload,
    Help,
    Quit,
}

impl BrowseCommand {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let position = |rest: &str| {
            rest.parse::<usize>()
                .map_err(|_| format!("\"{verb}\" needs a number, got \"{rest}\""))
        };

        match verb.to_lowercase().as_str() {
            "search" | "s" => Ok(BrowseCommand::Search(rest.to_string())),
            "toggle" | "t" if !rest.is_empty() => Ok(BrowseCommand::Toggle(rest.to_string())),
            "toggle" | "t" => Err("\"toggle\" needs an ingredient name".to_string()),
            "clear" => Ok(BrowseCommand::Clear),
            "next" | "n" => Ok(BrowseCommand::Next),
            "prev" | "p" => Ok(BrowseCommand::Previous),
            "page" => position(rest).map(BrowseCommand::Page),
            "fav" | "f" => position(rest).map(BrowseCommand::Favorite),
            "show" => position(rest).map(BrowseCommand::Show),
            "reload" => Ok(BrowseCommand::Reload),
            "help" | "?" | "" => Ok(BrowseCommand::Help),
            "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
            other => Err(format!("Unknown command \"{other}\". Type \"help\".")),
        }
    }
}

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Render,
    Print(String),
    Reload,
    Quit,
}

/// A finished favorite request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteUpdate {
    pub title: String,
    pub outcome: MutationOutcome,
}

pub struct Browser<R> {
    session: BrowseSession,
    reconciler: Arc<FavoritesReconciler<R>>,
    updates: mpsc::UnboundedSender<FavoriteUpdate>,
}

impl<R: FavoritesRemote + 'static> Browser<R> {
    pub fn new(
        session: BrowseSession,
        reconciler: Arc<FavoritesReconciler<R>>,
        updates: mpsc::UnboundedSender<FavoriteUpdate>,
    ) -> Self {
        Self {
            session,
            reconciler,
            updates,
        }
    }

    pub fn session_mut(&mut self) -> &mut BrowseSession {
        &mut self.session
    }

    pub fn handle(&mut self, command: BrowseCommand) -> Flow {
        match command {
            BrowseCommand::Search(text) => {
                self.session.set_query(text);
                Flow::Render
            }
            BrowseCommand::Toggle(name) => {
                self.session.toggle_ingredient(&name);
                Flow::Render
            }
            BrowseCommand::Clear => {
                self.session.clear_ingredients();
                Flow::Render
            }
            BrowseCommand::Next => {
                if self.session.next_page() {
                    Flow::Render
                } else {
                    Flow::Print("Already on the last page.".to_string())
                }
            }
            BrowseCommand::Previous => {
                if self.session.previous_page() {
                    Flow::Render
                } else {
                    Flow::Print("Already on the first page.".to_string())
                }
            }
            BrowseCommand::Page(page) => {
                self.session.go_to_page(page);
                Flow::Render
            }
            BrowseCommand::Favorite(position) => self.spawn_favorite(position),
            BrowseCommand::Show(position) => match self.session.recipe_on_page(position) {
                Some(recipe) => {
                    Flow::Print(format_recipe_detail(recipe, self.marker(&recipe.title)))
                }
                None => Flow::Print(format!("No recipe #{position} on this page.")),
            },
            BrowseCommand::Reload => Flow::Reload,
            BrowseCommand::Help => Flow::Print(help_text()),
            BrowseCommand::Quit => Flow::Quit,
        }
    }

    /// Heart marker for `title`, or `None` when not signed in
    fn marker(&self, title: &str) -> Option<String> {
        if !self.reconciler.auth().is_signed_in() {
            return None;
        }

        let marker = favorite_marker(self.reconciler.status(title));
        if self.reconciler.is_pending(title) {
            Some(format!("{} {}", marker, "(saving...)".bright_black()))
        } else {
            Some(marker)
        }
    }

    fn spawn_favorite(&mut self, position: usize) -> Flow {
        let Some(recipe) = self.session.recipe_on_page(position).cloned() else {
            return Flow::Print(format!("No recipe #{position} on this page."));
        };

        if !self.reconciler.auth().is_signed_in() {
            return Flow::Print(MutationOutcome::Inert.message(&recipe.title).unwrap_or_default());
        }

        let reconciler = Arc::clone(&self.reconciler);
        let updates = self.updates.clone();
        let title = recipe.title.clone();

        tokio::spawn(async move {
            let outcome = reconciler.toggle(&recipe).await;
            // The receiver only goes away when the loop has ended.
            let _ = updates.send(FavoriteUpdate {
                title: recipe.title,
                outcome,
            });
        });

        Flow::Print(format!("Updating \"{}\"...", title))
    }

    pub fn render(&self) -> String {
        format_page_text(&self.session, |title| self.marker(title))
    }
}

pub async fn run(options: BrowseOptions, global: crate::Global) -> Result<()> {
    let config = PantryConfig::resolve(&global)?;
    let client = reqwest::Client::new();
    let reconciler = Arc::new(reconciler_from_config(&config));

    let source = if options.favorites {
        CatalogSource::Favorites
    } else {
        CatalogSource::Static(config.catalog_location())
    };

    if global.verbose {
        println!("Loading recipes from {:?}...", source);
    }

    if reconciler.auth().is_signed_in() {
        if let Err(err) = reconciler.sync().await {
            log::warn!("favorite markers unavailable: {}", err);
        }
    }

    let store = SelectionStore::new();
    let session = BrowseSession::new(&store, &LoadState::Loading, config.page_size);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut browser = Browser::new(session, Arc::clone(&reconciler), tx);

    let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel();
    spawn_load(&source, &client, &reconciler, &loaded_tx);

    print!("{}", browser.render());
    println!("{}", "Type \"help\" for commands.".bright_black());

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.wrap_err("Failed to read input")? else {
                    break;
                };

                let command = match BrowseCommand::parse(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message.yellow());
                        continue;
                    }
                };

                match browser.handle(command) {
                    Flow::Render => print!("{}", browser.render()),
                    Flow::Print(message) => println!("{}", message),
                    Flow::Reload => {
                        spawn_load(&source, &client, &reconciler, &loaded_tx);
                        println!("{}", "Reloading recipes...".bright_black());
                    }
                    Flow::Quit => break,
                }
            }
            Some(state) = loaded_rx.recv() => {
                browser.session_mut().set_catalog(&state);
                print!("{}", browser.render());
            }
            Some(update) = rx.recv() => {
                if let Some(message) = update.outcome.message(&update.title) {
                    if update.outcome.is_error() {
                        println!("{}", message.red());
                    } else {
                        println!("{}", message.green());
                    }
                }
            }
        }
    }

    Ok(())
}

/// Load `source` in the background and hand the result to the loop
fn spawn_load<R: FavoritesRemote + 'static>(
    source: &CatalogSource,
    client: &reqwest::Client,
    reconciler: &Arc<FavoritesReconciler<R>>,
    loaded: &mpsc::UnboundedSender<LoadState>,
) {
    let source = source.clone();
    let client = client.clone();
    let reconciler = Arc::clone(reconciler);
    let loaded = loaded.clone();

    tokio::spawn(async move {
        let state = catalog::load(&source, &client, reconciler.remote(), reconciler.auth()).await;
        let _ = loaded.send(state);
    });
}

fn help_text() -> String {
    [
        "search <words>    filter by title/ingredient text (empty clears)",
        "toggle <name>     select or deselect a pantry ingredient",
        "clear             deselect every ingredient",
        "next | prev       move one page",
        "page <n>          jump to page n",
        "show <n>          show recipe #n on this page",
        "fav <n>           add or remove recipe #n from favorites",
        "reload            load the catalog again",
        "quit              leave",
    ]
    .join("\n")
}

fn format_recipe_detail(recipe: &pantry_core::recipe::Recipe, marker: Option<String>) -> String {
    let mut result = String::new();
    let marker = marker.map(|marker| format!(" {marker}")).unwrap_or_default();

    result.push_str(&format!("\n{}{}\n", recipe.display_title().white().bold(), marker));
    result.push_str(&format!("{}: {}\n", "Image".green(), recipe.display_image()));
    result.push_str(&format!("{}:\n", "Ingredients".green()));

    let ingredients = recipe.ingredient_list();
    if ingredients.is_empty() {
        result.push_str(&format!("  {}\n", recipe.display_ingredients()));
    }
    for ingredient in ingredients {
        result.push_str(&format!("  - {}\n", ingredient));
    }

    result.push_str(&format!(
        "{}:\n{}\n",
        "Instructions".green(),
        recipe.display_instructions()
    ));
    result
}

fn format_page_text<F>(session: &BrowseSession, marker: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::new();
    let page = session.page();

    if let Some(error) = session.load_error() {
        result.push_str(&format!("{}: {}\n", "Could not load recipes".red().bold(), error));
    }

    let selection = session.selection().names().join(", ");
    result.push_str(&format!(
        "\n{} | {}: {} | {}: {}\n",
        page.info.label().bright_cyan().bold(),
        "Search".green(),
        if session.query().is_empty() {
            "(none)"
        } else {
            session.query()
        },
        "Ingredients".green(),
        if selection.is_empty() {
            "(none)".to_string()
        } else {
            selection
        }
    ));

    if session.is_loading() {
        result.push_str(&format!("{}\n", "Loading recipes...".bright_black()));
        return result;
    }

    if page.recipes.is_empty() {
        result.push_str(&format!("{}\n", "No recipes found.".yellow()));
    }

    for (idx, recipe) in page.recipes.iter().enumerate() {
        let marker = marker(&recipe.title)
            .map(|marker| format!(" {marker}"))
            .unwrap_or_default();
        result.push_str(&format!(
            "{} {}{}\n",
            format!("[{}]", idx + 1).yellow().bold(),
            recipe.display_title(),
            marker
        ));
    }

    result.push_str(&format!(
        "{} of {} recipe(s) match\n",
        session.result_count(),
        session.catalog_len()
    ));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::favorites::FavoriteStatus;
    use crate::config::{AuthState, Credential};
    use crate::favorites::testing::MockRemote;
    use pantry_core::recipe::Recipe;

    fn create_test_browser(
        auth: AuthState,
    ) -> (
        Browser<MockRemote>,
        mpsc::UnboundedReceiver<FavoriteUpdate>,
        SelectionStore,
    ) {
        let state = LoadState::Ready(Arc::from(
            (0..25)
                .map(|i| Recipe::new(format!("Soup {i}"), "", "tomato, salt", ""))
                .collect::<Vec<_>>(),
        ));
        let store = SelectionStore::new();
        let session = BrowseSession::new(&store, &state, 20);
        let reconciler = Arc::new(FavoritesReconciler::new(MockRemote::default(), auth));
        let (tx, rx) = mpsc::unbounded_channel();
        (Browser::new(session, reconciler, tx), rx, store)
    }

    fn signed_in() -> AuthState {
        AuthState::signed_in(Credential::new("token").unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            BrowseCommand::parse("search tomato soup"),
            Ok(BrowseCommand::Search("tomato soup".to_string()))
        );
        assert_eq!(BrowseCommand::parse("search"), Ok(BrowseCommand::Search(String::new())));
        assert_eq!(
            BrowseCommand::parse("toggle Peanut Butter"),
            Ok(BrowseCommand::Toggle("Peanut Butter".to_string()))
        );
        assert_eq!(BrowseCommand::parse(" NEXT "), Ok(BrowseCommand::Next));
        assert_eq!(BrowseCommand::parse("page 3"), Ok(BrowseCommand::Page(3)));
        assert_eq!(BrowseCommand::parse("fav 2"), Ok(BrowseCommand::Favorite(2)));
        assert_eq!(BrowseCommand::parse("q"), Ok(BrowseCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(BrowseCommand::parse("toggle").is_err());
        assert!(BrowseCommand::parse("page two").is_err());
        assert!(BrowseCommand::parse("dance").is_err());
    }

    #[tokio::test]
    async fn test_navigation_flow() {
        let (mut browser, _rx, _store) = create_test_browser(AuthState::anonymous());

        assert_eq!(browser.handle(BrowseCommand::Next), Flow::Render);
        assert_eq!(browser.session.page().info.current_page, 2);
        assert!(matches!(browser.handle(BrowseCommand::Next), Flow::Print(_)));

        browser.handle(BrowseCommand::Toggle("salt".to_string()));
        assert_eq!(browser.session.page().info.current_page, 1);
        assert!(browser.render().contains("Page 1 of 2"));
    }

    #[tokio::test]
    async fn test_selection_from_another_handle_reaches_browser() {
        let (mut browser, _rx, store) = create_test_browser(AuthState::anonymous());

        store.toggle("basil");
        browser.session_mut().sync();

        assert_eq!(browser.session.result_count(), 0);
        assert!(browser.render().contains("No recipes found."));
    }

    #[tokio::test]
    async fn test_favorite_without_credential_is_inert() {
        let (mut browser, _rx, _store) = create_test_browser(AuthState::anonymous());

        let flow = browser.handle(BrowseCommand::Favorite(1));

        assert_eq!(flow, Flow::Print("You need to log in first.".to_string()));
        assert_eq!(browser.reconciler.remote().add_calls(), 0);
    }

    #[tokio::test]
    async fn test_favorite_outcome_arrives_on_channel() {
        let (mut browser, mut rx, _store) = create_test_browser(signed_in());

        let flow = browser.handle(BrowseCommand::Favorite(2));
        assert_eq!(flow, Flow::Print("Updating \"Soup 1\"...".to_string()));

        let update = rx.recv().await.unwrap();
        assert_eq!(update.title, "Soup 1");
        assert_eq!(
            update.outcome,
            MutationOutcome::Confirmed {
                status: FavoriteStatus::Favorited
            }
        );
        assert_eq!(browser.reconciler.status("Soup 1"), FavoriteStatus::Favorited);
    }

    #[tokio::test]
    async fn test_input_keeps_flowing_while_favorite_in_flight() {
        let (mut browser, mut rx, _store) = create_test_browser(signed_in());
        let gate = browser.reconciler.remote().hold_mutations();

        browser.handle(BrowseCommand::Favorite(1));
        gate.wait_for_request().await;

        assert_eq!(browser.handle(BrowseCommand::Next), Flow::Render);
        assert!(browser.reconciler.is_pending("Soup 0"));

        gate.release();
        let update = rx.recv().await.unwrap();
        assert!(!update.outcome.is_error());
    }

    #[tokio::test]
    async fn test_render_marks_pending_favorite() {
        let (mut browser, mut rx, _store) = create_test_browser(signed_in());
        let gate = browser.reconciler.remote().hold_mutations();

        browser.handle(BrowseCommand::Favorite(1));
        gate.wait_for_request().await;
        assert!(browser.render().contains("(saving...)"));

        gate.release();
        rx.recv().await.unwrap();
        assert!(!browser.render().contains("(saving...)"));
    }

    #[tokio::test]
    async fn test_render_while_catalog_is_loading() {
        let store = SelectionStore::new();
        let session = BrowseSession::new(&store, &LoadState::Loading, 20);
        let reconciler = Arc::new(FavoritesReconciler::new(
            MockRemote::default(),
            AuthState::anonymous(),
        ));
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut browser = Browser::new(session, reconciler, tx);

        assert!(browser.render().contains("Loading recipes..."));

        browser
            .session_mut()
            .set_catalog(&LoadState::Ready(Arc::from(vec![Recipe::new(
                "Pea Soup", "", "pea, salt", "",
            )])));

        let text = browser.render();
        assert!(!text.contains("Loading recipes..."));
        assert!(text.contains("Pea Soup"));
    }

    #[tokio::test]
    async fn test_show_out_of_range() {
        let (mut browser, _rx, _store) = create_test_browser(AuthState::anonymous());

        let flow = browser.handle(BrowseCommand::Show(21));

        assert_eq!(flow, Flow::Print("No recipe #21 on this page.".to_string()));
    }

    #[test]
    fn test_format_recipe_detail() {
        let recipe = Recipe::new("Pea Soup", "", "['1 cup peas', 'salt']", "");

        let text = format_recipe_detail(&recipe, None);

        assert!(text.contains("Pea Soup"));
        assert!(text.contains("- 1 cup peas"));
        assert!(text.contains(pantry_core::recipe::NO_INSTRUCTIONS));
    }
}
