use super::FavoritesRemote;
use crate::config::AuthState;
use crate::error::Error;
use pantry_core::favorites::{
    FavoriteAction, FavoriteLedger, FavoriteStatus, LedgerError, PendingMutation, Resolution,
};
use pantry_core::recipe::{normalize_favorites, CatalogSnapshot, Recipe};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What happened to a favorite add/remove request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum MutationOutcome {
    /// The remote accepted the change
    Confirmed { status: FavoriteStatus },
    /// The remote rejected the change and the optimistic status was reverted
    RolledBack { status: FavoriteStatus, error: String },
    /// Refused before any remote call (busy, or already in that state)
    Rejected { reason: String },
    /// No credential, so favorites are inert
    Inert,
    /// A newer request superseded this one
    Stale,
}

impl MutationOutcome {
    /// The transient message to show for this outcome, if any
    pub fn message(&self, title: &str) -> Option<String> {
        match self {
            MutationOutcome::Confirmed {
                status: FavoriteStatus::Favorited,
            } => Some(format!("Recipe \"{title}\" added to favorites!")),
            MutationOutcome::Confirmed { .. } => {
                Some(format!("Recipe \"{title}\" removed from favorites!"))
            }
            MutationOutcome::RolledBack { error, .. } => Some(format!(
                "Failed to update \"{title}\". Please try again. ({error})"
            )),
            MutationOutcome::Rejected { reason } => Some(reason.clone()),
            MutationOutcome::Inert => Some("You need to log in first.".to_string()),
            MutationOutcome::Stale => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            MutationOutcome::RolledBack { .. } | MutationOutcome::Rejected { .. }
        )
    }
}

/// Keeps per-recipe favorite status in step with the remote store.
///
/// Status changes are applied optimistically and rolled back when the remote
/// call fails. The ledger lock is never held across a remote call, so other
/// titles (and everything else) keep working while a request is in flight.
pub struct FavoritesReconciler<R> {
    remote: R,
    auth: AuthState,
    ledger: Mutex<FavoriteLedger>,
}

impl<R: FavoritesRemote> FavoritesReconciler<R> {
    pub fn new(remote: R, auth: AuthState) -> Self {
        Self {
            remote,
            auth,
            ledger: Mutex::new(FavoriteLedger::new()),
        }
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    fn ledger(&self) -> MutexGuard<'_, FavoriteLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self, title: &str) -> FavoriteStatus {
        self.ledger().status(title)
    }

    pub fn is_pending(&self, title: &str) -> bool {
        self.ledger().is_pending(title)
    }

    /// Load the favorites collection and settle every known title.
    ///
    /// Returns the collection as a catalog snapshot, or `None` without a
    /// credential (statuses then stay `Unknown`).
    pub async fn sync(&self) -> Result<Option<CatalogSnapshot>, Error> {
        let Some(credential) = self.auth.credential() else {
            return Ok(None);
        };

        let ticket = self.ledger().begin_sync();
        let records = self.remote.list(credential).await?;

        let titles: Vec<String> = records
            .iter()
            .filter_map(|record| record.name.clone())
            .collect();

        let applied = self
            .ledger()
            .apply_sync(ticket, titles.iter().map(String::as_str));
        if !applied {
            log::debug!("discarding superseded favorites load");
        }

        Ok(Some(normalize_favorites(records)))
    }

    pub async fn add(&self, recipe: &Recipe) -> MutationOutcome {
        self.mutate(recipe, Some(FavoriteAction::Add)).await
    }

    pub async fn remove(&self, recipe: &Recipe) -> MutationOutcome {
        self.mutate(recipe, Some(FavoriteAction::Remove)).await
    }

    /// Add when not favorited, remove when favorited
    pub async fn toggle(&self, recipe: &Recipe) -> MutationOutcome {
        self.mutate(recipe, None).await
    }

    async fn mutate(&self, recipe: &Recipe, action: Option<FavoriteAction>) -> MutationOutcome {
        let Some(credential) = self.auth.credential() else {
            return MutationOutcome::Inert;
        };

        let begun = {
            let mut ledger = self.ledger();
            match action {
                Some(action) => ledger.begin(&recipe.title, action),
                None => ledger.begin_toggle(&recipe.title),
            }
        };

        let pending = match begun {
            Ok(pending) => pending,
            Err(err) => return rejected(err),
        };

        let result = match pending.action {
            FavoriteAction::Add => {
                self.remote
                    .add(credential, &recipe.to_favorite_record())
                    .await
            }
            FavoriteAction::Remove => self.remote.remove(credential, &recipe.title).await,
        };

        self.finish(&pending, result)
    }

    fn finish(&self, pending: &PendingMutation, result: Result<(), Error>) -> MutationOutcome {
        let resolution = self.ledger().resolve(pending, result.is_ok());

        match resolution {
            Resolution::Confirmed(status) => MutationOutcome::Confirmed { status },
            Resolution::RolledBack(status) => {
                let error = result.err().map(|e| e.to_string()).unwrap_or_default();
                log::warn!(
                    "favorite {:?} for \"{}\" failed, reverted to {:?}: {}",
                    pending.action,
                    pending.title,
                    status,
                    error
                );
                MutationOutcome::RolledBack { status, error }
            }
            Resolution::Stale => {
                log::debug!("discarding stale favorite response for \"{}\"", pending.title);
                MutationOutcome::Stale
            }
        }
    }
}

fn rejected(err: LedgerError) -> MutationOutcome {
    MutationOutcome::Rejected {
        reason: err.to_string(),
    }
}
