//! Favorite status state machine
//!
//! The ledger tracks, per recipe title, whether the recipe is in the user's
//! favorites. It performs no I/O: callers ask it to begin a transition, run
//! the remote call themselves, and report the outcome back with the ticket
//! they were handed.
//!
//! ```text
//!   unknown ──sync──▶ favorited ◀──add / remove──▶ not-favorited
//!                 └─▶ not-favorited
//! ```
//!
//! Each title allows one mutation in flight. Every request is stamped with a
//! [`Ticket`] in issue order, and responses carrying an older ticket than the
//! newest one issued for the same title are discarded.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FavoriteStatus {
    Unknown,
    Favorited,
    NotFavorited,
}

impl FavoriteStatus {
    pub fn is_favorited(self) -> bool {
        self == FavoriteStatus::Favorited
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteAction {
    Add,
    Remove,
}

impl FavoriteAction {
    /// Status shown while the remote call is in flight
    pub fn optimistic_status(self) -> FavoriteStatus {
        match self {
            FavoriteAction::Add => FavoriteStatus::Favorited,
            FavoriteAction::Remove => FavoriteStatus::NotFavorited,
        }
    }

    /// Status restored when the remote call fails
    pub fn rollback_status(self) -> FavoriteStatus {
        match self {
            FavoriteAction::Add => FavoriteStatus::NotFavorited,
            FavoriteAction::Remove => FavoriteStatus::Favorited,
        }
    }
}

/// Issue-order stamp for a remote request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// A mutation that has been applied optimistically and awaits its remote outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub ticket: Ticket,
    pub title: String,
    pub action: FavoriteAction,
}

/// Outcome of reporting a remote result back to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The remote call succeeded and the optimistic status stands
    Confirmed(FavoriteStatus),
    /// The remote call failed and the status was reverted
    RolledBack(FavoriteStatus),
    /// A newer request superseded this one; nothing changed
    Stale,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("A favorite update for \"{0}\" is already in progress")]
    Busy(String),

    #[error("\"{0}\" is already in your favorites")]
    AlreadyFavorited(String),

    #[error("\"{0}\" is not in your favorites")]
    NotFavorited(String),
}

#[derive(Debug, Clone)]
struct Entry {
    status: FavoriteStatus,
    pending: Option<PendingMutation>,
    last_issued: Ticket,
}

#[derive(Debug, Clone, Default)]
pub struct FavoriteLedger {
    entries: HashMap<String, Entry>,
    next_ticket: u64,
    latest_sync: Option<Ticket>,
    synced: bool,
}

impl FavoriteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status of `title`. Titles never seen are `Unknown` until a
    /// favorites load has been applied, and `NotFavorited` afterwards.
    pub fn status(&self, title: &str) -> FavoriteStatus {
        match self.entries.get(title) {
            Some(entry) => entry.status,
            None if self.synced => FavoriteStatus::NotFavorited,
            None => FavoriteStatus::Unknown,
        }
    }

    pub fn is_pending(&self, title: &str) -> bool {
        self.entries
            .get(title)
            .is_some_and(|entry| entry.pending.is_some())
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Titles currently marked as favorited, sorted
    pub fn favorited_titles(&self) -> Vec<&str> {
        let mut titles: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.status.is_favorited())
            .map(|(title, _)| title.as_str())
            .collect();
        titles.sort_unstable();
        titles
    }

    fn issue(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Start loading the remote favorites collection
    pub fn begin_sync(&mut self) -> Ticket {
        let ticket = self.issue();
        self.latest_sync = Some(ticket);
        ticket
    }

    /// Apply the favorites collection fetched under `ticket`.
    ///
    /// Returns `false` and changes nothing when a newer load was issued in
    /// the meantime. Titles with a mutation in flight, or with a mutation
    /// issued after this load started, keep their current status.
    pub fn apply_sync<'a, I>(&mut self, ticket: Ticket, favorites: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.latest_sync != Some(ticket) {
            return false;
        }

        let favorites: HashSet<&str> = favorites.into_iter().collect();

        for (title, entry) in self.entries.iter_mut() {
            if entry.pending.is_some() || entry.last_issued > ticket {
                continue;
            }
            entry.status = if favorites.contains(title.as_str()) {
                FavoriteStatus::Favorited
            } else {
                FavoriteStatus::NotFavorited
            };
            entry.last_issued = ticket;
        }

        for title in favorites {
            self.entries.entry(title.to_string()).or_insert(Entry {
                status: FavoriteStatus::Favorited,
                pending: None,
                last_issued: ticket,
            });
        }

        self.synced = true;
        true
    }

    /// Apply `action` to `title` optimistically
    pub fn begin(
        &mut self,
        title: &str,
        action: FavoriteAction,
    ) -> Result<PendingMutation, LedgerError> {
        if self.is_pending(title) {
            return Err(LedgerError::Busy(title.to_string()));
        }

        match (action, self.status(title)) {
            (FavoriteAction::Add, FavoriteStatus::Favorited) => {
                return Err(LedgerError::AlreadyFavorited(title.to_string()))
            }
            (FavoriteAction::Remove, FavoriteStatus::NotFavorited) => {
                return Err(LedgerError::NotFavorited(title.to_string()))
            }
            _ => {}
        }

        let ticket = self.issue();
        let pending = PendingMutation {
            ticket,
            title: title.to_string(),
            action,
        };

        self.entries.insert(
            title.to_string(),
            Entry {
                status: action.optimistic_status(),
                pending: Some(pending.clone()),
                last_issued: ticket,
            },
        );

        Ok(pending)
    }

    /// Add when not favorited, remove when favorited
    pub fn begin_toggle(&mut self, title: &str) -> Result<PendingMutation, LedgerError> {
        let action = if self.status(title).is_favorited() {
            FavoriteAction::Remove
        } else {
            FavoriteAction::Add
        };
        self.begin(title, action)
    }

    /// Report the remote outcome of `mutation`
    pub fn resolve(&mut self, mutation: &PendingMutation, succeeded: bool) -> Resolution {
        let Some(entry) = self.entries.get_mut(&mutation.title) else {
            return Resolution::Stale;
        };

        let is_current = entry
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ticket == mutation.ticket);

        if !is_current || entry.last_issued > mutation.ticket {
            return Resolution::Stale;
        }

        entry.pending = None;

        if succeeded {
            entry.status = mutation.action.optimistic_status();
            Resolution::Confirmed(entry.status)
        } else {
            entry.status = mutation.action.rollback_status();
            Resolution::RolledBack(entry.status)
        }
    }

    /// Forget everything, e.g. when the credential goes away. Outstanding
    /// mutations resolve as stale afterwards.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.latest_sync = None;
        self.synced = false;
    }
}
