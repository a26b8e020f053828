//! Shared ingredient selection
//!
//! One [`SelectionStore`] owns the selection for the whole process. Every
//! surface that renders or filters by the selection holds a
//! [`SelectionSubscription`] instead of its own copy, and writes go through
//! the store. After a mutation all subscribers observe the very same
//! `Arc<SelectionSet>`.

use pantry_core::selection::SelectionSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Single writable copy of the selected ingredients.
///
/// Cloning the store clones the handle, not the selection: every clone writes
/// to the same channel.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    tx: Arc<watch::Sender<Arc<SelectionSet>>>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(SelectionSet::new()));
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> SelectionSubscription {
        SelectionSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn current(&self) -> Arc<SelectionSet> {
        Arc::clone(&self.tx.borrow())
    }

    /// Remove `name` if selected (case-insensitive), add it otherwise
    pub fn toggle(&self, name: &str) -> Arc<SelectionSet> {
        self.publish(|current| current.toggled(name))
    }

    /// Replace the whole selection
    pub fn replace(&self, selection: SelectionSet) -> Arc<SelectionSet> {
        self.publish(move |_| selection)
    }

    pub fn clear(&self) -> Arc<SelectionSet> {
        self.replace(SelectionSet::new())
    }

    fn publish<F>(&self, next: F) -> Arc<SelectionSet>
    where
        F: FnOnce(&SelectionSet) -> SelectionSet,
    {
        let mut published = self.current();

        self.tx.send_modify(|current| {
            *current = Arc::new(next(current.as_ref()));
            published = Arc::clone(current);
        });

        log::debug!("selection now has {} ingredient(s)", published.len());
        published
    }
}

/// Read side of the store
#[derive(Debug, Clone)]
pub struct SelectionSubscription {
    rx: watch::Receiver<Arc<SelectionSet>>,
}

impl SelectionSubscription {
    /// The latest published selection, without marking it as seen
    pub fn current(&self) -> Arc<SelectionSet> {
        Arc::clone(&self.rx.borrow())
    }

    /// The latest selection if it changed since the last call
    pub fn take_change(&mut self) -> Option<Arc<SelectionSet>> {
        if self.rx.has_changed().unwrap_or(false) {
            Some(Arc::clone(&self.rx.borrow_and_update()))
        } else {
            None
        }
    }
}
