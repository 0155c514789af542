//! Session-scoped favorites.
//!
//! A `FavoritesStore` is a shared handle: clones observe and mutate the same
//! set. Components receive it through a `Session`, which must have been
//! provisioned with a store; asking an unprovisioned session for favorites is
//! a usage error, not an empty set.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::SessionError;

/// Handles marked as favorite, unique, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FavoritesStore {
    handles: Arc<Mutex<Vec<String>>>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handle` if absent, remove it if present. Returns the new membership.
    pub fn toggle_favorite(&self, handle: &str) -> bool {
        let mut handles = self.lock();
        match handles.iter().position(|h| h == handle) {
            Some(index) => {
                handles.remove(index);
                false
            }
            None => {
                handles.push(handle.to_string());
                true
            }
        }
    }

    pub fn is_favorite(&self, handle: &str) -> bool {
        self.lock().iter().any(|h| h == handle)
    }

    /// Snapshot of the favorites in the order they were added.
    pub fn favorites(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Explicit scope for per-visitor state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    favorites: Option<FavoritesStore>,
}

impl Session {
    /// A session with nothing provisioned.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_favorites(store: FavoritesStore) -> Self {
        Self {
            favorites: Some(store),
        }
    }

    /// Install a fresh store unless one is already provisioned, and return it.
    pub fn provide_favorites(&mut self) -> FavoritesStore {
        self.favorites.get_or_insert_with(FavoritesStore::new).clone()
    }

    pub fn favorites(&self) -> Result<&FavoritesStore, SessionError> {
        self.favorites.as_ref().ok_or(SessionError::FavoritesNotProvided)
    }
}
