//! Debounced search state machine.
//!
//! # Design
//! `SearchOrchestrator` owns the current query and publishes a `FetchState`
//! through a `watch` channel. Changing the query schedules a fetch on a timer
//! task: immediately for the default listing, after `FetchOptions::debounce`
//! for a search. A newer query aborts the pending timer, so only the last
//! query typed within the window reaches the network.
//!
//! Requests already in flight are not cancelled. Every scheduled fetch takes
//! the next generation number, and state updates are applied only while that
//! generation is still the latest; a slow response for an older query is
//! dropped instead of overwriting newer results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::search_term;
use crate::directory::Directory;
use crate::types::UserEntry;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Quiet period before a search query is sent.
    pub debounce: Duration,
    /// Upgrade each result to a full profile before publishing.
    pub enrich: bool,
    /// Publish listing failures in `FetchState::error`. When off, failures
    /// are only logged.
    pub track_errors: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            enrich: false,
            track_errors: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState {
    pub query: String,
    pub results: Vec<UserEntry>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub phase: FetchPhase,
    /// Query of the most recent fetch that completed, successfully or not.
    pub settled_query: Option<String>,
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            is_loading: true,
            error: None,
            phase: FetchPhase::Idle,
            settled_query: None,
        }
    }
}

pub struct SearchOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    directory: Directory,
    options: FetchOptions,
    state: watch::Sender<FetchState>,
    generation: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchOrchestrator {
    /// Create the orchestrator and schedule the default listing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(directory: Directory, options: FetchOptions) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        let orchestrator = Self {
            inner: Arc::new(Inner {
                directory,
                options,
                state,
                generation: AtomicU64::new(0),
                pending: Mutex::new(None),
            }),
        };
        let generation = orchestrator.inner.next_generation();
        orchestrator.schedule(String::new(), generation);
        orchestrator
    }

    /// Replace the query. Setting the current query again does nothing.
    pub fn set_query(&self, text: impl Into<String>) {
        let query = text.into();
        let mut generation = None;
        self.inner.state.send_if_modified(|state| {
            if state.query == query {
                return false;
            }
            state.query.clone_from(&query);
            generation = Some(self.inner.next_generation());
            true
        });
        if let Some(generation) = generation {
            self.schedule(query, generation);
        }
    }

    pub fn query(&self) -> String {
        self.inner.state.borrow().query.clone()
    }

    pub fn results(&self) -> Vec<UserEntry> {
        self.inner.state.borrow().results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    pub fn snapshot(&self) -> FetchState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.inner.state.subscribe()
    }

    pub fn options(&self) -> FetchOptions {
        self.inner.options
    }

    fn schedule(&self, query: String, generation: u64) {
        let delay = match search_term(&query) {
            Some(_) => self.inner.options.debounce,
            None => Duration::ZERO,
        };
        let inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if !inner.is_current(generation) {
                return;
            }
            tokio::spawn(inner.fetch(query, generation));
        });

        let previous = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Drop for SearchOrchestrator {
    fn drop(&mut self) {
        let pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(timer) = pending {
            timer.abort();
        }
    }
}

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Run `update` only if `generation` is still the latest.
    fn apply(&self, generation: u64, update: impl FnOnce(&mut FetchState)) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            update(state);
            true
        })
    }

    async fn fetch(self: Arc<Self>, query: String, generation: u64) {
        let started = self.apply(generation, |state| {
            state.is_loading = true;
            state.error = None;
            state.phase = FetchPhase::Loading;
        });
        if !started {
            return;
        }

        let outcome = self.directory.fetch_users(&query, self.options.enrich).await;
        let settled = Some(query.clone());
        let applied = match outcome {
            Ok(results) => {
                let count = results.len();
                let applied = self.apply(generation, |state| {
                    state.results = results;
                    state.is_loading = false;
                    state.phase = FetchPhase::Ready;
                    state.settled_query = settled;
                });
                if applied {
                    debug!(query = %query, count, "results published");
                }
                applied
            }
            Err(err) => {
                let track_errors = self.options.track_errors;
                let message = err.to_string();
                let applied = self.apply(generation, |state| {
                    if track_errors {
                        state.error = Some(message);
                    }
                    state.is_loading = false;
                    state.phase = FetchPhase::Failed;
                    state.settled_query = settled;
                });
                if applied {
                    warn!(query = %query, %err, "failed to load users");
                }
                applied
            }
        };
        if !applied {
            debug!(query = %query, generation, "discarding stale response");
        }
    }
}
