use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use oneiro_types::models::Dream;

use crate::backend::FeedBackend;
use crate::session::Session;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(650);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExploreState {
    pub query: String,
    pub results: Vec<Dream>,
    pub searching: bool,
}

/// Debounced explore search. Every `set_query` supersedes the pending one,
/// so only the last query of a typing burst reaches the backend.
pub struct ExploreSearch {
    backend: Arc<dyn FeedBackend>,
    session: Session,
    delay: Duration,
    state: Arc<watch::Sender<ExploreState>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ExploreSearch {
    pub fn new(backend: Arc<dyn FeedBackend>, session: Session) -> Self {
        let (state, _) = watch::channel(ExploreState::default());
        Self {
            backend,
            session,
            delay: SEARCH_DEBOUNCE,
            state: Arc::new(state),
            pending: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ExploreState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExploreState> {
        self.state.subscribe()
    }

    /// Record the new query and schedule a search after the debounce delay.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.send_modify(|s| {
            s.query = query.clone();
            s.searching = true;
        });

        let backend = self.backend.clone();
        let state = self.state.clone();
        let token = self.session.token();
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(query = %query, "Searching");

            let result = backend.search(query.trim(), token.as_deref()).await;
            state.send_modify(|s| {
                s.searching = false;
                match result {
                    Ok(results) => s.results = results,
                    Err(e) => error!(query = %query, "Search failed: {}", e),
                }
            });
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }
}

impl Drop for ExploreSearch {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = pending.take() {
            task.abort();
        }
    }
}
