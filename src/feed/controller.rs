use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::api::ApiError;

use super::cursor::{Cursor, CursorStrategy};
use super::merge::merge_page;
use super::source::LogSource;
use super::types::{DateGroup, Seed};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedState {
    pub groups: Vec<DateGroup>,
    pub cursor: Option<Cursor>,
    pub has_next_page: bool,
}

/// What a `load_more` call did. Everything except `Loaded` is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Busy,
    Exhausted,
    NoCursor,
    Loaded { date_groups: usize, has_next_page: bool },
}

/// Pages through the change log and keeps the merged, date/herb grouped feed.
///
/// Shared by reference between tasks; the loading flag makes sure only one
/// request is in flight and only one merge touches the feed at a time.
pub struct FeedController<S> {
    source: S,
    strategy: Arc<dyn CursorStrategy>,
    state: Mutex<FeedState>,
    loading: AtomicBool,
}

// Resets the loading flag on every exit path of `load_more`.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: LogSource> FeedController<S> {
    pub fn new(source: S, strategy: Arc<dyn CursorStrategy>) -> Self {
        Self { source, strategy, state: Mutex::new(FeedState::default()), loading: AtomicBool::new(false) }
    }

    /// Adopt an already rendered first page and its pagination cursor.
    pub fn initialize(&self, seed: Seed) {
        let mut state = self.lock();
        state.groups = seed.entries;
        state.cursor = seed.cursor;
        state.has_next_page = seed.has_next_page;
    }

    pub async fn load_more(&self) -> Result<LoadOutcome, ApiError> {
        if self.loading.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Ok(LoadOutcome::Busy);
        }
        let _guard = LoadingGuard(&self.loading);

        let cursor = {
            let state = self.lock();
            if !state.has_next_page {
                return Ok(LoadOutcome::Exhausted);
            }
            match state.cursor.clone() {
                Some(c) => c,
                None => return Ok(LoadOutcome::NoCursor),
            }
        };

        tracing::debug!(cursor = %cursor, strategy = self.strategy.name(), "load_more");
        let page = self.source.fetch_page(self.strategy.as_ref(), Some(&cursor)).await?;

        let mut state = self.lock();
        let date_groups = page.data.len();
        merge_page(&mut state.groups, page.data);
        state.cursor = page.cursor;
        state.has_next_page = page.has_next_page;
        Ok(LoadOutcome::Loaded { date_groups, has_next_page: state.has_next_page })
    }

    /// Keep loading until the log is exhausted or `max_pages` more pages were
    /// merged. `on_page` sees (page number, date groups, has next page).
    pub async fn load_pages<C>(&self, max_pages: Option<usize>, mut on_page: C) -> Result<usize, ApiError>
    where
        C: FnMut(usize, usize, bool),
    {
        let mut loaded = 0usize;
        while max_pages.is_none_or(|max| loaded < max) {
            let before = self.cursor();
            match self.load_more().await? {
                LoadOutcome::Loaded { date_groups, has_next_page } => {
                    loaded += 1;
                    on_page(loaded, date_groups, has_next_page);
                }
                LoadOutcome::Busy | LoadOutcome::Exhausted | LoadOutcome::NoCursor => break,
            }
            if self.has_next_page() && self.cursor() == before {
                tracing::warn!(cursor = ?before, "server returned the same cursor again; stopping");
                break;
            }
        }
        Ok(loaded)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn has_next_page(&self) -> bool {
        self.lock().has_next_page
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.lock().cursor.clone()
    }

    pub fn snapshot(&self) -> FeedState {
        self.lock().clone()
    }

    pub fn into_state(self) -> FeedState {
        self.state.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // The lock is never held across an await, so a poisoned mutex still holds
    // a fully merged feed.
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
