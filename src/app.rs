//! The joke list controller.
//!
//! [`App`] owns the joke collection (mirrored to storage through
//! [`Persisted`]), the loading flag and the in-flight fetch, and applies the
//! vote / lock intents that joke rows emit.  It also carries the small amount
//! of view state the terminal needs: list selection, status line, quit flag.

use std::collections::HashSet;
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;

use chrono::Local;
use ratatui::widgets::ListState;

use crate::fetch::{self, FetchMsg};
use crate::joke_item::JokeIntents;
use crate::source::{sorted_by_votes, Joke, JokeId, JokeSource};
use crate::storage::Persisted;

pub struct App {
    jokes: Persisted<Vec<Joke>>,
    source: Arc<dyn JokeSource>,
    num_jokes_to_get: usize,
    /// Set while a fetch cycle is in flight.  Not persisted.
    is_loading: bool,
    initialized: bool,
    pending: Option<mpsc::Receiver<FetchMsg>>,
    /// Selection within the display order.
    pub list_state: ListState,
    pub quit: bool,
    /// Outcome of the last operation.
    pub status: String,
}

impl App {
    pub fn new(
        jokes: Persisted<Vec<Joke>>,
        source: Arc<dyn JokeSource>,
        num_jokes_to_get: usize,
    ) -> Self {
        let mut app = Self {
            jokes,
            source,
            num_jokes_to_get,
            is_loading: false,
            initialized: false,
            pending: None,
            list_state: ListState::default(),
            quit: false,
            status: "Ready".into(),
        };
        app.select_first();
        app
    }

    /// Whether a fetch cycle is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn jokes(&self) -> &[Joke] {
        self.jokes.get()
    }

    /// The collection ordered for display, highest votes first.
    pub fn display_jokes(&self) -> Vec<Joke> {
        sorted_by_votes(self.jokes.get())
    }

    /// Run the one-time startup step: fetch if there is nothing to show.
    ///
    /// Only the first call does anything.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        if self.jokes.get().is_empty() {
            self.fetch_jokes();
        }
    }

    // -- fetching ------------------------------------------------------------

    /// Start a fetch cycle in the background.
    ///
    /// Returns `false` without doing anything if a cycle is already running.
    pub fn fetch_jokes(&mut self) -> bool {
        if self.is_loading {
            tracing::debug!("Fetch requested while one is in flight; ignoring");
            self.status = "Already fetching…".into();
            return false;
        }

        let seen: HashSet<JokeId> = self.jokes.get().iter().map(|j| j.id.clone()).collect();
        tracing::info!(target_count = self.num_jokes_to_get, known = seen.len(), "Starting fetch cycle");

        self.is_loading = true;
        self.status = "Fetching jokes…".into();
        self.pending = Some(fetch::spawn(
            Arc::clone(&self.source),
            seen,
            self.num_jokes_to_get,
        ));
        true
    }

    /// Apply the result of the in-flight fetch, if it has arrived.
    ///
    /// Called on every tick of the event loop.
    pub fn poll_fetch(&mut self) {
        let received = match self.pending.as_ref() {
            Some(rx) => rx.try_recv(),
            None => return,
        };

        match received {
            Ok(msg) => self.finish_fetch(msg),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.finish_fetch(FetchMsg::Failed("fetch worker exited unexpectedly".into()))
            }
        }
    }

    fn finish_fetch(&mut self, msg: FetchMsg) {
        self.pending = None;
        self.is_loading = false;

        match msg {
            FetchMsg::Done(new_jokes) => {
                let count = new_jokes.len();
                let merged: Vec<Joke> = self
                    .jokes
                    .get()
                    .iter()
                    .filter(|j| j.is_locked)
                    .cloned()
                    .chain(new_jokes)
                    .collect();

                tracing::info!(fetched = count, total = merged.len(), "Fetch cycle applied");
                self.jokes.set(merged);
                self.status = format!("Fetched {count} jokes at {}", Local::now().format("%H:%M:%S"));
                self.list_state.select(None);
                self.select_first();
            }
            FetchMsg::Failed(e) => {
                tracing::error!(error = %e, "Fetch cycle abandoned");
                self.status = "Fetch failed, press n to retry".into();
            }
        }
    }

    // -- intents -------------------------------------------------------------

    /// Add `delta` to the votes of the joke with `id`.  Unknown ids are ignored.
    pub fn vote(&mut self, id: &JokeId, delta: i64) {
        if !self.jokes.get().iter().any(|j| &j.id == id) {
            return;
        }
        let selected = self.selected_id();

        let updated = self
            .jokes
            .get()
            .iter()
            .map(|j| {
                if &j.id == id {
                    Joke {
                        votes: j.votes.saturating_add(delta),
                        ..j.clone()
                    }
                } else {
                    j.clone()
                }
            })
            .collect();
        self.jokes.set(updated);

        // Keep the cursor on the same joke after it moves in the ranking.
        if let Some(selected) = selected {
            self.select_id(&selected);
        }
    }

    /// Flip the lock of the joke with `id`.  Unknown ids are ignored.
    pub fn toggle_lock(&mut self, id: &JokeId) {
        if !self.jokes.get().iter().any(|j| &j.id == id) {
            return;
        }

        let updated = self
            .jokes
            .get()
            .iter()
            .map(|j| {
                if &j.id == id {
                    Joke {
                        is_locked: !j.is_locked,
                        ..j.clone()
                    }
                } else {
                    j.clone()
                }
            })
            .collect();
        self.jokes.set(updated);
    }

    /// Drop every joke and delete the stored collection.
    pub fn reset_votes(&mut self) {
        tracing::info!(key = self.jokes.key(), "Resetting jokes");
        self.jokes.clear(Vec::new());
        self.list_state.select(None);
        self.status = "Reset, press n for new jokes".into();
    }

    // -- navigation ----------------------------------------------------------

    pub fn selected_joke(&self) -> Option<Joke> {
        let index = self.list_state.selected()?;
        self.display_jokes().into_iter().nth(index)
    }

    fn selected_id(&self) -> Option<JokeId> {
        self.selected_joke().map(|j| j.id)
    }

    fn select_id(&mut self, id: &JokeId) {
        if let Some(pos) = self.display_jokes().iter().position(|j| &j.id == id) {
            self.list_state.select(Some(pos));
        }
    }

    pub fn select_next(&mut self) {
        let len = self.jokes.get().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.jokes.get().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.jokes.get().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.jokes.get().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }
}

impl JokeIntents for App {
    fn request_vote(&mut self, id: &JokeId, delta: i64) {
        self.vote(id, delta);
    }

    fn request_lock_toggle(&mut self, id: &JokeId) {
        self.toggle_lock(id);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{app_with, make_joke, wait_for_fetch};
    use super::*;
    use crate::fetch::testing::ScriptedSource;
    use crate::storage::testing::MemoryStore;

    fn ids(jokes: &[Joke]) -> Vec<&str> {
        jokes.iter().map(|j| j.id.as_str()).collect()
    }

    fn no_source() -> Arc<dyn JokeSource> {
        Arc::new(ScriptedSource::ids(Vec::<&'static str>::new()))
    }

    fn three() -> Vec<Joke> {
        vec![
            make_joke("1", 3, false),
            make_joke("2", 5, false),
            make_joke("3", 3, false),
        ]
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn loads_persisted_jokes() {
        let (app, _) = app_with(three(), no_source(), 5);
        assert_eq!(ids(app.jokes()), ["1", "2", "3"]);
        assert!(!app.is_loading());
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn invalid_stored_json_starts_empty() {
        let store = MemoryStore::with_entry("jokes", "definitely [not json");
        let persisted = Persisted::load(Box::new(store), "jokes", Vec::new());
        let app = App::new(persisted, no_source(), 5);
        assert!(app.jokes().is_empty());
        assert!(app.list_state.selected().is_none());
    }

    // -- display order -------------------------------------------------------

    #[test]
    fn display_order_is_descending_and_stable() {
        let (app, _) = app_with(three(), no_source(), 5);
        assert_eq!(ids(&app.display_jokes()), ["2", "1", "3"]);
        // Stored order is unchanged.
        assert_eq!(ids(app.jokes()), ["1", "2", "3"]);
    }

    // -- vote ----------------------------------------------------------------

    #[test]
    fn vote_changes_only_the_target() {
        let (mut app, store) = app_with(three(), no_source(), 5);
        app.vote(&JokeId::new("3"), 1);

        let jokes = app.jokes();
        assert_eq!(jokes[0], make_joke("1", 3, false));
        assert_eq!(jokes[1], make_joke("2", 5, false));
        assert_eq!(jokes[2], make_joke("3", 4, false));

        let stored: Vec<Joke> = serde_json::from_str(&store.raw("jokes").unwrap()).unwrap();
        assert_eq!(stored, jokes);
    }

    #[test]
    fn downvote_can_go_negative() {
        let (mut app, _) = app_with(vec![make_joke("a", 0, false)], no_source(), 5);
        app.vote(&JokeId::new("a"), -1);
        app.vote(&JokeId::new("a"), -1);
        assert_eq!(app.jokes()[0].votes, -2);
    }

    #[test]
    fn vote_on_unknown_id_is_noop() {
        let (mut app, _) = app_with(three(), no_source(), 5);
        app.vote(&JokeId::new("nope"), 1);
        assert_eq!(app.jokes(), three().as_slice());
    }

    #[test]
    fn vote_keeps_selection_on_the_voted_joke() {
        let (mut app, _) = app_with(three(), no_source(), 5);
        // Display order is 2, 1, 3; select "3".
        app.select_last();
        app.vote(&JokeId::new("3"), 5);
        assert_eq!(app.selected_joke().unwrap().id, JokeId::new("3"));
        assert_eq!(app.list_state.selected(), Some(0));
    }

    // -- toggle_lock ---------------------------------------------------------

    #[test]
    fn toggle_lock_flips_only_the_target_and_is_an_involution() {
        let (mut app, _) = app_with(three(), no_source(), 5);
        let id = JokeId::new("2");

        app.toggle_lock(&id);
        assert!(app.jokes()[1].is_locked);
        assert!(!app.jokes()[0].is_locked);
        assert!(!app.jokes()[2].is_locked);

        app.toggle_lock(&id);
        assert_eq!(app.jokes(), three().as_slice());
    }

    #[test]
    fn toggle_lock_on_unknown_id_is_noop() {
        let (mut app, _) = app_with(three(), no_source(), 5);
        app.toggle_lock(&JokeId::new("zzz"));
        assert_eq!(app.jokes(), three().as_slice());
    }

    #[test]
    fn intents_route_to_operations() {
        let (mut app, _) = app_with(three(), no_source(), 5);
        app.request_vote(&JokeId::new("1"), -1);
        app.request_lock_toggle(&JokeId::new("1"));
        assert_eq!(app.jokes()[0], make_joke("1", 2, true));
    }

    // -- reset ---------------------------------------------------------------

    #[test]
    fn reset_clears_memory_and_removes_key() {
        let (mut app, store) = app_with(three(), no_source(), 5);
        assert!(store.raw("jokes").is_some());

        app.reset_votes();

        assert!(app.jokes().is_empty());
        assert!(store.raw("jokes").is_none());
        assert!(app.list_state.selected().is_none());
    }

    // -- fetch ---------------------------------------------------------------

    #[test]
    fn fetch_keeps_locked_and_replaces_unlocked() {
        let existing = vec![
            make_joke("keep", 7, true),
            make_joke("drop", 9, false),
        ];
        let source = Arc::new(ScriptedSource::ids(["keep", "n1", "n2"]));
        let (mut app, store) = app_with(existing, source.clone(), 2);

        assert!(app.fetch_jokes());
        assert!(app.is_loading());
        wait_for_fetch(&mut app);

        assert_eq!(ids(app.jokes()), ["keep", "n1", "n2"]);
        assert_eq!(app.jokes()[0].votes, 7, "locked joke keeps its votes");
        assert_eq!(source.calls(), 3);
        assert!(!app.is_loading());

        let stored: Vec<Joke> = serde_json::from_str(&store.raw("jokes").unwrap()).unwrap();
        assert_eq!(stored, app.jokes());
    }

    #[test]
    fn fetch_results_have_unique_ids() {
        let source = Arc::new(ScriptedSource::ids(["a", "a", "b", "a", "c"]));
        let (mut app, _) = app_with(vec![make_joke("b", 1, true)], source, 2);

        app.fetch_jokes();
        wait_for_fetch(&mut app);

        let all = ids(app.jokes());
        let unique: HashSet<&str> = all.iter().copied().collect();
        assert_eq!(all.len(), unique.len());
        assert_eq!(all, ["b", "a", "c"]);
    }

    #[test]
    fn failed_fetch_leaves_collection_untouched() {
        let before = three();
        let source = Arc::new(ScriptedSource::new([Some("x"), None, Some("y")]));
        let (mut app, store) = app_with(before.clone(), source, 3);
        let stored_before = store.raw("jokes");

        app.fetch_jokes();
        wait_for_fetch(&mut app);

        assert_eq!(app.jokes(), before.as_slice());
        assert_eq!(store.raw("jokes"), stored_before);
        assert!(!app.is_loading());
        assert!(app.status.contains("failed"));
    }

    #[test]
    fn second_fetch_while_loading_is_rejected() {
        let source = Arc::new(ScriptedSource::ids(["a", "b"]));
        let (mut app, _) = app_with(Vec::new(), source.clone(), 2);

        assert!(app.fetch_jokes());
        assert!(!app.fetch_jokes());
        wait_for_fetch(&mut app);

        assert_eq!(ids(app.jokes()), ["a", "b"]);
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn lock_during_fetch_survives_the_merge() {
        let source = Arc::new(ScriptedSource::ids(["n1"]));
        let (mut app, _) = app_with(three(), source, 1);

        app.fetch_jokes();
        app.toggle_lock(&JokeId::new("2"));
        wait_for_fetch(&mut app);

        assert_eq!(ids(app.jokes()), ["2", "n1"]);
        assert!(app.jokes()[0].is_locked);
    }

    #[test]
    fn reset_during_fetch_leaves_only_new_jokes() {
        let existing = vec![make_joke("kept", 4, true), make_joke("old", 1, false)];
        let source = Arc::new(ScriptedSource::ids(["n1", "n2"]));
        let (mut app, store) = app_with(existing, source, 2);

        app.fetch_jokes();
        app.reset_votes();
        wait_for_fetch(&mut app);

        assert_eq!(ids(app.jokes()), ["n1", "n2"]);
        let stored: Vec<Joke> = serde_json::from_str(&store.raw("jokes").unwrap()).unwrap();
        assert_eq!(stored, app.jokes());
    }

    struct PanickingSource;

    impl JokeSource for PanickingSource {
        fn name(&self) -> &str {
            "panicking"
        }

        fn fetch_one(&self) -> Result<crate::source::RemoteJoke, crate::error::FetchError> {
            panic!("worker blew up");
        }
    }

    #[test]
    fn vanished_worker_counts_as_failure() {
        let (mut app, store) = app_with(three(), Arc::new(PanickingSource), 2);
        let stored_before = store.raw("jokes");

        assert!(app.fetch_jokes());
        wait_for_fetch(&mut app);

        assert!(!app.is_loading());
        assert_eq!(app.jokes(), three().as_slice());
        assert_eq!(store.raw("jokes"), stored_before);
        assert!(app.status.contains("failed"));
        // A fresh fetch is accepted afterwards.
        assert!(app.fetch_jokes());
    }

    // -- initialize ----------------------------------------------------------

    #[test]
    fn initialize_fetches_once_when_empty() {
        let source = Arc::new(ScriptedSource::ids(["a", "b", "c", "d"]));
        let (mut app, _) = app_with(Vec::new(), source.clone(), 2);

        app.initialize();
        wait_for_fetch(&mut app);
        app.reset_votes();
        app.initialize();

        assert!(!app.is_loading());
        assert!(app.jokes().is_empty());
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn initialize_skips_fetch_when_jokes_exist() {
        let source = Arc::new(ScriptedSource::ids(["a"]));
        let (mut app, _) = app_with(three(), source.clone(), 1);

        app.initialize();

        assert!(!app.is_loading());
        assert_eq!(source.calls(), 0);
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let (mut app, _) = app_with(Vec::new(), no_source(), 5);
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
        assert!(app.selected_joke().is_none());
    }

    #[test]
    fn navigation_clamps() {
        let (mut app, _) = app_with(three(), no_source(), 5);
        app.select_last();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
        app.select_next();
        assert_eq!(app.selected_joke().unwrap().id, JokeId::new("1"));
    }
}
