//! Shared state of one interactive run.
//!
//! A single `Session` is built at startup and handed to every loop behind an
//! `Arc`. Each field is guarded by its own lock and every operation takes at most
//! one of them at a time. The View task is the only writer of [`Display`].

pub mod query;

pub use query::QueryState;

use crate::buffer::{Match, MemoryBuffer, Record};
use crate::error::Result;
use crate::hub::{Hub, QuerySeq, ResultSet};
use crate::matcher::{Matcher, MatcherSet};
use crate::selection::Selection;
use crate::view::Pager;
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Exit status after a confirmed selection.
pub const EXIT_OK: i32 = 0;
/// Exit status after cancellation or a terminating signal.
pub const EXIT_CANCELLED: i32 = 1;

/// What the View currently shows.
#[derive(Debug, Clone)]
pub struct Display {
    pub result: ResultSet,
    pub pager: Pager,
    pub status: Option<String>,
}

impl Display {
    fn new() -> Self {
        Self {
            result: ResultSet::default(),
            pager: Pager::new(1),
            status: None,
        }
    }

    /// The match under the cursor, if the result is not empty.
    pub fn cursor_match(&self) -> Option<&Match> {
        self.result.matches.get(self.pager.cursor())
    }
}

#[derive(Debug)]
pub struct Session {
    hub: Hub,
    buffer: Arc<MemoryBuffer>,
    matchers: RwLock<MatcherSet>,
    query: Mutex<QueryState>,
    selection: Mutex<Selection>,
    display: Mutex<Display>,
    prompt: String,
    exit_status: OnceLock<i32>,
    result: Mutex<Vec<Arc<Record>>>,
    tracker: TaskTracker,
}

impl Session {
    pub fn new(buffer: Arc<MemoryBuffer>, matchers: MatcherSet, prompt: impl Into<String>) -> Self {
        Self {
            hub: Hub::new(),
            buffer,
            matchers: RwLock::new(matchers),
            query: Mutex::new(QueryState::default()),
            selection: Mutex::new(Selection::new()),
            display: Mutex::new(Display::new()),
            prompt: prompt.into(),
            exit_status: OnceLock::new(),
            result: Mutex::new(Vec::new()),
            tracker: TaskTracker::new(),
        }
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub fn buffer(&self) -> &Arc<MemoryBuffer> {
        &self.buffer
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Run a loop as part of this session; [`Session::join`] waits for it.
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn(task)
    }

    /// Wait for every spawned loop to finish. Call once, after the last spawn.
    pub async fn join(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Record the exit status (first writer wins) and stop the session.
    pub fn exit_with(&self, status: i32) {
        if self.exit_status.set(status).is_ok() {
            log::debug!("exit status set to {status}");
        }
        self.hub.stop();
    }

    pub fn exit_status(&self) -> Option<i32> {
        self.exit_status.get().copied()
    }

    /// Confirm `records` as the outcome and stop with [`EXIT_OK`].
    pub fn finish(&self, records: Vec<Arc<Record>>) {
        *self.result.lock() = records;
        self.exit_with(EXIT_OK);
    }

    pub fn take_result(&self) -> Vec<Arc<Record>> {
        std::mem::take(&mut *self.result.lock())
    }

    // Query

    pub fn query_text(&self) -> String {
        self.query.lock().text()
    }

    /// Edit the query under its lock and return the closure's value.
    pub fn edit_query<T>(&self, edit: impl FnOnce(&mut QueryState) -> T) -> T {
        edit(&mut self.query.lock())
    }

    pub fn query_snapshot(&self) -> QueryState {
        self.query.lock().clone()
    }

    /// Submit the current query text for filtering.
    pub async fn submit_query(&self) -> Result<QuerySeq> {
        let text = self.query_text();
        self.hub.send_query(text).await
    }

    /// True while a pass for query `seq` with `text` under `matcher` still answers
    /// the latest query. Re-submissions of the same text under the same matcher
    /// (streaming refreshes) do not make an older pass stale.
    pub fn pass_is_current(&self, seq: QuerySeq, text: &str, matcher: &str) -> bool {
        if self.hub.latest_query_seq() == seq {
            return true;
        }
        self.hub.is_latest_query(seq, text) && self.current_matcher().name() == matcher
    }

    // Matchers

    pub fn current_matcher(&self) -> Arc<Matcher> {
        self.matchers.read().current()
    }

    pub fn rotate_matcher(&self) -> Arc<Matcher> {
        self.matchers.write().rotate()
    }

    pub fn set_matcher(&self, name: &str) -> Result<()> {
        self.matchers.write().set_current(name)
    }

    // Selection

    pub fn with_selection<T>(&self, f: impl FnOnce(&mut Selection) -> T) -> T {
        f(&mut self.selection.lock())
    }

    pub fn selection_snapshot(&self) -> Selection {
        self.selection.lock().clone()
    }

    // Display

    pub fn with_display<T>(&self, f: impl FnOnce(&mut Display) -> T) -> T {
        f(&mut self.display.lock())
    }

    pub fn display_snapshot(&self) -> Display {
        self.display.lock().clone()
    }

    /// Cursor position and the match under it.
    pub fn cursor_target(&self) -> Option<(usize, Match)> {
        let display = self.display.lock();
        display
            .cursor_match()
            .map(|m| (display.pager.cursor(), m.clone()))
    }

    /// Close an open range at the current cursor, resolving positions through the
    /// displayed result. Returns how many records were newly marked.
    pub fn commit_range(&self) -> usize {
        let (cursor, matches) = {
            let display = self.display.lock();
            (display.pager.cursor(), Arc::clone(&display.result.matches))
        };
        self.selection
            .lock()
            .commit_range(cursor, |pos| matches.get(pos).map(Match::index))
    }

    /// The records a confirmation should output: the marked ones in buffer order,
    /// or else the one under the cursor.
    pub fn confirmed_records(&self) -> Vec<Arc<Record>> {
        let marked = self.selection.lock().indices();
        if marked.is_empty() {
            return self
                .cursor_target()
                .map(|(_, m)| vec![Arc::clone(m.record())])
                .unwrap_or_default();
        }
        marked
            .into_iter()
            .filter_map(|index| match self.buffer.record_at(index) {
                Ok(record) => Some(record),
                Err(err) => {
                    log::warn!("selected record {index} unavailable: {err}");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::PagingRequest;
    use crate::matcher::{IGNORE_CASE, REGEXP};

    fn session(lines: &[&str]) -> Session {
        Session::new(
            Arc::new(MemoryBuffer::from_lines(lines)),
            MatcherSet::new(),
            "QUERY>",
        )
    }

    fn show_all(session: &Session) {
        let records = session.buffer().snapshot();
        let matches = session.current_matcher().filter(&records, "").unwrap();
        session.with_display(|display| {
            display.result = ResultSet::new("", "IgnoreCase", matches);
            display.pager = Pager::new(10);
        });
    }

    #[test]
    fn first_exit_status_wins() {
        let session = session(&[]);
        assert_eq!(session.exit_status(), None);
        session.exit_with(EXIT_CANCELLED);
        session.exit_with(EXIT_OK);
        assert_eq!(session.exit_status(), Some(EXIT_CANCELLED));
        assert!(session.hub().is_stopped());
    }

    #[test]
    fn confirmation_prefers_marks_over_cursor() {
        let session = session(&["a", "b", "c", "d"]);
        show_all(&session);
        session.with_display(|d| d.pager.apply(PagingRequest::NextLine, 4));

        let shown: Vec<String> = session
            .confirmed_records()
            .iter()
            .map(|r| r.display().to_string())
            .collect();
        assert_eq!(shown, vec!["b"]);

        session.with_selection(|s| s.select_all([3, 0]));
        let indices: Vec<usize> = session.confirmed_records().iter().map(|r| r.index()).collect();
        assert_eq!(indices, vec![0, 3]);
    }

    #[test]
    fn range_commit_uses_displayed_positions() {
        let session = session(&["x1", "y", "x2", "x3"]);
        let records = session.buffer().snapshot();
        let matches = Matcher::IgnoreCase.filter(&records, "x").unwrap();
        session.with_display(|d| {
            d.result = ResultSet::new("x", "IgnoreCase", matches);
            d.pager = Pager::new(10);
        });

        session.with_selection(|s| s.start_range(0));
        session.with_display(|d| d.pager.set_cursor(2, 3));
        assert_eq!(session.commit_range(), 3);
        assert_eq!(session.selection_snapshot().indices(), vec![0, 2, 3]);
    }

    #[tokio::test]
    async fn refresh_of_the_same_query_keeps_a_pass_current() {
        let session = session(&["a"]);
        let _rx = session.hub().take_query_receiver().unwrap();

        session.edit_query(|q| q.set("a"));
        let first = session.submit_query().await.unwrap();
        session.submit_query().await.unwrap();
        assert!(session.pass_is_current(first, "a", IGNORE_CASE));

        // A different matcher answers a different question
        assert!(!session.pass_is_current(first, "a", REGEXP));
        session.set_matcher(REGEXP).unwrap();
        assert!(!session.pass_is_current(first, "a", IGNORE_CASE));

        session.edit_query(|q| q.set("ab"));
        let typed = session.submit_query().await.unwrap();
        assert!(!session.pass_is_current(first, "a", REGEXP));
        assert!(session.pass_is_current(typed, "ab", REGEXP));
    }

    #[test]
    fn empty_result_confirms_nothing() {
        let session = session(&[]);
        assert!(session.confirmed_records().is_empty());
    }

    #[tokio::test]
    async fn join_waits_for_spawned_loops() {
        let session = Arc::new(session(&[]));
        let waiter = Arc::clone(&session);
        session.spawn(async move { waiter.hub().stopped().await });
        session.exit_with(EXIT_OK);
        tokio::time::timeout(std::time::Duration::from_secs(1), session.join())
            .await
            .expect("loops did not join");
    }
}
