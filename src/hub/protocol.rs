//! Event types carried by the hub channels.

use crate::buffer::Match;
use std::sync::Arc;
use std::time::Duration;

/// Monotonic number attached to each submitted query.
pub type QuerySeq = u64;

/// A query submitted for filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEvent {
    pub seq: QuerySeq,
    pub text: String,
}

/// Shared, immutable result of one filter pass.
pub type MatchList = Arc<Vec<Match>>;

/// The admitted outcome of a filter pass, tagged with what produced it.
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub query: String,
    pub matcher: String,
    pub matches: MatchList,
}

impl ResultSet {
    pub fn new(query: impl Into<String>, matcher: impl Into<String>, matches: Vec<Match>) -> Self {
        Self {
            query: query.into(),
            matcher: matcher.into(),
            matches: Arc::new(matches),
        }
    }

    /// True when `other` refreshes the same query under the same matcher, as
    /// happens while records are still streaming in.
    pub fn refreshes(&self, other: &ResultSet) -> bool {
        self.query == other.query && self.matcher == other.matcher
    }
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::new("", "", Vec::new())
    }
}

/// Request for the view loop to draw.
#[derive(Debug, Clone)]
pub enum DrawRequest {
    /// Redraw with the current state (resize, selection change, status update).
    Redraw,
    /// Replace the displayed result, then draw.
    Results(ResultSet),
}

/// Text for the status row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    /// Clear the message after this long; `None` keeps it until replaced.
    pub clear_after: Option<Duration>,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            clear_after: None,
        }
    }

    pub fn timed(text: impl Into<String>, clear_after: Duration) -> Self {
        Self {
            text: text.into(),
            clear_after: Some(clear_after),
        }
    }
}

/// Cursor and page movement requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingRequest {
    NextLine,
    PrevLine,
    NextPage,
    PrevPage,
    /// Jump to a 1-based page number.
    GotoPage(usize),
}
