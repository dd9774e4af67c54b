//! Everything one frame needs, gathered from the session in one go.

use crate::buffer::{FilteredView, LineSource, Match};
use crate::session::Session;

/// One visible result line.
#[derive(Debug, Clone)]
pub struct Row {
    pub line: Match,
    /// Position of the line in the whole result.
    pub position: usize,
    pub is_cursor: bool,
    pub is_selected: bool,
}

/// A renderer-independent snapshot of the screen.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    pub prompt: String,
    pub query: String,
    /// Caret position in chars.
    pub caret: usize,
    pub rows: Vec<Row>,
    pub matcher: String,
    pub page: usize,
    pub last_page: usize,
    pub total: usize,
    pub buffer_len: usize,
    pub loading: bool,
    pub selected: usize,
    pub range_open: bool,
    pub status: Option<String>,
}

impl Screen {
    /// Take a consistent-enough snapshot of the session. Each piece comes from a
    /// single lock; the pieces are not taken atomically together.
    pub fn compose(session: &Session) -> Self {
        let display = session.display_snapshot();
        let query = session.query_snapshot();
        let selection = session.selection_snapshot();
        let pager = display.pager;
        let cursor = pager.cursor();
        let matches = display.result.matches.as_slice();

        let page = FilteredView::page(matches, pager.page(), pager.per_page());
        let rows = (0..page.size())
            .filter_map(|i| {
                let position = page.backing_index(i).ok()?;
                let line = page.line_at(i).ok()?;
                let is_selected = selection.is_marked(position, line.index(), cursor);
                Some(Row {
                    line,
                    position,
                    is_cursor: position == cursor,
                    is_selected,
                })
            })
            .collect();

        Self {
            prompt: session.prompt().to_string(),
            query: query.text(),
            caret: query.caret(),
            rows,
            matcher: session.current_matcher().name().to_string(),
            page: pager.page(),
            last_page: pager.last_page(matches.len()),
            total: matches.len(),
            buffer_len: session.buffer().len(),
            loading: !session.buffer().is_done(),
            selected: selection.len(),
            range_open: selection.is_range_open(),
            status: display.status,
        }
    }

    /// The summary shown on the status row.
    pub fn info(&self) -> String {
        let mut info = format!(
            "{} [{}/{}] ({}/{}{})",
            self.matcher,
            self.page,
            self.last_page,
            self.total,
            self.buffer_len,
            if self.loading { "+" } else { "" }
        );
        if self.selected > 0 {
            info.push_str(&format!(" {} selected", self.selected));
        }
        if self.range_open {
            info.push_str(" RANGE");
        }
        if let Some(status) = &self.status {
            info.push_str(" | ");
            info.push_str(status);
        }
        info
    }
}
