//! Cursor and page arithmetic over a result list.
//!
//! Pages are 1-based, the in-page line is 0-based. Every movement is a no-op at
//! its boundary, so repeating a request past the end is harmless.

use crate::hub::PagingRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    per_page: usize,
    page: usize,
    line: usize,
}

impl Pager {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
            page: 1,
            line: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Absolute position of the cursor in the result list.
    pub fn cursor(&self) -> usize {
        (self.page - 1) * self.per_page + self.line
    }

    /// Number of the last page; an empty result still has one (empty) page.
    pub fn last_page(&self, total: usize) -> usize {
        total.div_ceil(self.per_page).max(1)
    }

    /// How many lines the current page shows.
    pub fn page_len(&self, total: usize) -> usize {
        let start = (self.page - 1) * self.per_page;
        total.saturating_sub(start).min(self.per_page)
    }

    /// Back to page 1, line 0.
    pub fn reset(&mut self) {
        self.page = 1;
        self.line = 0;
    }

    /// Place the cursor at an absolute position, clamped to the result.
    pub fn set_cursor(&mut self, position: usize, total: usize) {
        let position = position.min(total.saturating_sub(1));
        self.page = position / self.per_page + 1;
        self.line = position % self.per_page;
    }

    /// Re-fit the cursor after the result changed size.
    pub fn clamp(&mut self, total: usize) {
        self.set_cursor(self.cursor(), total);
    }

    /// Change the page size, keeping the absolute cursor.
    pub fn set_per_page(&mut self, per_page: usize, total: usize) {
        let per_page = per_page.max(1);
        if per_page == self.per_page {
            return;
        }
        let cursor = self.cursor();
        self.per_page = per_page;
        self.set_cursor(cursor, total);
    }

    /// Apply a movement. Returns whether anything moved.
    pub fn apply(&mut self, request: PagingRequest, total: usize) -> bool {
        let before = *self;
        let cursor = self.cursor();
        match request {
            PagingRequest::NextLine => {
                if cursor + 1 < total {
                    self.set_cursor(cursor + 1, total);
                }
            }
            PagingRequest::PrevLine => {
                if cursor > 0 {
                    self.set_cursor(cursor - 1, total);
                }
            }
            PagingRequest::NextPage => {
                if self.page < self.last_page(total) {
                    self.page += 1;
                    self.fit_line(total);
                }
            }
            PagingRequest::PrevPage => {
                if self.page > 1 {
                    self.page -= 1;
                    self.fit_line(total);
                }
            }
            PagingRequest::GotoPage(page) => {
                if (1..=self.last_page(total)).contains(&page) {
                    self.page = page;
                    self.fit_line(total);
                }
            }
        }
        *self != before
    }

    fn fit_line(&mut self, total: usize) {
        self.line = self.line.min(self.page_len(total).saturating_sub(1));
    }
}
