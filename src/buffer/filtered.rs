//! Index-remapping projections used for paging.

use crate::buffer::memory::MemoryBuffer;
use crate::buffer::record::Match;
use crate::error::{LinepickError, Result};

/// Anything that can hand out lines by position.
pub trait LineSource {
    /// Number of lines available.
    fn size(&self) -> usize;

    /// The line at position `index`, or an error when out of range.
    fn line_at(&self, index: usize) -> Result<Match>;
}

impl LineSource for MemoryBuffer {
    fn size(&self) -> usize {
        self.len()
    }

    fn line_at(&self, index: usize) -> Result<Match> {
        self.record_at(index).map(Match::plain)
    }
}

impl LineSource for [Match] {
    fn size(&self) -> usize {
        self.len()
    }

    fn line_at(&self, index: usize) -> Result<Match> {
        self.get(index).cloned().ok_or(LinepickError::OutOfRange {
            index,
            size: self.len(),
        })
    }
}

/// A read-only window over another line source.
///
/// Position `i` of the view maps to `indices[i]` of the source, so a view can sit on
/// top of a buffer, a match list or another view.
#[derive(Debug)]
pub struct FilteredView<'a, S: LineSource + ?Sized> {
    src: &'a S,
    indices: Vec<usize>,
}

impl<'a, S: LineSource + ?Sized> FilteredView<'a, S> {
    /// A view over explicit source positions. Positions past the end of the source
    /// are dropped.
    pub fn new(src: &'a S, indices: Vec<usize>) -> Self {
        let size = src.size();
        let indices = indices.into_iter().filter(|&i| i < size).collect();
        Self { src, indices }
    }

    /// The lines of 1-based page `page` when the source is split into pages of
    /// `per_page` lines. A page past the end yields an empty view.
    pub fn page(src: &'a S, page: usize, per_page: usize) -> Self {
        let size = src.size();
        let start = per_page.saturating_mul(page.saturating_sub(1));
        let indices = if page == 0 || start >= size {
            Vec::new()
        } else {
            (start..size.min(start + per_page)).collect()
        };
        Self { src, indices }
    }

    /// Translate a view position to the backing source position.
    pub fn backing_index(&self, index: usize) -> Result<usize> {
        self.indices
            .get(index)
            .copied()
            .ok_or(LinepickError::OutOfRange {
                index,
                size: self.indices.len(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Every line of the view in order, skipping any the source can no longer produce.
    pub fn lines(&self) -> Vec<Match> {
        self.indices
            .iter()
            .filter_map(|&i| self.src.line_at(i).ok())
            .collect()
    }
}

impl<S: LineSource + ?Sized> LineSource for FilteredView<'_, S> {
    fn size(&self) -> usize {
        self.indices.len()
    }

    fn line_at(&self, index: usize) -> Result<Match> {
        self.src.line_at(self.backing_index(index)?)
    }
}
