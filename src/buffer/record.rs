//! Single ingested lines and their matched form.

use bstr::ByteSlice;
use std::sync::Arc;

/// Byte separating the display half of a record from its output half.
pub const FIELD_SEPARATOR: u8 = b'\0';

const ESCAPE: u8 = 0x1b;

/// Highlight region `[start, end)` as byte offsets into a record's display text.
pub type Span = (usize, usize);

/// One ingested line.
///
/// The raw bytes are kept exactly as read (minus the line terminator) so the final
/// output reproduces the input. Matching and drawing only ever look at the cached
/// display text, which has terminal escape sequences removed and, when separator
/// mode is on, covers only the part before the separator.
#[derive(Debug, PartialEq, Eq)]
pub struct Record {
    index: usize,
    raw: Vec<u8>,
    separator: Option<usize>,
    display: String,
}

impl Record {
    /// Build a record from raw line bytes. `index` is its permanent buffer position.
    pub fn new(index: usize, raw: Vec<u8>, null_separated: bool) -> Self {
        let separator = if null_separated {
            memchr::memrchr(FIELD_SEPARATOR, &raw)
        } else {
            None
        };

        let display_bytes = match separator {
            Some(at) => &raw[..at],
            None => &raw[..],
        };
        let display = if memchr::memchr(ESCAPE, display_bytes).is_some() {
            strip_ansi_escapes::strip(display_bytes)
                .to_str_lossy()
                .into_owned()
        } else {
            display_bytes.to_str_lossy().into_owned()
        };

        Self {
            index,
            raw,
            separator,
            display,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The bytes as read from the input stream.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Text used for matching, highlighting and drawing.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The value emitted when this record is picked: everything after the separator,
    /// or the whole raw line when there is none.
    pub fn output(&self) -> &[u8] {
        match self.separator {
            Some(at) => &self.raw[at + 1..],
            None => &self.raw,
        }
    }
}

/// A record as seen through one filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    record: Arc<Record>,
    spans: Vec<Span>,
}

impl Match {
    pub fn new(record: Arc<Record>, spans: Vec<Span>) -> Self {
        Self { record, spans }
    }

    /// A match with no highlighted regions (empty query, custom matchers).
    pub fn plain(record: Arc<Record>) -> Self {
        Self {
            record,
            spans: Vec::new(),
        }
    }

    pub fn record(&self) -> &Arc<Record> {
        &self.record
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Buffer index of the underlying record.
    pub fn index(&self) -> usize {
        self.record.index()
    }

    pub fn display(&self) -> &str {
        self.record.display()
    }
}

/// Sort spans and fold overlapping or touching ones together.
pub fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.retain(|(start, end)| start < end);
    spans.sort_unstable();

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
