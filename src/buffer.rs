//! Record storage.
//!
//! Records are ingested once into an append-only [`MemoryBuffer`] and never change
//! afterwards. Filter passes produce [`Match`] values that pair a shared record with
//! query-dependent highlight spans, and paging projects any line source through a
//! [`FilteredView`] without copying records.

pub mod filtered;
pub mod memory;
pub mod record;

pub use filtered::{FilteredView, LineSource};
pub use memory::MemoryBuffer;
pub use record::{merge_spans, Match, Record, Span};
