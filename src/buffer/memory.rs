//! Append-only in-memory record store.
//!
//! One ingestion task appends while any number of filter and view passes read. The
//! records vector sits behind a `parking_lot::RwLock`; readers either look up a
//! single record or take a cheap snapshot of `Arc`s and release the lock before
//! doing any real work.

use crate::buffer::record::Record;
use crate::error::{LinepickError, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Ordered store of every record read so far.
#[derive(Debug)]
pub struct MemoryBuffer {
    records: RwLock<Vec<Arc<Record>>>,
    null_separated: bool,
    done: CancellationToken,
}

impl MemoryBuffer {
    pub fn new(null_separated: bool) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            null_separated,
            done: CancellationToken::new(),
        }
    }

    /// Build a completed buffer from in-memory lines (tests, benchmarks, one-shot use).
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let buffer = Self::new(false);
        {
            let mut records = buffer.records.write();
            for line in lines {
                let index = records.len();
                records.push(Arc::new(Record::new(index, line.as_ref().to_vec(), false)));
            }
        }
        buffer.mark_done();
        buffer
    }

    /// Append one line, assigning it the next index.
    ///
    /// Fails once the buffer has been marked done; a completed buffer never changes.
    pub fn append(&self, raw: Vec<u8>) -> Result<Arc<Record>> {
        if self.is_done() {
            return Err(LinepickError::other("buffer is complete; append refused"));
        }
        let mut records = self.records.write();
        let record = Arc::new(Record::new(records.len(), raw, self.null_separated));
        records.push(Arc::clone(&record));
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a record by its buffer index.
    pub fn record_at(&self, index: usize) -> Result<Arc<Record>> {
        let records = self.records.read();
        if records.is_empty() {
            return Err(LinepickError::EmptyBuffer);
        }
        records
            .get(index)
            .cloned()
            .ok_or(LinepickError::OutOfRange {
                index,
                size: records.len(),
            })
    }

    /// Copy out the current record handles so a pass can run without holding the lock.
    pub fn snapshot(&self) -> Vec<Arc<Record>> {
        self.records.read().clone()
    }

    /// Signal that no more records will arrive. Idempotent.
    pub fn mark_done(&self) {
        self.done.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Wait until ingestion has finished (normally or not).
    pub async fn wait_done(&self) {
        self.done.cancelled().await;
    }
}
