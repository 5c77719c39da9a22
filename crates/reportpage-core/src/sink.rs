//! Output collaborators
//!
//! In direct mode rows go to an [`OutputSink`] one at a time; the sink may
//! refuse a row, which ends the page early. In identifiers mode the page's
//! `(namespace_id, local_name)` pairs go to an [`EntityResolver`] in a single
//! batch.

use crate::model::EmittedRow;
use tracing::debug;

/// Whether the sink took a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Accepted,
    /// The record did not fit; nothing further should be pushed.
    Full,
}

/// Receives emitted rows in direct mode.
pub trait OutputSink {
    fn push(&mut self, row: EmittedRow) -> Fit;
}

/// Identifies a row's subject for entity resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub namespace_id: i32,
    pub local_name: String,
}

/// Turns row identifiers into full entities for the caller.
pub trait EntityResolver {
    /// # Errors
    ///
    /// Returns a message describing why the batch could not be resolved.
    fn resolve(&mut self, refs: Vec<EntityRef>) -> Result<(), String>;
}

/// Buffers emitted rows, optionally under a serialized-size budget.
#[derive(Debug, Default)]
pub struct PageBuffer {
    rows: Vec<EmittedRow>,
    max_bytes: Option<usize>,
    used_bytes: usize,
}

impl PageBuffer {
    /// Unbounded buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer refusing any row that would push the JSON size past `max_bytes`.
    pub fn with_byte_budget(max_bytes: usize) -> Self {
        Self {
            max_bytes: Some(max_bytes),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[EmittedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<EmittedRow> {
        self.rows
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }
}

impl OutputSink for PageBuffer {
    fn push(&mut self, row: EmittedRow) -> Fit {
        if let Some(max) = self.max_bytes {
            // Rows that fail to serialize count as oversized.
            let size = serde_json::to_vec(&row).map_or(usize::MAX, |bytes| bytes.len());
            if self.used_bytes.saturating_add(size) > max {
                debug!(used = self.used_bytes, size, max, "page buffer full");
                return Fit::Full;
            }
            self.used_bytes += size;
        }
        self.rows.push(row);
        Fit::Accepted
    }
}

/// Keeps the forwarded identifiers.
#[derive(Debug, Default)]
pub struct CollectingResolver {
    pub batches: Vec<Vec<EntityRef>>,
}

impl CollectingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All forwarded identifiers across batches, in order.
    pub fn refs(&self) -> impl Iterator<Item = &EntityRef> {
        self.batches.iter().flatten()
    }
}

impl EntityResolver for CollectingResolver {
    fn resolve(&mut self, refs: Vec<EntityRef>) -> Result<(), String> {
        self.batches.push(refs);
        Ok(())
    }
}
