//! Cursor
//!
//! An ordered position within the table, bound to one transaction.
//!
//! The engine exposes ordered ranges rather than a stateful cursor, so the
//! cursor remembers where it stands and every move is one bounded range
//! lookup from that position. A miss (`Ok(None)`) is the engine's
//! "not found"; it is never turned into an error here.

use std::ops::Bound;

use redb::{AccessGuard, ReadOnlyTable, ReadableTable, Table};
use tracing::trace;

use crate::error::{KvError, Result};

use super::Raw;

/// A key/value pair copied out of the engine
pub type Entry = (Vec<u8>, Vec<u8>);

/// Cursor over a read-only snapshot; owns its table handle
pub type ReadCursor = Cursor<ReadOnlyTable<Raw, Raw>>;

/// Cursor inside a write transaction; borrows the transaction
pub type WriteCursor<'txn> = Cursor<Table<'txn, Raw, Raw>>;

/// Where the cursor stands between moves
#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    /// Never positioned, or the last exact seek missed
    Unset,
    At(Vec<u8>),
    /// Ran off the front; `next` resumes at the first key
    BeforeFirst,
    /// Ran off the back; `prev` resumes at the last key
    AfterLast,
}

/// Ordered position in the table
pub struct Cursor<T> {
    table: T,
    position: Position,
    quota: Quota,
}

impl<T> Cursor<T> {
    pub(super) fn new(table: T, quota: Quota) -> Self {
        Self {
            table,
            position: Position::Unset,
            quota,
        }
    }

    /// Release the table handle. Consuming the cursor ends its borrow of
    /// the transaction.
    pub fn close(self) -> Result<()> {
        trace!(position = ?self.position, "closing cursor");
        drop(self.table);
        Ok(())
    }

    /// Key and value bytes the table holds as seen by this cursor
    pub(super) fn stored_bytes(&self) -> u64 {
        self.quota.used
    }

    fn settle(&mut self, found: Option<Entry>, miss: Position) -> Option<Entry> {
        self.position = match &found {
            Some((key, _)) => Position::At(key.clone()),
            None => miss,
        };
        found
    }
}

impl<T: ReadableTable<Raw, Raw>> Cursor<T> {
    pub fn first(&mut self) -> Result<Option<Entry>> {
        let found = first_of(&self.table)?;
        Ok(self.settle(found, Position::Unset))
    }

    pub fn last(&mut self) -> Result<Option<Entry>> {
        let found = last_of(&self.table)?;
        Ok(self.settle(found, Position::Unset))
    }

    /// Position at the smallest key >= `key`
    pub fn seek(&mut self, key: &[u8]) -> Result<Option<Entry>> {
        let found = scan_forward(&self.table, Bound::Included(key))?;
        Ok(self.settle(found, Position::AfterLast))
    }

    /// Position at exactly `key`
    pub fn seek_exact(&mut self, key: &[u8]) -> Result<Option<Entry>> {
        let found = self
            .table
            .get(key)
            .map_err(KvError::operation)?
            .map(|value| (key.to_vec(), value.value().to_vec()));
        Ok(self.settle(found, Position::Unset))
    }

    pub fn next(&mut self) -> Result<Option<Entry>> {
        let found = match &self.position {
            Position::Unset | Position::BeforeFirst => first_of(&self.table)?,
            Position::At(key) => scan_forward(&self.table, Bound::Excluded(key.as_slice()))?,
            Position::AfterLast => None,
        };
        Ok(self.settle(found, Position::AfterLast))
    }

    pub fn prev(&mut self) -> Result<Option<Entry>> {
        let found = match &self.position {
            Position::Unset | Position::AfterLast => last_of(&self.table)?,
            Position::At(key) => scan_backward(&self.table, Bound::Excluded(key.as_slice()))?,
            Position::BeforeFirst => None,
        };
        Ok(self.settle(found, Position::BeforeFirst))
    }

    /// Re-read the entry under the cursor. `None` if unpositioned or if the
    /// entry was deleted through this cursor.
    pub fn current(&self) -> Result<Option<Entry>> {
        let Position::At(key) = &self.position else {
            return Ok(None);
        };
        let found = self
            .table
            .get(key.as_slice())
            .map_err(KvError::operation)?
            .map(|value| (key.clone(), value.value().to_vec()));
        Ok(found)
    }
}

impl<'txn> Cursor<Table<'txn, Raw, Raw>> {
    /// Write `key`/`value` and leave the cursor on `key`
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let replaced = self
            .table
            .get(key)
            .map_err(KvError::operation)?
            .map(|old| (key.len() + old.value().len()) as u64)
            .unwrap_or(0);

        self.quota.charge((key.len() + value.len()) as u64, replaced)?;

        self.table.insert(key, value).map_err(KvError::operation)?;
        self.position = Position::At(key.to_vec());
        Ok(())
    }

    /// Delete the entry under the cursor. The cursor keeps its place, so
    /// `next`/`prev` continue from the deleted key.
    pub fn del(&mut self) -> Result<()> {
        let Position::At(key) = &self.position else {
            return Err(KvError::Operation("cursor is not positioned".to_string()));
        };

        let removed = self
            .table
            .remove(key.as_slice())
            .map_err(KvError::operation)?
            .map(|old| (key.len() + old.value().len()) as u64);

        if let Some(bytes) = removed {
            self.quota.release(bytes);
        }
        Ok(())
    }
}

// =============================================================================
// Range Lookups
// =============================================================================

fn to_entry((key, value): (AccessGuard<'_, Raw>, AccessGuard<'_, Raw>)) -> Entry {
    (key.value().to_vec(), value.value().to_vec())
}

fn first_of<T: ReadableTable<Raw, Raw>>(table: &T) -> Result<Option<Entry>> {
    Ok(table.first().map_err(KvError::operation)?.map(to_entry))
}

fn last_of<T: ReadableTable<Raw, Raw>>(table: &T) -> Result<Option<Entry>> {
    Ok(table.last().map_err(KvError::operation)?.map(to_entry))
}

fn scan_forward<T: ReadableTable<Raw, Raw>>(table: &T, from: Bound<&[u8]>) -> Result<Option<Entry>> {
    let mut range = table
        .range::<&[u8]>((from, Bound::Unbounded))
        .map_err(KvError::operation)?;
    let found = range.next().transpose().map_err(KvError::operation)?;
    Ok(found.map(to_entry))
}

fn scan_backward<T: ReadableTable<Raw, Raw>>(table: &T, to: Bound<&[u8]>) -> Result<Option<Entry>> {
    let mut range = table
        .range::<&[u8]>((Bound::Unbounded, to))
        .map_err(KvError::operation)?;
    let found = range.next_back().transpose().map_err(KvError::operation)?;
    Ok(found.map(to_entry))
}

// =============================================================================
// Capacity Accounting
// =============================================================================

/// Running count of key and value bytes stored in the table, checked
/// against the configured capacity on every put
pub(crate) struct Quota {
    capacity: u64,
    used: u64,
}

impl Quota {
    pub(crate) fn new(capacity: u64, used: u64) -> Self {
        Self { capacity, used }
    }

    pub(crate) fn unbounded() -> Self {
        Self::new(u64::MAX, 0)
    }

    fn charge(&mut self, added: u64, released: u64) -> Result<()> {
        let requested = self.used.saturating_add(added).saturating_sub(released);
        if requested > self.capacity {
            return Err(KvError::CapacityExceeded {
                requested,
                capacity: self.capacity,
            });
        }

        self.used = requested;
        Ok(())
    }

    fn release(&mut self, bytes: u64) {
        self.used = self.used.saturating_sub(bytes);
    }
}
