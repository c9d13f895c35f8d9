//! Write Batch Module
//!
//! In-memory put/delete intents applied atomically in one write
//! transaction.
//!
//! ## Atomicity
//! Entries are applied in insertion order through one cursor. A delete of
//! an absent key is a silent no-op. The first real error stops the walk and
//! is carried into the unified close rule, which aborts the transaction:
//! the prefix already applied is discarded together with the remainder.
//! Only a batch without real errors commits.

use tracing::debug;

use crate::error::Result;
use crate::store::Store;
use crate::txn::WriteScope;

/// One batch entry: `value == None` deletes `key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
}

impl Write {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn is_delete(&self) -> bool {
        self.value.is_none()
    }
}

/// Apply `writes` inside `scope` and terminate it through the close rule
pub(crate) fn apply(scope: WriteScope, writes: &[Write]) -> Result<()> {
    debug!(entries = writes.len(), "applying batch");
    scope.with_cursor(|cursor| {
        for write in writes {
            match &write.value {
                Some(value) => cursor.put(&write.key, value)?,
                None => {
                    if cursor.seek_exact(&write.key)?.is_some() {
                        cursor.del()?;
                    }
                }
            }
        }
        Ok(())
    })
}

/// Accumulates writes until [`WriteBatch::commit`]
///
/// Holds no transaction while accumulating; the write transaction exists
/// only for the duration of `commit`.
pub struct WriteBatch<'a> {
    store: &'a Store,
    writes: Vec<Write>,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Self {
            store,
            writes: Vec::new(),
        }
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.writes.push(Write::put(key, value));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.writes.push(Write::delete(key));
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Apply every pending write atomically. The batch is emptied whether or
    /// not the apply succeeds.
    pub fn commit(&mut self) -> Result<()> {
        let writes = std::mem::take(&mut self.writes);
        self.store.batch_put(&writes)
    }

    /// Discard pending writes
    pub fn rollback(&mut self) -> Result<()> {
        if !self.writes.is_empty() {
            debug!(discarded = self.writes.len(), "rolling back batch");
        }
        self.writes.clear();
        Ok(())
    }

    /// Release the batch; anything not committed is rolled back
    pub fn close(mut self) -> Result<()> {
        self.rollback()
    }
}
