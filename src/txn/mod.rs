//! Transaction Module
//!
//! Bounded-lifetime wrappers around one engine transaction.
//!
//! ## Responsibilities
//! - Begin read-only and read-write transactions against the single table
//! - Hand out cursors bound to exactly one transaction
//! - Terminate every transaction with exactly one commit or abort
//!
//! ## Lifecycle
//! ```text
//!   begin ──► ReadScope / WriteScope ──► cursor ──► ops ──► cursor.close()
//!                                                               │
//!                         ┌─────────────────────────────────────┘
//!                         ▼
//!                 CloseDecision::resolve(cursor result, carried error)
//!                         │
//!            ┌────────────┴────────────┐
//!            ▼                         ▼
//!      Abort(error)                 Commit
//! ```
//!
//! Scopes are owned and not `Clone`. `commit` and `abort` consume them, so a
//! second terminal action cannot be written.

mod cursor;

pub use cursor::{Cursor, Entry, ReadCursor, WriteCursor};

use std::sync::Arc;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use redb::{Database, Durability, ReadTransaction, TableDefinition, WriteTransaction};
use tracing::{debug, warn};

use crate::error::{KvError, Result};

use cursor::Quota;

/// Raw byte slices are both the key and the value type of the table
pub(crate) type Raw = &'static [u8];

// =============================================================================
// Table Handle
// =============================================================================

/// Capability for the single table, owned by the environment and attached
/// to every scope it begins
#[derive(Debug, Clone, Copy)]
pub struct TableHandle {
    name: &'static str,
}

impl TableHandle {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn definition(&self) -> TableDefinition<'static, Raw, Raw> {
        TableDefinition::new(self.name)
    }
}

// =============================================================================
// Scopes
// =============================================================================

/// Transaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ReadOnly,
    ReadWrite,
}

/// An open transaction whose only valid terminal actions are one commit or
/// one abort
pub trait Scope: Sized {
    fn mode(&self) -> Mode;

    /// Make the transaction's effects durable (or just release it, for reads)
    fn commit(self) -> Result<()>;

    /// Discard the transaction's effects
    fn abort(self) -> Result<()>;
}

/// Read-only transaction pinned to the snapshot taken when it began
pub struct ReadScope {
    txn: ReadTransaction,
    table: TableHandle,
}

impl ReadScope {
    pub(crate) fn begin(db: &Database, table: TableHandle) -> Result<Self> {
        let txn = db.begin_read().map_err(KvError::transaction)?;
        Ok(Self { txn, table })
    }

    /// Direct keyed lookup, no cursor. Absent keys are `Ok(None)`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let table = self
            .txn
            .open_table(self.table.definition())
            .map_err(KvError::operation)?;
        let value = table
            .get(key)
            .map_err(KvError::operation)?
            .map(|guard| guard.value().to_vec());
        Ok(value)
    }

    pub fn cursor(&self) -> Result<ReadCursor> {
        let table = self
            .txn
            .open_table(self.table.definition())
            .map_err(KvError::operation)?;
        Ok(Cursor::new(table, Quota::unbounded()))
    }
}

impl Scope for ReadScope {
    fn mode(&self) -> Mode {
        Mode::ReadOnly
    }

    // A read transaction has nothing to persist; ending it releases the
    // snapshot either way.
    fn commit(self) -> Result<()> {
        drop(self.txn);
        Ok(())
    }

    fn abort(self) -> Result<()> {
        drop(self.txn);
        Ok(())
    }
}

/// Read-write transaction. The engine admits one at a time.
///
/// The scope also holds the environment's stored-bytes counter for its
/// whole lifetime, so the counter only ever changes on commit.
pub struct WriteScope {
    txn: WriteTransaction,
    table: TableHandle,
    capacity: u64,
    usage: ArcMutexGuard<RawMutex, u64>,
    /// Counter value to publish if the transaction commits
    pending_usage: Option<u64>,
}

impl WriteScope {
    pub(crate) fn begin(
        db: &Database,
        table: TableHandle,
        capacity: u64,
        durability: Durability,
        usage: &Arc<Mutex<u64>>,
    ) -> Result<Self> {
        let mut txn = db.begin_write().map_err(KvError::transaction)?;
        txn.set_durability(durability);
        Ok(Self {
            txn,
            table,
            capacity,
            usage: usage.lock_arc(),
            pending_usage: None,
        })
    }

    /// Open a cursor that borrows this scope; it must be closed before the
    /// scope can be terminated.
    pub fn cursor(&self) -> Result<WriteCursor<'_>> {
        let table = self
            .txn
            .open_table(self.table.definition())
            .map_err(KvError::operation)?;
        Ok(Cursor::new(table, Quota::new(self.capacity, *self.usage)))
    }

    /// Run `op` against a fresh cursor, then close the cursor and terminate
    /// the transaction through the unified close rule.
    ///
    /// The first error `op` returns is the carried error. A cursor that
    /// cannot be opened counts as a cursor failure.
    pub fn with_cursor<F>(mut self, op: F) -> Result<()>
    where
        F: FnOnce(&mut WriteCursor<'_>) -> Result<()>,
    {
        let (cursor_closed, carried, stored) = match self.cursor() {
            Ok(mut cursor) => {
                let carried = op(&mut cursor).err();
                let stored = cursor.stored_bytes();
                (cursor.close(), carried, Some(stored))
            }
            Err(err) => (Err(err), None, None),
        };
        self.pending_usage = stored;
        finish(self, cursor_closed, carried)
    }
}

impl Scope for WriteScope {
    fn mode(&self) -> Mode {
        Mode::ReadWrite
    }

    fn commit(mut self) -> Result<()> {
        self.txn.commit().map_err(KvError::transaction)?;
        if let Some(stored) = self.pending_usage {
            *self.usage = stored;
        }
        Ok(())
    }

    fn abort(self) -> Result<()> {
        self.txn.abort().map_err(KvError::transaction)
    }
}

// =============================================================================
// Unified Close Rule
// =============================================================================

/// Outcome of closing a cursor-bearing transaction
#[derive(Debug)]
pub enum CloseDecision {
    Commit,
    Abort(KvError),
}

impl CloseDecision {
    /// Priority: cursor-close failure, then carried error, then commit.
    pub fn resolve(cursor_closed: Result<()>, carried: Option<KvError>) -> Self {
        match (cursor_closed, carried) {
            (Err(err), _) => Self::Abort(err),
            (Ok(()), Some(err)) => Self::Abort(err),
            (Ok(()), None) => Self::Commit,
        }
    }
}

/// Terminate `scope` according to [`CloseDecision::resolve`].
///
/// On abort the decisive error is returned; a failing abort is logged and
/// does not replace it.
pub fn finish<S: Scope>(scope: S, cursor_closed: Result<()>, carried: Option<KvError>) -> Result<()> {
    let mode = scope.mode();
    match CloseDecision::resolve(cursor_closed, carried) {
        CloseDecision::Commit => {
            debug!(?mode, "committing transaction");
            scope.commit()
        }
        CloseDecision::Abort(err) => {
            debug!(?mode, error = %err, "aborting transaction");
            Err(abandon(scope, err))
        }
    }
}

/// Abort `scope` because of `err` and hand `err` back.
pub(crate) fn abandon<S: Scope>(scope: S, err: KvError) -> KvError {
    let mode = scope.mode();
    if let Err(abort_err) = scope.abort() {
        warn!(?mode, error = %abort_err, "abort failed");
    }
    err
}
