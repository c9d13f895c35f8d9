//! Iterator Module
//!
//! Caller-facing ordered traversal over one read-only snapshot.
//!
//! ## State machine
//! ```text
//!                 first/last/seek/next/prev
//!   Unpositioned ──────────────────────────┐
//!                                          ▼
//!        ┌────────── Ok(Some) ─────────► At(key, value)
//!        │                                  │
//!   any move ─── Ok(None) (not found) ──► Exhausted
//!        │
//!        └────────── Err ──────────────► Failed(error)   (sticky)
//! ```
//!
//! `valid()` and `error()` are derived from the state. Once an error has
//! been recorded further moves are ignored, so the error that ends up in
//! the close rule is the first real one.

use tracing::warn;

use crate::error::{KvError, Result};
use crate::txn::{self, Entry, ReadCursor, ReadScope};

#[derive(Debug)]
enum State {
    Unpositioned,
    At(Entry),
    Exhausted,
    Failed(KvError),
}

impl State {
    /// Fold the result of one positioning call into the next state
    fn from_step(step: Result<Option<Entry>>) -> Self {
        match step {
            Ok(Some(entry)) => State::At(entry),
            Ok(None) => State::Exhausted,
            Err(err) => State::Failed(err),
        }
    }
}

/// The scope and cursor an iterator holds until it is closed
struct OpenCursor {
    cursor: ReadCursor,
    scope: ReadScope,
}

/// Ordered iterator over a read-only snapshot of the table
///
/// Holds one read transaction from creation until [`KvIterator::close`].
/// Readers never block the writer, but an iterator kept open pins its
/// snapshot, so callers should close it promptly.
pub struct KvIterator {
    open: Option<OpenCursor>,
    state: State,
}

impl KvIterator {
    pub(crate) fn new(scope: ReadScope, cursor: ReadCursor) -> Self {
        Self {
            open: Some(OpenCursor { cursor, scope }),
            state: State::Unpositioned,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Key under the iterator, if positioned
    pub fn key(&self) -> Option<&[u8]> {
        match &self.state {
            State::At((key, _)) => Some(key.as_slice()),
            _ => None,
        }
    }

    /// Value under the iterator, if positioned
    pub fn value(&self) -> Option<&[u8]> {
        match &self.state {
            State::At((_, value)) => Some(value.as_slice()),
            _ => None,
        }
    }

    pub fn valid(&self) -> bool {
        matches!(self.state, State::At(_))
    }

    /// The error that invalidated the iterator, as opposed to plain
    /// exhaustion
    pub fn error(&self) -> Option<&KvError> {
        match &self.state {
            State::Failed(err) => Some(err),
            _ => None,
        }
    }

    // =========================================================================
    // Positioning
    // =========================================================================

    pub fn first(&mut self) {
        self.step(|cursor| cursor.first());
    }

    pub fn last(&mut self) {
        self.step(|cursor| cursor.last());
    }

    /// Position at the smallest key >= `key`
    pub fn seek(&mut self, key: &[u8]) {
        self.step(|cursor| cursor.seek(key));
    }

    pub fn next(&mut self) {
        self.step(|cursor| cursor.next());
    }

    pub fn prev(&mut self) {
        self.step(|cursor| cursor.prev());
    }

    fn step<F>(&mut self, op: F)
    where
        F: FnOnce(&mut ReadCursor) -> Result<Option<Entry>>,
    {
        if let State::Failed(_) = self.state {
            return;
        }
        if let Some(open) = self.open.as_mut() {
            self.state = State::from_step(op(&mut open.cursor));
        }
    }

    /// Close the cursor and end the read transaction through the unified
    /// close rule. Returns the recorded error, if any.
    pub fn close(mut self) -> Result<()> {
        let Some(OpenCursor { cursor, scope }) = self.open.take() else {
            return Ok(());
        };
        let carried = match std::mem::replace(&mut self.state, State::Exhausted) {
            State::Failed(err) => Some(err),
            _ => None,
        };
        txn::finish(scope, cursor.close(), carried)
    }
}

impl Drop for KvIterator {
    fn drop(&mut self) {
        if self.open.is_some() {
            warn!("iterator dropped without close; releasing its read transaction");
        }
    }
}
