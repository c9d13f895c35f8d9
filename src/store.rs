//! Store Module
//!
//! The driver facade the host database talks to.
//!
//! ## Responsibilities
//! - Single operations (put/get/delete) in short-lived transactions that
//!   never outlive the call
//! - Atomic multi-key writes (batch_put)
//! - Factories for iterators and write batches
//!
//! ## Concurrency Model
//! `Store` is `Send + Sync`; share it behind an `Arc`. The engine runs one
//! write transaction at a time (writers queue in `begin_write`) and any
//! number of readers, each on the snapshot taken when it began. Nothing is
//! retried: every failure goes straight back to the caller.

use std::path::Path;

use crate::batch::{self, Write, WriteBatch};
use crate::config::Config;
use crate::environment::Environment;
use crate::error::Result;
use crate::iterator::KvIterator;
use crate::txn::{self, ReadScope};

/// Storage driver backed by a single redb table
pub struct Store {
    env: Environment,
}

impl Store {
    /// Backend identifier reported by [`Store::name`]
    pub const NAME: &'static str = "redb";

    /// Open or create a store
    pub fn open(config: Config) -> Result<Self> {
        let env = Environment::open(config)?;
        Ok(Self { env })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    /// Not supported; logs and succeeds
    pub fn repair(config: &Config) -> Result<()> {
        Environment::repair(config)
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn path(&self) -> &Path {
        self.env.path()
    }

    /// Effective capacity in bytes
    pub fn capacity(&self) -> u64 {
        self.env.capacity()
    }

    /// Key and value bytes counted against the capacity
    pub fn stored_bytes(&self) -> u64 {
        self.env.stored_bytes()
    }

    /// No-op: the engine reclaims pages on its own
    pub fn compact(&self) {}

    // =========================================================================
    // Single Operations
    // =========================================================================

    /// Put a key-value pair
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.env
            .begin_write()?
            .with_cursor(|cursor| cursor.put(key, value))
    }

    /// Get a value by key
    ///
    /// Returns:
    /// - `Ok(Some(value))`: key found
    /// - `Ok(None)`: key absent (not an error)
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let scope = self.env.begin_read()?;
        let (value, carried) = match scope.get(key) {
            Ok(value) => (value, None),
            Err(err) => (None, Some(err)),
        };
        txn::finish(scope, Ok(()), carried)?;
        Ok(value)
    }

    /// Delete a key; deleting an absent key succeeds
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.env.begin_write()?.with_cursor(|cursor| {
            if cursor.seek_exact(key)?.is_some() {
                cursor.del()?;
            }
            Ok(())
        })
    }

    /// Apply `writes` atomically, in order
    pub fn batch_put(&self, writes: &[Write]) -> Result<()> {
        batch::apply(self.env.begin_write()?, writes)
    }

    // =========================================================================
    // Factories
    // =========================================================================

    /// Unpositioned iterator over a fresh read-only snapshot
    pub fn new_iterator(&self) -> Result<KvIterator> {
        let scope: ReadScope = self.env.begin_read()?;
        match scope.cursor() {
            Ok(cursor) => Ok(KvIterator::new(scope, cursor)),
            Err(err) => Err(txn::abandon(scope, err)),
        }
    }

    pub fn new_write_batch(&self) -> WriteBatch<'_> {
        WriteBatch::new(self)
    }

    /// Close the store, flushing pending commits to stable storage
    pub fn close(self) -> Result<()> {
        self.env.close()
    }

    /// The underlying environment
    pub fn env(&self) -> &Environment {
        &self.env
    }
}
