//! Driver Contract
//!
//! The traits a host database programs against. A backend provides a
//! store, an iterator and a write batch; [`Store`], [`KvIterator`] and
//! [`WriteBatch`] are the redb implementation.

use std::path::Path;

use crate::batch::{Write, WriteBatch};
use crate::config::Config;
use crate::error::{KvError, Result};
use crate::iterator::KvIterator;
use crate::store::Store;

/// A storage backend
pub trait Driver: Sized + Send + Sync {
    type Iterator: DriverIterator;
    type WriteBatch<'a>: DriverWriteBatch
    where
        Self: 'a;

    fn open(config: Config) -> Result<Self>;
    fn repair(config: &Config) -> Result<()>;

    /// Fixed backend identifier
    fn name(&self) -> &'static str;
    fn path(&self) -> &Path;
    fn close(self) -> Result<()>;
    fn compact(&self);

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    fn delete(&self, key: &[u8]) -> Result<()>;
    fn batch_put(&self, writes: &[Write]) -> Result<()>;

    fn new_iterator(&self) -> Result<Self::Iterator>;
    fn new_write_batch(&self) -> Self::WriteBatch<'_>;
}

/// Ordered cursor over a backend snapshot
pub trait DriverIterator {
    fn key(&self) -> Option<&[u8]>;
    fn value(&self) -> Option<&[u8]>;
    fn valid(&self) -> bool;
    fn error(&self) -> Option<&KvError>;

    fn seek(&mut self, key: &[u8]);
    fn next(&mut self);
    fn prev(&mut self);
    fn first(&mut self);
    fn last(&mut self);

    fn close(self) -> Result<()>;
}

/// Pending writes applied atomically on commit
pub trait DriverWriteBatch {
    fn put(&mut self, key: &[u8], value: &[u8]);
    fn delete(&mut self, key: &[u8]);
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
    fn close(self) -> Result<()>;
}

// =============================================================================
// redb implementation
// =============================================================================

impl Driver for Store {
    type Iterator = KvIterator;
    type WriteBatch<'a> = WriteBatch<'a>;

    fn open(config: Config) -> Result<Self> {
        Store::open(config)
    }

    fn repair(config: &Config) -> Result<()> {
        Store::repair(config)
    }

    fn name(&self) -> &'static str {
        Store::name(self)
    }

    fn path(&self) -> &Path {
        Store::path(self)
    }

    fn close(self) -> Result<()> {
        Store::close(self)
    }

    fn compact(&self) {
        Store::compact(self)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        Store::put(self, key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Store::get(self, key)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        Store::delete(self, key)
    }

    fn batch_put(&self, writes: &[Write]) -> Result<()> {
        Store::batch_put(self, writes)
    }

    fn new_iterator(&self) -> Result<KvIterator> {
        Store::new_iterator(self)
    }

    fn new_write_batch(&self) -> WriteBatch<'_> {
        Store::new_write_batch(self)
    }
}

impl DriverIterator for KvIterator {
    fn key(&self) -> Option<&[u8]> {
        KvIterator::key(self)
    }

    fn value(&self) -> Option<&[u8]> {
        KvIterator::value(self)
    }

    fn valid(&self) -> bool {
        KvIterator::valid(self)
    }

    fn error(&self) -> Option<&KvError> {
        KvIterator::error(self)
    }

    fn seek(&mut self, key: &[u8]) {
        KvIterator::seek(self, key)
    }

    fn next(&mut self) {
        KvIterator::next(self)
    }

    fn prev(&mut self) {
        KvIterator::prev(self)
    }

    fn first(&mut self) {
        KvIterator::first(self)
    }

    fn last(&mut self) {
        KvIterator::last(self)
    }

    fn close(self) -> Result<()> {
        KvIterator::close(self)
    }
}

impl DriverWriteBatch for WriteBatch<'_> {
    fn put(&mut self, key: &[u8], value: &[u8]) {
        WriteBatch::put(self, key, value)
    }

    fn delete(&mut self, key: &[u8]) {
        WriteBatch::delete(self, key)
    }

    fn commit(&mut self) -> Result<()> {
        WriteBatch::commit(self)
    }

    fn rollback(&mut self) -> Result<()> {
        WriteBatch::rollback(self)
    }

    fn close(self) -> Result<()> {
        WriteBatch::close(self)
    }
}
