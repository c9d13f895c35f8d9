//! Environment Module
//!
//! Owns the engine handle, the single table, and the configuration.
//!
//! ## Responsibilities
//! - Create the storage directory and the engine file on open
//! - Create the table inside one bootstrap transaction
//! - Begin read and write scopes with the table handle attached
//! - Flush and release the engine on close

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use redb::{Database, Durability, ReadableTableMetadata};
use tracing::{debug, info, warn};

use crate::config::{Config, SyncMode};
use crate::error::{KvError, Result};
use crate::txn::{ReadScope, TableHandle, WriteScope};

/// Engine handle plus the one table every transaction works on
pub struct Environment {
    db: Database,
    table: TableHandle,
    config: Config,
    data_file: PathBuf,

    /// Key and value bytes held by the table as of the last commit.
    /// Locked by the active write scope for its whole lifetime.
    usage: Arc<Mutex<u64>>,
}

impl Environment {
    // =========================================================================
    // Internal Constants
    // =========================================================================
    const DATA_FILENAME: &'static str = "data.redb";
    const TABLE_NAME: &'static str = "kv";

    /// Open or create the environment described by `config`
    ///
    /// On startup:
    /// 1. Validate the config (resolves default capacity)
    /// 2. Create the storage directory if absent
    /// 3. Open/create the engine file
    /// 4. Create the table in one bootstrap transaction, measure what it
    ///    already holds, and commit
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Validate
        let config = config.validate()?;

        // Step 2: Storage directory
        fs::create_dir_all(&config.path)
            .map_err(|e| KvError::open(&format!("create {}", config.path.display()), e))?;

        // Step 3: Engine file
        let data_file = config.path.join(Self::DATA_FILENAME);
        let mut builder = Database::builder();
        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }
        let db = builder
            .create(&data_file)
            .map_err(|e| KvError::open("open engine", e))?;

        // Step 4: Bootstrap the table
        let table = TableHandle::new(Self::TABLE_NAME);
        let txn = db
            .begin_write()
            .map_err(|e| KvError::open("begin bootstrap transaction", e))?;
        let stored = txn
            .open_table(table.definition())
            .map_err(|e| KvError::open("create table", e))?
            .stats()
            .map_err(|e| KvError::open("measure table", e))?
            .stored_bytes();
        txn.commit()
            .map_err(|e| KvError::open("commit bootstrap transaction", e))?;

        info!(
            path = %config.path.display(),
            capacity = config.capacity,
            stored,
            sync = ?config.sync,
            "environment opened"
        );

        Ok(Self {
            db,
            table,
            config,
            data_file,
            usage: Arc::new(Mutex::new(stored)),
        })
    }

    /// Repair is not supported: the engine recovers to its last committed
    /// state on its own. Always succeeds without touching the store.
    pub fn repair(config: &Config) -> Result<()> {
        warn!(path = %config.path.display(), "redb store does not support repair");
        Ok(())
    }

    /// Begin a read-only scope on the current snapshot
    pub fn begin_read(&self) -> Result<ReadScope> {
        ReadScope::begin(&self.db, self.table)
    }

    /// Begin a read-write scope (blocks while another writer is active)
    pub fn begin_write(&self) -> Result<WriteScope> {
        WriteScope::begin(
            &self.db,
            self.table,
            self.config.capacity,
            self.durability(),
            &self.usage,
        )
    }

    /// Close the environment
    ///
    /// Releases the table handle, forces one immediate commit so earlier
    /// eventual commits reach stable storage, then drops the engine.
    /// Consumes `self`: there is no second close.
    pub fn close(self) -> Result<()> {
        let Self { db, table, config, .. } = self;
        debug!(table = table.name(), "releasing table handle");

        let mut txn = db.begin_write().map_err(KvError::transaction)?;
        txn.set_durability(Durability::Immediate);
        txn.commit().map_err(KvError::transaction)?;

        drop(db);
        info!(path = %config.path.display(), "environment closed");
        Ok(())
    }

    fn durability(&self) -> Durability {
        match self.config.sync {
            SyncMode::Async => Durability::Eventual,
            SyncMode::Sync => Durability::Immediate,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Storage directory
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Engine file inside the storage directory
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Effective capacity in bytes (default applied)
    pub fn capacity(&self) -> u64 {
        self.config.capacity
    }

    /// Key and value bytes stored as of the last commit. Blocks while a
    /// write is in progress.
    pub fn stored_bytes(&self) -> u64 {
        *self.usage.lock()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
