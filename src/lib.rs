//! # kvdriver
//!
//! A storage driver that puts an embedded, transactional, ordered key-value
//! engine (redb) behind the generic driver contract of a host database:
//! - One table, raw byte keys ordered bytewise
//! - Every operation runs in exactly one transaction that ends in exactly
//!   one commit or abort
//! - Absent keys are `None`, never errors
//! - Atomic write batches: any real error discards the whole batch
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Host database (driver contract)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Store                                │
//! │   put / get / delete / batch_put / new_iterator / batch     │
//! └──────────┬──────────────────┬───────────────────┬───────────┘
//!            │                  │                   │
//!            ▼                  ▼                   ▼
//!   ┌────────────────┐  ┌──────────────┐   ┌────────────────┐
//!   │   KvIterator   │  │  WriteBatch  │   │ single ops     │
//!   └───────┬────────┘  └──────┬───────┘   └───────┬────────┘
//!           └──────────────────┼───────────────────┘
//!                              ▼
//!                ┌───────────────────────────┐
//!                │ ReadScope / WriteScope    │
//!                │   + Cursor, close rule    │
//!                └─────────────┬─────────────┘
//!                              ▼
//!                ┌───────────────────────────┐
//!                │ Environment (redb + table)│
//!                └───────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod environment;
pub mod txn;
pub mod iterator;
pub mod batch;
pub mod store;
pub mod driver;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{Config, SyncMode};
pub use batch::{Write, WriteBatch};
pub use driver::{Driver, DriverIterator, DriverWriteBatch};
pub use iterator::KvIterator;
pub use store::Store;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvdriver
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
