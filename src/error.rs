//! Error types for kvdriver
//!
//! Provides a unified error type for all driver operations.
//!
//! The engine's "not found" result never appears here: absence is reported
//! as `None` (from `get`, or as an exhausted iterator), not as an error.

use std::fmt::Display;

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for kvdriver operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Environment Errors
    // -------------------------------------------------------------------------
    #[error("Open error: {0}")]
    Open(String),

    // -------------------------------------------------------------------------
    // Transaction Errors
    // -------------------------------------------------------------------------
    #[error("Transaction error: {0}")]
    Transaction(String),

    // -------------------------------------------------------------------------
    // Operation Errors
    // -------------------------------------------------------------------------
    #[error("Operation error: {0}")]
    Operation(String),

    /// A put would grow the table past the configured capacity
    #[error("Capacity exceeded: {requested} bytes requested, capacity is {capacity} bytes")]
    CapacityExceeded { requested: u64, capacity: u64 },
}

impl KvError {
    pub(crate) fn open(context: &str, err: impl Display) -> Self {
        Self::Open(format!("{}: {}", context, err))
    }

    pub(crate) fn transaction(err: impl Display) -> Self {
        Self::Transaction(err.to_string())
    }

    pub(crate) fn operation(err: impl Display) -> Self {
        Self::Operation(err.to_string())
    }
}
