//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Once;

use kvdriver::{Config, Store, SyncMode};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Route library logs to the test harness (`RUST_LOG=kvdriver=debug`)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn setup_temp_store() -> (TempDir, Store) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("db"))
        .build();
    let store = Store::open(config).unwrap();
    (temp_dir, store)
}

/// Store whose capacity is small enough to trip with one large value
pub fn setup_temp_store_with_capacity(capacity: u64) -> (TempDir, Store) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .path(temp_dir.path().join("db"))
        .capacity(capacity)
        .sync(SyncMode::Sync)
        .build();
    let store = Store::open(config).unwrap();
    (temp_dir, store)
}

/// Store pre-filled with `entries`
pub fn setup_store_with_entries(entries: &[(&[u8], &[u8])]) -> (TempDir, Store) {
    let (temp_dir, store) = setup_temp_store();
    for (key, value) in entries {
        store.put(key, value).unwrap();
    }
    (temp_dir, store)
}
