//! Tests for batched writes
//!
//! These tests verify:
//! - batch_put applies puts and deletes in order, in one transaction
//! - Deleting an absent key inside a batch is a benign miss
//! - A real error aborts the whole batch, including the applied prefix
//! - WriteBatch accumulate / commit / rollback / close

mod common;

use common::{setup_store_with_entries, setup_temp_store, setup_temp_store_with_capacity};
use kvdriver::{KvError, Write};

// =============================================================================
// batch_put Tests
// =============================================================================

#[test]
fn test_batch_with_benign_delete_miss() {
    let (_temp, store) = setup_temp_store();

    let writes = vec![
        Write::put(b"A".to_vec(), b"1".to_vec()),
        Write::delete(b"B".to_vec()),
        Write::put(b"C".to_vec(), b"3".to_vec()),
    ];
    store.batch_put(&writes).unwrap();

    assert_eq!(store.get(b"A").unwrap(), Some(b"1".to_vec()));
    assert_eq!(store.get(b"B").unwrap(), None);
    assert_eq!(store.get(b"C").unwrap(), Some(b"3".to_vec()));
}

#[test]
fn test_batch_deletes_existing_keys() {
    let (_temp, store) = setup_store_with_entries(&[(b"x".as_slice(), b"1".as_slice())]);

    store
        .batch_put(&[Write::delete(b"x".to_vec()), Write::put(b"y".to_vec(), b"2".to_vec())])
        .unwrap();

    assert_eq!(store.get(b"x").unwrap(), None);
    assert_eq!(store.get(b"y").unwrap(), Some(b"2".to_vec()));
}

#[test]
fn test_batch_applies_in_insertion_order() {
    let (_temp, store) = setup_temp_store();

    store
        .batch_put(&[
            Write::put(b"k".to_vec(), b"first".to_vec()),
            Write::delete(b"k".to_vec()),
            Write::put(b"k".to_vec(), b"last".to_vec()),
            Write::put(b"gone".to_vec(), b"v".to_vec()),
            Write::delete(b"gone".to_vec()),
        ])
        .unwrap();

    assert_eq!(store.get(b"k").unwrap(), Some(b"last".to_vec()));
    assert_eq!(store.get(b"gone").unwrap(), None);
}

#[test]
fn test_empty_batch_commits() {
    let (_temp, store) = setup_temp_store();

    store.batch_put(&[]).unwrap();

    let mut iter = store.new_iterator().unwrap();
    iter.first();
    assert!(!iter.valid());
    iter.close().unwrap();
}

#[test]
fn test_batch_delete_miss_keeps_open_snapshot() {
    let (_temp, store) = setup_store_with_entries(&[(b"k".as_slice(), b"v".as_slice())]);
    let mut iter = store.new_iterator().unwrap();

    let writes = vec![
        Write::delete(b"absent".to_vec()),
        Write::delete(b"k".to_vec()),
        Write::put(b"x".to_vec(), b"y".to_vec()),
    ];
    store.batch_put(&writes).unwrap();
    assert_eq!(store.stored_bytes(), 2);

    // The iterator still reads the snapshot taken before the batch
    iter.first();
    assert_eq!(iter.key(), Some(b"k".as_slice()));
    iter.next();
    assert!(!iter.valid());
    iter.close().unwrap();
}

#[test]
fn test_batch_real_error_discards_prefix_and_remainder() {
    let (_temp, store) = setup_temp_store_with_capacity(1024);

    let writes = vec![
        Write::put(b"A".to_vec(), b"1".to_vec()),
        Write::put(b"huge".to_vec(), vec![0u8; 8192]),
        Write::put(b"C".to_vec(), b"3".to_vec()),
    ];
    let result = store.batch_put(&writes);

    assert!(matches!(result, Err(KvError::CapacityExceeded { .. })));
    assert_eq!(store.get(b"A").unwrap(), None);
    assert_eq!(store.get(b"huge").unwrap(), None);
    assert_eq!(store.get(b"C").unwrap(), None);
}

#[test]
fn test_batch_abort_preserves_earlier_state() {
    let (_temp, store) = setup_temp_store_with_capacity(1024);
    store.put(b"keep", b"old").unwrap();

    let writes = vec![
        Write::delete(b"keep".to_vec()),
        Write::put(b"huge".to_vec(), vec![0u8; 8192]),
    ];
    assert!(store.batch_put(&writes).is_err());

    // The delete in the aborted batch never became visible
    assert_eq!(store.get(b"keep").unwrap(), Some(b"old".to_vec()));
    assert_eq!(store.stored_bytes(), 7);

    // The writer slot was released by the abort
    store.put(b"after", b"ok").unwrap();
    assert_eq!(store.get(b"after").unwrap(), Some(b"ok".to_vec()));
    assert_eq!(store.stored_bytes(), 14);
}

#[test]
fn test_write_is_delete() {
    assert!(Write::delete(b"k".to_vec()).is_delete());
    assert!(!Write::put(b"k".to_vec(), b"".to_vec()).is_delete());
}

// =============================================================================
// WriteBatch Tests
// =============================================================================

#[test]
fn test_write_batch_untouched_until_commit() {
    let (_temp, store) = setup_temp_store();

    let mut batch = store.new_write_batch();
    batch.put(b"a", b"1");
    batch.put(b"b", b"2");
    batch.delete(b"c");

    assert_eq!(batch.len(), 3);
    assert_eq!(store.get(b"a").unwrap(), None);

    batch.commit().unwrap();

    assert!(batch.is_empty());
    assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
    batch.close().unwrap();
}

#[test]
fn test_write_batch_rollback_discards() {
    let (_temp, store) = setup_temp_store();

    let mut batch = store.new_write_batch();
    batch.put(b"a", b"1");
    batch.rollback().unwrap();

    assert!(batch.is_empty());
    batch.commit().unwrap();

    assert_eq!(store.get(b"a").unwrap(), None);
}

#[test]
fn test_write_batch_close_without_commit() {
    let (_temp, store) = setup_temp_store();

    let mut batch = store.new_write_batch();
    batch.put(b"a", b"1");
    batch.close().unwrap();

    assert_eq!(store.get(b"a").unwrap(), None);
}

#[test]
fn test_write_batch_reusable_after_commit() {
    let (_temp, store) = setup_temp_store();

    let mut batch = store.new_write_batch();
    batch.put(b"a", b"1");
    batch.commit().unwrap();

    batch.delete(b"a");
    batch.put(b"b", b"2");
    batch.commit().unwrap();

    assert_eq!(store.get(b"a").unwrap(), None);
    assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
}

#[test]
fn test_write_batch_failed_commit_is_cleared() {
    let (_temp, store) = setup_temp_store_with_capacity(1024);

    let mut batch = store.new_write_batch();
    batch.put(b"a", b"1");
    batch.put(b"huge", &[0u8; 8192]);

    assert!(batch.commit().is_err());
    assert!(batch.is_empty());
    assert_eq!(store.get(b"a").unwrap(), None);
}
