use super::{load, verify, LoadError};
use crate::{
    data::{BatchPlan, Generator},
    schema::{self, Table},
    store::memory::MemoryStore,
};
use std::num::NonZeroU64;

fn prepared(store: MemoryStore) -> MemoryStore {
    let mut store = store;
    schema::reset(&mut store).unwrap();
    store
}

fn plan(total: u64, batch_size: u64) -> BatchPlan {
    BatchPlan::new(total, NonZeroU64::new(batch_size).unwrap())
}

#[test]
pub fn load_commits_once_per_batch() {
    let mut store = prepared(MemoryStore::new());
    let mut generator = Generator::new(Some(0));

    let report = load(&mut store, &mut generator, Table::Users, plan(100, 10), false).unwrap();

    assert_eq!(report.batches, 10);
    assert_eq!(report.rows, 100);
    assert_eq!(store.rows("users"), Some(100));
    assert_eq!(store.committed().len(), 10);
    assert!(store.committed().iter().all(|(table, rows)| table == "users" && *rows == 10));
}

#[test]
pub fn load_keeps_remainder() {
    let mut store = prepared(MemoryStore::new());
    let mut generator = Generator::new(Some(0));

    let report = load(&mut store, &mut generator, Table::Documents, plan(25, 10), false).unwrap();

    assert_eq!(report.batches, 3);
    assert_eq!(report.rows, 25);
    assert_eq!(
        store.committed().iter().map(|(_, rows)| *rows).collect::<Vec<_>>(),
        vec![10, 10, 5]
    );
    verify(&mut store, Table::Documents, 25).unwrap();
}

#[test]
pub fn load_nothing() {
    let mut store = prepared(MemoryStore::new());
    let mut generator = Generator::new(None);

    let report = load(&mut store, &mut generator, Table::Articles, plan(0, 10), false).unwrap();

    assert_eq!(report.batches, 0);
    assert!(store.committed().is_empty());
}

#[test]
pub fn failing_batch_aborts_load() {
    let mut store = prepared(MemoryStore::new().failing_batch(3));
    let mut generator = Generator::new(Some(0));

    let error = load(&mut store, &mut generator, Table::Articles, plan(50, 10), false).unwrap_err();

    assert!(matches!(
        error,
        LoadError::Batch {
            table: Table::Articles,
            batch: 3,
            ..
        }
    ));
    // the two batches before the failing one stay committed
    assert_eq!(store.rows("articles"), Some(20));
    assert_eq!(store.committed().len(), 2);
}

#[test]
pub fn verify_detects_mismatch() {
    let mut store = prepared(MemoryStore::new());
    let mut generator = Generator::new(Some(0));
    load(&mut store, &mut generator, Table::Users, plan(10, 4), false).unwrap();

    assert!(matches!(
        verify(&mut store, Table::Users, 11),
        Err(LoadError::RowCount {
            expected: 11,
            found: 10,
            ..
        })
    ));
}

#[test]
pub fn verify_missing_table() {
    let mut store = MemoryStore::new();

    assert!(matches!(
        verify(&mut store, Table::Users, 0),
        Err(LoadError::Count(_))
    ));
}
