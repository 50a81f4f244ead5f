use super::{
    run, run_queries,
    timing::{JsonPlan, TextPlan},
    ARRAY_QUERY, QUERIES,
};
use crate::{
    data::Generator,
    schema::{self, Table},
    store::{memory::MemoryStore, Store},
};

fn loaded(store: MemoryStore, rows: u64) -> MemoryStore {
    let mut store = store;
    schema::reset(&mut store).unwrap();

    let mut generator = Generator::new(Some(0));
    for table in Table::ALL {
        store.commit_batch(&generator.batch(table, 0..rows)).unwrap();
    }

    store
}

#[test]
pub fn every_query_is_timed() {
    let mut store = loaded(MemoryStore::new(), 100);

    let timings = run(&mut store, &TextPlan).unwrap();

    assert_eq!(timings.len(), QUERIES.len());
    for query in QUERIES {
        let time = timings[query.name].unwrap();
        assert!((time - 1.005).abs() < 1e-9, "{}: {time}", query.name);
    }
    assert_eq!(
        store.plans().iter().map(|plan| plan.table.as_str()).collect::<Vec<_>>(),
        vec!["users", "articles", "documents"]
    );
}

#[test]
pub fn json_plans_are_timed() {
    let mut store = loaded(MemoryStore::new(), 10);

    let timings = run(&mut store, &JsonPlan).unwrap();

    assert!(timings.values().all(Option::is_some));
}

#[test]
pub fn missing_timing_is_recorded() {
    let mut store = loaded(MemoryStore::new().without_timing(), 10);

    let timings = run_queries(&mut store, &[ARRAY_QUERY], &TextPlan).unwrap();

    assert_eq!(timings.len(), 1);
    assert_eq!(timings[ARRAY_QUERY.name], None);
}

#[test]
pub fn query_on_missing_table_fails() {
    let mut store = MemoryStore::new();

    assert!(run(&mut store, &TextPlan).is_err());
}
