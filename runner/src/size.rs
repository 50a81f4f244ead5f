use crate::{
    index::IndexFamily,
    query::Query,
    store::{Store, StoreError},
};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;

pub const BYTES_PER_MEGABYTE: f64 = 1_048_576.0;

/// map of query name -> size in MB of the index serving that query
pub type IndexSizeReport = IndexMap<String, f64>;

#[derive(Error, Debug)]
pub enum SizeError {
    #[error("Index {0} does not exist")]
    UnknownIndex(String),
    #[error("Database query failed")]
    Store(#[from] StoreError),
}

// unknown names and relations that are not indexes produce no row
const SQL_INDEX_SIZE: &str = "select pg_total_relation_size(c.oid) from pg_class c \
     where c.relname = $1 and c.relkind in ('i', 'I') and pg_table_is_visible(c.oid)";

/// On-disk footprint of `index` in MB, only meaningful while the index exists
pub fn size_of<S: Store>(store: &mut S, index: &str) -> Result<f64, SizeError> {
    match store.query_scalar(SQL_INDEX_SIZE, &[index])? {
        Some(bytes) => {
            debug!(index, bytes, "Measured index size");

            Ok(bytes as f64 / BYTES_PER_MEGABYTE)
        }
        None => Err(SizeError::UnknownIndex(index.to_owned())),
    }
}

/// Sizes of the `family` indexes, keyed by the query each of them serves
pub fn family_sizes<S: Store>(
    store: &mut S,
    family: IndexFamily,
    queries: &[Query],
) -> Result<IndexSizeReport, SizeError> {
    queries
        .iter()
        .map(|query| {
            size_of(store, family.index_on(query.table).name)
                .map(|size| (query.name.to_owned(), size))
        })
        .collect()
}

#[cfg(test)]
#[path = "size_test.rs"]
mod size_test;
