//! Benchmark of B-tree against GIN indexes on PostgreSQL.
//!
//! A run recreates three tables (`users` with a jsonb profile, `articles` with a tag array,
//! `documents` with free text), bulk loads synthetic rows, then measures one index family
//! after the other: create its indexes, `EXPLAIN ANALYZE` the fixed query set, read the index
//! sizes, drop the indexes. Both measurement sets are merged into [`metrics::Metrics`].

pub mod config;
pub mod data;
pub mod harness;
pub mod index;
pub mod loader;
pub mod metrics;
pub mod query;
pub mod report;
pub mod schema;
pub mod size;
pub mod store;
