pub mod timing;

use crate::{
    schema::Table,
    store::{Store, StoreError},
};
use indexmap::IndexMap;
use timing::TimingExtractor;
use tracing::{info, instrument, trace, warn};

/// map of query name -> execution time in ms, `None` when the plan carried no timing, in
/// execution order
pub type QueryTiming = IndexMap<String, Option<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub name: &'static str,
    pub table: Table,
    pub sql: &'static str,
}

pub const JSONB_QUERY: Query = Query {
    name: "JSONB Query",
    table: Table::Users,
    sql: r#"select * from users where profile @> '{"prefs": {"theme": "dark"}}'"#,
};

pub const ARRAY_QUERY: Query = Query {
    name: "Array Query",
    table: Table::Articles,
    sql: "select * from articles where 'postgres' = any(tags)",
};

pub const FULL_TEXT_QUERY: Query = Query {
    name: "Full-Text Query",
    table: Table::Documents,
    sql: "select * from documents where to_tsvector('english', content) @@ to_tsquery('english', 'GIN & indexes')",
};

pub const QUERIES: [Query; 3] = [JSONB_QUERY, ARRAY_QUERY, FULL_TEXT_QUERY];

/// Execute the fixed query set once, strictly one query after the other
pub fn run<S: Store>(
    store: &mut S,
    extractor: &dyn TimingExtractor,
) -> Result<QueryTiming, StoreError> {
    run_queries(store, &QUERIES, extractor)
}

#[instrument(skip_all, fields(extractor = extractor.name()), level = "info")]
pub fn run_queries<S: Store>(
    store: &mut S,
    queries: &[Query],
    extractor: &dyn TimingExtractor,
) -> Result<QueryTiming, StoreError> {
    let mut timings = QueryTiming::new();

    for query in queries {
        let plan = store.query_text(&extractor.explain(query.sql))?;
        trace!(query = query.name, plan = ?plan, "Received plan");

        let time = extractor.extract(&plan);
        match time {
            Some(time) => info!(query = query.name, "Executed in {time:.3} ms"),
            None => warn!(
                query = query.name,
                lines = plan.len(),
                "Plan output carried no execution time, recording it as missing"
            ),
        }

        timings.insert(query.name.to_owned(), time);
    }

    Ok(timings)
}

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;
