//! Deterministic stand-in for PostgreSQL used by the test suite.
//!
//! Only the statements issued by the harness are understood. Row counts, index existence,
//! relation sizes and plan output are modelled closely enough to drive a full run.

use super::{InsertBatch, Store, StoreError};
use std::collections::BTreeMap;

const PAGE_SIZE: i64 = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MemoryIndex {
    gin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRecord {
    pub table: String,
    pub indexes: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, u64>,
    /// index name -> (table, index)
    indexes: BTreeMap<String, (String, MemoryIndex)>,
    committed: Vec<(String, usize)>,
    plans: Vec<PlanRecord>,
    batch_calls: usize,
    fail_on_batch: Option<usize>,
    fail_on_index: Option<String>,
    omit_timing: bool,
}

fn strip_name(word: &str) -> String {
    word.split('(')
        .next()
        .unwrap_or_default()
        .trim_matches(|c| c == '"' || c == ',' || c == ';')
        .to_owned()
}

fn name_list(words: &[&str]) -> Vec<String> {
    words
        .join(" ")
        .split(',')
        .map(|name| strip_name(name.trim()))
        .filter(|name| !name.is_empty())
        .collect()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// fail the `batch`-th call (1-based) to `commit_batch`
    pub fn failing_batch(mut self, batch: usize) -> Self {
        self.fail_on_batch = Some(batch);
        self
    }

    /// reject the creation of index `name`
    pub fn failing_index(mut self, name: &str) -> Self {
        self.fail_on_index = Some(name.to_owned());
        self
    }

    /// produce plans without an execution time
    pub fn without_timing(mut self) -> Self {
        self.omit_timing = true;
        self
    }

    pub fn rows(&self, table: &str) -> Option<u64> {
        self.tables.get(table).copied()
    }

    pub fn has_index(&self, index: &str) -> bool {
        self.indexes.contains_key(index)
    }

    pub fn index_names(&self) -> Vec<String> {
        self.indexes.keys().cloned().collect()
    }

    /// (table, rows) for every committed batch
    pub fn committed(&self) -> &[(String, usize)] {
        &self.committed
    }

    pub fn plans(&self) -> &[PlanRecord] {
        &self.plans
    }

    fn drop_table(&mut self, table: &str) {
        self.tables.remove(table);
        self.indexes.retain(|_, (indexed, _)| indexed != table);
    }

    fn apply(&mut self, statement: &str) -> Result<(), StoreError> {
        let lower = statement.to_lowercase();
        let words = lower.split_whitespace().collect::<Vec<_>>();

        match words.as_slice() {
            ["drop", "table", "if", "exists", names @ ..] => {
                for table in name_list(names) {
                    self.drop_table(&table);
                }
            }
            ["create", "table", name, ..] => {
                let table = strip_name(name);
                if self.tables.contains_key(&table) {
                    return Err(StoreError::Conflict(format!(
                        "relation \"{table}\" already exists"
                    )));
                }
                self.tables.insert(table, 0);
            }
            ["create", "index", name, "on", table, rest @ ..] => {
                let (index, table) = (strip_name(name), strip_name(table));
                if self.fail_on_index.as_deref() == Some(index.as_str()) {
                    return Err(StoreError::UndefinedObject(
                        "operator class \"missing_ops\" does not exist".to_owned(),
                    ));
                }
                if self.indexes.contains_key(&index) {
                    return Err(StoreError::Conflict(format!(
                        "relation \"{index}\" already exists"
                    )));
                }
                if !self.tables.contains_key(&table) {
                    return Err(StoreError::UndefinedObject(format!(
                        "relation \"{table}\" does not exist"
                    )));
                }
                let gin = matches!(rest, ["using", "gin", ..]);
                self.indexes.insert(index, (table, MemoryIndex { gin }));
            }
            ["drop", "index", "if", "exists", names @ ..] => {
                for index in name_list(names) {
                    self.indexes.remove(&index);
                }
            }
            _ => panic!("statement not understood by the memory store: {statement}"),
        }

        Ok(())
    }

    fn table_rows(&self, table: &str) -> Result<u64, StoreError> {
        self.tables.get(table).copied().ok_or_else(|| {
            StoreError::UndefinedObject(format!("relation \"{table}\" does not exist"))
        })
    }

    fn plan(&mut self, sql: &str) -> Result<Vec<String>, StoreError> {
        let lower = sql.to_lowercase();
        let table = lower
            .split_whitespace()
            .skip_while(|word| *word != "from")
            .nth(1)
            .map(strip_name)
            .unwrap_or_default();
        let rows = self.table_rows(&table)?;

        let indexes = self
            .indexes
            .iter()
            .filter(|(_, (indexed, _))| *indexed == table)
            .map(|(name, (_, index))| (name.clone(), index.gin))
            .collect::<Vec<_>>();
        let gin = indexes.iter().any(|(_, gin)| *gin);
        let execution = 0.005 + rows as f64 * if gin { 0.002 } else { 0.01 };
        let node = if gin { "Bitmap Heap Scan" } else { "Seq Scan" };

        self.plans.push(PlanRecord {
            table: table.clone(),
            indexes: indexes.into_iter().map(|(name, _)| name).collect(),
        });

        if lower.contains("format json") {
            let timing = if self.omit_timing {
                String::new()
            } else {
                format!(", \"Execution Time\": {execution:.3}")
            };

            return Ok(vec![format!(
                "[{{\"Plan\": {{\"Node Type\": \"{node}\", \"Relation Name\": \"{table}\", \
                 \"Actual Rows\": {rows}}}, \"Planning Time\": 0.050{timing}}}]"
            )]);
        }

        let mut lines = vec![
            format!(
                "{node} on {table}  (cost=0.00..{rows}.00 rows={rows} width=64) \
                 (actual time=0.010..{execution:.3} rows={rows} loops=1)"
            ),
            "Planning Time: 0.050 ms".to_owned(),
        ];
        if !self.omit_timing {
            lines.push(format!("Execution Time: {execution:.3} ms"));
        }

        Ok(lines)
    }
}

impl Store for MemoryStore {
    fn execute(&mut self, sql: &str) -> Result<(), StoreError> {
        sql.split(';')
            .map(str::trim)
            .filter(|statement| !statement.is_empty())
            .try_for_each(|statement| self.apply(statement))
    }

    fn query_text(&mut self, sql: &str) -> Result<Vec<String>, StoreError> {
        if sql.trim_start().to_lowercase().starts_with("explain") {
            self.plan(sql)
        } else {
            panic!("query not understood by the memory store: {sql}")
        }
    }

    fn query_scalar(&mut self, sql: &str, params: &[&str]) -> Result<Option<i64>, StoreError> {
        let lower = sql.to_lowercase();

        if lower.contains("pg_indexes") {
            Ok(Some(self.indexes.contains_key(params[0]) as i64))
        } else if lower.contains("pg_total_relation_size") {
            // only indexes are sized, any other name yields no row
            match self.indexes.get(params[0]) {
                Some((table, index)) => {
                    let per_row = if index.gin { 16 } else { 48 };
                    Ok(Some(PAGE_SIZE + self.table_rows(table)? as i64 * per_row))
                }
                None => Ok(None),
            }
        } else if lower.starts_with("select count(*) from") {
            let table = lower
                .split_whitespace()
                .last()
                .map(strip_name)
                .unwrap_or_default();
            Ok(Some(self.table_rows(&table)? as i64))
        } else {
            panic!("query not understood by the memory store: {sql}")
        }
    }

    fn commit_batch(&mut self, batch: &InsertBatch) -> Result<u64, StoreError> {
        self.batch_calls += 1;

        if self.fail_on_batch == Some(self.batch_calls) {
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint \"{}_pkey\"",
                batch.table
            )));
        }

        let rows = self.table_rows(batch.table)?;
        assert!(
            batch.rows.iter().all(|row| row.len() == batch.columns.len()),
            "every row must carry one value per column"
        );

        self.tables.insert(batch.table.to_owned(), rows + batch.len() as u64);
        self.committed.push((batch.table.to_owned(), batch.len()));

        Ok(batch.len() as u64)
    }

    fn close(self) -> Result<(), StoreError> {
        Ok(())
    }
}
