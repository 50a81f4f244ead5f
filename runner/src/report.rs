use crate::metrics::{Metrics, MetricsEntry};
use cli_table::{format::Justify, Cell, CellStruct, Style, Table, TableStruct};

pub const HEADERS: [&str; 6] = [
    "Query",
    "B-tree (ms)",
    "B-tree size(MB)",
    "GIN (ms)",
    "GIN size(MB)",
    "Speedup (x)",
];

pub const MISSING: &str = "N/A";

pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.2}"),
        None => MISSING.to_owned(),
    }
}

fn values(entry: &MetricsEntry) -> [Option<f64>; 5] {
    [
        entry.btree.time,
        Some(entry.btree.size),
        entry.gin.time,
        Some(entry.gin.size),
        entry.speedup,
    ]
}

/// Formatted table rows, one per query in the order of `metrics`
pub fn rows(metrics: &Metrics) -> Vec<[String; 6]> {
    metrics
        .iter()
        .map(|(query, entry)| {
            let [btree_time, btree_size, gin_time, gin_size, speedup] =
                values(entry).map(format_value);

            [
                query.clone(),
                btree_time,
                btree_size,
                gin_time,
                gin_size,
                speedup,
            ]
        })
        .collect()
}

fn value_cell(value: Option<f64>) -> CellStruct {
    match value {
        Some(_) => format_value(value).cell().justify(Justify::Right),
        None => MISSING
            .cell()
            .justify(Justify::Right)
            .dimmed(true)
            .italic(true),
    }
}

pub fn table(metrics: &Metrics) -> TableStruct {
    metrics
        .iter()
        .map(|(query, entry)| {
            std::iter::once(query.cell())
                .chain(values(entry).into_iter().map(value_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .table()
        .title(HEADERS.map(|header| header.cell().bold(true)))
}

pub fn print(metrics: &Metrics) -> std::io::Result<()> {
    cli_table::print_stdout(table(metrics))
}

#[cfg(test)]
#[path = "report_test.rs"]
mod report_test;
