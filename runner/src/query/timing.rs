//! Extraction of the execution time from `EXPLAIN ANALYZE` output.
//!
//! The plan is free text written for humans, so every extractor answers `None` instead of
//! failing when the value cannot be found.

use crate::config::PlanFormat;

/// label PostgreSQL puts in front of the measured execution time
pub const EXECUTION_TIME_MARKER: &str = "Execution Time";

pub trait TimingExtractor {
    fn name(&self) -> &'static str;

    /// wrap `sql` in the plan-and-execute mode this extractor understands
    fn explain(&self, sql: &str) -> String;

    /// execution time in milliseconds from the returned plan rows
    fn extract(&self, plan: &[String]) -> Option<f64>;
}

/// `EXPLAIN ANALYZE` with the default text output
#[derive(Debug, Default, Clone, Copy)]
pub struct TextPlan;

/// `EXPLAIN (ANALYZE, FORMAT JSON)`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPlan;

/// Parse a line like `Execution Time: 12.345 ms`
pub fn parse_time_line(line: &str) -> Option<f64> {
    let (_, value) = line.split_once(':')?;
    let value = value.trim();
    let value = value.strip_suffix("ms").unwrap_or(value).trim();

    value.parse::<f64>().ok().filter(|time| time.is_finite())
}

impl TimingExtractor for TextPlan {
    fn name(&self) -> &'static str {
        "text"
    }

    fn explain(&self, sql: &str) -> String {
        format!("explain analyze {sql}")
    }

    fn extract(&self, plan: &[String]) -> Option<f64> {
        // only the first marker counts, a second one would be a different statement
        plan.iter()
            .flat_map(|row| row.lines())
            .find(|line| line.contains(EXECUTION_TIME_MARKER))
            .and_then(parse_time_line)
    }
}

impl TimingExtractor for JsonPlan {
    fn name(&self) -> &'static str {
        "json"
    }

    fn explain(&self, sql: &str) -> String {
        format!("explain (analyze, format json) {sql}")
    }

    fn extract(&self, plan: &[String]) -> Option<f64> {
        let document = serde_json::from_str::<serde_json::Value>(&plan.join("\n")).ok()?;
        let root = match &document {
            serde_json::Value::Array(statements) => statements.first()?,
            other => other,
        };

        root.get(EXECUTION_TIME_MARKER)?
            .as_f64()
            .filter(|time| time.is_finite())
    }
}

impl PlanFormat {
    pub fn extractor(self) -> Box<dyn TimingExtractor> {
        match self {
            Self::Text => Box::new(TextPlan),
            Self::Json => Box::new(JsonPlan),
        }
    }
}

#[cfg(test)]
#[path = "timing_test.rs"]
mod timing_test;
