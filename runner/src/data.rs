use crate::{
    schema::Table,
    store::{InsertBatch, Value},
};
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::{num::NonZeroU64, ops::Range};

pub const TAGS: [&str; 8] = [
    "tech", "news", "postgres", "gin", "json", "sql", "backend", "tutorial",
];
pub const TAGS_PER_ARTICLE: usize = 5;
pub const DOCUMENT_TEXT: &str = "PostgreSQL GIN indexes are awesome.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    En,
    Fr,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl Lang {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub theme: Theme,
    pub lang: Lang,
}

impl Profile {
    /// jsonb document as stored in `users.profile`
    pub fn to_json(self) -> serde_json::Value {
        json!({
            "prefs": {
                "theme": self.theme.as_str(),
                "lang": self.lang.as_str(),
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub content: String,
}

/// A generated row of one of the benchmark tables
pub trait Record {
    const TABLE: Table;

    /// column values in the order of `Table::columns`
    fn into_values(self) -> Vec<Value>;
}

impl Record for UserRecord {
    const TABLE: Table = Table::Users;

    fn into_values(self) -> Vec<Value> {
        vec![Value::Text(self.name), Value::Json(self.profile.to_json())]
    }
}

impl Record for ArticleRecord {
    const TABLE: Table = Table::Articles;

    fn into_values(self) -> Vec<Value> {
        vec![Value::Text(self.title), Value::TextArray(self.tags)]
    }
}

impl Record for DocumentRecord {
    const TABLE: Table = Table::Documents;

    fn into_values(self) -> Vec<Value> {
        vec![Value::Text(self.content)]
    }
}

pub fn into_batch<R: Record>(records: impl Iterator<Item = R>) -> InsertBatch {
    InsertBatch {
        table: R::TABLE.name(),
        columns: R::TABLE.columns(),
        rows: records.map(Record::into_values).collect(),
    }
}

/// Split of `total` rows into consecutive batches of `batch_size`.
///
/// Every batch holds exactly `batch_size` rows except the last one, which carries the
/// remainder when `total` is not a multiple of `batch_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub total: u64,
    pub batch_size: NonZeroU64,
}

impl BatchPlan {
    pub fn new(total: u64, batch_size: NonZeroU64) -> Self {
        Self { total, batch_size }
    }

    pub fn batches(&self) -> u64 {
        self.total.div_ceil(self.batch_size.get())
    }

    /// row offsets of each batch
    pub fn iter(&self) -> impl Iterator<Item = Range<u64>> {
        let (total, size) = (self.total, self.batch_size.get());

        (0..self.batches()).map(move |batch| {
            let start = batch * size;
            start..(start + size).min(total)
        })
    }
}

/// Source of synthetic rows for all three tables
#[derive(Debug, Clone)]
pub struct Generator {
    rng: rand_pcg::Pcg64Mcg,
}

impl Generator {
    /// seeded generators produce identical rows on every run
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => rand_pcg::Pcg64Mcg::seed_from_u64(seed),
            None => rand_pcg::Pcg64Mcg::from_entropy(),
        };

        Self { rng }
    }

    pub fn user(&mut self, index: u64) -> UserRecord {
        let theme = if self.rng.gen_bool(0.5) {
            Theme::Dark
        } else {
            Theme::Light
        };
        let lang = if self.rng.gen_bool(0.5) {
            Lang::En
        } else {
            Lang::Fr
        };

        UserRecord {
            name: format!("user_{index}"),
            profile: Profile { theme, lang },
        }
    }

    pub fn article(&mut self, index: u64) -> ArticleRecord {
        let tags = (0..TAGS_PER_ARTICLE)
            .map(|_| TAGS[self.rng.gen_range(0..TAGS.len())].to_owned())
            .collect();

        ArticleRecord {
            title: format!("Article {index}"),
            tags,
        }
    }

    pub fn document(&mut self) -> DocumentRecord {
        DocumentRecord {
            content: format!("{DOCUMENT_TEXT} {}", self.rng.gen::<u128>()),
        }
    }

    /// rows `rows` of `table`, ready to be committed
    pub fn batch(&mut self, table: Table, rows: Range<u64>) -> InsertBatch {
        match table {
            Table::Users => into_batch(rows.map(|i| self.user(i))),
            Table::Articles => into_batch(rows.map(|i| self.article(i))),
            Table::Documents => into_batch(rows.map(|_| self.document())),
        }
    }
}

#[cfg(test)]
#[path = "data_test.rs"]
mod data_test;
