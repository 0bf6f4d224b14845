//! A single income/expense entry and the operations on a record collection.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Money, validate::ValidRecord};

const ID_PREFIX: &str = "rec_";
const ID_SUFFIX_LEN: usize = 5;

/// One financial transaction.
///
/// `amount` is always expressed in the base currency. Keys this type does not
/// know about are kept in `extra` so that files written by other tools
/// survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub description: String,
    pub amount: Money,
    #[serde(default)]
    pub category: String,
    /// Calendar day, `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Builds a record from validated input. The id is left empty so that the
    /// state manager assigns one on insert.
    #[must_use]
    pub fn from_valid(valid: ValidRecord) -> Self {
        Self {
            id: String::new(),
            description: valid.description,
            amount: valid.amount,
            category: valid.category,
            date: valid.date,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// Shallow merge: fields carried by `incoming` replace ours, while
    /// `created_at` and extra keys absent from `incoming` are kept.
    pub(crate) fn merge_from(&mut self, incoming: Record) {
        self.description = incoming.description;
        self.amount = incoming.amount;
        self.category = incoming.category;
        self.date = incoming.date;
        if incoming.created_at.is_some() {
            self.created_at = incoming.created_at;
        }
        self.extra.extend(incoming.extra);
    }

    /// Returns `true` when the record's date lies in the given `YYYY-MM`
    /// month.
    #[must_use]
    pub fn in_month(&self, year_month: &str) -> bool {
        self.date.starts_with(year_month)
    }
}

/// Generates an id of the form `rec_<unix-millis><5 random hex chars>` that does
/// not collide with any id in `existing`.
pub(crate) fn new_record_id(now: DateTime<Utc>, existing: &[Record]) -> String {
    loop {
        let random = Uuid::new_v4().simple().to_string();
        let suffix = &random[..ID_SUFFIX_LEN];
        let id = format!("{ID_PREFIX}{}{suffix}", now.timestamp_millis());
        if !existing.iter().any(|record| record.id == id) {
            return id;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Description,
    Amount,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort of `records` by `key`. Descriptions compare case-insensitively
/// first, then by raw text.
pub fn sort_records(records: &mut [Record], key: SortKey, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Description => compare_text(&a.description, &b.description),
            SortKey::Amount => a.amount.cmp(&b.amount),
            SortKey::Date => a.date.cmp(&b.date),
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
