//! Storage adapter: maps the record collection and the settings onto two
//! fixed keys of a [`KeyValueStore`].
//!
//! Loading is fail-soft. A missing key, an unreadable store or malformed
//! content yields an empty collection or the default settings, and the cause
//! is only logged. Saving overwrites the whole value.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::{
    EngineError, Record, ResultEngine, Settings,
    settings::StoredSettings,
    store::KeyValueStore,
};

pub const RECORDS_KEY: &str = "finance_tracker_data";
pub const SETTINGS_KEY: &str = "finance_tracker_settings";

/// File name offered for JSON exports.
pub const EXPORT_FILE_NAME: &str = "finance_data.json";

#[derive(Debug)]
pub struct Storage<S> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load_records(&self) -> Vec<Record> {
        let Some(raw) = self.read(RECORDS_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("ignoring malformed records blob: {err}");
                Vec::new()
            }
        }
    }

    pub fn save_records(&mut self, records: &[Record]) -> ResultEngine<()> {
        self.write(RECORDS_KEY, records)
    }

    pub fn load_settings(&self) -> Settings {
        let Some(raw) = self.read(SETTINGS_KEY) else {
            return Settings::default();
        };
        match serde_json::from_str::<StoredSettings>(&raw) {
            Ok(stored) => stored.into_settings(),
            Err(err) => {
                tracing::warn!("ignoring malformed settings blob: {err}");
                Settings::default()
            }
        }
    }

    pub fn save_settings(&mut self, settings: &Settings) -> ResultEngine<()> {
        self.write(SETTINGS_KEY, settings)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("failed to read {key}: {err}");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> ResultEngine<()> {
        let payload = serde_json::to_string(value)?;
        self.store.set(key, &payload)?;
        tracing::debug!("saved {key} ({} bytes)", payload.len());
        Ok(())
    }
}

/// Parses a user-supplied JSON file into a record collection.
///
/// The file must be an array whose every element has a non-empty string `id`,
/// a non-empty string `description` and a numeric `amount`, and no `id` may
/// appear twice. Any failure rejects the whole file.
pub fn import_records(text: &str) -> ResultEngine<Vec<Record>> {
    let invalid = |message: String| EngineError::InvalidImport(message);

    let value: Value = serde_json::from_str(text).map_err(|err| invalid(err.to_string()))?;
    let Value::Array(items) = value else {
        return Err(invalid("Not an array".to_string()));
    };

    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        let non_empty = |field: &str| {
            item.get(field)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
        };
        let numeric_amount = item.get("amount").is_some_and(Value::is_number);
        let (Some(id), Some(_), true) = (non_empty("id"), non_empty("description"), numeric_amount)
        else {
            return Err(invalid(format!(
                "Invalid record structure at index {index}"
            )));
        };
        if !seen.insert(id) {
            return Err(invalid(format!("Duplicate id {id:?} at index {index}")));
        }
    }

    serde_json::from_value(Value::Array(items)).map_err(|err| invalid(err.to_string()))
}

/// Serializes the full collection as pretty-printed JSON.
pub fn export_records(records: &[Record]) -> ResultEngine<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Serializes the full collection as CSV, one row per record.
pub fn export_records_csv(records: &[Record]) -> ResultEngine<String> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ExportRow<'a> {
        id: &'a str,
        description: &'a str,
        amount: String,
        category: &'a str,
        date: &'a str,
        created_at: Option<String>,
        updated_at: Option<String>,
    }

    let mut writer = csv::Writer::from_writer(vec![]);
    for record in records {
        writer.serialize(ExportRow {
            id: &record.id,
            description: &record.description,
            amount: record.amount.to_string(),
            category: &record.category,
            date: &record.date,
            created_at: record.created_at.map(|at| at.to_rfc3339()),
            updated_at: record.updated_at.map(|at| at.to_rfc3339()),
        })?;
    }

    let data = writer
        .into_inner()
        .map_err(|err| EngineError::Storage(err.into_error()))?;
    String::from_utf8(data).map_err(|err| EngineError::Storage(std::io::Error::other(err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Money, store::MemoryStore};

    #[test]
    fn missing_keys_load_defaults() {
        let storage = Storage::new(MemoryStore::new());
        assert!(storage.load_records().is_empty());
        assert_eq!(storage.load_settings(), Settings::default());
    }

    #[test]
    fn malformed_blobs_load_defaults() {
        let store = MemoryStore::new()
            .with(RECORDS_KEY, "{not json")
            .with(SETTINGS_KEY, r#"{"monthlyCap":"lots"}"#);
        let storage = Storage::new(store);
        assert!(storage.load_records().is_empty());
        assert_eq!(storage.load_settings(), Settings::default());
    }

    #[test]
    fn legacy_settings_blob_is_migrated_on_load() {
        let store = MemoryStore::new().with(
            SETTINGS_KEY,
            r#"{"rates":{"USD":1000,"EUR":1200},"displayCurrency":"EUR"}"#,
        );
        let mut storage = Storage::new(store);
        let settings = storage.load_settings();
        assert_eq!(settings.currencies.len(), 2);
        assert_eq!(settings.display_currency, "EUR");

        storage.save_settings(&settings).unwrap();
        let raw = storage.store().get(SETTINGS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"currencies\""));
        assert!(!raw.contains("\"rates\""));
    }

    #[test]
    fn import_rejects_wrong_shapes() {
        assert_eq!(
            import_records(r#"{"id":"a"}"#),
            Err(EngineError::InvalidImport("Not an array".to_string()))
        );
        assert_eq!(
            import_records(r#"[{"id":"a","description":"x","amount":1},{"id":"","description":"y","amount":2}]"#),
            Err(EngineError::InvalidImport(
                "Invalid record structure at index 1".to_string()
            ))
        );
        assert!(import_records(r#"[{"id":"a","description":"x","amount":"1"}]"#).is_err());
        assert!(import_records(r#"[{"id":"a","amount":1}]"#).is_err());
        assert!(import_records("not json").is_err());
    }

    #[test]
    fn import_rejects_repeated_ids() {
        assert_eq!(
            import_records(
                r#"[{"id":"dup","description":"Tea","amount":1},{"id":"b","description":"Bus","amount":2},{"id":"dup","description":"Cake","amount":3}]"#
            ),
            Err(EngineError::InvalidImport(
                "Duplicate id \"dup\" at index 2".to_string()
            ))
        );
    }

    #[test]
    fn import_rejects_amounts_out_of_range() {
        let result = import_records(
            r#"[{"id":"a","description":"Tea","amount":9e16},{"id":"b","description":"Bus","amount":9e16}]"#,
        );
        assert!(matches!(result, Err(EngineError::InvalidImport(_))));
    }

    #[test]
    fn import_accepts_minimal_records() {
        let records = import_records(r#"[{"id":"a","description":"Tea","amount":3.5}]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, Money::new(350));
        assert_eq!(records[0].category, "");
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let records = import_records(
            r#"[{"id":"a","description":"Tea, hot","amount":3.5,"category":"Food","date":"2024-03-01"}]"#,
        )
        .unwrap();
        let csv = export_records_csv(&records).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,description,amount,category,date,createdAt,updatedAt")
        );
        assert_eq!(lines.next(), Some("a,\"Tea, hot\",3.50,Food,2024-03-01,,"));
    }
}
