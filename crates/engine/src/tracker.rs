use chrono::{DateTime, Utc};

use crate::{
    EngineError, Money, Record, ResultEngine, Settings,
    record::{SortKey, SortOrder, new_record_id, sort_records},
    storage::{self, Storage},
    store::KeyValueStore,
    validate::ValidRecord,
};

/// Owner of the live record collection and settings.
///
/// Every mutation goes through `&mut self` and is written back to the store
/// before returning, so what is in memory and what is persisted never
/// diverge after a successful call. On error the in-memory state is left as
/// it was.
#[derive(Debug)]
pub struct Tracker<S> {
    storage: Storage<S>,
    records: Vec<Record>,
    settings: Settings,
}

impl<S: KeyValueStore> Tracker<S> {
    /// Loads records and settings from `store`. Never fails: unreadable data
    /// is replaced by an empty collection and default settings.
    pub fn open(store: S) -> Self {
        let storage = Storage::new(store);
        let records = storage.load_records();
        let settings = storage.load_settings();
        tracing::debug!("loaded {} records", records.len());
        Self {
            storage,
            records,
            settings,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    /// Replaces the record with the same id (shallow merge) or appends it
    /// under a freshly generated id. Returns the id of the stored record.
    pub fn upsert_record(&mut self, record: Record, now: DateTime<Utc>) -> ResultEngine<String> {
        let mut records = self.records.clone();
        let existing = records
            .iter()
            .position(|stored| !record.id.is_empty() && stored.id == record.id);
        let id = match existing {
            Some(index) => {
                let stored = &mut records[index];
                stored.merge_from(record);
                stored.updated_at = Some(now);
                stored.id.clone()
            }
            _ => {
                let id = new_record_id(now, &records);
                records.push(Record {
                    id: id.clone(),
                    created_at: record.created_at.or(Some(now)),
                    updated_at: Some(now),
                    ..record
                });
                id
            }
        };

        self.set_records(records)?;
        Ok(id)
    }

    /// Appends a new record built from validated form input.
    pub fn add_record(&mut self, valid: ValidRecord, now: DateTime<Utc>) -> ResultEngine<String> {
        self.upsert_record(Record::from_valid(valid), now)
    }

    /// Overwrites the editable fields of an existing record.
    pub fn edit_record(
        &mut self,
        id: &str,
        valid: ValidRecord,
        now: DateTime<Utc>,
    ) -> ResultEngine<String> {
        if self.record(id).is_none() {
            return Err(EngineError::KeyNotFound(id.to_string()));
        }
        let record = Record {
            id: id.to_string(),
            ..Record::from_valid(valid)
        };
        self.upsert_record(record, now)
    }

    /// Removes the record with `id`. Returns `false` if there was none.
    pub fn delete_record(&mut self, id: &str) -> ResultEngine<bool> {
        let before = self.records.len();
        let records: Vec<Record> = self
            .records
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect();
        let removed = records.len() != before;
        self.set_records(records)?;
        Ok(removed)
    }

    pub fn set_records(&mut self, records: Vec<Record>) -> ResultEngine<()> {
        self.storage.save_records(&records)?;
        self.records = records;
        Ok(())
    }

    pub fn set_settings(&mut self, settings: Settings) -> ResultEngine<()> {
        self.storage.save_settings(&settings)?;
        self.settings = settings;
        Ok(())
    }

    pub fn sort_records(&mut self, key: SortKey, order: SortOrder) -> ResultEngine<()> {
        let mut records = self.records.clone();
        sort_records(&mut records, key, order);
        self.set_records(records)
    }

    /// Replaces the whole collection with the records of a JSON file.
    /// Returns how many records were imported.
    pub fn import_json(&mut self, text: &str) -> ResultEngine<usize> {
        let records = storage::import_records(text)?;
        let count = records.len();
        self.set_records(records)?;
        tracing::info!("imported {count} records");
        Ok(count)
    }

    pub fn export_json(&self) -> ResultEngine<String> {
        storage::export_records(&self.records)
    }

    pub fn export_csv(&self) -> ResultEngine<String> {
        storage::export_records_csv(&self.records)
    }

    pub fn add_category(&mut self, name: &str) -> ResultEngine<bool> {
        self.edit_settings(|settings| settings.add_category(name))
    }

    pub fn remove_category(&mut self, name: &str) -> ResultEngine<()> {
        self.edit_settings(|settings| settings.remove_category(name))
    }

    pub fn add_currency(&mut self, code: &str, rate: f64) -> ResultEngine<String> {
        self.edit_settings(|settings| settings.add_currency(code, rate))
    }

    pub fn remove_currency(&mut self, code: &str) -> ResultEngine<()> {
        self.edit_settings(|settings| settings.remove_currency(code))
    }

    pub fn set_currency_rate(&mut self, code: &str, rate: f64) -> ResultEngine<()> {
        self.edit_settings(|settings| settings.set_currency_rate(code, rate))
    }

    pub fn set_display_currency(&mut self, code: &str) -> ResultEngine<()> {
        self.edit_settings(|settings| settings.set_display_currency(code))
    }

    pub fn set_monthly_cap(&mut self, cap: Money) -> ResultEngine<()> {
        self.edit_settings(|settings| settings.set_monthly_cap(cap))
    }

    /// Applies `edit` to a copy of the settings and persists it only if the
    /// edit succeeds.
    fn edit_settings<T>(
        &mut self,
        edit: impl FnOnce(&mut Settings) -> ResultEngine<T>,
    ) -> ResultEngine<T> {
        let mut settings = self.settings.clone();
        let value = edit(&mut settings)?;
        self.set_settings(settings)?;
        Ok(value)
    }
}
