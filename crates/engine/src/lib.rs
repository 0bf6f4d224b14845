//! Core of a personal finance tracker.
//!
//! Records are income/expense entries stored in a fixed base currency
//! ([`BASE_CURRENCY`]). The [`Tracker`] owns the live records and
//! [`Settings`] and persists them through a [`KeyValueStore`] after every
//! change. The [`stats`] module derives everything a dashboard shows from
//! those two inputs.

pub use error::EngineError;
pub use money::Money;
pub use record::{Record, SortKey, SortOrder, sort_records};
pub use search::SearchPattern;
pub use settings::{CurrencyRate, Settings};
pub use storage::{EXPORT_FILE_NAME, Storage, export_records, import_records};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use tracker::Tracker;
pub use validate::{FieldErrors, RecordDraft, ValidRecord, ValidationError};

mod error;
mod money;
mod record;
mod search;
pub mod settings;
pub mod stats;
pub mod storage;
mod store;
mod tracker;
pub mod validate;

/// Code of the currency every amount is stored in.
pub const BASE_CURRENCY: &str = "RWF";

type ResultEngine<T> = Result<T, EngineError>;
