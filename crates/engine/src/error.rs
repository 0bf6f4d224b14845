//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a record field fails its format rule.
//! - [`InvalidImport`] thrown when an imported file is rejected as a whole.
//! - [`LastCategory`] and [`LastCurrency`] thrown when a removal would leave
//!   the settings without any entry.
//! - [`Storage`] thrown when the underlying store cannot be written.
//!
//! Loading never fails: malformed stored data is replaced by defaults.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvalidImport`]: EngineError::InvalidImport
//!  [`LastCategory`]: EngineError::LastCategory
//!  [`LastCurrency`]: EngineError::LastCurrency
//!  [`Storage`]: EngineError::Storage
use thiserror::Error;

use crate::validate::ValidationError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid JSON file: {0}")]
    InvalidImport(String),
    #[error("At least one category required.")]
    LastCategory,
    #[error("At least one currency must remain.")]
    LastCurrency,
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidImport(a), Self::InvalidImport(b)) => a == b,
            (Self::LastCategory, Self::LastCategory) => true,
            (Self::LastCurrency, Self::LastCurrency) => true,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            (Self::Csv(a), Self::Csv(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
