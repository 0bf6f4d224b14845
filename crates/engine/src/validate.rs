//! Field validators for record input.
//!
//! Every validator is pure and returns `Ok(())` for an accepted value or a
//! [`ValidationError`] whose `Display` is the message shown next to the field.

use std::{fmt, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::Money;

#[allow(clippy::expect_used)]
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)(\.[0-9]{1,2})?$").expect("amount pattern compiles")
});

#[allow(clippy::expect_used)]
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$")
        .expect("date pattern compiles")
});

#[allow(clippy::expect_used)]
static CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]+(?:[ -][A-Za-z]+)*$").expect("category pattern compiles")
});

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Description is required.")]
    Required,
    #[error("No leading or trailing spaces allowed.")]
    SurroundingWhitespace,
    #[error("Collapse multiple spaces into one.")]
    RepeatedWhitespace,
    #[error("Duplicate consecutive words (e.g., \"the the\") are not allowed.")]
    DuplicateWord,
    #[error("Enter a positive amount (up to 2 decimals).")]
    AmountFormat,
    #[error("Amount must be greater than zero.")]
    AmountNotPositive,
    #[error("Date must be in YYYY-MM-DD format with valid month/day.")]
    DateFormat,
    #[error("Invalid date (e.g., Feb 30 does not exist).")]
    DateNotReal,
    #[error("Category is required.")]
    CategoryRequired,
    #[error("Use only letters, spaces, or hyphens (must start/end with a letter).")]
    CategoryFormat,
}

pub fn validate_description(desc: &str) -> Result<(), ValidationError> {
    let trimmed = desc.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required);
    }
    if trimmed != desc {
        return Err(ValidationError::SurroundingWhitespace);
    }

    let chars: Vec<char> = desc.chars().collect();
    if chars
        .windows(2)
        .any(|pair| pair[0].is_whitespace() && pair[1].is_whitespace())
    {
        return Err(ValidationError::RepeatedWhitespace);
    }

    let words: Vec<String> = desc.split_whitespace().map(str::to_lowercase).collect();
    if words.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(ValidationError::DuplicateWord);
    }

    Ok(())
}

pub fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    if !AMOUNT_RE.is_match(amount) {
        return Err(ValidationError::AmountFormat);
    }
    let parsed: Money = amount
        .parse()
        .map_err(|_| ValidationError::AmountFormat)?;
    if !parsed.is_positive() {
        return Err(ValidationError::AmountNotPositive);
    }
    Ok(())
}

pub fn validate_date(date: &str) -> Result<(), ValidationError> {
    let captures = DATE_RE.captures(date).ok_or(ValidationError::DateFormat)?;
    let field = |idx: usize| -> Result<u32, ValidationError> {
        captures
            .get(idx)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or(ValidationError::DateFormat)
    };

    let year = i32::try_from(field(1)?).map_err(|_| ValidationError::DateFormat)?;
    NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)
        .map(|_| ())
        .ok_or(ValidationError::DateNotReal)
}

pub fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.trim().is_empty() {
        return Err(ValidationError::CategoryRequired);
    }
    if !CATEGORY_RE.is_match(category) {
        return Err(ValidationError::CategoryFormat);
    }
    Ok(())
}

/// Raw, unvalidated record input as typed into a form.
#[derive(Debug, Clone, Default)]
pub struct RecordDraft {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

/// Record input that passed every field validator.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord {
    pub description: String,
    pub amount: Money,
    pub category: String,
    pub date: String,
}

/// Per-field validation outcome; `None` means the field is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub description: Option<ValidationError>,
    pub amount: Option<ValidationError>,
    pub category: Option<ValidationError>,
    pub date: Option<ValidationError>,
}

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
    }

    /// Field name and error for every failing field, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ValidationError)> {
        [
            ("description", self.description),
            ("amount", self.amount),
            ("category", self.category),
            ("date", self.date),
        ]
        .into_iter()
        .filter_map(|(field, err)| err.map(|err| (field, err)))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, err) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {err}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl RecordDraft {
    /// Validates all four fields at once.
    ///
    /// Description and category are trimmed first, amount and date are taken
    /// verbatim.
    pub fn validate(&self) -> Result<ValidRecord, FieldErrors> {
        let description = self.description.trim();
        let category = self.category.trim();

        let errors = FieldErrors {
            description: validate_description(description).err(),
            amount: validate_amount(&self.amount).err(),
            category: validate_category(category).err(),
            date: validate_date(&self.date).err(),
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let amount = self.amount.parse().map_err(|_| FieldErrors {
            amount: Some(ValidationError::AmountFormat),
            ..FieldErrors::default()
        })?;

        Ok(ValidRecord {
            description: description.to_string(),
            amount,
            category: category.to_string(),
            date: self.date.clone(),
        })
    }
}
