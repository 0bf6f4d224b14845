//! User settings: categories, convertible currencies, display currency and
//! monthly cap.
//!
//! ## Stored shape
//!
//! Older versions stored the exchange rates as a fixed two-field map
//! (`"rates": {"USD": 1456, "EUR": 1720}`) instead of a currency list. The
//! stored blob is decoded into [`StoredSettings`], a patch in which every key
//! is optional, and whose rate table is one of the two shapes. The patch is
//! then merged over [`Settings::default`], so the rest of the engine only ever
//! sees the canonical [`Settings`].

use serde::{Deserialize, Serialize};

use crate::{
    BASE_CURRENCY, EngineError, Money, ResultEngine, validate::validate_category,
};

/// A user-defined currency: `rate` is how many base units one unit is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub code: String,
    pub rate: f64,
}

impl CurrencyRate {
    #[must_use]
    pub fn new(code: impl Into<String>, rate: f64) -> Self {
        Self {
            code: code.into(),
            rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub categories: Vec<String>,
    pub currencies: Vec<CurrencyRate>,
    pub display_currency: String,
    pub monthly_cap: Money,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            categories: ["Food", "Books", "Transport", "Entertainment", "Fees", "Other"]
                .into_iter()
                .map(String::from)
                .collect(),
            currencies: vec![
                CurrencyRate::new("USD", 1456.0),
                CurrencyRate::new("EUR", 1720.0),
            ],
            display_currency: BASE_CURRENCY.to_string(),
            monthly_cap: Money::from_major(500_000),
        }
    }
}

impl Settings {
    /// Looks up a configured currency by code.
    #[must_use]
    pub fn currency(&self, code: &str) -> Option<&CurrencyRate> {
        self.currencies.iter().find(|currency| currency.code == code)
    }

    /// Adds a category. Returns `false` if it was already configured.
    pub fn add_category(&mut self, name: &str) -> ResultEngine<bool> {
        let name = name.trim();
        validate_category(name)?;
        if self.categories.iter().any(|category| category == name) {
            return Ok(false);
        }
        self.categories.push(name.to_string());
        Ok(true)
    }

    /// Removes a category, refusing to remove the last one.
    pub fn remove_category(&mut self, name: &str) -> ResultEngine<()> {
        let index = self
            .categories
            .iter()
            .position(|category| category == name)
            .ok_or_else(|| EngineError::KeyNotFound(name.to_string()))?;
        if self.categories.len() <= 1 {
            return Err(EngineError::LastCategory);
        }
        self.categories.remove(index);
        Ok(())
    }

    /// Adds a convertible currency. The code is trimmed and upper-cased.
    pub fn add_currency(&mut self, code: &str, rate: f64) -> ResultEngine<String> {
        let code = code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(EngineError::InvalidCurrency(
                "Please enter a currency code (e.g., GBP).".to_string(),
            ));
        }
        if code == BASE_CURRENCY {
            return Err(EngineError::InvalidCurrency(format!(
                "{BASE_CURRENCY} is the base currency and cannot be added as a convertible currency."
            )));
        }
        ensure_rate(rate)?;
        if self.currency(&code).is_some() {
            return Err(EngineError::ExistingKey(code));
        }
        self.currencies.push(CurrencyRate::new(code.clone(), rate));
        Ok(code)
    }

    /// Removes a currency, refusing to remove the last one. If it was the
    /// display currency, display falls back to the base currency.
    pub fn remove_currency(&mut self, code: &str) -> ResultEngine<()> {
        let index = self
            .currencies
            .iter()
            .position(|currency| currency.code == code)
            .ok_or_else(|| EngineError::KeyNotFound(code.to_string()))?;
        if self.currencies.len() <= 1 {
            return Err(EngineError::LastCurrency);
        }
        self.currencies.remove(index);
        if self.display_currency == code {
            self.display_currency = BASE_CURRENCY.to_string();
        }
        Ok(())
    }

    pub fn set_currency_rate(&mut self, code: &str, rate: f64) -> ResultEngine<()> {
        ensure_rate(rate)?;
        let currency = self
            .currencies
            .iter_mut()
            .find(|currency| currency.code == code)
            .ok_or_else(|| EngineError::KeyNotFound(code.to_string()))?;
        currency.rate = rate;
        Ok(())
    }

    /// Selects the display currency: the base code or a configured one.
    pub fn set_display_currency(&mut self, code: &str) -> ResultEngine<()> {
        let code = code.trim().to_ascii_uppercase();
        if code != BASE_CURRENCY && self.currency(&code).is_none() {
            return Err(EngineError::KeyNotFound(code));
        }
        self.display_currency = code;
        Ok(())
    }

    pub fn set_monthly_cap(&mut self, cap: Money) -> ResultEngine<()> {
        if cap.is_negative() {
            return Err(EngineError::InvalidAmount(
                "monthly cap must not be negative".to_string(),
            ));
        }
        self.monthly_cap = cap;
        Ok(())
    }
}

fn ensure_rate(rate: f64) -> ResultEngine<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(EngineError::InvalidCurrency(
            "Please enter a valid positive rate.".to_string(),
        ));
    }
    Ok(())
}

/// Fixed-code rate map used before currencies became a list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LegacyRates {
    #[serde(rename = "USD")]
    pub usd: Option<f64>,
    #[serde(rename = "EUR")]
    pub eur: Option<f64>,
}

impl LegacyRates {
    fn into_currencies(self) -> Vec<CurrencyRate> {
        [("USD", self.usd), ("EUR", self.eur)]
            .into_iter()
            .filter_map(|(code, rate)| {
                rate.filter(|rate| *rate != 0.0)
                    .map(|rate| CurrencyRate::new(code, rate))
            })
            .collect()
    }
}

/// Whichever rate table a stored settings blob carries.
#[derive(Debug, Clone, PartialEq)]
pub enum RateTable {
    Current(Vec<CurrencyRate>),
    Legacy(LegacyRates),
    Absent,
}

/// Settings as found in storage: any key may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    pub categories: Option<Vec<String>>,
    pub currencies: Option<Vec<CurrencyRate>>,
    pub rates: Option<LegacyRates>,
    pub display_currency: Option<String>,
    pub monthly_cap: Option<Money>,
}

impl StoredSettings {
    /// A currency list always wins over the legacy map.
    #[must_use]
    pub fn rate_table(&self) -> RateTable {
        match (&self.currencies, &self.rates) {
            (Some(list), _) => RateTable::Current(list.clone()),
            (None, Some(legacy)) => RateTable::Legacy(legacy.clone()),
            (None, None) => RateTable::Absent,
        }
    }

    /// Migrates and merges the stored keys over the defaults.
    ///
    /// Empty category or currency lists count as missing so the result always
    /// holds at least one of each.
    #[must_use]
    pub fn into_settings(self) -> Settings {
        let defaults = Settings::default();
        let currencies = match self.rate_table() {
            RateTable::Current(list) => list,
            RateTable::Legacy(legacy) => {
                tracing::info!("migrating legacy rate map to currency list");
                legacy.into_currencies()
            }
            RateTable::Absent => Vec::new(),
        };

        Settings {
            categories: self
                .categories
                .filter(|categories| !categories.is_empty())
                .unwrap_or(defaults.categories),
            currencies: Some(currencies)
                .filter(|currencies| !currencies.is_empty())
                .unwrap_or(defaults.currencies),
            display_currency: self.display_currency.unwrap_or(defaults.display_currency),
            monthly_cap: self.monthly_cap.unwrap_or(defaults.monthly_cap),
        }
    }
}
