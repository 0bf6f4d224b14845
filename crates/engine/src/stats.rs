//! Currency conversion and aggregate statistics.
//!
//! Everything here is a pure function of `(records, settings, today)`: no
//! caching, no state, no formatting. Rendering the results is the caller's
//! job.
//!
//! ## Conversion
//!
//! Amounts are stored in the base currency. For display they are divided by
//! the rate of the selected display currency and rounded to whole display
//! units. An unknown display currency, or a rate that is not a positive finite
//! number, falls back to the base currency with rate 1.

use chrono::{Datelike, Days, NaiveDate};

use crate::{BASE_CURRENCY, Money, Record, Settings};

/// Height given to a trend bar whose day has no spending, in percent.
pub const TREND_FLOOR_PERCENT: f64 = 4.0;

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// The currency amounts are shown in, with its resolved rate.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCurrency {
    pub code: String,
    pub rate: f64,
}

impl DisplayCurrency {
    #[must_use]
    pub fn base() -> Self {
        Self {
            code: BASE_CURRENCY.to_string(),
            rate: 1.0,
        }
    }

    #[must_use]
    pub fn resolve(settings: &Settings) -> Self {
        if settings.display_currency == BASE_CURRENCY {
            return Self::base();
        }
        match settings.currency(&settings.display_currency) {
            Some(currency) if currency.rate.is_finite() && currency.rate > 0.0 => Self {
                code: currency.code.clone(),
                rate: currency.rate,
            },
            _ => Self::base(),
        }
    }

    /// `round(amount / rate)` in whole display units.
    #[must_use]
    pub fn convert(&self, amount: Money) -> i64 {
        (amount.to_major() / self.rate).round() as i64
    }

    #[must_use]
    pub fn amount(&self, base: Money) -> DisplayAmount {
        DisplayAmount {
            base,
            display: self.convert(base),
        }
    }
}

/// A base-currency amount together with its converted, rounded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayAmount {
    pub base: Money,
    pub display: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapOutcome {
    /// Spending exceeded the cap by `surplus`.
    Over { surplus: DisplayAmount },
    /// Spending is within the cap, `remaining` is left.
    Within { remaining: DisplayAmount },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapStatus {
    /// `YYYY-MM` of the evaluated month.
    pub month: String,
    pub spent: DisplayAmount,
    pub cap: DisplayAmount,
    pub outcome: CapOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendDay {
    pub date: NaiveDate,
    pub label: &'static str,
    pub total: Money,
    /// Bar height in percent of the busiest day.
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: DisplayAmount,
}

/// Everything the dashboard shows, computed in one pass over the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub currency: DisplayCurrency,
    pub record_count: usize,
    pub total: DisplayAmount,
    /// `None` when there are no records.
    pub top_category: Option<String>,
    pub cap: CapStatus,
    pub trend: Vec<TrendDay>,
    pub categories: Vec<CategoryTotal>,
}

#[must_use]
pub fn summarize(records: &[Record], settings: &Settings, today: NaiveDate) -> Summary {
    let currency = DisplayCurrency::resolve(settings);
    let total = records.iter().map(|record| record.amount).sum();

    Summary {
        record_count: records.len(),
        total: currency.amount(total),
        top_category: top_category(records),
        cap: cap_status(records, settings, today),
        trend: weekly_trend(records, today),
        categories: monthly_category_totals(records, settings, today),
        currency,
    }
}

/// Category with the highest total; the first one seen wins a tie.
#[must_use]
pub fn top_category(records: &[Record]) -> Option<String> {
    let mut totals: Vec<(&str, Money)> = Vec::new();
    for record in records {
        add_to(&mut totals, &record.category, record.amount);
    }

    let mut best: Option<(&str, Money)> = None;
    for (category, total) in totals {
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((category, total)),
        }
    }
    best.map(|(category, _)| category.to_string())
}

#[must_use]
pub fn cap_status(records: &[Record], settings: &Settings, today: NaiveDate) -> CapStatus {
    let currency = DisplayCurrency::resolve(settings);
    let month = month_key(today);
    let spent: Money = records
        .iter()
        .filter(|record| record.in_month(&month))
        .map(|record| record.amount)
        .sum();
    let cap = settings.monthly_cap;

    let outcome = if spent > cap {
        CapOutcome::Over {
            surplus: currency.amount(spent - cap),
        }
    } else {
        CapOutcome::Within {
            remaining: currency.amount(cap - spent),
        }
    };

    CapStatus {
        month,
        spent: currency.amount(spent),
        cap: currency.amount(cap),
        outcome,
    }
}

/// Daily totals for Monday..Sunday of the week containing `today`.
///
/// Days after `today` are part of the window, so future-dated records in the
/// current week show up on their own day.
///
/// Totals stay in the base currency. Heights are relative to the busiest day,
/// with the maximum floored at one base unit; a day without spending gets
/// [`TREND_FLOOR_PERCENT`] so it is still drawn.
#[must_use]
pub fn weekly_trend(records: &[Record], today: NaiveDate) -> Vec<TrendDay> {
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));

    let days: Vec<(NaiveDate, Money)> = (0..7u64)
        .map(|offset| {
            let date = monday + Days::new(offset);
            let key = date.format("%Y-%m-%d").to_string();
            let total = records
                .iter()
                .filter(|record| record.date == key)
                .map(|record| record.amount)
                .sum();
            (date, total)
        })
        .collect();

    let max = days
        .iter()
        .map(|(_, total)| total.to_major())
        .fold(1.0_f64, f64::max);

    days.into_iter()
        .zip(WEEKDAY_LABELS)
        .map(|((date, total), label)| {
            let mut height = total.to_major() / max * 100.0;
            if height == 0.0 {
                height = TREND_FLOOR_PERCENT;
            }
            TrendDay {
                date,
                label,
                total,
                height,
            }
        })
        .collect()
}

/// Current-month totals per category.
///
/// Configured categories come first in configured order, followed by any
/// other category found in the records in first-seen order. Zero totals are
/// left out.
#[must_use]
pub fn monthly_category_totals(
    records: &[Record],
    settings: &Settings,
    today: NaiveDate,
) -> Vec<CategoryTotal> {
    let currency = DisplayCurrency::resolve(settings);
    let month = month_key(today);

    let mut totals: Vec<(&str, Money)> = settings
        .categories
        .iter()
        .map(|category| (category.as_str(), Money::ZERO))
        .collect();
    for record in records.iter().filter(|record| record.in_month(&month)) {
        add_to(&mut totals, &record.category, record.amount);
    }

    totals
        .into_iter()
        .filter(|(_, total)| !total.is_zero())
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total: currency.amount(total),
        })
        .collect()
}

fn add_to<'a>(totals: &mut Vec<(&'a str, Money)>, category: &'a str, amount: Money) {
    match totals.iter_mut().find(|(name, _)| *name == category) {
        Some((_, total)) => *total += amount,
        None => totals.push((category, amount)),
    }
}

fn month_key(today: NaiveDate) -> String {
    today.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::CurrencyRate;

    fn record(amount: i64, date: &str, category: &str) -> Record {
        Record {
            id: format!("rec_{date}_{category}_{amount}"),
            description: "Test".to_string(),
            amount: Money::from_major(amount),
            category: category.to_string(),
            date: date.to_string(),
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    fn with_display(code: &str, currencies: Vec<CurrencyRate>) -> Settings {
        Settings {
            currencies,
            display_currency: code.to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn resolves_configured_display_currency() {
        let settings = with_display("USD", vec![CurrencyRate::new("USD", 1000.0)]);
        let currency = DisplayCurrency::resolve(&settings);
        assert_eq!(currency.code, "USD");
        assert_eq!(currency.convert(Money::from_major(5000)), 5);
    }

    #[test]
    fn falls_back_to_base_for_unknown_or_bad_rates() {
        for settings in [
            with_display("GBP", vec![CurrencyRate::new("USD", 1000.0)]),
            with_display("USD", vec![CurrencyRate::new("USD", 0.0)]),
            with_display("USD", vec![CurrencyRate::new("USD", -3.0)]),
            with_display("USD", vec![CurrencyRate::new("USD", f64::INFINITY)]),
        ] {
            let currency = DisplayCurrency::resolve(&settings);
            assert_eq!(currency, DisplayCurrency::base());
            assert_eq!(currency.convert(Money::from_major(5000)), 5000);
        }
    }

    #[test]
    fn conversion_rounds_to_nearest_unit() {
        let currency = DisplayCurrency {
            code: "USD".to_string(),
            rate: 1456.0,
        };
        assert_eq!(currency.convert(Money::from_major(2184)), 2);
        assert_eq!(currency.convert(Money::from_major(2183)), 1);
        assert_eq!(currency.convert(Money::ZERO), 0);
    }

    #[test]
    fn over_cap_reports_surplus() {
        let records = vec![
            record(1000, "2024-03-01", "Food"),
            record(2000, "2024-03-01", "Food"),
            record(9000, "2024-02-28", "Food"),
        ];
        let settings = Settings {
            monthly_cap: Money::from_major(2500),
            ..Settings::default()
        };
        let status = cap_status(&records, &settings, day("2024-03-15"));
        assert_eq!(status.month, "2024-03");
        assert_eq!(status.spent.display, 3000);
        assert_eq!(status.cap.display, 2500);
        assert_eq!(
            status.outcome,
            CapOutcome::Over {
                surplus: DisplayAmount {
                    base: Money::from_major(500),
                    display: 500
                }
            }
        );
    }

    #[test]
    fn within_cap_reports_remaining_in_display_currency() {
        let records = vec![record(1000, "2024-03-01", "Food")];
        let settings = Settings {
            monthly_cap: Money::from_major(3000),
            ..with_display("USD", vec![CurrencyRate::new("USD", 1000.0)])
        };
        let status = cap_status(&records, &settings, day("2024-03-31"));
        assert_eq!(
            status.outcome,
            CapOutcome::Within {
                remaining: DisplayAmount {
                    base: Money::from_major(2000),
                    display: 2
                }
            }
        );
    }

    #[test]
    fn spending_exactly_the_cap_is_within() {
        let records = vec![record(2500, "2024-03-01", "Food")];
        let settings = Settings {
            monthly_cap: Money::from_major(2500),
            ..Settings::default()
        };
        let status = cap_status(&records, &settings, day("2024-03-02"));
        assert!(matches!(status.outcome, CapOutcome::Within { remaining } if remaining.display == 0));
    }

    #[test]
    fn top_category_prefers_first_seen_on_ties() {
        assert_eq!(top_category(&[]), None);

        let records = vec![
            record(100, "2024-03-01", "Books"),
            record(50, "2024-03-01", "Food"),
            record(50, "2024-03-02", "Food"),
        ];
        assert_eq!(top_category(&records).as_deref(), Some("Books"));

        let records = vec![
            record(100, "2024-03-01", "Books"),
            record(150, "2024-03-02", "Food"),
        ];
        assert_eq!(top_category(&records).as_deref(), Some("Food"));
    }

    #[test]
    fn trend_covers_monday_to_sunday_of_current_week() {
        let records = vec![
            record(200, "2024-03-04", "Food"),
            record(100, "2024-03-06", "Food"),
            record(100, "2024-03-06", "Books"),
            // Sunday, still ahead of `today`.
            record(50, "2024-03-10", "Food"),
            record(999, "2024-03-03", "Food"),
        ];
        // Wednesday.
        let trend = weekly_trend(&records, day("2024-03-06"));

        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, day("2024-03-04"));
        assert_eq!(trend[6].date, day("2024-03-10"));
        assert_eq!(
            trend.iter().map(|d| d.label).collect::<Vec<_>>(),
            WEEKDAY_LABELS
        );
        assert_eq!(trend[0].total, Money::from_major(200));
        assert_eq!(trend[0].height, 100.0);
        assert_eq!(trend[2].total, Money::from_major(200));
        assert_eq!(trend[6].height, 25.0);
        assert_eq!(trend[1].height, TREND_FLOOR_PERCENT);
    }

    #[test]
    fn trend_on_sunday_and_empty_week() {
        let trend = weekly_trend(&[], day("2024-03-10"));
        assert_eq!(trend[0].date, day("2024-03-04"));
        assert!(trend.iter().all(|d| d.height == TREND_FLOOR_PERCENT));
    }

    #[test]
    fn category_totals_keep_unconfigured_and_skip_zero() {
        let records = vec![
            record(300, "2024-03-01", "Transport"),
            record(100, "2024-03-02", "Gifts"),
            record(200, "2024-03-03", "Food"),
            record(700, "2024-02-03", "Books"),
        ];
        let totals = monthly_category_totals(&records, &Settings::default(), day("2024-03-20"));
        let names: Vec<_> = totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, ["Food", "Transport", "Gifts"]);
        assert_eq!(totals[0].total.display, 200);
        assert_eq!(totals[2].total.base, Money::from_major(100));
    }

    #[test]
    fn summary_is_idempotent() {
        let records = vec![
            record(1000, "2024-03-01", "Food"),
            record(2000, "2024-03-05", "Books"),
        ];
        let settings = Settings::default();
        let today = day("2024-03-06");
        let first = summarize(&records, &settings, today);
        let second = summarize(&records, &settings, today);
        assert_eq!(first, second);
        assert_eq!(first.record_count, 2);
        assert_eq!(first.total.display, 3000);
        assert_eq!(first.top_category.as_deref(), Some("Books"));
    }
}
