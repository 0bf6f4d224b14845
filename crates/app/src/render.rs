//! Turns engine results into terminal text. Nothing here computes totals.

use std::fmt::Write as _;

use chrono::NaiveDate;
use fintrack_engine::{
    BASE_CURRENCY, Record, SearchPattern, Settings,
    stats::{CapOutcome, CapStatus, DisplayCurrency, Summary, TrendDay},
};

const TREND_BAR_WIDTH: usize = 20;
const HIGHLIGHT_OPEN: &str = "\x1b[7m";
const HIGHLIGHT_CLOSE: &str = "\x1b[0m";

/// `2024-03-01` → `March 1, 2024`; anything unparseable is shown as is.
#[must_use]
pub fn format_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|day| day.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

#[must_use]
pub fn format_amount(code: &str, value: i64) -> String {
    format!("{code} {value}")
}

#[must_use]
pub fn records_table(
    records: &[Record],
    settings: &Settings,
    search: Option<&SearchPattern>,
    only_matches: bool,
) -> String {
    let currency = DisplayCurrency::resolve(settings);
    // Width is measured on the plain text; escape codes take no columns.
    let highlight = |text: &str, width: usize| {
        let padding = " ".repeat(width.saturating_sub(text.chars().count()));
        match search {
            Some(pattern) => {
                pattern.highlight(text, HIGHLIGHT_OPEN, HIGHLIGHT_CLOSE) + &padding
            }
            None => format!("{text}{padding}"),
        }
    };

    let mut out = String::new();
    for record in records {
        if only_matches && search.is_some_and(|pattern| !pattern.matches(record)) {
            continue;
        }
        let _ = writeln!(
            out,
            "{:<24} {} {:>16} {} {}",
            record.id,
            highlight(&record.description, 40),
            format_amount(&currency.code, currency.convert(record.amount)),
            highlight(&record.category, 16),
            format_date(&record.date),
        );
    }

    if out.is_empty() {
        return "No records found.\n".to_string();
    }
    format!(
        "{:<24} {:<40} {:>16} {:<16} {}\n{out}",
        "ID", "Description", "Amount", "Category", "Date"
    )
}

#[must_use]
pub fn cap_message(cap: &CapStatus, code: &str) -> String {
    match cap.outcome {
        CapOutcome::Over { surplus } => format!(
            "⚠️ You have exceeded your monthly cap by {}!",
            format_amount(code, surplus.display)
        ),
        CapOutcome::Within { remaining } => format!(
            "✅ You have {} remaining this month.",
            format_amount(code, remaining.display)
        ),
    }
}

#[must_use]
pub fn trend_line(day: &TrendDay) -> String {
    let filled = ((day.height / 100.0 * TREND_BAR_WIDTH as f64).round() as usize)
        .clamp(1, TREND_BAR_WIDTH);
    let empty = TREND_BAR_WIDTH - filled;
    format!(
        "{} {}{} {}",
        day.label,
        "█".repeat(filled),
        "░".repeat(empty),
        format_amount(BASE_CURRENCY, day.total.to_major().round() as i64),
    )
}

#[must_use]
pub fn dashboard(summary: &Summary) -> String {
    let code = summary.currency.code.as_str();
    let mut out = String::new();

    let _ = writeln!(out, "Total records:  {}", summary.record_count);
    let _ = writeln!(
        out,
        "Total amount:   {}",
        format_amount(code, summary.total.display)
    );
    let _ = writeln!(
        out,
        "Top category:   {}",
        summary.top_category.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "Monthly cap:    {} / {}",
        format_amount(code, summary.cap.spent.display),
        format_amount(code, summary.cap.cap.display)
    );
    let _ = writeln!(out, "{}", cap_message(&summary.cap, code));

    let _ = writeln!(out, "\nThis week");
    for day in &summary.trend {
        let _ = writeln!(out, "  {}", trend_line(day));
    }

    let _ = writeln!(out, "\nThis month by category");
    if summary.categories.is_empty() {
        let _ = writeln!(out, "  No expenses this month.");
    }
    for entry in &summary.categories {
        let _ = writeln!(
            out,
            "  {:<16} {}",
            entry.category.to_uppercase(),
            format_amount(code, entry.total.display)
        );
    }

    out
}

#[must_use]
pub fn settings_view(settings: &Settings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Categories:       {}", settings.categories.join(", "));
    let _ = writeln!(out, "Currencies:");
    for currency in &settings.currencies {
        let _ = writeln!(
            out,
            "  {:<6} 1 = {} {BASE_CURRENCY}",
            currency.code, currency.rate
        );
    }
    let _ = writeln!(out, "Display currency: {}", settings.display_currency);
    let _ = writeln!(
        out,
        "Monthly cap:      {BASE_CURRENCY} {}",
        settings.monthly_cap
    );
    out
}
