//! Display formatting for dates, money and labels.
//!
//! Formatters never fail: invalid input renders as a fixed fallback
//! (`N/A` for dates, `$0.00` for amounts).

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Shown for missing or unparseable dates.
pub const DATE_FALLBACK: &str = "N/A";

const DATE_FORMAT: &str = "%b %-d, %Y";
const DATE_TIME_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

/// 2^53: largest range in which every whole number of cents is exact.
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

/// Parse an RFC 3339 timestamp, a bare `YYYY-MM-DDTHH:MM:SS` or a
/// `YYYY-MM-DD` date. Timestamps keep the wall-clock time of their offset.
fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `2024-01-05T15:04:00Z` → `Jan 5, 2024`.
pub fn format_date(input: &str) -> String {
    parse_timestamp(input)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| DATE_FALLBACK.to_string())
}

/// `2024-01-05T15:04:00Z` → `Jan 5, 2024, 3:04 PM`.
pub fn format_date_time(input: &str) -> String {
    parse_timestamp(input)
        .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
        .unwrap_or_else(|| DATE_FALLBACK.to_string())
}

/// US-dollar amount with thousands separators: `1234.5` → `$1,234.50`.
///
/// Rounds to whole cents. Any finite amount renders in full; there is no
/// integer cap.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0.00".to_string();
    }
    let cents = (amount.abs() * 100.0).round();
    // At least three digits so there is always a whole part. Past 2^53
    // cents are no longer exact, so large amounts format directly.
    let digits = if cents < MAX_EXACT_CENTS {
        format!("{cents:03.0}")
    } else {
        format!("{:.2}", amount.abs()).replace('.', "")
    };
    let (whole, fraction) = digits.split_at(digits.len() - 2);
    let sign = if amount < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{sign}${}.{fraction}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cut `text` to at most `max_chars` characters, appending `...` if cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// `awaiting_payment` → `Awaiting Payment`.
pub fn humanize_status(status: &str) -> String {
    status
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
