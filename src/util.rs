// Parsing and formatting helpers.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the pipeline can assume clean, typed values.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Parse a date cell as the spreadsheet exports write them.
///
/// Accepts ISO (`2024-01-05`) and day-first (`05/01/2024`) dates, with or
/// without a trailing time component. Returns `None` for anything that
/// cannot be safely parsed.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok()
}

/// `YYYY-MM` label for a date, used when the source has no month column.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places plus locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Render a ratio as a percentage, e.g. `0.0075` -> `"0.75%"`.
pub fn format_percent(ratio: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, ratio * 100.0)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
