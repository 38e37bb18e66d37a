//! Cell and header normalisation shared by every table source.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Canonical column name: trimmed, lower-case, with inner whitespace and
/// hyphens folded to `_`. Warehouses hand back `INFLUENCER_ID`, exports
/// sometimes carry `Total Payout`.
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().trim_start_matches('\u{feff}').chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_sep = !out.is_empty();
            continue;
        }
        if pending_sep {
            out.push('_');
            pending_sep = false;
        }
        out.extend(ch.to_lowercase());
    }
    out
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse an ISO-ish date or timestamp to its calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
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
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Parse a currency amount. Empty cells count as zero, matching how the
/// upstream sums skip missing values. Negative and non-finite values are
/// rejected.
pub fn parse_amount(raw: &str) -> Result<f64, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !value.is_finite() {
        return Err(format!("'{s}' is not a finite amount"));
    }
    if value < 0.0 {
        return Err(format!("amount {value} is negative"));
    }
    Ok(value)
}

/// Lenient numeric parse used for optional engagement columns.
pub fn parse_metric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
