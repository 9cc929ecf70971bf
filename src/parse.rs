//! Parse-or-default helpers applied at every input boundary of the engine.
//!
//! Engine functions never fail on malformed numeric or date input. Each
//! coercion lives here so the fallback value is explicit and tested once.

use chrono::NaiveDate;

pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

pub fn finite_or_zero(value: f64) -> f64 {
    finite_or(value, 0.0)
}

/// Reads an optional number, treating absent and non-finite values alike.
pub fn finite_opt(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

pub fn iso_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Clamps a requested headcount into `[min, max]`; zero and absent counts
/// fall back to `min`.
pub fn headcount(raw: Option<i64>, min: u32, max: u32) -> u32 {
    let value = raw.unwrap_or(0);
    if value <= 0 {
        return min;
    }
    u32::try_from(value).unwrap_or(max).clamp(min, max)
}

pub fn headcount_from_json(raw: Option<&serde_json::Value>, min: u32, max: u32) -> u32 {
    let parsed = raw.and_then(|value| match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
        _ => None,
    });
    headcount(parsed, min, max)
}

pub fn json_text(raw: Option<&serde_json::Value>) -> String {
    match raw {
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
