//! Lenient cell coercion shared by every CSV schema.
//!
//! Marketing exports are dirty: blank cells, thousands separators, currency
//! symbols, spelled-out months. Nothing in here returns an error; values
//! that cannot be read degrade to 0 / `None` and the caller decides.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

lazy_static! {
    static ref NUMERIC: Regex =
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([Ee][+-]?\d+)?$").expect("valid numeric pattern");
    static ref STORE_BRAND: Regex =
        Regex::new(r"(?i)^Visit the\s+(.*?)\s+Store$").expect("valid store brand pattern");
}

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Coerce a raw cell to a number. Blank, non-numeric and non-finite cells are 0.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if !NUMERIC.is_match(trimmed) {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse a price cell such as `$1,299.99`. `None` when nothing numeric remains.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if !NUMERIC.is_match(cleaned) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strip the Amazon storefront wrapper: `Visit the Medela Store` -> `Medela`.
pub fn clean_store_brand(raw: &str) -> String {
    let trimmed = raw.trim();
    match STORE_BRAND.captures(trimmed) {
        Some(caps) => caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        None => trimmed.to_string(),
    }
}

/// First whitespace-separated token of a month label (`"Jan 2024"` -> `"Jan"`).
pub fn month_token(label: &str) -> &str {
    label.split_whitespace().next().unwrap_or("")
}

/// Calendar month parsed out of a month-year label, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Accepts `Jan 2024`, `January 2024` and `2024-01`.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        let date = NaiveDate::parse_from_str(&format!("1 {}", label), "%d %B %Y")
            .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", label), "%Y-%m-%d"))
            .ok()?;
        Some(Self {
            year: date.year(),
            month: date.month(),
        })
    }

    pub fn short_name(&self) -> &'static str {
        MONTH_NAMES[(self.month as usize).saturating_sub(1) % 12]
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.short_name(), self.year)
    }
}

/// Parse a post date (`2024-05-01`, `2024-05-01T10:00:00Z`, `05/01/2024`).
pub fn parse_post_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

/// serde adapter: numeric column that never fails to decode.
pub fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(coerce_number).unwrap_or(0.0))
}

/// serde adapter: categorical column, trimmed, blank when absent.
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| s.trim().to_string()).unwrap_or_default())
}
