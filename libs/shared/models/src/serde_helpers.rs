//! Boundary deserializers for clinic API payloads.
//!
//! The upstream API is loose about shapes: identifiers arrive as strings or
//! numbers and dates arrive either as plain calendar dates or as full
//! timestamps. These helpers normalise both before the data reaches the
//! booking logic.

use chrono::{DateTime, NaiveDate};
use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

/// Accepts `"42"` or `42` and yields `"42"`.
pub fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = RawId::deserialize(deserializer)?.into_string();
    if id.trim().is_empty() {
        return Err(de::Error::custom("identifier must not be empty"));
    }
    Ok(id)
}

/// Parses `yyyy-MM-dd`, or an RFC 3339 timestamp whose date part is kept as-is.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    // Timestamps without an offset, e.g. "2025-03-03T00:00:00"
    raw.get(..10)
        .filter(|_| raw.as_bytes().get(10) == Some(&b'T'))
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

pub fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid calendar date '{}'", raw)))
}
