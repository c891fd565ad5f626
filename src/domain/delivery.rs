// src/domain/delivery.rs

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::sync::LazyLock;

static YEAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").expect("static regex"));

/// Delivery readiness of a unit, parsed once from the raw `ready_by` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Literal "ready" marker: the unit is already delivered.
    Ready,
    /// Date-only value, taken as midnight UTC.
    Date(NaiveDate),
    /// Timestamp value, kept to the instant.
    At(DateTime<Utc>),
    /// Kept verbatim so the year-token fallback can still look at it.
    Unparsed(String),
}

impl Delivery {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if is_ready_marker(trimmed) {
            return Some(Delivery::Ready);
        }
        if let Some(date) = parse_date(trimmed) {
            return Some(Delivery::Date(date));
        }
        Some(match parse_timestamp(trimmed) {
            Some(at) => Delivery::At(at),
            None => Delivery::Unparsed(trimmed.to_string()),
        })
    }

    /// Calendar date, only when the value actually parsed.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Delivery::Date(d) => Some(*d),
            Delivery::At(at) => Some(at.date_naive()),
            _ => None,
        }
    }

    /// Calendar year bucket: parsed dates by year, otherwise a `20xx` token.
    pub fn year_bucket(&self) -> Option<i32> {
        match self {
            Delivery::Ready => None,
            Delivery::Unparsed(raw) => year_token(raw),
            parsed => parsed.date().map(|d| d.year()),
        }
    }

    /// Delivered on or before `now`. Unparsed values never count as delivered.
    pub fn is_delivered_by(&self, now: DateTime<Utc>) -> bool {
        match self {
            Delivery::Ready => true,
            Delivery::Date(d) => d.and_time(NaiveTime::MIN).and_utc() <= now,
            Delivery::At(at) => *at <= now,
            Delivery::Unparsed(_) => false,
        }
    }

    pub fn as_str(&self) -> String {
        match self {
            Delivery::Ready => "ready".to_string(),
            Delivery::Date(d) => d.format("%Y-%m-%d").to_string(),
            Delivery::At(at) => at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Delivery::Unparsed(raw) => raw.clone(),
        }
    }
}

impl Serialize for Delivery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

fn is_ready_marker(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "ready" | "ready to move" | "ready_to_move" | "delivered"
    )
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"]
        .into_iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// RFC 3339 timestamps, plus the zone-less forms Postgres exports (read as UTC).
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .into_iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.and_utc())
}

fn year_token(raw: &str) -> Option<i32> {
    YEAR_TOKEN
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
