// src/domain/reference.rs

//! Normalization of reference fields (developer, compound, area, property type).
//!
//! The store hands these back either as a structured object or as a legacy
//! string holding a Python-style dict (`{'id': 7, 'name': 'Mountain View'}`,
//! with `None` for nulls). Everything downstream only ever sees
//! [`NormalizedReference`] or `None`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Longest quoted fragment or bare string accepted as a name by the loose rules.
const MAX_LOOSE_NAME_LEN: usize = 100;
/// How many levels of reference-within-reference are followed.
const MAX_NESTING: usize = 4;

/// A reference field exactly as the store returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawReference {
    Object(Map<String, Value>),
    Text(String),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
}

impl NormalizedReference {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// `None` in value position only, so quoted names containing the word survive.
static NULL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([:\[,]\s*)None\b").expect("static regex"));

static ID_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]?\bid['"]?\s*:\s*['"]?(-?\d+)"#).expect("static regex")
});

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'([^']{2,100})'|"([^"]{2,100})""#).expect("static regex")
});

/// Name-extraction rules tried in order once structured parsing has failed.
static NAME_RULES: LazyLock<[(&'static str, Regex); 4]> = LazyLock::new(|| {
    [
        (
            "single-quoted key",
            Regex::new(r"'name'\s*:\s*'([^']+)'").expect("static regex"),
        ),
        (
            "double-quoted key",
            Regex::new(r#""name"\s*:\s*"([^"]+)""#).expect("static regex"),
        ),
        (
            "bare key, single-quoted value",
            Regex::new(r"\bname\s*:\s*'([^']+)'").expect("static regex"),
        ),
        (
            "bare key, double-quoted value",
            Regex::new(r#"\bname\s*:\s*"([^"]+)""#).expect("static regex"),
        ),
    ]
});

/// Normalizes one reference field. Never fails; unresolvable input is `None`.
pub fn normalize_reference(raw: &RawReference) -> Option<NormalizedReference> {
    resolve(raw, 0)
}

fn resolve(raw: &RawReference, depth: usize) -> Option<NormalizedReference> {
    match raw {
        RawReference::Object(map) => from_object(map, depth),
        RawReference::Text(text) => resolve_text(text, depth),
        RawReference::Other(_) => None,
    }
}

fn from_object(map: &Map<String, Value>, depth: usize) -> Option<NormalizedReference> {
    if depth > MAX_NESTING {
        return None;
    }

    let id = map.get("id").and_then(value_as_id);
    match map.get("name")? {
        Value::String(name) => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return None;
            }
            // A name that is itself an encoded record.
            if trimmed.starts_with('{') {
                return resolve_text(trimmed, depth + 1);
            }
            Some(NormalizedReference {
                id,
                name: trimmed.to_string(),
            })
        }
        Value::Object(inner) => from_object(inner, depth + 1),
        _ => None,
    }
}

fn value_as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn resolve_text(text: &str, depth: usize) -> Option<NormalizedReference> {
    let trimmed = text.trim();
    if trimmed.is_empty() || depth > MAX_NESTING {
        return None;
    }

    let rewritten = NULL_LITERAL.replace_all(trimmed, "${1}null").replace('\'', "\"");
    if let Ok(value) = serde_json::from_str::<Value>(&rewritten) {
        if let Value::Object(map) = &value {
            if let Some(found) = from_object(map, depth) {
                tracing::trace!(rule = "structured", name = %found.name, "reference resolved");
                return Some(found);
            }
        }
    }

    let found = fallback(trimmed);
    if found.is_none() {
        tracing::trace!(raw = %trimmed, "reference unresolved");
    }
    found
}

fn fallback(text: &str) -> Option<NormalizedReference> {
    let id = ID_FIELD
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok());

    for (rule, pattern) in NAME_RULES.iter() {
        let name = pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty());
        if let Some(name) = name {
            tracing::trace!(rule, name, "reference resolved");
            return Some(NormalizedReference {
                id,
                name: name.to_string(),
            });
        }
    }

    if let Some(name) = first_quoted_value(text) {
        tracing::trace!(rule = "quoted fragment", name, "reference resolved");
        return Some(NormalizedReference {
            id,
            name: name.to_string(),
        });
    }

    if is_plain_name(text) {
        tracing::trace!(rule = "raw string", name = text, "reference resolved");
        return Some(NormalizedReference::named(text));
    }

    None
}

/// First quoted fragment that is neither a key nor an identifier.
fn first_quoted_value(text: &str) -> Option<&str> {
    QUOTED.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let inner = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();

        let is_key = text
            .get(whole.end()..)
            .and_then(|rest| rest.trim_start().chars().next())
            == Some(':');
        if is_key || looks_like_id(inner) || !inner.chars().any(char::is_alphanumeric) {
            return None;
        }
        Some(inner)
    })
}

fn looks_like_id(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower == "id" || lower.ends_with("_id") || s.chars().all(|c| c.is_ascii_digit())
}

fn is_plain_name(text: &str) -> bool {
    const STRUCTURAL: &[char] = &['{', '}', '[', ']', ':', ',', '\'', '"'];

    !text.is_empty()
        && text.chars().count() <= MAX_LOOSE_NAME_LEN
        && !text.contains(STRUCTURAL)
        && !matches!(text, "None" | "null")
}
