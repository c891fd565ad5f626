// src/catalog/filters.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::ServerError;

/// Filter value meaning "already delivered" rather than a calendar year.
pub const READY_SENTINEL: &str = "Ready";

/// Property types counted as commercial for the category switch.
pub const COMMERCIAL_TYPES: &[&str] = &["office", "retail", "clinic", "commercial"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Residential,
    Commercial,
}

impl Category {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "residential" => Some(Category::Residential),
            "commercial" => Some(Category::Commercial),
            _ => None,
        }
    }

    /// Classifies a normalized property-type name.
    pub fn of_property_type(name: &str) -> Self {
        let lower = name.to_lowercase();
        if COMMERCIAL_TYPES.iter().any(|t| lower.contains(t)) {
            Category::Commercial
        } else {
            Category::Residential
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyBy {
    Ready,
    Year(i32),
}

impl ReadyBy {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(READY_SENTINEL) {
            return Some(ReadyBy::Ready);
        }
        trimmed.parse().ok().map(ReadyBy::Year)
    }
}

impl fmt::Display for ReadyBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyBy::Ready => f.write_str(READY_SENTINEL),
            ReadyBy::Year(y) => write!(f, "{y}"),
        }
    }
}

/// Sparse set of catalog constraints. `None` (or blank text) is "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpecification {
    pub developer: Option<String>,
    pub compound: Option<String>,
    pub area: Option<String>,
    pub areas: Vec<String>,
    pub property_type: Option<String>,
    pub category: Option<Category>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub finishing: Option<String>,
    pub ready_by: Option<ReadyBy>,
    pub search: Option<String>,
}

impl FilterSpecification {
    /// Builds a specification from decoded query-string pairs. Unknown keys are
    /// ignored; malformed numbers are rejected.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, ServerError> {
        let text = |key: &str| params.get(key).and_then(|v| non_blank(v)).map(str::to_string);

        let areas = params
            .get("areas")
            .map(|v| {
                v.split(',')
                    .filter_map(non_blank)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let category = match text("category") {
            None => None,
            Some(raw) => Some(
                Category::parse(&raw)
                    .ok_or_else(|| ServerError::BadRequest(format!("unknown category {raw:?}")))?,
            ),
        };

        let ready_by = match text("ready_by").or_else(|| text("ready_by_year")) {
            None => None,
            Some(raw) => Some(
                ReadyBy::parse(&raw)
                    .ok_or_else(|| ServerError::BadRequest(format!("invalid ready_by {raw:?}")))?,
            ),
        };

        Ok(Self {
            developer: text("developer"),
            compound: text("compound"),
            area: text("area"),
            areas,
            property_type: text("property_type"),
            category,
            bedrooms: number(params, "bedrooms")?,
            bathrooms: number(params, "bathrooms")?,
            min_area: number(params, "min_area")?,
            max_area: number(params, "max_area")?,
            min_price: number(params, "min_price")?,
            max_price: number(params, "max_price")?,
            finishing: text("finishing"),
            ready_by,
            search: text("search"),
        })
    }

    /// Search term as used for matching: trimmed and lowercased.
    pub fn search_term(&self) -> Option<String> {
        self.search.as_deref().and_then(non_blank).map(str::to_lowercase)
    }
}

pub(crate) fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn number<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, ServerError> {
    match params.get(key).and_then(|v| non_blank(v)) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("invalid {key}: {raw:?}"))),
    }
}
