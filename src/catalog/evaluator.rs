// src/catalog/evaluator.rs

//! In-memory evaluation of the client-side part of a filter specification.
//!
//! Stages run in a fixed order, each narrowing the output of the previous
//! one: search, developer, compound, area, property type, delivery. A record
//! whose reference failed to normalize never satisfies a filter on it.

use chrono::{DateTime, Utc};

use crate::catalog::filters::{non_blank, Category, FilterSpecification, ReadyBy};
use crate::domain::{PropertyRecord, ReferenceField};

pub struct Evaluator<'a> {
    filters: &'a FilterSpecification,
    search: Option<String>,
    now: DateTime<Utc>,
    pushdown: bool,
}

impl<'a> Evaluator<'a> {
    pub fn new(filters: &'a FilterSpecification, now: DateTime<Utc>) -> Self {
        Self {
            filters,
            search: filters.search_term(),
            now,
            pushdown: false,
        }
    }

    /// Also apply the predicates normally pushed down to the store, with the
    /// same exact/substring semantics.
    pub fn with_pushdown(mut self) -> Self {
        self.pushdown = true;
        self
    }

    pub fn evaluate(&self, mut corpus: Vec<PropertyRecord>) -> Vec<PropertyRecord> {
        let before = corpus.len();

        corpus.retain(|r| self.matches_search(r));
        corpus.retain(|r| fragment(r, ReferenceField::Developer, &self.filters.developer));
        corpus.retain(|r| fragment(r, ReferenceField::Compound, &self.filters.compound));
        corpus.retain(|r| self.matches_area(r));
        corpus.retain(|r| self.matches_property_type(r));
        corpus.retain(|r| self.matches_delivery(r));
        if self.pushdown {
            corpus.retain(|r| self.matches_pushdown(r));
        }

        tracing::debug!(before, after = corpus.len(), "client filters applied");
        corpus
    }

    fn matches_search(&self, r: &PropertyRecord) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };

        let names = [
            ReferenceField::Developer,
            ReferenceField::Compound,
            ReferenceField::Area,
            ReferenceField::PropertyType,
        ]
        .into_iter()
        .filter_map(|f| r.reference_name(f));
        let units = [r.unit_id.as_deref(), r.unit_number.as_deref()]
            .into_iter()
            .flatten();

        names.chain(units).any(|s| contains_ci(s, term))
    }

    fn matches_area(&self, r: &PropertyRecord) -> bool {
        if !fragment(r, ReferenceField::Area, &self.filters.area) {
            return false;
        }

        let wanted: Vec<&str> = self.filters.areas.iter().filter_map(|a| non_blank(a)).collect();
        if wanted.is_empty() {
            return true;
        }
        match r.reference_name(ReferenceField::Area) {
            Some(name) => wanted.iter().any(|w| contains_ci(name, &w.to_lowercase())),
            None => false,
        }
    }

    fn matches_property_type(&self, r: &PropertyRecord) -> bool {
        if !fragment(r, ReferenceField::PropertyType, &self.filters.property_type) {
            return false;
        }
        match self.filters.category {
            None => true,
            Some(category) => r
                .reference_name(ReferenceField::PropertyType)
                .is_some_and(|name| Category::of_property_type(name) == category),
        }
    }

    fn matches_delivery(&self, r: &PropertyRecord) -> bool {
        match self.filters.ready_by {
            None => true,
            Some(ReadyBy::Ready) => r
                .delivery
                .as_ref()
                .is_some_and(|d| d.is_delivered_by(self.now)),
            Some(ReadyBy::Year(year)) => r
                .delivery
                .as_ref()
                .and_then(|d| d.date())
                .is_some_and(|d| chrono::Datelike::year(&d) == year),
        }
    }

    fn matches_pushdown(&self, r: &PropertyRecord) -> bool {
        let f = self.filters;
        let exact = |want: Option<i64>, got: Option<i64>| want.map_or(true, |w| got == Some(w));
        let at_least = |bound: Option<f64>, got: Option<f64>| bound.map_or(true, |b| got.is_some_and(|g| g >= b));
        let at_most = |bound: Option<f64>, got: Option<f64>| bound.map_or(true, |b| got.is_some_and(|g| g <= b));

        let finishing = match f.finishing.as_deref().and_then(non_blank) {
            None => true,
            Some(want) => r
                .finishing
                .as_deref()
                .is_some_and(|have| contains_ci(have, &want.to_lowercase())),
        };

        exact(f.bedrooms, r.bedrooms)
            && exact(f.bathrooms, r.bathrooms)
            && at_least(f.min_area, r.unit_area)
            && at_most(f.max_area, r.unit_area)
            && at_least(f.min_price, r.price)
            && at_most(f.max_price, r.price)
            && finishing
    }
}

fn fragment(r: &PropertyRecord, field: ReferenceField, want: &Option<String>) -> bool {
    let Some(want) = want.as_deref().and_then(non_blank) else {
        return true;
    };
    r.reference_name(field)
        .is_some_and(|name| contains_ci(name, &want.to_lowercase()))
}

/// `needle` must already be lowercase.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
