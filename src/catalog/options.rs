// src/catalog/options.rs

//! Distinct value sets for the catalog's filter controls, derived from one
//! pass over the normalized corpus.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::filters::READY_SENTINEL;
use crate::domain::{PropertyRecord, ReferenceField};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub compounds: Vec<String>,
    pub areas: Vec<String>,
    pub developers: Vec<String>,
    pub property_types: Vec<String>,
    pub bedroom_options: Vec<i64>,
    pub bathroom_options: Vec<i64>,
    pub finishing_options: Vec<String>,
    /// `"Ready"` first, then years ascending.
    pub ready_by_year_options: Vec<String>,
    pub developer_compounds: BTreeMap<String, Vec<String>>,
    pub price_range: Option<NumericRange>,
    pub area_range: Option<NumericRange>,
}

#[derive(Default)]
struct RangeAcc(Option<NumericRange>);

impl RangeAcc {
    fn push(&mut self, value: Option<f64>) {
        let Some(v) = value.filter(|v| v.is_finite() && *v > 0.0) else {
            return;
        };
        self.0 = Some(match self.0 {
            None => NumericRange { min: v, max: v },
            Some(r) => NumericRange {
                min: r.min.min(v),
                max: r.max.max(v),
            },
        });
    }
}

pub fn aggregate(corpus: &[PropertyRecord]) -> FilterOptions {
    let mut compounds = BTreeSet::new();
    let mut areas = BTreeSet::new();
    let mut developers = BTreeSet::new();
    let mut property_types = BTreeSet::new();
    let mut bedrooms = BTreeSet::new();
    let mut bathrooms = BTreeSet::new();
    let mut finishing = BTreeSet::new();
    let mut years = BTreeSet::new();
    let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut price = RangeAcc::default();
    let mut unit_area = RangeAcc::default();

    for r in corpus {
        let developer = r.reference_name(ReferenceField::Developer);
        let compound = r.reference_name(ReferenceField::Compound);

        if let Some(d) = developer {
            developers.insert(d.to_string());
        }
        if let Some(c) = compound {
            compounds.insert(c.to_string());
        }
        if let (Some(d), Some(c)) = (developer, compound) {
            adjacency
                .entry(d.to_string())
                .or_default()
                .insert(c.to_string());
        }
        if let Some(a) = r.reference_name(ReferenceField::Area) {
            areas.insert(a.to_string());
        }
        if let Some(t) = r.reference_name(ReferenceField::PropertyType) {
            property_types.insert(t.to_string());
        }

        bedrooms.extend(r.bedrooms);
        bathrooms.extend(r.bathrooms);
        if let Some(f) = r.finishing.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            finishing.insert(f.to_string());
        }
        if let Some(year) = r.delivery.as_ref().and_then(|d| d.year_bucket()) {
            years.insert(year);
        }

        price.push(r.price);
        unit_area.push(r.unit_area);
    }

    let mut ready_by_year_options = vec![READY_SENTINEL.to_string()];
    ready_by_year_options.extend(years.into_iter().map(|y: i32| y.to_string()));

    FilterOptions {
        compounds: compounds.into_iter().collect(),
        areas: areas.into_iter().collect(),
        developers: developers.into_iter().collect(),
        property_types: property_types.into_iter().collect(),
        bedroom_options: bedrooms.into_iter().collect(),
        bathroom_options: bathrooms.into_iter().collect(),
        finishing_options: finishing.into_iter().collect(),
        ready_by_year_options,
        developer_compounds: adjacency
            .into_iter()
            .map(|(d, cs)| (d, cs.into_iter().collect()))
            .collect(),
        price_range: price.0,
        area_range: unit_area.0,
    }
}
