// src/catalog/planner.rs

//! Splits a [`FilterSpecification`] into what the store can answer natively
//! and what has to be evaluated over the full corpus in memory.

use crate::catalog::filters::{non_blank, FilterSpecification, ReadyBy};
use crate::db::store::{Column, Predicate, StoreQuery, PROPERTIES_TABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// No client-side predicates: the store can page directly.
    Page { offset: usize, limit: usize },
    /// Client-side predicates present: fetch everything (up to `cap` rows),
    /// filter, then page in memory.
    FullCorpus { cap: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub server: Vec<Predicate>,
    pub fetch: FetchMode,
}

impl QueryPlan {
    pub fn needs_full_corpus(&self) -> bool {
        matches!(self.fetch, FetchMode::FullCorpus { .. })
    }

    /// The store query for this plan, ordered newest first, with a count.
    pub fn to_store_query(&self) -> StoreQuery {
        let query = StoreQuery::from(PROPERTIES_TABLE)
            .filters(self.server.iter().cloned())
            .newest_first(Column::Id)
            .with_count();
        match self.fetch {
            FetchMode::Page { offset, limit } => query.range(offset, limit),
            FetchMode::FullCorpus { cap } => query.range(0, cap),
        }
    }
}

/// Predicates the store evaluates: exact counts, numeric ranges, finishing
/// substring and a delivery-year window.
pub fn server_predicates(filters: &FilterSpecification) -> Vec<Predicate> {
    let mut out = Vec::new();

    if let Some(n) = filters.bedrooms {
        out.push(Predicate::Eq(Column::Bedrooms, n));
    }
    if let Some(n) = filters.bathrooms {
        out.push(Predicate::Eq(Column::Bathrooms, n));
    }
    if let Some(v) = filters.min_area {
        out.push(Predicate::Gte(Column::UnitArea, v));
    }
    if let Some(v) = filters.max_area {
        out.push(Predicate::Lte(Column::UnitArea, v));
    }
    if let Some(v) = filters.min_price {
        out.push(Predicate::Gte(Column::Price, v));
    }
    if let Some(v) = filters.max_price {
        out.push(Predicate::Lte(Column::Price, v));
    }
    if let Some(f) = filters.finishing.as_deref().and_then(non_blank) {
        out.push(Predicate::Contains(Column::Finishing, f.to_string()));
    }
    if let Some(ReadyBy::Year(year)) = filters.ready_by {
        out.push(Predicate::TextGte(Column::ReadyBy, format!("{year:04}-01-01")));
        out.push(Predicate::TextLt(Column::ReadyBy, format!("{:04}-01-01", year + 1)));
    }

    out
}

/// True when any constraint can only be checked against normalized records.
pub fn has_client_predicates(filters: &FilterSpecification) -> bool {
    let text = |v: &Option<String>| v.as_deref().and_then(non_blank).is_some();

    text(&filters.search)
        || text(&filters.developer)
        || text(&filters.compound)
        || text(&filters.area)
        || text(&filters.property_type)
        || filters.areas.iter().any(|a| non_blank(a).is_some())
        || filters.category.is_some()
        || filters.ready_by == Some(ReadyBy::Ready)
}

pub fn plan(filters: &FilterSpecification, page: usize, page_size: usize, cap: usize) -> QueryPlan {
    let server = server_predicates(filters);
    let fetch = if has_client_predicates(filters) {
        FetchMode::FullCorpus { cap }
    } else {
        FetchMode::Page {
            offset: page.max(1).saturating_sub(1).saturating_mul(page_size),
            limit: page_size,
        }
    };

    let plan = QueryPlan { server, fetch };
    tracing::debug!(
        server_predicates = plan.server.len(),
        full_corpus = plan.needs_full_corpus(),
        "catalog query planned"
    );
    plan
}
