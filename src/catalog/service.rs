// src/catalog/service.rs

//! The catalog's two produced operations: one page of listings, and the
//! option sets for the filter controls.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::evaluator::Evaluator;
use crate::catalog::filters::FilterSpecification;
use crate::catalog::options::{aggregate, FilterOptions};
use crate::catalog::planner::{plan, FetchMode};
use crate::catalog::ranking::{paginate, total_pages, PromotionPolicy};
use crate::config::CatalogConfig;
use crate::db::store::{Column, Predicate, PropertyStore, StoreQuery, PROPERTIES_TABLE};
use crate::domain::PropertyRecord;
use crate::errors::StoreError;

/// Columns the option aggregator reads.
const OPTION_COLUMNS: &[Column] = &[
    Column::Developer,
    Column::Compound,
    Column::Area,
    Column::PropertyType,
    Column::Bedrooms,
    Column::Bathrooms,
    Column::Finishing,
    Column::ReadyBy,
    Column::Price,
    Column::UnitArea,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub properties: Vec<PropertyRecord>,
    /// Store row count for the pushed-down predicates only.
    pub total_count: u64,
    /// Pages in the client-filtered set.
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
    /// The full-corpus fetch hit the configured row cap.
    pub corpus_truncated: bool,
}

impl PageResult {
    fn empty(page: usize, page_size: usize) -> Self {
        Self {
            properties: Vec::new(),
            total_count: 0,
            total_pages: 0,
            page,
            page_size,
            corpus_truncated: false,
        }
    }
}

/// Result envelope: on a store failure `error` is set and the payload is empty.
#[derive(Debug, Serialize)]
pub struct CatalogPage {
    #[serde(flatten)]
    pub result: PageResult,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FilterOptionsResponse {
    #[serde(flatten)]
    pub options: FilterOptions,
    pub error: Option<String>,
}

pub struct CatalogService<S> {
    store: S,
    config: CatalogConfig,
    policy: PromotionPolicy,
}

impl<S: PropertyStore> CatalogService<S> {
    pub fn new(store: S, config: CatalogConfig) -> Self {
        let policy = PromotionPolicy::new(&config.promoted_developer);
        Self {
            store,
            config,
            policy,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn fetch_catalog_page(
        &self,
        page: usize,
        page_size: usize,
        filters: &FilterSpecification,
    ) -> CatalogPage {
        self.fetch_catalog_page_at(page, page_size, filters, Utc::now())
    }

    /// Same as [`fetch_catalog_page`](Self::fetch_catalog_page) with an
    /// explicit evaluation instant for the "Ready" filter.
    pub fn fetch_catalog_page_at(
        &self,
        page: usize,
        page_size: usize,
        filters: &FilterSpecification,
        now: DateTime<Utc>,
    ) -> CatalogPage {
        let page = page.max(1);
        let page_size = if page_size == 0 {
            self.config.default_page_size
        } else {
            page_size
        };

        match self.try_fetch_page(page, page_size, filters, now) {
            Ok(result) => CatalogPage {
                result,
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, page, page_size, "catalog page fetch failed");
                CatalogPage {
                    result: PageResult::empty(page, page_size),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn try_fetch_page(
        &self,
        page: usize,
        page_size: usize,
        filters: &FilterSpecification,
        now: DateTime<Utc>,
    ) -> Result<PageResult, StoreError> {
        let plan = plan(filters, page, page_size, self.config.max_corpus_rows);
        let fetched = self.store.execute(&plan.to_store_query())?;
        let total_count = fetched.count.unwrap_or(fetched.data.len() as u64);

        let records: Vec<PropertyRecord> =
            fetched.data.into_iter().map(PropertyRecord::from_raw).collect();

        match plan.fetch {
            FetchMode::Page { .. } => {
                // The store already paged; ranking can only reorder this page.
                let properties = self.policy.rank(records);
                let count = usize::try_from(total_count).unwrap_or(usize::MAX);
                Ok(PageResult {
                    properties,
                    total_count,
                    total_pages: total_pages(count, page_size),
                    page,
                    page_size,
                    corpus_truncated: false,
                })
            }
            FetchMode::FullCorpus { cap } => {
                let corpus_truncated = total_count > cap as u64;
                if corpus_truncated {
                    tracing::warn!(
                        total_count,
                        cap,
                        "full-corpus fetch truncated; client-side filters see a partial corpus"
                    );
                }

                // Re-checking the pushed predicates keeps a store that ignores them honest.
                let filtered = Evaluator::new(filters, now).with_pushdown().evaluate(records);
                let ranked = self.policy.rank(filtered);
                let paged = paginate(ranked, page, page_size);

                Ok(PageResult {
                    properties: paged.items,
                    total_count,
                    total_pages: paged.total_pages,
                    page,
                    page_size,
                    corpus_truncated,
                })
            }
        }
    }

    pub fn fetch_filter_options(&self) -> FilterOptionsResponse {
        match self.try_fetch_options() {
            Ok(options) => FilterOptionsResponse {
                options,
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "filter options fetch failed");
                FilterOptionsResponse {
                    options: FilterOptions::default(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn try_fetch_options(&self) -> Result<FilterOptions, StoreError> {
        let cap = self.config.max_corpus_rows;
        let query = StoreQuery::from(PROPERTIES_TABLE)
            .select(OPTION_COLUMNS)
            .range(0, cap)
            .with_count();
        let fetched = self.store.execute(&query)?;

        if fetched.count.is_some_and(|n| n > cap as u64) {
            tracing::warn!(cap, "filter options computed over a truncated corpus");
        }

        let corpus: Vec<PropertyRecord> =
            fetched.data.into_iter().map(PropertyRecord::from_raw).collect();
        Ok(aggregate(&corpus))
    }

    /// Looks up one listing by id.
    pub fn fetch_property(&self, id: i64) -> Result<Option<PropertyRecord>, StoreError> {
        let query = StoreQuery::from(PROPERTIES_TABLE)
            .filter(Predicate::Eq(Column::Id, id))
            .range(0, 1);
        let fetched = self.store.execute(&query)?;
        Ok(fetched.data.into_iter().next().map(PropertyRecord::from_raw))
    }
}
