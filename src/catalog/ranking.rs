// src/catalog/ranking.rs

use crate::domain::{PropertyRecord, ReferenceField};

/// Business rule: listings from one developer are shown before everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionPolicy {
    token: String,
}

impl PromotionPolicy {
    /// A blank token promotes nobody.
    pub fn new(token: impl AsRef<str>) -> Self {
        let token = token.as_ref().trim();
        if token.is_empty() {
            return Self::none();
        }
        Self {
            token: token.to_lowercase(),
        }
    }

    /// A policy that promotes nobody.
    pub fn none() -> Self {
        Self { token: String::new() }
    }

    pub fn is_promoted(&self, record: &PropertyRecord) -> bool {
        !self.token.is_empty()
            && record
                .reference_name(ReferenceField::Developer)
                .is_some_and(|name| name.to_lowercase().contains(&self.token))
    }

    /// Stable two-way partition: promoted first, original order kept on both sides.
    pub fn rank(&self, records: Vec<PropertyRecord>) -> Vec<PropertyRecord> {
        let (mut promoted, rest): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|r| self.is_promoted(r));
        promoted.extend(rest);
        promoted
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
}

/// Slices one page out of `items`. Pages are 1-based; page 0 is page 1, and a
/// page past the end is empty.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);

    let items = items.into_iter().skip(start).take(page_size).collect();
    Page { items, total_pages }
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}
