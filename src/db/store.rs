// src/db/store.rs

//! The query interface the catalog consumes. Anything that can evaluate
//! equality/range/substring predicates over the `properties` table and report
//! a row count can back the catalog.

use crate::domain::RawRecord;
use crate::errors::StoreError;

pub const PROPERTIES_TABLE: &str = "properties";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    UnitId,
    UnitNumber,
    UnitArea,
    Bedrooms,
    Bathrooms,
    PricePerMeter,
    Price,
    Currency,
    Finishing,
    IsLaunch,
    Image,
    ReadyBy,
    Developer,
    Compound,
    Area,
    PropertyType,
    PaymentPlans,
    DownPaymentValue,
    DownPaymentPercent,
    MonthlyInstallment,
    PaymentYears,
}

impl Column {
    pub const ALL: [Column; 22] = [
        Column::Id,
        Column::UnitId,
        Column::UnitNumber,
        Column::UnitArea,
        Column::Bedrooms,
        Column::Bathrooms,
        Column::PricePerMeter,
        Column::Price,
        Column::Currency,
        Column::Finishing,
        Column::IsLaunch,
        Column::Image,
        Column::ReadyBy,
        Column::Developer,
        Column::Compound,
        Column::Area,
        Column::PropertyType,
        Column::PaymentPlans,
        Column::DownPaymentValue,
        Column::DownPaymentPercent,
        Column::MonthlyInstallment,
        Column::PaymentYears,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::UnitId => "unit_id",
            Column::UnitNumber => "unit_number",
            Column::UnitArea => "unit_area",
            Column::Bedrooms => "number_of_bedrooms",
            Column::Bathrooms => "number_of_bathrooms",
            Column::PricePerMeter => "price_per_meter",
            Column::Price => "price_in_egp",
            Column::Currency => "currency",
            Column::Finishing => "finishing",
            Column::IsLaunch => "is_launch",
            Column::Image => "image",
            Column::ReadyBy => "ready_by",
            Column::Developer => "developer",
            Column::Compound => "compound",
            Column::Area => "area",
            Column::PropertyType => "property_type",
            Column::PaymentPlans => "payment_plans",
            Column::DownPaymentValue => "down_payment_value",
            Column::DownPaymentPercent => "down_payment_percent",
            Column::MonthlyInstallment => "monthly_installment",
            Column::PaymentYears => "payment_years",
        }
    }

    /// Columns holding an object-or-encoded-string reference.
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            Column::Developer | Column::Compound | Column::Area | Column::PropertyType
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    /// `id` is always returned in addition to these.
    Columns(Vec<Column>),
}

impl Projection {
    pub fn columns(&self) -> Vec<Column> {
        match self {
            Projection::All => Column::ALL.to_vec(),
            Projection::Columns(cols) => {
                let mut out = vec![Column::Id];
                out.extend(cols.iter().copied().filter(|c| *c != Column::Id));
                out
            }
        }
    }
}

/// Predicates the store evaluates natively.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Column, i64),
    Gte(Column, f64),
    Lte(Column, f64),
    /// Case-insensitive substring match.
    Contains(Column, String),
    /// Lexicographic bounds on a text column (ISO dates compare correctly).
    TextGte(Column, String),
    TextLt(Column, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub table: &'static str,
    pub projection: Projection,
    pub predicates: Vec<Predicate>,
    /// Sort column, largest value first.
    pub order_desc: Option<Column>,
    pub range: Option<RowRange>,
    /// Ask for the row count matching `predicates` (ignoring `range`).
    pub count: bool,
}

impl StoreQuery {
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            projection: Projection::All,
            predicates: Vec::new(),
            order_desc: None,
            range: None,
            count: false,
        }
    }

    pub fn select(mut self, columns: &[Column]) -> Self {
        self.projection = Projection::Columns(columns.to_vec());
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn filters(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    pub fn newest_first(mut self, column: Column) -> Self {
        self.order_desc = Some(column);
        self
    }

    pub fn range(mut self, offset: usize, limit: usize) -> Self {
        self.range = Some(RowRange { offset, limit });
        self
    }

    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub data: Vec<RawRecord>,
    /// Rows matching the pushed predicates; `None` when not requested.
    pub count: Option<u64>,
}

pub trait PropertyStore {
    fn execute(&self, query: &StoreQuery) -> Result<QueryResult, StoreError>;
}

impl<T: PropertyStore + ?Sized> PropertyStore for &T {
    fn execute(&self, query: &StoreQuery) -> Result<QueryResult, StoreError> {
        (**self).execute(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_always_includes_id_once() {
        let q = StoreQuery::from(PROPERTIES_TABLE).select(&[Column::Developer, Column::Id]);
        assert_eq!(q.projection.columns(), vec![Column::Id, Column::Developer]);
        assert_eq!(Projection::All.columns().len(), Column::ALL.len());
    }

    #[test]
    fn builder_accumulates_predicates() {
        let q = StoreQuery::from(PROPERTIES_TABLE)
            .filter(Predicate::Eq(Column::Bedrooms, 3))
            .filters([Predicate::Gte(Column::Price, 1.0)])
            .range(40, 20)
            .with_count();
        assert_eq!(q.predicates.len(), 2);
        assert_eq!(q.range, Some(RowRange { offset: 40, limit: 20 }));
        assert!(q.count);
    }
}
