// src/domain/property.rs

use crate::domain::delivery::Delivery;
use crate::domain::reference::{normalize_reference, NormalizedReference, RawReference};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inventory row exactly as the store returned it. Reference fields are
/// still in whatever encoding the importer left behind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: i64,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub unit_number: Option<String>,
    #[serde(default)]
    pub unit_area: Option<f64>,
    #[serde(default)]
    pub number_of_bedrooms: Option<i64>,
    #[serde(default)]
    pub number_of_bathrooms: Option<i64>,
    #[serde(default)]
    pub price_per_meter: Option<f64>,
    #[serde(default)]
    pub price_in_egp: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub finishing: Option<String>,
    #[serde(default)]
    pub is_launch: Option<bool>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_by: Option<String>,

    #[serde(default)]
    pub developer: Option<RawReference>,
    #[serde(default)]
    pub compound: Option<RawReference>,
    #[serde(default)]
    pub area: Option<RawReference>,
    #[serde(default)]
    pub property_type: Option<RawReference>,

    /// JSON array, or a string holding one.
    #[serde(default)]
    pub payment_plans: Option<Value>,
    #[serde(default)]
    pub down_payment_value: Option<f64>,
    #[serde(default)]
    pub down_payment_percent: Option<f64>,
    #[serde(default)]
    pub monthly_installment: Option<f64>,
    #[serde(default)]
    pub payment_years: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    #[serde(default, alias = "down_payment_value")]
    pub down_payment_amount: Option<f64>,
    #[serde(default, alias = "down_payment")]
    pub down_payment_percent: Option<f64>,
    #[serde(default, alias = "equal_installments_value", alias = "monthly_installment")]
    pub installment_amount: Option<f64>,
    #[serde(default)]
    pub years: Option<f64>,
}

/// Headline payment terms shown on a listing card.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub down_payment: Option<f64>,
    pub down_payment_percent: Option<f64>,
    pub monthly_installment: Option<f64>,
    pub years: Option<f64>,
}

/// A listing after normalization. Every reference is canonical or `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRecord {
    pub id: i64,
    pub unit_id: Option<String>,
    pub unit_number: Option<String>,
    pub unit_area: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub price_per_meter: Option<f64>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub finishing: Option<String>,
    pub is_launch: bool,
    pub image: Option<String>,
    pub delivery: Option<Delivery>,

    pub developer: Option<NormalizedReference>,
    pub compound: Option<NormalizedReference>,
    pub area: Option<NormalizedReference>,
    pub property_type: Option<NormalizedReference>,

    pub payment_plans: Vec<PaymentPlan>,
    pub payment: PaymentSummary,
}

/// The four reference attributes a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceField {
    Developer,
    Compound,
    Area,
    PropertyType,
}

impl PropertyRecord {
    /// Normalizes a raw row. This is the only place raw reference shapes are
    /// inspected.
    pub fn from_raw(raw: RawRecord) -> Self {
        let normalize = |r: &Option<RawReference>| r.as_ref().and_then(normalize_reference);

        let developer = normalize(&raw.developer);
        let compound = normalize(&raw.compound);
        let area = normalize(&raw.area);
        let property_type = normalize(&raw.property_type);

        let payment_plans = parse_payment_plans(raw.id, raw.payment_plans.as_ref());
        let payment = summarize_payment(&raw, &payment_plans);

        PropertyRecord {
            id: raw.id,
            unit_id: raw.unit_id,
            unit_number: raw.unit_number,
            unit_area: raw.unit_area,
            bedrooms: raw.number_of_bedrooms,
            bathrooms: raw.number_of_bathrooms,
            price_per_meter: raw.price_per_meter,
            price: raw.price_in_egp,
            currency: raw.currency,
            finishing: raw.finishing,
            is_launch: raw.is_launch.unwrap_or(false),
            image: raw.image,
            delivery: raw.ready_by.as_deref().and_then(Delivery::parse),
            developer,
            compound,
            area,
            property_type,
            payment_plans,
            payment,
        }
    }

    pub fn reference(&self, field: ReferenceField) -> Option<&NormalizedReference> {
        match field {
            ReferenceField::Developer => self.developer.as_ref(),
            ReferenceField::Compound => self.compound.as_ref(),
            ReferenceField::Area => self.area.as_ref(),
            ReferenceField::PropertyType => self.property_type.as_ref(),
        }
    }

    pub fn reference_name(&self, field: ReferenceField) -> Option<&str> {
        self.reference(field).map(|r| r.name.as_str())
    }
}

fn parse_payment_plans(id: i64, value: Option<&Value>) -> Vec<PaymentPlan> {
    let parsed = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::String(s)) if s.trim().is_empty() => return Vec::new(),
        Some(Value::String(s)) => serde_json::from_str::<Vec<PaymentPlan>>(s),
        Some(other) => serde_json::from_value::<Vec<PaymentPlan>>(other.clone()),
    };

    parsed.unwrap_or_else(|e| {
        tracing::debug!(property_id = id, error = %e, "ignoring malformed payment plans");
        Vec::new()
    })
}

/// Explicit payment columns win; when the down payment is missing the first
/// plan fills the whole summary.
fn summarize_payment(raw: &RawRecord, plans: &[PaymentPlan]) -> PaymentSummary {
    let explicit = PaymentSummary {
        down_payment: raw.down_payment_value,
        down_payment_percent: raw.down_payment_percent,
        monthly_installment: raw.monthly_installment,
        years: raw.payment_years,
    };

    let has_down_payment = explicit.down_payment.is_some_and(|v| v != 0.0);
    match plans.first() {
        Some(plan) if !has_down_payment => PaymentSummary {
            down_payment: plan.down_payment_amount,
            down_payment_percent: plan.down_payment_percent,
            monthly_installment: plan.installment_amount,
            years: plan.years,
        },
        _ => explicit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn raw(v: Value) -> RawRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn from_raw_normalizes_every_reference() {
        let record = PropertyRecord::from_raw(raw(json!({
            "id": 10,
            "unit_id": "U-10",
            "developer": "{'id': 1, 'name': 'Mountain View'}",
            "compound": {"id": 2, "name": "Aliva"},
            "area": "bad{data",
            "property_type": null,
            "ready_by": "2027-03-01",
            "is_launch": true
        })));

        assert_eq!(record.reference_name(ReferenceField::Developer), Some("Mountain View"));
        assert_eq!(record.developer.as_ref().and_then(|d| d.id), Some(1));
        assert_eq!(record.reference_name(ReferenceField::Compound), Some("Aliva"));
        assert_eq!(record.area, None);
        assert_eq!(record.reference_name(ReferenceField::Area), None);
        assert_eq!(record.property_type, None);
        assert_eq!(
            record.delivery,
            Some(Delivery::Date(NaiveDate::from_ymd_opt(2027, 3, 1).unwrap()))
        );
        assert!(record.is_launch);
    }

    #[test]
    fn payment_summary_falls_back_to_first_plan() {
        let record = PropertyRecord::from_raw(raw(json!({
            "id": 1,
            "payment_plans": "[{\"down_payment_value\": 100000, \"down_payment\": 10, \"equal_installments_value\": 25000, \"years\": 8}]"
        })));
        assert_eq!(record.payment_plans.len(), 1);
        assert_eq!(
            record.payment,
            PaymentSummary {
                down_payment: Some(100000.0),
                down_payment_percent: Some(10.0),
                monthly_installment: Some(25000.0),
                years: Some(8.0),
            }
        );
    }

    #[test]
    fn explicit_payment_columns_win() {
        let record = PropertyRecord::from_raw(raw(json!({
            "id": 1,
            "down_payment_value": 5.0,
            "monthly_installment": 7.0,
            "payment_plans": [{"down_payment_value": 100, "years": 3}]
        })));
        assert_eq!(record.payment.down_payment, Some(5.0));
        assert_eq!(record.payment.monthly_installment, Some(7.0));
        assert_eq!(record.payment.years, None);
    }

    #[test]
    fn malformed_payment_plans_are_dropped() {
        let record = PropertyRecord::from_raw(raw(json!({"id": 1, "payment_plans": "not json"})));
        assert!(record.payment_plans.is_empty());
        assert_eq!(record.payment, PaymentSummary::default());
    }
}
