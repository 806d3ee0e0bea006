use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::form::FieldClass;
use super::pricing::PriceBreakdown;
use super::tier::RateTier;

/// Address of a single user-entered value on an order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    pub item_id: Uuid,
    pub class: FieldClass,
    pub field_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(i64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Integer reading of the value. Numeric text is accepted since form
    /// inputs often arrive as strings.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
            FieldValue::Bool(_) | FieldValue::List(_) => None,
        }
    }

    /// Like [`FieldValue::as_integer`], with negatives counted as zero.
    pub fn as_quantity(&self) -> Option<i64> {
        self.as_integer().map(|n| n.max(0))
    }
}

/// Everything a sponsor has typed into an order form so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderValues {
    fields: BTreeMap<FieldKey, FieldValue>,
    quantities: BTreeMap<Uuid, i64>,
    notes: BTreeMap<Uuid, String>,
}

impl OrderValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&mut self, key: FieldKey, value: FieldValue) -> &mut Self {
        self.fields.insert(key, value);
        self
    }

    pub fn field(&self, key: &FieldKey) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldKey, &FieldValue)> {
        self.fields.iter()
    }

    /// Values belonging to one line item, in key order.
    pub fn fields_for_item(&self, item_id: Uuid) -> impl Iterator<Item = (&FieldKey, &FieldValue)> {
        self.fields.iter().filter(move |(k, _)| k.item_id == item_id)
    }

    pub fn set_manual_quantity(&mut self, item_id: Uuid, quantity: i64) -> &mut Self {
        self.quantities.insert(item_id, quantity);
        self
    }

    pub fn manual_quantity(&self, item_id: Uuid) -> Option<i64> {
        self.quantities.get(&item_id).copied()
    }

    pub fn manual_quantities(&self) -> impl Iterator<Item = (Uuid, i64)> + '_ {
        self.quantities.iter().map(|(id, q)| (*id, *q))
    }

    pub fn set_notes(&mut self, item_id: Uuid, notes: impl Into<String>) -> &mut Self {
        self.notes.insert(item_id, notes.into());
        self
    }

    pub fn notes(&self, item_id: Uuid) -> Option<&str> {
        self.notes.get(&item_id).map(String::as_str)
    }

    pub fn all_notes(&self) -> impl Iterator<Item = (Uuid, &str)> {
        self.notes.iter().map(|(id, n)| (*id, n.as_str()))
    }
}

/// Order-level discount. Recorded with the order; it does not change the
/// grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    /// Fixed amount in cents.
    Amount(i64),
    /// Percentage, 0 to 100.
    Rate(i64),
}

impl Discount {
    pub fn kind(&self) -> &'static str {
        match self {
            Discount::Amount(_) => "amount",
            Discount::Rate(_) => "rate",
        }
    }

    pub fn value(&self) -> i64 {
        match self {
            Discount::Amount(v) | Discount::Rate(v) => *v,
        }
    }

    pub fn from_parts(kind: &str, value: i64) -> Result<Self, DomainError> {
        match kind {
            "amount" => Ok(Discount::Amount(value)),
            "rate" => Ok(Discount::Rate(value)),
            other => Err(DomainError::InvalidInput(format!(
                "unknown discount type '{}'",
                other
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match *self {
            Discount::Amount(v) if v < 0 => Err(DomainError::InvalidInput(
                "discount amount must not be negative".to_string(),
            )),
            Discount::Rate(v) if !(0..=100).contains(&v) => Err(DomainError::InvalidInput(
                format!("discount rate {} is outside 0..=100", v),
            )),
            _ => Ok(()),
        }
    }
}

/// Fully priced order ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewSponsorOrder {
    pub form_id: Uuid,
    pub sponsor_id: Uuid,
    pub discount: Option<Discount>,
    pub values: OrderValues,
    pub pricing: PriceBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFieldValue {
    pub class: FieldClass,
    pub field_id: Uuid,
    pub value: FieldValue,
}

#[derive(Debug, Clone)]
pub struct SponsorOrderLineView {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity: i64,
    pub unit_rate: i64,
    pub line_total: i64,
    pub notes: Option<String>,
    pub values: Vec<SavedFieldValue>,
}

#[derive(Debug, Clone)]
pub struct SponsorOrderView {
    pub id: Uuid,
    pub form_id: Uuid,
    pub sponsor_id: Uuid,
    pub tier: RateTier,
    pub discount: Option<Discount>,
    pub grand_total: i64,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<SponsorOrderLineView>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<SponsorOrderView>,
    pub total: i64,
}
