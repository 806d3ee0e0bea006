use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::tier::RateTier;

/// Scope of a meta field: filled in on the order, or part of the item's own
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum FieldClass {
    Form,
    Item,
}

impl FieldClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldClass::Form => "Form",
            FieldClass::Item => "Item",
        }
    }
}

impl fmt::Display for FieldClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Form" => Ok(FieldClass::Form),
            "Item" => Ok(FieldClass::Item),
            other => Err(DomainError::InvalidInput(format!(
                "unknown field class '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MetaFieldType {
    Quantity,
    Text,
    TextArea,
    CheckBox,
    CheckBoxList,
    RadioButtonList,
    ComboBox,
    DateTime,
    Time,
}

impl MetaFieldType {
    pub const ALL: [MetaFieldType; 9] = [
        MetaFieldType::Quantity,
        MetaFieldType::Text,
        MetaFieldType::TextArea,
        MetaFieldType::CheckBox,
        MetaFieldType::CheckBoxList,
        MetaFieldType::RadioButtonList,
        MetaFieldType::ComboBox,
        MetaFieldType::DateTime,
        MetaFieldType::Time,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetaFieldType::Quantity => "Quantity",
            MetaFieldType::Text => "Text",
            MetaFieldType::TextArea => "TextArea",
            MetaFieldType::CheckBox => "CheckBox",
            MetaFieldType::CheckBoxList => "CheckBoxList",
            MetaFieldType::RadioButtonList => "RadioButtonList",
            MetaFieldType::ComboBox => "ComboBox",
            MetaFieldType::DateTime => "DateTime",
            MetaFieldType::Time => "Time",
        }
    }

    /// Types whose value is picked from the field's option list.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            MetaFieldType::CheckBoxList | MetaFieldType::RadioButtonList | MetaFieldType::ComboBox
        )
    }
}

impl FromStr for MetaFieldType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetaFieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown meta field type '{}'", s)))
    }
}

/// Cutoff days for each price window, as Unix epoch seconds. Any of them may
/// be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateSchedule {
    pub early_bird_end: Option<i64>,
    pub standard_end: Option<i64>,
    pub onsite_end: Option<i64>,
}

impl RateSchedule {
    /// True when every configured cutoff is no earlier than the one before it.
    pub fn is_monotonic(&self) -> bool {
        let set: Vec<i64> = [self.early_bird_end, self.standard_end, self.onsite_end]
            .into_iter()
            .flatten()
            .collect();
        set.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Unit prices in minor currency units (cents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rates {
    pub early_bird: i64,
    pub standard: i64,
    pub onsite: i64,
}

impl Rates {
    pub fn for_tier(&self, tier: RateTier) -> i64 {
        match tier {
            RateTier::EarlyBird => self.early_bird,
            RateTier::Standard => self.standard,
            RateTier::Onsite => self.onsite,
            RateTier::Expired => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaField {
    pub id: Uuid,
    pub class: FieldClass,
    pub field_type: MetaFieldType,
    pub label: String,
    pub minimum_quantity: Option<i64>,
    pub maximum_quantity: Option<i64>,
    pub options: Vec<String>,
}

impl MetaField {
    pub fn is_order_quantity(&self) -> bool {
        self.class == FieldClass::Form && self.field_type == MetaFieldType::Quantity
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub rates: Rates,
    pub default_quantity: Option<i64>,
    pub meta_fields: Vec<MetaField>,
}

impl LineItem {
    /// Form-class Quantity fields that drive the effective quantity.
    pub fn quantity_fields(&self) -> impl Iterator<Item = &MetaField> {
        self.meta_fields.iter().filter(|f| f.is_order_quantity())
    }

    pub fn meta_field(&self, id: Uuid) -> Option<&MetaField> {
        self.meta_fields.iter().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderForm {
    pub id: Uuid,
    pub name: String,
    pub timezone: String,
    pub schedule: RateSchedule,
    pub items: Vec<LineItem>,
}

impl OrderForm {
    pub fn item(&self, id: Uuid) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

/// Administrator input for a new form. Identifiers are assigned on creation.
#[derive(Debug, Clone)]
pub struct OrderFormDraft {
    pub name: String,
    pub timezone: String,
    pub schedule: RateSchedule,
    pub items: Vec<LineItemDraft>,
}

#[derive(Debug, Clone)]
pub struct LineItemDraft {
    pub code: String,
    pub name: String,
    pub rates: Rates,
    pub default_quantity: Option<i64>,
    pub meta_fields: Vec<MetaFieldDraft>,
}

#[derive(Debug, Clone)]
pub struct MetaFieldDraft {
    pub class: FieldClass,
    pub field_type: MetaFieldType,
    pub label: String,
    pub minimum_quantity: Option<i64>,
    pub maximum_quantity: Option<i64>,
    pub options: Vec<String>,
}
