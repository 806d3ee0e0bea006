use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::form::FieldClass;
use crate::domain::order::FieldValue;
use crate::schema::{
    form_item_meta_fields, form_items, order_forms, sponsor_order_lines, sponsor_order_outbox,
    sponsor_orders,
};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_forms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderFormRow {
    pub id: Uuid,
    pub name: String,
    pub timezone: String,
    pub early_bird_end: Option<i64>,
    pub standard_end: Option<i64>,
    pub onsite_end: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_forms)]
pub struct NewOrderFormRow {
    pub id: Uuid,
    pub name: String,
    pub timezone: String,
    pub early_bird_end: Option<i64>,
    pub standard_end: Option<i64>,
    pub onsite_end: Option<i64>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations, Insertable)]
#[diesel(table_name = form_items)]
#[diesel(belongs_to(OrderFormRow, foreign_key = form_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FormItemRow {
    pub id: Uuid,
    pub form_id: Uuid,
    pub position: i32,
    pub code: String,
    pub name: String,
    pub early_bird_rate: i64,
    pub standard_rate: i64,
    pub onsite_rate: i64,
    pub default_quantity: Option<i64>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations, Insertable)]
#[diesel(table_name = form_item_meta_fields)]
#[diesel(belongs_to(FormItemRow, foreign_key = item_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MetaFieldRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub position: i32,
    pub class: String,
    pub field_type: String,
    pub label: String,
    pub minimum_quantity: Option<i64>,
    pub maximum_quantity: Option<i64>,
    pub options: Value,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sponsor_orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SponsorOrderRow {
    pub id: Uuid,
    pub form_id: Uuid,
    pub sponsor_id: Uuid,
    pub tier: String,
    pub discount_type: Option<String>,
    pub discount_value: Option<i64>,
    pub grand_total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sponsor_orders)]
pub struct NewSponsorOrderRow {
    pub id: Uuid,
    pub form_id: Uuid,
    pub sponsor_id: Uuid,
    pub tier: String,
    pub discount_type: Option<String>,
    pub discount_value: Option<i64>,
    pub grand_total: i64,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations, Insertable)]
#[diesel(table_name = sponsor_order_lines)]
#[diesel(belongs_to(SponsorOrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SponsorOrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub position: i32,
    pub quantity: i64,
    pub unit_rate: i64,
    pub line_total: i64,
    pub notes: Option<String>,
    pub field_values: Value,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sponsor_order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sponsor_order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

/// JSON shape of one entry in `sponsor_order_lines.field_values`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFieldValue {
    pub class: FieldClass,
    pub field_id: Uuid,
    pub value: FieldValue,
}
