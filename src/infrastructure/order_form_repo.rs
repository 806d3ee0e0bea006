use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::form::{LineItem, MetaField, OrderForm, RateSchedule, Rates};
use crate::domain::order::{
    Discount, ListResult, NewSponsorOrder, SavedFieldValue, SponsorOrderLineView,
    SponsorOrderView,
};
use crate::domain::ports::OrderFormRepository;
use crate::schema::{
    form_item_meta_fields, form_items, order_forms, sponsor_order_lines, sponsor_order_outbox,
    sponsor_orders,
};

use super::models::{
    FormItemRow, MetaFieldRow, NewOrderFormRow, NewOutboxEventRow, NewSponsorOrderRow,
    OrderFormRow, SponsorOrderLineRow, SponsorOrderRow, StoredFieldValue,
};

pub const OUTBOX_AGGREGATE_TYPE: &str = "SponsorOrder";
pub const ORDER_SAVED_EVENT: &str = "SponsorOrderSaved";

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// A stored value that no longer parses is a data problem, not bad input.
fn corrupt(e: DomainError) -> DomainError {
    DomainError::Internal(format!("corrupt stored value: {}", e))
}

// ── Row mapping ──────────────────────────────────────────────────────────────

fn meta_field_from_row(row: MetaFieldRow) -> Result<MetaField, DomainError> {
    Ok(MetaField {
        id: row.id,
        class: row.class.parse().map_err(corrupt)?,
        field_type: row.field_type.parse().map_err(corrupt)?,
        label: row.label,
        minimum_quantity: row.minimum_quantity,
        maximum_quantity: row.maximum_quantity,
        options: serde_json::from_value(row.options)?,
    })
}

fn item_from_rows(item: FormItemRow, fields: Vec<MetaFieldRow>) -> Result<LineItem, DomainError> {
    Ok(LineItem {
        id: item.id,
        code: item.code,
        name: item.name,
        rates: Rates {
            early_bird: item.early_bird_rate,
            standard: item.standard_rate,
            onsite: item.onsite_rate,
        },
        default_quantity: item.default_quantity,
        meta_fields: fields
            .into_iter()
            .map(meta_field_from_row)
            .collect::<Result<_, _>>()?,
    })
}

fn discount_from_row(row: &SponsorOrderRow) -> Result<Option<Discount>, DomainError> {
    match (&row.discount_type, row.discount_value) {
        (Some(kind), Some(value)) => Discount::from_parts(kind, value).map(Some).map_err(corrupt),
        _ => Ok(None),
    }
}

fn order_from_rows(
    order: SponsorOrderRow,
    lines: Vec<SponsorOrderLineRow>,
) -> Result<SponsorOrderView, DomainError> {
    let discount = discount_from_row(&order)?;
    let lines = lines
        .into_iter()
        .map(|l| -> Result<SponsorOrderLineView, DomainError> {
            let stored: Vec<StoredFieldValue> = serde_json::from_value(l.field_values)?;
            Ok(SponsorOrderLineView {
                id: l.id,
                item_id: l.item_id,
                quantity: l.quantity,
                unit_rate: l.unit_rate,
                line_total: l.line_total,
                notes: l.notes,
                values: stored
                    .into_iter()
                    .map(|s| SavedFieldValue {
                        class: s.class,
                        field_id: s.field_id,
                        value: s.value,
                    })
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SponsorOrderView {
        id: order.id,
        form_id: order.form_id,
        sponsor_id: order.sponsor_id,
        tier: order.tier.parse().map_err(corrupt)?,
        discount,
        grand_total: order.grand_total,
        created_at: order.created_at,
        lines,
    })
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderFormRepository {
    pool: DbPool,
}

impl DieselOrderFormRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderFormRepository for DieselOrderFormRepository {
    fn create_form(&self, form: &OrderForm) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let item_rows: Vec<FormItemRow> = form
            .items
            .iter()
            .zip(0..)
            .map(|(item, position)| FormItemRow {
                id: item.id,
                form_id: form.id,
                position,
                code: item.code.clone(),
                name: item.name.clone(),
                early_bird_rate: item.rates.early_bird,
                standard_rate: item.rates.standard,
                onsite_rate: item.rates.onsite,
                default_quantity: item.default_quantity,
            })
            .collect();

        let mut field_rows = Vec::new();
        for item in &form.items {
            for (field, position) in item.meta_fields.iter().zip(0..) {
                field_rows.push(MetaFieldRow {
                    id: field.id,
                    item_id: item.id,
                    position,
                    class: field.class.as_str().to_string(),
                    field_type: field.field_type.as_str().to_string(),
                    label: field.label.clone(),
                    minimum_quantity: field.minimum_quantity,
                    maximum_quantity: field.maximum_quantity,
                    options: json!(field.options),
                });
            }
        }

        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::insert_into(order_forms::table)
                .values(&NewOrderFormRow {
                    id: form.id,
                    name: form.name.clone(),
                    timezone: form.timezone.clone(),
                    early_bird_end: form.schedule.early_bird_end,
                    standard_end: form.schedule.standard_end,
                    onsite_end: form.schedule.onsite_end,
                })
                .execute(conn)?;

            if !item_rows.is_empty() {
                diesel::insert_into(form_items::table)
                    .values(&item_rows)
                    .execute(conn)?;
            }

            if !field_rows.is_empty() {
                diesel::insert_into(form_item_meta_fields::table)
                    .values(&field_rows)
                    .execute(conn)?;
            }

            Ok(())
        })
    }

    fn find_form(&self, id: Uuid) -> Result<Option<OrderForm>, DomainError> {
        let mut conn = self.pool.get()?;

        let form = order_forms::table
            .filter(order_forms::id.eq(id))
            .select(OrderFormRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(form) = form else {
            return Ok(None);
        };

        let items = FormItemRow::belonging_to(&form)
            .select(FormItemRow::as_select())
            .order(form_items::position.asc())
            .load(&mut conn)?;

        let fields = MetaFieldRow::belonging_to(&items)
            .select(MetaFieldRow::as_select())
            .order(form_item_meta_fields::position.asc())
            .load(&mut conn)?;
        let grouped = fields.grouped_by(&items);

        let items = items
            .into_iter()
            .zip(grouped)
            .map(|(item, fields)| item_from_rows(item, fields))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(OrderForm {
            id: form.id,
            name: form.name,
            timezone: form.timezone,
            schedule: RateSchedule {
                early_bird_end: form.early_bird_end,
                standard_end: form.standard_end,
                onsite_end: form.onsite_end,
            },
            items,
        }))
    }

    fn save_order(&self, order: NewSponsorOrder) -> Result<Uuid, DomainError> {
        let order_id = Uuid::new_v4();
        let pricing = &order.pricing;

        let line_rows = pricing
            .lines
            .iter()
            .zip(0..)
            .map(|(line, position)| -> Result<SponsorOrderLineRow, DomainError> {
                let stored: Vec<StoredFieldValue> = order
                    .values
                    .fields_for_item(line.item_id)
                    .map(|(k, v)| StoredFieldValue {
                        class: k.class,
                        field_id: k.field_id,
                        value: v.clone(),
                    })
                    .collect();
                Ok(SponsorOrderLineRow {
                    id: Uuid::new_v4(),
                    order_id,
                    item_id: line.item_id,
                    position,
                    quantity: line.quantity,
                    unit_rate: line.unit_rate,
                    line_total: line.total,
                    notes: order.values.notes(line.item_id).map(str::to_string),
                    field_values: serde_json::to_value(stored)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Debezium's EventRouter SMT derives the Kafka topic from `aggregate_type`.
        let event_payload = json!({
            "order_id": order_id,
            "form_id": order.form_id,
            "sponsor_id": order.sponsor_id,
            "tier": pricing.tier.as_str(),
            "grand_total": pricing.grand_total,
            "discount": order.discount.map(|d| json!({ "type": d.kind(), "value": d.value() })),
            "lines": pricing
                .lines
                .iter()
                .map(|l| json!({
                    "item_id": l.item_id,
                    "quantity": l.quantity,
                    "unit_rate": l.unit_rate,
                    "line_total": l.total
                }))
                .collect::<Vec<_>>()
        });

        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::insert_into(sponsor_orders::table)
                .values(&NewSponsorOrderRow {
                    id: order_id,
                    form_id: order.form_id,
                    sponsor_id: order.sponsor_id,
                    tier: pricing.tier.as_str().to_string(),
                    discount_type: order.discount.map(|d| d.kind().to_string()),
                    discount_value: order.discount.map(|d| d.value()),
                    grand_total: pricing.grand_total,
                })
                .execute(conn)?;

            if !line_rows.is_empty() {
                diesel::insert_into(sponsor_order_lines::table)
                    .values(&line_rows)
                    .execute(conn)?;
            }

            diesel::insert_into(sponsor_order_outbox::table)
                .values(&NewOutboxEventRow {
                    id: Uuid::new_v4(),
                    aggregate_type: OUTBOX_AGGREGATE_TYPE.to_string(),
                    aggregate_id: order_id.to_string(),
                    event_type: ORDER_SAVED_EVENT.to_string(),
                    payload: event_payload,
                })
                .execute(conn)?;

            Ok(order_id)
        })
    }

    fn find_order(&self, id: Uuid) -> Result<Option<SponsorOrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = sponsor_orders::table
            .filter(sponsor_orders::id.eq(id))
            .select(SponsorOrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = SponsorOrderLineRow::belonging_to(&order)
            .select(SponsorOrderLineRow::as_select())
            .order(sponsor_order_lines::position.asc())
            .load(&mut conn)?;

        order_from_rows(order, lines).map(Some)
    }

    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = page.saturating_sub(1).saturating_mul(limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = sponsor_orders::table.count().get_result(conn)?;

            let rows = sponsor_orders::table
                .select(SponsorOrderRow::as_select())
                .order(sponsor_orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .map(|o| order_from_rows(o, vec![]))
                    .collect::<Result<Vec<_>, _>>()?,
                total,
            })
        })
    }
}
