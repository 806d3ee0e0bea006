use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_form_service::{SaveOrderCommand, SharedOrderFormService};
use crate::domain::form::{
    FieldClass, LineItem, LineItemDraft, MetaField, MetaFieldDraft, MetaFieldType, OrderForm,
    OrderFormDraft, RateSchedule, Rates,
};
use crate::domain::order::{Discount, FieldKey, FieldValue, OrderValues};
use crate::domain::pricing::{LinePrice, PriceBreakdown};
use crate::domain::tier::RateTier;
use crate::errors::AppError;

use super::display_cents;

// ── Form definition DTOs ─────────────────────────────────────────────────────

/// Unit prices in cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct RatesDto {
    pub early_bird: i64,
    pub standard: i64,
    pub onsite: i64,
}

impl From<RatesDto> for Rates {
    fn from(r: RatesDto) -> Self {
        Rates {
            early_bird: r.early_bird,
            standard: r.standard,
            onsite: r.onsite,
        }
    }
}

impl From<Rates> for RatesDto {
    fn from(r: Rates) -> Self {
        RatesDto {
            early_bird: r.early_bird,
            standard: r.standard,
            onsite: r.onsite,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMetaFieldRequest {
    pub class: FieldClass,
    pub field_type: MetaFieldType,
    pub label: String,
    #[serde(default)]
    pub minimum_quantity: Option<i64>,
    #[serde(default)]
    pub maximum_quantity: Option<i64>,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLineItemRequest {
    pub code: String,
    pub name: String,
    pub rates: RatesDto,
    #[serde(default)]
    pub default_quantity: Option<i64>,
    #[serde(default)]
    pub meta_fields: Vec<CreateMetaFieldRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFormRequest {
    pub name: String,
    /// IANA timezone name, e.g. "America/New_York"
    pub timezone: String,
    /// Cutoff days as Unix epoch seconds
    #[serde(default)]
    pub early_bird_end: Option<i64>,
    #[serde(default)]
    pub standard_end: Option<i64>,
    #[serde(default)]
    pub onsite_end: Option<i64>,
    pub items: Vec<CreateLineItemRequest>,
}

impl From<CreateFormRequest> for OrderFormDraft {
    fn from(req: CreateFormRequest) -> Self {
        OrderFormDraft {
            name: req.name,
            timezone: req.timezone,
            schedule: RateSchedule {
                early_bird_end: req.early_bird_end,
                standard_end: req.standard_end,
                onsite_end: req.onsite_end,
            },
            items: req
                .items
                .into_iter()
                .map(|i| LineItemDraft {
                    code: i.code,
                    name: i.name,
                    rates: i.rates.into(),
                    default_quantity: i.default_quantity,
                    meta_fields: i
                        .meta_fields
                        .into_iter()
                        .map(|f| MetaFieldDraft {
                            class: f.class,
                            field_type: f.field_type,
                            label: f.label,
                            minimum_quantity: f.minimum_quantity,
                            maximum_quantity: f.maximum_quantity,
                            options: f.options,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateFormResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetaFieldResponse {
    pub id: Uuid,
    pub class: FieldClass,
    pub field_type: MetaFieldType,
    pub label: String,
    pub minimum_quantity: Option<i64>,
    pub maximum_quantity: Option<i64>,
    pub options: Vec<String>,
}

impl From<MetaField> for MetaFieldResponse {
    fn from(f: MetaField) -> Self {
        MetaFieldResponse {
            id: f.id,
            class: f.class,
            field_type: f.field_type,
            label: f.label,
            minimum_quantity: f.minimum_quantity,
            maximum_quantity: f.maximum_quantity,
            options: f.options,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub rates: RatesDto,
    pub default_quantity: Option<i64>,
    pub meta_fields: Vec<MetaFieldResponse>,
}

impl From<LineItem> for LineItemResponse {
    fn from(i: LineItem) -> Self {
        LineItemResponse {
            id: i.id,
            code: i.code,
            name: i.name,
            rates: i.rates.into(),
            default_quantity: i.default_quantity,
            meta_fields: i.meta_fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FormResponse {
    pub id: Uuid,
    pub name: String,
    pub timezone: String,
    pub early_bird_end: Option<i64>,
    pub standard_end: Option<i64>,
    pub onsite_end: Option<i64>,
    pub items: Vec<LineItemResponse>,
}

impl From<OrderForm> for FormResponse {
    fn from(f: OrderForm) -> Self {
        FormResponse {
            id: f.id,
            name: f.name,
            timezone: f.timezone,
            early_bird_end: f.schedule.early_bird_end,
            standard_end: f.schedule.standard_end,
            onsite_end: f.schedule.onsite_end,
            items: f.items.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Pricing DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TierParams {
    /// Instant to evaluate (RFC 3339). Defaults to now.
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TierResponse {
    pub form_id: Uuid,
    pub tier: RateTier,
    pub timezone: String,
    pub evaluated_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FieldEntry {
    pub item_id: Uuid,
    pub class: FieldClass,
    pub field_id: Uuid,
    pub value: FieldValue,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualQuantity {
    pub item_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LineNotes {
    pub item_id: Uuid,
    pub notes: String,
}

/// Current order form values, keyed by item, field class and field.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderValuesRequest {
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    #[serde(default)]
    pub quantities: Vec<ManualQuantity>,
    #[serde(default)]
    pub notes: Vec<LineNotes>,
}

impl From<OrderValuesRequest> for OrderValues {
    fn from(req: OrderValuesRequest) -> Self {
        let mut values = OrderValues::new();
        for f in req.fields {
            values.set_field(
                FieldKey {
                    item_id: f.item_id,
                    class: f.class,
                    field_id: f.field_id,
                },
                f.value,
            );
        }
        for q in req.quantities {
            values.set_manual_quantity(q.item_id, q.quantity);
        }
        for n in req.notes {
            values.set_notes(n.item_id, n.notes);
        }
        values
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteRequest {
    #[serde(default)]
    pub values: OrderValuesRequest,
    /// Instant to price at (RFC 3339). Defaults to now.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineTotalResponse {
    pub item_id: Uuid,
    pub quantity: i64,
    pub unit_rate: i64,
    pub line_total: i64,
    /// Line total in major units, e.g. "1504.00"
    pub line_total_display: String,
}

impl From<&LinePrice> for LineTotalResponse {
    fn from(l: &LinePrice) -> Self {
        LineTotalResponse {
            item_id: l.item_id,
            quantity: l.quantity,
            unit_rate: l.unit_rate,
            line_total: l.total,
            line_total_display: display_cents(l.total),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub tier: RateTier,
    pub lines: Vec<LineTotalResponse>,
    pub grand_total: i64,
    pub grand_total_display: String,
}

impl From<&PriceBreakdown> for QuoteResponse {
    fn from(p: &PriceBreakdown) -> Self {
        QuoteResponse {
            tier: p.tier,
            lines: p.lines.iter().map(Into::into).collect(),
            grand_total: p.grand_total,
            grand_total_display: display_cents(p.grand_total),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DiscountRequest {
    /// "amount" (cents) or "rate" (percent)
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveOrderRequest {
    pub sponsor_id: Uuid,
    #[serde(default)]
    pub values: OrderValuesRequest,
    #[serde(default)]
    pub discount: Option<DiscountRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveOrderResponse {
    pub id: Uuid,
    pub tier: RateTier,
    pub lines: Vec<LineTotalResponse>,
    pub grand_total: i64,
    pub grand_total_display: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /forms
///
/// Creates an order form with its line items and meta fields.
#[utoipa::path(
    post,
    path = "/forms",
    request_body = CreateFormRequest,
    responses(
        (status = 201, description = "Form created", body = CreateFormResponse),
        (status = 400, description = "Invalid form definition"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "forms"
)]
pub async fn create_form(
    service: web::Data<SharedOrderFormService>,
    body: web::Json<CreateFormRequest>,
) -> Result<HttpResponse, AppError> {
    let draft = OrderFormDraft::from(body.into_inner());

    let id = web::block(move || service.create_form(draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateFormResponse { id }))
}

/// GET /forms/{id}
#[utoipa::path(
    get,
    path = "/forms/{id}",
    params(
        ("id" = Uuid, Path, description = "Form UUID"),
    ),
    responses(
        (status = 200, description = "Form found", body = FormResponse),
        (status = 404, description = "Form not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "forms"
)]
pub async fn get_form(
    service: web::Data<SharedOrderFormService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let form_id = path.into_inner();

    let form = web::block(move || service.get_form(form_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match form {
        Some(form) => Ok(HttpResponse::Ok().json(FormResponse::from(form))),
        None => Err(AppError::NotFound),
    }
}

/// GET /forms/{id}/tier
///
/// Reports which price window applies at `at` (or now).
#[utoipa::path(
    get,
    path = "/forms/{id}/tier",
    params(
        ("id" = Uuid, Path, description = "Form UUID"),
        TierParams,
    ),
    responses(
        (status = 200, description = "Resolved tier", body = TierResponse),
        (status = 404, description = "Form not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "forms"
)]
pub async fn get_tier(
    service: web::Data<SharedOrderFormService>,
    path: web::Path<Uuid>,
    query: web::Query<TierParams>,
) -> Result<HttpResponse, AppError> {
    let form_id = path.into_inner();
    let at = query.into_inner().at.unwrap_or_else(Utc::now);

    let (tier, form) = web::block(move || {
        let tier = service.resolve_tier(form_id, at)?;
        let form = service.get_form(form_id)?;
        Ok::<_, AppError>((tier, form))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(TierResponse {
        form_id,
        tier,
        timezone: form.map(|f| f.timezone).unwrap_or_default(),
        evaluated_at: at.to_rfc3339(),
    }))
}

/// POST /forms/{id}/quote
///
/// Prices the current form values without saving anything. Called on every
/// edit of the order form.
#[utoipa::path(
    post,
    path = "/forms/{id}/quote",
    params(
        ("id" = Uuid, Path, description = "Form UUID"),
    ),
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Priced draft", body = QuoteResponse),
        (status = 400, description = "Values do not fit the form"),
        (status = 404, description = "Form not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "forms"
)]
pub async fn quote(
    service: web::Data<SharedOrderFormService>,
    path: web::Path<Uuid>,
    body: web::Json<QuoteRequest>,
) -> Result<HttpResponse, AppError> {
    let form_id = path.into_inner();
    let body = body.into_inner();
    let at = body.at.unwrap_or_else(Utc::now);
    let values = OrderValues::from(body.values);

    let pricing = web::block(move || service.quote(form_id, &values, at))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(QuoteResponse::from(&pricing)))
}

/// POST /forms/{id}/orders
///
/// Re-prices the submitted values at the current instant and saves the
/// order. The order, its lines and an outbox event are written in a single
/// transaction.
#[utoipa::path(
    post,
    path = "/forms/{id}/orders",
    params(
        ("id" = Uuid, Path, description = "Form UUID"),
    ),
    request_body = SaveOrderRequest,
    responses(
        (status = 201, description = "Order saved", body = SaveOrderResponse),
        (status = 400, description = "Values do not fit the form"),
        (status = 404, description = "Form not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "forms"
)]
pub async fn save_order(
    service: web::Data<SharedOrderFormService>,
    path: web::Path<Uuid>,
    body: web::Json<SaveOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let form_id = path.into_inner();
    let body = body.into_inner();
    let discount = body
        .discount
        .map(|d| Discount::from_parts(&d.kind, d.value))
        .transpose()?;
    let cmd = SaveOrderCommand {
        form_id,
        sponsor_id: body.sponsor_id,
        values: body.values.into(),
        discount,
    };

    let saved = web::block(move || service.save_order(cmd, Utc::now()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let priced = QuoteResponse::from(&saved.pricing);
    Ok(HttpResponse::Created().json(SaveOrderResponse {
        id: saved.id,
        tier: priced.tier,
        lines: priced.lines,
        grand_total: priced.grand_total,
        grand_total_display: priced.grand_total_display,
    }))
}
