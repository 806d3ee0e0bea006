use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_form_service::SharedOrderFormService;
use crate::domain::form::FieldClass;
use crate::domain::order::{FieldValue, SponsorOrderView};
use crate::domain::tier::RateTier;
use crate::errors::AppError;

use super::display_cents;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct SavedFieldResponse {
    pub class: FieldClass,
    pub field_id: Uuid,
    pub value: FieldValue,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity: i64,
    pub unit_rate: i64,
    pub line_total: i64,
    pub line_total_display: String,
    pub notes: Option<String>,
    pub values: Vec<SavedFieldResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiscountResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub form_id: Uuid,
    pub sponsor_id: Uuid,
    pub tier: RateTier,
    pub discount: Option<DiscountResponse>,
    pub grand_total: i64,
    pub grand_total_display: String,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<SponsorOrderView> for OrderResponse {
    fn from(o: SponsorOrderView) -> Self {
        OrderResponse {
            id: o.id,
            form_id: o.form_id,
            sponsor_id: o.sponsor_id,
            tier: o.tier,
            discount: o.discount.map(|d| DiscountResponse {
                kind: d.kind().to_string(),
                value: d.value(),
            }),
            grand_total: o.grand_total,
            grand_total_display: display_cents(o.grand_total),
            created_at: o.created_at.to_rfc3339(),
            lines: o
                .lines
                .into_iter()
                .map(|l| OrderLineResponse {
                    id: l.id,
                    item_id: l.item_id,
                    quantity: l.quantity,
                    unit_rate: l.unit_rate,
                    line_total: l.line_total,
                    line_total_display: display_cents(l.line_total),
                    notes: l.notes,
                    values: l
                        .values
                        .into_iter()
                        .map(|v| SavedFieldResponse {
                            class: v.class,
                            field_id: v.field_id,
                            value: v.value,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders/{id}
///
/// Returns the saved order together with its lines.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<SharedOrderFormService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let result = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match result {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders
///
/// Returns a paginated list of saved orders (without their lines), newest
/// first. Use `page` (1-based) and `limit` to control pagination.
#[utoipa::path(
    get,
    path = "/orders",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<SharedOrderFormService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || service.list_orders(page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}
