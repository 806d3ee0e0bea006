pub mod forms;
pub mod orders;

use actix_web::web;
use bigdecimal::BigDecimal;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        forms::create_form,
        forms::get_form,
        forms::get_tier,
        forms::quote,
        forms::save_order,
        orders::get_order,
        orders::list_orders,
    ),
    tags(
        (name = "forms", description = "Order form definitions and pricing"),
        (name = "orders", description = "Saved sponsor orders"),
    )
)]
pub struct ApiDoc;

/// Register every route on `cfg`. The service must be supplied as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/forms")
            .route("", web::post().to(forms::create_form))
            .route("/{id}", web::get().to(forms::get_form))
            .route("/{id}/tier", web::get().to(forms::get_tier))
            .route("/{id}/quote", web::post().to(forms::quote))
            .route("/{id}/orders", web::post().to(forms::save_order)),
    )
    .service(
        web::scope("/orders")
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order)),
    );
}

/// Format minor units as a two-decimal amount, e.g. 150400 -> "1504.00".
pub(crate) fn display_cents(cents: i64) -> String {
    BigDecimal::new(cents.into(), 2).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_display_with_two_decimals() {
        assert_eq!(display_cents(150400), "1504.00");
        assert_eq!(display_cents(37600), "376.00");
        assert_eq!(display_cents(188000), "1880.00");
        assert_eq!(display_cents(1999), "19.99");
        assert_eq!(display_cents(5), "0.05");
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/forms",
            "/forms/{id}",
            "/forms/{id}/tier",
            "/forms/{id}/quote",
            "/forms/{id}/orders",
            "/orders",
            "/orders/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
